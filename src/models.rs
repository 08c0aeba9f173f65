//! Data models and structures
//!
//! Defines the request input, the candidate object pulled out of a model
//! reply, the normalized prediction returned to callers, and the service
//! configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Dream text submitted by a user, guaranteed non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamInput(String);

impl DreamInput {
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Structured object tentatively extracted from a model reply.
///
/// Every field is optional: a field holding the wrong JSON type is treated
/// the same as a missing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCandidate {
    pub interpretation: Option<String>,
    pub lucky_numbers: Option<Vec<Value>>,
    pub confidence: Option<String>,
    pub notes: Option<String>,
}

impl ParsedCandidate {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let string_field = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            interpretation: string_field("interpretation"),
            lucky_numbers: object
                .get("lucky_numbers")
                .and_then(Value::as_array)
                .cloned(),
            confidence: string_field("confidence"),
            notes: string_field("notes"),
        }
    }
}

/// Normalized prediction returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub interpretation: String,
    pub lucky_numbers: Vec<i64>,
    pub confidence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Decoded candidate object, or the raw model text when none was found.
    pub raw: Value,
}

/// Request body accepted by the prediction endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub dream: Option<String>,
}

/// Error body returned by the prediction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    /// Identifier stamped on results as `service`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            AiProvider::OpenAi => AiProvider::Gemini,
            AiProvider::Gemini => AiProvider::OpenAi,
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(Error::Config(format!(
                "Unknown AI provider '{}'. Expected 'openai' or 'gemini'",
                other
            ))),
        }
    }
}

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub primary_provider: AiProvider,
    pub fallback_provider: Option<AiProvider>,
    pub request_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// when one exists.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let primary_provider = match non_empty("PRIMARY_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::OpenAi,
        };

        let fallback_provider = match non_empty("FALLBACK_PROVIDER") {
            Some(value) if value.trim().eq_ignore_ascii_case("none") => None,
            Some(value) => Some(value.parse::<AiProvider>()?),
            None => Some(primary_provider.other()),
        };

        if fallback_provider == Some(primary_provider) {
            return Err(Error::Config(format!(
                "FALLBACK_PROVIDER must differ from PRIMARY_PROVIDER ({})",
                primary_provider
            )));
        }

        let request_timeout = match non_empty("AI_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "AI_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        value
                    ))
                })?;
                if secs == 0 {
                    return Err(Error::Config(
                        "AI_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            primary_provider,
            fallback_provider,
            request_timeout,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    pub fn api_key_for(&self, provider: AiProvider) -> Option<&str> {
        match provider {
            AiProvider::OpenAi => self.openai_api_key.as_deref(),
            AiProvider::Gemini => self.gemini_api_key.as_deref(),
        }
    }

    pub fn model_for(&self, provider: AiProvider) -> &str {
        match provider {
            AiProvider::OpenAi => &self.openai_model,
            AiProvider::Gemini => &self.gemini_model,
        }
    }
}
