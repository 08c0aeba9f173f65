//! Request-level orchestration: validate the dream, ask the provider chain,
//! normalize the reply.

use crate::ai::{build_completion_service, CompletionService};
use crate::fallback::FallbackChain;
use crate::models::{Config, DreamInput, PredictionResult};
use crate::normalizer::normalize;
use crate::{prompts, Error, Result};
use tracing::info;

pub struct App {
    chain: FallbackChain,
}

/// Injectable provider bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub primary: Box<dyn CompletionService>,
    pub fallback: Option<Box<dyn CompletionService>>,
}

impl App {
    /// Build an app from concrete provider dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            chain: FallbackChain::new(services.primary, services.fallback),
        }
    }

    /// Build the provider chain described by `config`.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let primary =
            build_completion_service(config.primary_provider, config, http_client.clone());
        let fallback = config
            .fallback_provider
            .map(|provider| build_completion_service(provider, config, http_client.clone()));

        let app = Self::with_services(AppServices { primary, fallback });
        info!("Provider chain: {}", app.chain.service_names().join(" -> "));
        app
    }

    /// Produce a prediction for one dream description.
    ///
    /// Blank input and a chain without any credentials are rejected before
    /// any network call is made.
    pub async fn predict(&self, dream: &str) -> Result<PredictionResult> {
        let dream = DreamInput::parse(dream)?;

        if !self.chain.is_configured() {
            return Err(Error::Configuration(format!(
                "No AI provider credentials configured (checked {})",
                self.chain.service_names().join(", ")
            )));
        }

        let user_prompt = prompts::predict_user(dream.as_str());
        let outcome = self
            .chain
            .complete(prompts::PREDICT_SYSTEM, &user_prompt)
            .await?;

        info!(
            "Received {} chars from {}{}",
            outcome.raw_text.chars().count(),
            outcome.service,
            if outcome.used_fallback { " (fallback)" } else { "" }
        );

        let service = self
            .chain
            .has_fallback()
            .then_some(outcome.service.as_str());
        Ok(normalize(&outcome.raw_text, service))
    }
}
