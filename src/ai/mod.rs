//! Upstream LLM providers
//!
//! Every provider is reached through [`CompletionService`]: one system prompt
//! and one user prompt in, raw reply text out. Provider choice is a matter of
//! configuration, see [`build_completion_service`].

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod unconfigured;

pub use gemini::GeminiChatClient;
pub use mock::MockCompletionClient;
pub use openai::OpenAiChatClient;
pub use unconfigured::UnconfiguredClient;

use crate::models::{AiProvider, Config};
use crate::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Upper bound on generated tokens for a single prediction.
pub const MAX_OUTPUT_TOKENS: u32 = 400;

/// Sampling temperature for predictions.
pub const TEMPERATURE: f32 = 0.8;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Identifier stamped on results produced from this provider's output.
    fn service_name(&self) -> &str;

    /// Whether the provider has the credentials it needs to make a call.
    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Build the client for `provider`, or an [`UnconfiguredClient`] when its
/// credential is absent.
pub fn build_completion_service(
    provider: AiProvider,
    config: &Config,
    http_client: reqwest::Client,
) -> Box<dyn CompletionService> {
    let model = config.model_for(provider).to_string();

    let Some(api_key) = config.api_key_for(provider).map(str::to_string) else {
        warn!(
            "{} not set; {} provider will report a configuration error",
            provider.api_key_var(),
            provider
        );
        return Box::new(UnconfiguredClient::new(provider));
    };

    match provider {
        AiProvider::OpenAi => {
            info!("Completion provider: OpenAI (model: {})", model);
            Box::new(
                OpenAiChatClient::new_with_client(
                    api_key,
                    model,
                    config.request_timeout,
                    http_client,
                )
                .with_base_url(config.openai_base_url.clone()),
            )
        }
        AiProvider::Gemini => {
            info!("Completion provider: Gemini (model: {})", model);
            Box::new(
                GeminiChatClient::new_with_client(
                    api_key,
                    model,
                    config.request_timeout,
                    http_client,
                )
                .with_base_url(config.gemini_base_url.clone()),
            )
        }
    }
}
