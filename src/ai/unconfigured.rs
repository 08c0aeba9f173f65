use super::CompletionService;
use crate::models::AiProvider;
use crate::{Error, Result};
use async_trait::async_trait;

/// Stand-in for a provider whose credential is missing.
///
/// Every call fails with [`Error::Configuration`] without touching the
/// network, which lets a fallback chain move on to the next provider.
pub struct UnconfiguredClient {
    provider: AiProvider,
}

impl UnconfiguredClient {
    pub fn new(provider: AiProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompletionService for UnconfiguredClient {
    fn service_name(&self) -> &str {
        self.provider.as_str()
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(Error::Configuration(format!(
            "{} is missing",
            self.provider.api_key_var()
        )))
    }
}
