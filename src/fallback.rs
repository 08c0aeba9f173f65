//! Primary/secondary provider chain with a single fallback hop.

use crate::ai::CompletionService;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Progress of one pass through a [`FallbackChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    NotStarted,
    TryingPrimary,
    TryingSecondary,
    Succeeded { service: String },
    Failed,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded { .. } | AttemptState::Failed)
    }

    /// Move to `next`, refusing anything the chain cannot legally do.
    pub fn advance(self, next: AttemptState) -> Result<AttemptState> {
        use AttemptState::*;

        let allowed = matches!(
            (&self, &next),
            (NotStarted, TryingPrimary)
                | (TryingPrimary, Succeeded { .. })
                | (TryingPrimary, TryingSecondary)
                | (TryingPrimary, Failed)
                | (TryingSecondary, Succeeded { .. })
                | (TryingSecondary, Failed)
        );

        if !allowed {
            return Err(Error::Invariant(format!(
                "Illegal fallback transition {:?} -> {:?}",
                self, next
            )));
        }

        debug!("Fallback state {:?} -> {:?}", self, next);
        Ok(next)
    }
}

/// Raw reply obtained from whichever provider answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackOutcome {
    pub service: String,
    pub raw_text: String,
    pub used_fallback: bool,
}

pub struct FallbackChain {
    primary: Box<dyn CompletionService>,
    secondary: Option<Box<dyn CompletionService>>,
}

impl FallbackChain {
    pub fn new(
        primary: Box<dyn CompletionService>,
        secondary: Option<Box<dyn CompletionService>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// The secondary provider, if it can actually be asked.
    fn usable_secondary(&self) -> Option<&dyn CompletionService> {
        self.secondary
            .as_deref()
            .filter(|secondary| secondary.is_configured())
    }

    /// True when a failing primary has a configured provider to hand over to.
    pub fn has_fallback(&self) -> bool {
        self.usable_secondary().is_some()
    }

    /// True when at least one provider in the chain has credentials.
    pub fn is_configured(&self) -> bool {
        self.primary.is_configured()
            || self
                .secondary
                .as_ref()
                .is_some_and(|secondary| secondary.is_configured())
    }

    /// Names of the providers in the chain, primary first.
    pub fn service_names(&self) -> Vec<&str> {
        std::iter::once(self.primary.service_name())
            .chain(self.secondary.as_ref().map(|s| s.service_name()))
            .collect()
    }

    /// Ask the primary provider, then the secondary once if the primary
    /// fails. Only the last error is returned. A secondary without
    /// credentials is skipped and the primary error surfaces as is.
    pub async fn complete(&self, system: &str, user: &str) -> Result<FallbackOutcome> {
        let state = AttemptState::NotStarted.advance(AttemptState::TryingPrimary)?;

        let primary_error = match self.primary.complete(system, user).await {
            Ok(raw_text) => {
                let service = self.primary.service_name().to_string();
                state.advance(AttemptState::Succeeded {
                    service: service.clone(),
                })?;
                return Ok(FallbackOutcome {
                    service,
                    raw_text,
                    used_fallback: false,
                });
            }
            Err(e) => e,
        };

        let Some(secondary) = self.usable_secondary() else {
            if let Some(skipped) = &self.secondary {
                debug!(
                    "Skipping fallback to {}: no credentials",
                    skipped.service_name()
                );
            }
            state.advance(AttemptState::Failed)?;
            return Err(primary_error);
        };

        warn!(
            "Provider {} failed: {}. Falling back to {}",
            self.primary.service_name(),
            primary_error,
            secondary.service_name()
        );
        let state = state.advance(AttemptState::TryingSecondary)?;

        match secondary.complete(system, user).await {
            Ok(raw_text) => {
                let service = secondary.service_name().to_string();
                info!("Fallback provider {} succeeded", service);
                state.advance(AttemptState::Succeeded {
                    service: service.clone(),
                })?;
                Ok(FallbackOutcome {
                    service,
                    raw_text,
                    used_fallback: true,
                })
            }
            Err(e) => {
                warn!(
                    "Fallback provider {} failed: {}",
                    secondary.service_name(),
                    e
                );
                state.advance(AttemptState::Failed)?;
                Err(e)
            }
        }
    }
}
