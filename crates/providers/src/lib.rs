//! Chat backend implementations for Tandem.
//!
//! The remote endpoint implements the `tandem_core::Provider` trait.
//! [`ChatBackend`] binds a provider to a model name and wraps every call in
//! the bounded retry policy.

pub mod backend;
pub mod openai_compat;
pub mod retry;

use std::sync::Arc;

use tandem_config::AppConfig;
use tandem_core::error::ProviderError;
use tandem_core::Provider;

pub use backend::ChatBackend;
pub use openai_compat::OpenAiCompatProvider;
pub use retry::RetryPolicy;

/// Build the shared HTTP provider from configuration.
///
/// A missing key is not an error here; the endpoint rejects the first call
/// with an authentication failure instead.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let provider = OpenAiCompatProvider::new("openai", &config.base_url, api_key)?;
    Ok(Arc::new(provider))
}

/// The three backends an agent needs: planner, executor and memory updater.
///
/// All three share one provider (and one HTTP connection pool) and differ
/// only in model name.
pub struct Backends {
    pub planner: ChatBackend,
    pub executor: ChatBackend,
    pub memory: ChatBackend,
}

impl Backends {
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let provider = build_provider(config)?;
        Ok(Self::with_provider(provider, config))
    }

    /// Bind an existing provider to the configured models.
    pub fn with_provider(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let make = |model: &str| ChatBackend::from_config(provider.clone(), model, config);
        Self {
            planner: make(&config.models.planner),
            executor: make(&config.models.executor),
            memory: make(&config.models.memory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_use_configured_models() {
        let mut config = AppConfig::default();
        config.models.planner = "planner-model".into();
        config.models.executor = "executor-model".into();
        config.models.memory = "memory-model".into();

        let backends = Backends::from_config(&config).unwrap();
        assert_eq!(backends.planner.model(), "planner-model");
        assert_eq!(backends.executor.model(), "executor-model");
        assert_eq!(backends.memory.model(), "memory-model");
    }

    #[test]
    fn build_provider_without_key_still_builds() {
        let config = AppConfig::default();
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
