use crate::config::{ExtractionConfig, ProviderConfig};
use crate::error::CatalogError;
use crate::providers::{ExtractionProvider, GoogleProvider, OpenAIProvider};
use config::ConfigError;
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn ExtractionProvider>, CatalogError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(ConfigError::Message(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            ))
            .into());
        }

        match provider_name {
            "google" => Ok(Box::new(GoogleProvider::new(config, timeout)?)),
            "openai" => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            _ => Err(ConfigError::Message(format!(
                "Unknown provider: {} (available: {})",
                provider_name,
                Self::available_providers().join(", ")
            ))
            .into()),
        }
    }

    /// Create the provider called `provider_name`, or the default one
    pub fn from_config(
        config: &ExtractionConfig,
        provider_name: Option<&str>,
    ) -> Result<Box<dyn ExtractionProvider>, CatalogError> {
        let provider_name = provider_name.unwrap_or(config.default_provider.as_str());
        let provider_config = config.provider_config(provider_name).ok_or_else(|| {
            ConfigError::Message(format!(
                "Provider '{}' not found in configuration",
                provider_name
            ))
        })?;

        Self::create(provider_name, &provider_config, config.timeout())
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["google", "openai"]
    }
}
