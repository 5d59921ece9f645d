use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use config::ConfigError;
use log::info;

use crate::config::ExtractionConfig;
use crate::error::CatalogError;
use crate::extraction;
use crate::model::{CatalogSettings, ProductDraft};
use crate::parser::LineParser;
use crate::providers::{ExtractionProvider, ProviderFactory};

/// How pasted text is turned into products
#[derive(Debug, Clone, Copy)]
pub enum ImportMode<'a> {
    /// Deterministic line parser
    Parser,
    /// External extraction service, authenticated with a per-call key
    Provider { api_key: &'a str },
}

/// Held while an import runs; clears the busy flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Turns pasted text into an import batch.
///
/// Only one import runs at a time: a second request while one is in flight
/// fails with [`CatalogError::Busy`] instead of racing it.
pub struct Importer {
    provider: Option<Box<dyn ExtractionProvider>>,
    busy: Arc<AtomicBool>,
}

impl Importer {
    /// Creates a new builder for importers
    ///
    /// # Example
    /// ```
    /// use price_catalog::Importer;
    ///
    /// let importer = Importer::builder().parser_only().build().unwrap();
    /// assert!(!importer.is_busy());
    /// ```
    pub fn builder() -> ImporterBuilder {
        ImporterBuilder::default()
    }

    /// Importer that can only use the line parser
    pub fn parser_only() -> Self {
        Importer {
            provider: None,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_provider(provider: Box<dyn ExtractionProvider>) -> Self {
        Importer {
            provider: Some(provider),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the busy flag, failing if another import holds it.
    pub fn try_begin(&self) -> Result<BusyGuard, CatalogError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CatalogError::Busy)?;
        Ok(BusyGuard {
            flag: Arc::clone(&self.busy),
        })
    }

    /// Extract an import batch from `text`.
    ///
    /// # Errors
    /// - [`CatalogError::Busy`] if another import is running
    /// - [`CatalogError::ParseEmpty`] if no product was found, including
    ///   when the extraction service failed
    pub async fn import(
        &self,
        text: &str,
        mode: ImportMode<'_>,
        settings: &CatalogSettings,
    ) -> Result<Vec<ProductDraft>, CatalogError> {
        let _guard = self.try_begin()?;

        if text.trim().is_empty() {
            return Err(CatalogError::ParseEmpty);
        }

        let batch: Vec<ProductDraft> = match mode {
            ImportMode::Parser => LineParser::new(settings.freight_default)
                .parse(text)
                .into_iter()
                .map(ProductDraft::from)
                .collect(),
            ImportMode::Provider { api_key } => {
                let provider = self.provider.as_deref().ok_or_else(|| {
                    ConfigError::Message("No extraction provider configured".to_string())
                })?;
                extraction::extract_items(provider, text, api_key)
                    .await
                    .into_iter()
                    .map(ProductDraft::from)
                    .collect()
            }
        };

        if batch.is_empty() {
            return Err(CatalogError::ParseEmpty);
        }
        info!("Import produced {} products", batch.len());
        Ok(batch)
    }
}

/// Builder for [`Importer`]
#[derive(Debug, Default)]
pub struct ImporterBuilder {
    config: Option<ExtractionConfig>,
    provider: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    parser_only: bool,
}

impl ImporterBuilder {
    /// Use the extraction settings from the application configuration
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Name of the extraction provider ("google" or "openai")
    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }

    /// Override the provider's model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the provider's endpoint, e.g. for a proxy
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a timeout for extraction requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Skip the extraction provider entirely
    pub fn parser_only(mut self) -> Self {
        self.parser_only = true;
        self
    }

    /// # Errors
    /// Returns [`CatalogError::Config`] if the provider is unknown or disabled.
    pub fn build(self) -> Result<Importer, CatalogError> {
        if self.parser_only {
            return Ok(Importer::parser_only());
        }

        let mut config = self.config.unwrap_or_default();
        let name = self
            .provider
            .unwrap_or_else(|| config.default_provider.clone());
        if self.model.is_some() || self.base_url.is_some() {
            let mut provider_config = config.provider_config(&name).ok_or_else(|| {
                ConfigError::Message(format!("Provider '{}' not found in configuration", name))
            })?;
            if let Some(model) = self.model {
                provider_config.model = model;
            }
            if let Some(base_url) = self.base_url {
                provider_config.base_url = Some(base_url);
            }
            config.providers.insert(name.clone(), provider_config);
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout.as_secs().max(1);
        }

        let provider = ProviderFactory::from_config(&config, Some(name.as_str()))?;
        Ok(Importer::with_provider(provider))
    }
}
