mod factory;
mod google;
mod open_ai;
mod prompt;

pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_extraction_prompt, EXTRACTION_PROMPT};

use async_trait::async_trait;
use std::error::Error;

/// Unified trait for external text-understanding services
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Get the provider name (e.g., "google", "openai")
    fn provider_name(&self) -> &str;

    /// Send `prompt` and return the raw text of the model's answer.
    ///
    /// `api_key` is supplied by the caller for every request and is never
    /// stored by the provider.
    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}
