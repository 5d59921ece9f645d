use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::reconciler::BatchPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Directory holding the persisted catalog slots
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// How an import batch is folded into the existing catalog
    #[serde(default)]
    pub batch_policy: BatchPolicy,
    /// Extraction service settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Promotional message template
    #[serde(default)]
    pub message: MessageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            batch_policy: BatchPolicy::default(),
            extraction: ExtractionConfig::default(),
            message: MessageConfig::default(),
        }
    }
}

/// Configuration for the external extraction service
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Provider used when none is named explicitly
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            timeout: default_timeout(),
        }
    }
}

impl ExtractionConfig {
    /// Configuration for `name`, falling back to the built-in settings of
    /// known providers when the file does not mention it.
    pub fn provider_config(&self, name: &str) -> Option<ProviderConfig> {
        self.providers
            .get(name)
            .cloned()
            .or_else(|| ProviderConfig::builtin(name))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Configuration for a specific extraction provider.
///
/// API keys are not part of the configuration; they are supplied with each call.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.0-flash", "gpt-4o-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    fn builtin(name: &str) -> Option<Self> {
        let model = match name {
            "google" => "gemini-2.0-flash",
            "openai" => "gpt-4o-mini",
            _ => return None,
        };
        Some(ProviderConfig {
            enabled: true,
            model: model.to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: None,
        })
    }
}

/// Header and footer of the promotional message
#[derive(Debug, Deserialize, Clone)]
pub struct MessageConfig {
    #[serde(default = "default_message_title")]
    pub title: String,
    #[serde(default = "default_message_footer")]
    pub footer: Vec<String>,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            title: default_message_title(),
            footer: default_message_footer(),
        }
    }
}

// Default value functions
fn default_storage_dir() -> PathBuf {
    PathBuf::from(".price-catalog")
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout() -> u64 {
    30
}

fn default_message_title() -> String {
    "📢 Lista Oficial ⚡".to_string()
}

fn default_message_footer() -> Vec<String> {
    vec![
        "📌 Condições Especiais".to_string(),
        "⚡ Entrega rápida".to_string(),
        "📦 Produtos 100% lacrados".to_string(),
    ]
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PRICE_CATALOG__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PRICE_CATALOG__EXTRACTION__DEFAULT_PROVIDER
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: PRICE_CATALOG__EXTRACTION__TIMEOUT
        .add_source(
            Environment::with_prefix("PRICE_CATALOG")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
