use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while importing, editing or persisting the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No line of the pasted text produced a product
    #[error("No products found in the provided text")]
    ParseEmpty,

    /// The extraction service call failed or returned something unusable
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    /// An edited value is not a non-negative number
    #[error("Invalid numeric value: {0}")]
    InvalidNumericEdit(String),

    /// The name does not match any editable pricing field
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A percentage back-solve was attempted with a zero cost price
    #[error("Cannot derive a margin percentage from a zero cost price")]
    DivisionByZero,

    /// Reading or writing the durable slots failed
    #[error("Persistence error: {0}")]
    PersistenceFailure(String),

    /// No product carries the given identifier
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// A deletion was requested without confirmation
    #[error("Deletion requires confirmation")]
    DeletionNotConfirmed,

    /// Another import is still in flight
    #[error("An import is already in progress")]
    Busy,

    /// Failed to build an HTTP client or send a request
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
