//! Price catalog editor.
//!
//! Pasted price lists are turned into products either by a deterministic
//! line parser or by an external extraction service, reconciled against
//! the stored catalog by normalized name, priced with a
//! cost-plus-margin-plus-freight formula, and rendered as a promotional
//! message.
//!
//! ```
//! use price_catalog::{generate_message, CatalogStore, MemorySlots, BatchPolicy, MessageConfig};
//! use price_catalog::{Action, ProductDraft, parser};
//!
//! let mut store = CatalogStore::load(MemorySlots::new(), BatchPolicy::Merge).unwrap();
//! let batch = parser::parse_text("iPhone 16 • 256GB → R$ 3.500,00", 0.0)
//!     .into_iter()
//!     .map(ProductDraft::from)
//!     .collect();
//! store.dispatch(Action::ImportBatch(batch)).unwrap();
//!
//! let message = generate_message(store.products(), &MessageConfig::default());
//! assert!(message.contains("R$ 3.850,00"));
//! ```

pub mod config;
pub mod currency;
pub mod error;
pub mod extraction;
pub mod importer;
pub mod message;
pub mod model;
pub mod parser;
pub mod pricing;
pub mod providers;
pub mod reconciler;
pub mod store;

pub use config::{AppConfig, ExtractionConfig, MessageConfig, ProviderConfig};
pub use error::CatalogError;
pub use importer::{ImportMode, Importer, ImporterBuilder};
pub use message::generate_message;
pub use model::{CatalogSettings, Category, ExtractedItem, ParsedProduct, Product, ProductDraft};
pub use pricing::EditableField;
pub use reconciler::{normalize_name, reconcile, BatchPolicy, Reconciliation};
pub use store::{
    Action, CatalogStore, CatalogSummary, FileSlots, ImportReport, MemorySlots, Outcome,
    SlotStorage,
};

use log::info;

/// Extract products from `text` and fold them into `store`.
///
/// The store is only touched once extraction has finished, so a slow
/// extraction call never overwrites a newer state with a stale one.
pub async fn import_text<S: SlotStorage>(
    store: &mut CatalogStore<S>,
    importer: &Importer,
    text: &str,
    mode: ImportMode<'_>,
) -> Result<Outcome, CatalogError> {
    let settings = store.settings();
    let batch = importer.import(text, mode, &settings).await?;

    let outcome = store.dispatch(Action::ImportBatch(batch))?;
    if let Outcome::Imported(report) = &outcome {
        info!(
            "Updated {} products and added {} new products",
            report.updated, report.inserted
        );
    }
    Ok(outcome)
}

/// Open the catalog described by `config`, stored on disk.
pub fn open_catalog(config: &AppConfig) -> Result<CatalogStore<FileSlots>, CatalogError> {
    CatalogStore::load(FileSlots::new(&config.storage_dir), config.batch_policy)
}
