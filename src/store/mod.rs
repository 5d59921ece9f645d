//! The catalog store: the single source of truth for products and defaults.
//!
//! State changes go through [`CatalogStore::dispatch`]. Each [`Action`] is
//! reduced into a new state by a pure function, the changed slots are
//! written, and only then is the new state committed. A failed action
//! leaves the previous state untouched in memory and on disk.

mod slots;

pub use self::slots::{FileSlots, MemorySlots, SlotStorage, FREIGHT_SLOT, MARGIN_SLOT, PRODUCTS_SLOT};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::model::{CatalogSettings, Product, ProductDraft};
use crate::pricing::{self, EditableField};
use crate::reconciler::{self, BatchPolicy};

/// A requested change to the catalog.
#[derive(Debug, Clone)]
pub enum Action {
    /// Fold an import batch into the catalog
    ImportBatch(Vec<ProductDraft>),
    /// Edit one pricing field from the raw text typed by the user
    EditField {
        id: Uuid,
        field: EditableField,
        raw: String,
    },
    /// Remove a product; only takes effect when confirmed
    Delete { id: Uuid, confirmed: bool },
    SetFreightDefault(f64),
    SetMarginDefault(f64),
}

/// Number of products an import batch updated and inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub updated: usize,
    pub inserted: usize,
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Imported(ImportReport),
    Edited(Product),
    /// The edit matched the current value; nothing was written
    Unchanged,
    Deleted(Product),
    SettingsChanged(CatalogSettings),
}

/// Totals over the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogSummary {
    pub count: usize,
    pub total_cost: f64,
    pub total_margin: f64,
    pub total_sale: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub products: Vec<Product>,
    pub settings: CatalogSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dirty {
    Products,
    Freight,
    Margin,
}

/// Compute the state that follows `action`, without side effects.
fn reduce(
    state: &CatalogState,
    action: Action,
    policy: BatchPolicy,
    now: DateTime<Utc>,
) -> Result<(CatalogState, Outcome, Option<Dirty>), CatalogError> {
    match action {
        Action::ImportBatch(batch) => {
            let batch: Vec<ProductDraft> = batch
                .into_iter()
                .filter(|draft| {
                    let usable = draft_is_usable(draft);
                    if !usable {
                        warn!("Skipping {:?}: amount out of range", draft.name);
                    }
                    usable
                })
                .collect();
            if batch.is_empty() {
                return Err(CatalogError::ParseEmpty);
            }
            let reconciliation =
                reconciler::reconcile(&state.products, &batch, &state.settings, now);
            let report = ImportReport {
                updated: reconciliation.updates.len(),
                inserted: reconciliation.inserts.len(),
            };
            let next = CatalogState {
                products: reconciliation.apply(&state.products, policy),
                settings: state.settings,
            };
            Ok((next, Outcome::Imported(report), Some(Dirty::Products)))
        }

        Action::EditField { id, field, raw } => {
            let index = state
                .products
                .iter()
                .position(|p| p.id == id)
                .ok_or(CatalogError::ProductNotFound(id))?;
            let current = &state.products[index];
            let value = pricing::parse_numeric_input(&raw)?;
            if value == field.current_value(current) {
                return Ok((state.clone(), Outcome::Unchanged, None));
            }

            let mut edited = pricing::apply_edit(current, field, value)?;
            edited.updated_at = now;
            let mut next = state.clone();
            next.products[index] = edited.clone();
            Ok((next, Outcome::Edited(edited), Some(Dirty::Products)))
        }

        Action::Delete { id, confirmed } => {
            let index = state
                .products
                .iter()
                .position(|p| p.id == id)
                .ok_or(CatalogError::ProductNotFound(id))?;
            if !confirmed {
                return Err(CatalogError::DeletionNotConfirmed);
            }
            let mut next = state.clone();
            let removed = next.products.remove(index);
            Ok((next, Outcome::Deleted(removed), Some(Dirty::Products)))
        }

        Action::SetFreightDefault(value) => {
            let mut next = state.clone();
            next.settings.freight_default = check_default(value)?;
            let settings = next.settings;
            Ok((next, Outcome::SettingsChanged(settings), Some(Dirty::Freight)))
        }

        Action::SetMarginDefault(value) => {
            let mut next = state.clone();
            next.settings.margin_default = check_default(value)?;
            let settings = next.settings;
            Ok((next, Outcome::SettingsChanged(settings), Some(Dirty::Margin)))
        }
    }
}

fn check_default(value: f64) -> Result<f64, CatalogError> {
    pricing::check_amount(value)
}

fn draft_is_usable(draft: &ProductDraft) -> bool {
    pricing::is_valid_amount(draft.cost_price)
        && draft.margin_percentage.map_or(true, pricing::is_valid_amount)
        && draft.freight.map_or(true, pricing::is_valid_amount)
}

pub struct CatalogStore<S: SlotStorage> {
    storage: S,
    state: CatalogState,
    policy: BatchPolicy,
}

impl<S: SlotStorage> CatalogStore<S> {
    /// Load the catalog from `storage`.
    ///
    /// Missing or unparsable slots fall back to their defaults; only a
    /// failing read is an error.
    pub fn load(storage: S, policy: BatchPolicy) -> Result<Self, CatalogError> {
        let defaults = CatalogSettings::default();
        let settings = CatalogSettings {
            freight_default: read_slot(&storage, FREIGHT_SLOT)?
                .unwrap_or(defaults.freight_default),
            margin_default: read_slot(&storage, MARGIN_SLOT)?.unwrap_or(defaults.margin_default),
        };
        let products: Vec<Product> = read_slot(&storage, PRODUCTS_SLOT)?.unwrap_or_default();
        info!("Loaded {} products", products.len());

        Ok(CatalogStore {
            storage,
            state: CatalogState { products, settings },
            policy,
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.state.products.iter().find(|p| p.id == id)
    }

    pub fn settings(&self) -> CatalogSettings {
        self.state.settings
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn summary(&self) -> CatalogSummary {
        let products = &self.state.products;
        CatalogSummary {
            count: products.len(),
            total_cost: pricing::round_money(products.iter().map(|p| p.cost_price).sum()),
            total_margin: pricing::round_money(
                products
                    .iter()
                    .map(|p| p.cost_price * p.margin_percentage / 100.0)
                    .sum(),
            ),
            total_sale: pricing::round_money(
                products.iter().map(Product::computed_sale_price).sum(),
            ),
        }
    }

    /// Apply `action`, persisting before the new state becomes visible.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome, CatalogError> {
        self.dispatch_at(action, Utc::now())
    }

    /// [`dispatch`](Self::dispatch) with an explicit clock.
    pub fn dispatch_at(
        &mut self,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Outcome, CatalogError> {
        let (next, outcome, dirty) = reduce(&self.state, action, self.policy, now)?;
        if let Some(dirty) = dirty {
            self.persist(&next, dirty)?;
            self.state = next;
        }
        Ok(outcome)
    }

    fn persist(&mut self, state: &CatalogState, dirty: Dirty) -> Result<(), CatalogError> {
        let (key, serialized) = match dirty {
            Dirty::Products => (PRODUCTS_SLOT, serde_json::to_string(&state.products)),
            Dirty::Freight => (
                FREIGHT_SLOT,
                serde_json::to_string(&state.settings.freight_default),
            ),
            Dirty::Margin => (
                MARGIN_SLOT,
                serde_json::to_string(&state.settings.margin_default),
            ),
        };
        let serialized = serialized.map_err(|e| {
            CatalogError::PersistenceFailure(format!("failed to serialize {}: {}", key, e))
        })?;
        self.storage.write(key, &serialized)
    }
}

fn read_slot<S: SlotStorage, T: DeserializeOwned>(
    storage: &S,
    key: &str,
) -> Result<Option<T>, CatalogError> {
    let Some(raw) = storage.read(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Ignoring unparsable slot {}: {}", key, e);
            Ok(None)
        }
    }
}
