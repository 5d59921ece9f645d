//! Matching of import batches against the existing catalog.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{CatalogSettings, Category, Product, ProductDraft};
use crate::parser::infer_category;
use crate::pricing;

/// How a reconciled batch is folded into the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    /// Update matched products in place and append the rest.
    #[default]
    Merge,
    /// The batch becomes the whole catalog; matched products keep their ids.
    Replace,
}

/// Matching key for product names: lower-cased, without whitespace,
/// hyphens, bullets or arrows.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '•' | '→'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// An import batch split into products that replace existing entries and
/// products that are new to the catalog. Both keep batch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub updates: Vec<Product>,
    pub inserts: Vec<Product>,
    /// Batch position of every product, as (is_update, index into its list).
    order: Vec<(bool, usize)>,
}

impl Reconciliation {
    /// Products in the order the batch listed them.
    pub fn in_batch_order(&self) -> impl Iterator<Item = &Product> + '_ {
        self.order.iter().map(move |&(is_update, index)| {
            if is_update {
                &self.updates[index]
            } else {
                &self.inserts[index]
            }
        })
    }

    /// Fold the reconciled batch into `existing` according to `policy`.
    pub fn apply(&self, existing: &[Product], policy: BatchPolicy) -> Vec<Product> {
        match policy {
            BatchPolicy::Replace => self.in_batch_order().cloned().collect(),
            BatchPolicy::Merge => {
                let mut merged = existing.to_vec();
                for update in &self.updates {
                    if let Some(slot) = merged.iter_mut().find(|p| p.id == update.id) {
                        *slot = update.clone();
                    }
                }
                merged.extend(self.inserts.iter().cloned());
                merged
            }
        }
    }
}

/// Partition `batch` into updates and inserts against `existing`.
///
/// Matched products keep their id, creation time, and any category, margin
/// or freight the batch leaves unspecified. New products take unspecified
/// values from `settings` and an inferred category.
///
/// An existing product is updated at most once per batch: when several
/// entries match it, the last one wins and keeps the position of the first.
pub fn reconcile(
    existing: &[Product],
    batch: &[ProductDraft],
    settings: &CatalogSettings,
    now: DateTime<Utc>,
) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();
    // id of a matched product -> index into `updates`
    let mut claimed: HashMap<Uuid, usize> = HashMap::new();

    for draft in batch {
        let key = normalize_name(&draft.name);
        match existing.iter().find(|p| normalize_name(&p.name) == key) {
            Some(current) => {
                debug!("Matched {:?} to existing product {}", draft.name, current.id);
                let product = build_product(
                    current.id,
                    draft,
                    draft.margin_percentage.unwrap_or(current.margin_percentage),
                    draft.freight.unwrap_or(current.freight),
                    draft.category.unwrap_or(current.category),
                    current.created_at,
                    now,
                );
                if let Some(&index) = claimed.get(&current.id) {
                    debug!("{:?} overrides an earlier entry for {}", draft.name, current.id);
                    reconciliation.updates[index] = product;
                    continue;
                }
                claimed.insert(current.id, reconciliation.updates.len());
                reconciliation
                    .order
                    .push((true, reconciliation.updates.len()));
                reconciliation.updates.push(product);
            }
            None => {
                let product = build_product(
                    Uuid::new_v4(),
                    draft,
                    draft.margin_percentage.unwrap_or(settings.margin_default),
                    draft.freight.unwrap_or(settings.freight_default),
                    draft
                        .category
                        .unwrap_or_else(|| infer_category(&draft.name)),
                    now,
                    now,
                );
                reconciliation
                    .order
                    .push((false, reconciliation.inserts.len()));
                reconciliation.inserts.push(product);
            }
        }
    }

    reconciliation
}

fn build_product(
    id: Uuid,
    draft: &ProductDraft,
    margin_percentage: f64,
    freight: f64,
    category: Category,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Product {
    Product {
        id,
        name: draft.name.clone(),
        cost_price: draft.cost_price,
        margin_percentage,
        margin_value: pricing::margin_value(draft.cost_price, margin_percentage),
        sale_price: pricing::sale_price(draft.cost_price, margin_percentage, freight),
        freight,
        category,
        created_at,
        updated_at,
    }
}
