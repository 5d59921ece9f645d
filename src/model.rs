use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::pricing;

/// Fixed set of product categories inferred from product names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "iPhone")]
    IPhone,
    Watch,
    AirPods,
    #[serde(rename = "iPad")]
    IPad,
    Mac,
    Ultra,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::IPhone => "iPhone",
            Category::Watch => "Watch",
            Category::AirPods => "AirPods",
            Category::IPad => "iPad",
            Category::Mac => "Mac",
            Category::Ultra => "Ultra",
            Category::Other => "Other",
        }
    }

    /// Margin percentage applied to freshly parsed products of this category
    pub fn default_margin(&self) -> f64 {
        match self {
            Category::Watch | Category::AirPods | Category::Ultra => 15.0,
            Category::IPhone | Category::IPad | Category::Mac | Category::Other => 10.0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A catalog entry.
///
/// `margin_value` and `sale_price` are cached derivations of the other
/// pricing fields; the pricing module keeps them consistent on every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub cost_price: f64,
    pub margin_percentage: f64,
    pub margin_value: f64,
    pub sale_price: f64,
    pub freight: f64,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Sale price derived live from cost, margin and freight.
    pub fn computed_sale_price(&self) -> f64 {
        pricing::sale_price(self.cost_price, self.margin_percentage, self.freight)
    }
}

/// Transient `{name, price}` pair produced by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub price: f64,
}

/// Fully priced record produced by the line parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProduct {
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub margin_percentage: f64,
    pub margin_value: f64,
    pub freight: f64,
    pub category: Category,
}

/// A product as proposed by an import batch, before it is matched against
/// the catalog. Fields left as `None` were not specified by the batch and
/// are filled from the matched product or from the catalog defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub cost_price: f64,
    pub margin_percentage: Option<f64>,
    pub freight: Option<f64>,
    pub category: Option<Category>,
}

impl From<ParsedProduct> for ProductDraft {
    fn from(parsed: ParsedProduct) -> Self {
        ProductDraft {
            name: parsed.name,
            cost_price: parsed.cost_price,
            margin_percentage: Some(parsed.margin_percentage),
            freight: Some(parsed.freight),
            category: Some(parsed.category),
        }
    }
}

impl From<ExtractedItem> for ProductDraft {
    fn from(item: ExtractedItem) -> Self {
        ProductDraft {
            name: item.name,
            cost_price: item.price,
            margin_percentage: None,
            freight: None,
            category: None,
        }
    }
}

/// Catalog-wide defaults persisted next to the products.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogSettings {
    pub freight_default: f64,
    pub margin_default: f64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            freight_default: 0.0,
            margin_default: 20.0,
        }
    }
}
