//! Best-effort product extraction through an external text-understanding
//! service.
//!
//! The service is asked for a JSON array of `{name, price}` objects. Its
//! answer is untrusted: fencing is stripped, every entry is validated on
//! its own, and any failure of the call as a whole yields an empty result.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::CatalogError;
use crate::model::ExtractedItem;
use crate::parser::normalize_price;
use crate::pricing;
use crate::providers::{build_extraction_prompt, ExtractionProvider};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?").expect("code fence pattern is valid"));

/// Remove Markdown code fences such as ```` ```json ```` from a response.
pub fn strip_code_fence(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Parse a service answer into validated items.
///
/// The answer must be a JSON array. Entries without a non-empty string
/// `name` or a positive `price` are skipped. A price given as a string is
/// read with the Brazilian number convention.
pub fn parse_items(text: &str) -> Result<Vec<ExtractedItem>, CatalogError> {
    let cleaned = strip_code_fence(text);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| CatalogError::ExtractionFailure(format!("response is not JSON: {}", e)))?;

    let entries = value.as_array().ok_or_else(|| {
        CatalogError::ExtractionFailure("response is not a JSON array".to_string())
    })?;

    let items: Vec<ExtractedItem> = entries
        .iter()
        .filter_map(|entry| {
            let item = coerce_item(entry);
            if item.is_none() {
                warn!("Discarding malformed extracted entry: {}", entry);
            }
            item
        })
        .collect();

    Ok(items)
}

fn coerce_item(entry: &Value) -> Option<ExtractedItem> {
    let name = entry.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let price = match entry.get("price")? {
        Value::Number(number) => number.as_f64()?,
        Value::String(raw) => normalize_price(raw)?,
        _ => return None,
    };
    if !pricing::is_valid_amount(price) || price <= 0.0 {
        return None;
    }

    Some(ExtractedItem {
        name: name.to_string(),
        price,
    })
}

/// Ask `provider` for the products in `text`, surfacing failures.
pub async fn try_extract(
    provider: &dyn ExtractionProvider,
    text: &str,
    api_key: &str,
) -> Result<Vec<ExtractedItem>, CatalogError> {
    let prompt = build_extraction_prompt(text);
    let answer = provider
        .complete(&prompt, api_key)
        .await
        .map_err(|e| CatalogError::ExtractionFailure(e.to_string()))?;
    debug!("Extraction answer from {}: {}", provider.provider_name(), answer);

    parse_items(&answer)
}

/// Ask `provider` for the products in `text`.
///
/// Never fails: any error is logged and reported as an empty result,
/// which callers present as "no products found".
pub async fn extract_items(
    provider: &dyn ExtractionProvider,
    text: &str,
    api_key: &str,
) -> Vec<ExtractedItem> {
    match try_extract(provider, text, api_key).await {
        Ok(items) => {
            info!(
                "{} extracted {} products",
                provider.provider_name(),
                items.len()
            );
            items
        }
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    }
}
