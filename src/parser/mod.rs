//! Line-oriented extraction of products and prices from pasted text.
//!
//! Each non-blank line is offered to an ordered list of [`LinePattern`]s;
//! the first one that captures a name and a price wins. Lines no pattern
//! understands are dropped, since partial extraction is expected from
//! hand-written price lists.

mod category;
mod patterns;

pub use self::category::infer_category;
pub use self::patterns::{SeparatorPattern, TrailingPricePattern};

use log::debug;

use crate::model::ParsedProduct;
use crate::pricing;

/// Raw captures of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch<'a> {
    pub name: &'a str,
    pub price: &'a str,
}

pub trait LinePattern: Send + Sync {
    fn name(&self) -> &'static str;
    fn capture<'a>(&self, line: &'a str) -> Option<LineMatch<'a>>;
}

/// Patterns in priority order.
pub const DEFAULT_PATTERNS: &[&dyn LinePattern] = &[&SeparatorPattern, &TrailingPricePattern];

/// Normalize a captured price: keep digits and commas, then read the comma
/// as the decimal separator. Dots are thousands separators and vanish.
/// Prices above [`pricing::MAX_AMOUNT`] are rejected.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    let price: f64 = digits.replacen(',', ".", 1).parse().ok()?;
    if pricing::is_valid_amount(price) && price > 0.0 {
        Some(price)
    } else {
        None
    }
}

pub struct LineParser<'p> {
    patterns: &'p [&'p dyn LinePattern],
    freight: f64,
}

impl LineParser<'static> {
    /// Parser using the default patterns; `freight` is stamped on every product.
    pub fn new(freight: f64) -> Self {
        LineParser {
            patterns: DEFAULT_PATTERNS,
            freight,
        }
    }
}

impl<'p> LineParser<'p> {
    pub fn with_patterns(patterns: &'p [&'p dyn LinePattern], freight: f64) -> Self {
        LineParser { patterns, freight }
    }

    /// Parse every line of `text`, preserving input order.
    pub fn parse(&self, text: &str) -> Vec<ParsedProduct> {
        text.lines().filter_map(|line| self.parse_line(line)).collect()
    }

    pub fn parse_line(&self, line: &str) -> Option<ParsedProduct> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some((pattern, captured)) = self
            .patterns
            .iter()
            .find_map(|pattern| pattern.capture(line).map(|m| (pattern.name(), m)))
        else {
            debug!("No pattern matched line: {:?}", line);
            return None;
        };

        let name = captured.name.trim();
        let Some(cost_price) = normalize_price(captured.price) else {
            debug!("Dropping line with unusable price {:?}: {:?}", captured.price, line);
            return None;
        };
        if name.is_empty() {
            debug!("Dropping line without a product name: {:?}", line);
            return None;
        }
        debug!("Line matched by {} pattern: {:?}", pattern, line);

        let category = infer_category(name);
        let margin_percentage = category.default_margin();
        Some(ParsedProduct {
            name: name.to_string(),
            cost_price,
            sale_price: pricing::sale_price(cost_price, margin_percentage, self.freight),
            margin_percentage,
            margin_value: pricing::margin_value(cost_price, margin_percentage),
            freight: self.freight,
            category,
        })
    }
}

/// Parse `text` with the default patterns.
pub fn parse_text(text: &str, freight: f64) -> Vec<ParsedProduct> {
    LineParser::new(freight).parse(text)
}
