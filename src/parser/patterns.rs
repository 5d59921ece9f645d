use once_cell::sync::Lazy;
use regex::Regex;

use super::{LineMatch, LinePattern};

/// `<name> <separator> R$? <price>` where the separator is one of
/// `→`, `->`, `:`, `-` or `=`.
static SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)(?:→|->|:|-|=)\s*R?\$?\s*([\d.,]+)")
        .expect("separator pattern is valid")
});

/// `<name> <price>` with the price at the end of the line.
static TRAILING_PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+([\d.,]+)$").expect("trailing price pattern is valid"));

pub struct SeparatorPattern;

impl LinePattern for SeparatorPattern {
    fn name(&self) -> &'static str {
        "separator"
    }

    fn capture<'a>(&self, line: &'a str) -> Option<LineMatch<'a>> {
        capture_with(&SEPARATOR_PATTERN, line)
    }
}

pub struct TrailingPricePattern;

impl LinePattern for TrailingPricePattern {
    fn name(&self) -> &'static str {
        "trailing_price"
    }

    fn capture<'a>(&self, line: &'a str) -> Option<LineMatch<'a>> {
        capture_with(&TRAILING_PRICE_PATTERN, line)
    }
}

fn capture_with<'a>(regex: &Regex, line: &'a str) -> Option<LineMatch<'a>> {
    let captures = regex.captures(line)?;
    Some(LineMatch {
        name: captures.get(1)?.as_str(),
        price: captures.get(2)?.as_str(),
    })
}
