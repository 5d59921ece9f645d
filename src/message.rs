use crate::config::MessageConfig;
use crate::currency::format_brl;
use crate::model::Product;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━";

/// A section of the message and the name fragment that selects its products.
struct Bucket {
    keyword: &'static str,
    heading: &'static str,
}

const BUCKETS: &[Bucket] = &[
    Bucket {
        keyword: "iphone",
        heading: "📱 iPhones – Mais vendidos",
    },
    Bucket {
        keyword: "watch",
        heading: "⌚ Apple Watch – Performance e estilo",
    },
    Bucket {
        keyword: "airpods",
        heading: "🎧 AirPods – Som de última geração",
    },
];

/// Render the promotional message for `products`.
///
/// Products are grouped by name into the iPhone, Watch and AirPods sections
/// in catalog order; products matching none of them are left out. Prices
/// are derived live from cost, margin and freight.
pub fn generate_message(products: &[Product], template: &MessageConfig) -> String {
    let mut lines: Vec<String> = vec![template.title.clone(), String::new(), RULE.to_string()];

    for (i, bucket) in BUCKETS.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(bucket.heading.to_string());
        lines.extend(
            products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(bucket.keyword))
                .map(|p| format!("• {} → {}", p.name, format_brl(p.computed_sale_price()))),
        );
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.extend(template.footer.iter().cloned());

    let mut message = lines.join("\n");
    message.push('\n');
    message
}
