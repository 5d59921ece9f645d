use crate::model::Category;

/// Name fragments checked in order; the first one found decides the category.
const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("iphone", Category::IPhone),
    ("watch", Category::Watch),
    ("airpods", Category::AirPods),
    ("ipad", Category::IPad),
    ("macbook", Category::Mac),
    ("mac ", Category::Mac),
    ("ultra", Category::Ultra),
];

pub fn infer_category(name: &str) -> Category {
    let lower = name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}
