//! Cost-plus-margin-plus-freight pricing.
//!
//! A product carries four linked pricing fields: cost price, margin
//! percentage, margin value and sale price. Editing any one of them goes
//! through the functions here, which recompute the dependent pair so the
//! product stays consistent:
//!
//! ```text
//! margin_value = cost_price * margin_percentage / 100
//! sale_price   = cost_price + margin_value + freight
//! ```
//!
//! Monetary outputs are rounded to two decimals, half-up.

use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;
use crate::model::Product;

/// Largest amount accepted for any price, margin or freight input.
pub const MAX_AMOUNT: f64 = 1e12;

/// Round a monetary amount to cents, halves away from zero.
///
/// The amount is first snapped to a micro-cent grid so that values such as
/// `2.675` (stored as `2.67499999...`) round the way they read.
pub fn round_money(value: f64) -> f64 {
    let cents = (value * 100.0 * 1e6).round() / 1e6;
    cents.round() / 100.0
}

pub fn margin_value(cost_price: f64, margin_percentage: f64) -> f64 {
    round_money(cost_price * margin_percentage / 100.0)
}

pub fn sale_price(cost_price: f64, margin_percentage: f64, freight: f64) -> f64 {
    round_money(cost_price * (1.0 + margin_percentage / 100.0) + freight)
}

/// Margin percentage that a margin value represents over a cost price.
pub fn margin_percentage_for(margin_value: f64, cost_price: f64) -> Result<f64, CatalogError> {
    if cost_price == 0.0 {
        return Err(CatalogError::DivisionByZero);
    }
    Ok(margin_value / cost_price * 100.0)
}

/// The pricing fields a user can edit on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    CostPrice,
    MarginPercentage,
    SalePrice,
    MarginValue,
    Freight,
}

impl EditableField {
    pub fn current_value(&self, product: &Product) -> f64 {
        match self {
            EditableField::CostPrice => product.cost_price,
            EditableField::MarginPercentage => product.margin_percentage,
            EditableField::SalePrice => product.sale_price,
            EditableField::MarginValue => product.margin_value,
            EditableField::Freight => product.freight,
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditableField::CostPrice => "cost",
            EditableField::MarginPercentage => "margin",
            EditableField::SalePrice => "sale",
            EditableField::MarginValue => "margin-value",
            EditableField::Freight => "freight",
        };
        f.write_str(name)
    }
}

impl FromStr for EditableField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cost" | "cost_price" => Ok(EditableField::CostPrice),
            "margin" | "margin_percentage" => Ok(EditableField::MarginPercentage),
            "sale" | "sale_price" => Ok(EditableField::SalePrice),
            "margin-value" | "margin_value" => Ok(EditableField::MarginValue),
            "freight" => Ok(EditableField::Freight),
            other => Err(CatalogError::UnknownField(other.to_string())),
        }
    }
}

/// Parse the raw text of an edited cell.
///
/// Everything but digits, `.`, `,` and `-` is ignored. When a comma is
/// present it is the decimal separator and dots are thousands separators,
/// so `"R$ 3.500,00"` reads as `3500.0`.
pub fn parse_numeric_input(raw: &str) -> Result<f64, CatalogError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replacen(',', ".", 1)
    } else {
        cleaned
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| CatalogError::InvalidNumericEdit(raw.to_string()))?;

    check_amount(value)
}

/// Whether `value` is a usable amount: finite, not negative and at most
/// [`MAX_AMOUNT`].
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && (0.0..=MAX_AMOUNT).contains(&value)
}

pub fn check_amount(value: f64) -> Result<f64, CatalogError> {
    if !is_valid_amount(value) {
        return Err(CatalogError::InvalidNumericEdit(value.to_string()));
    }
    Ok(value)
}

/// Reject a recomputed product whose derived fields left the finite range.
fn checked(product: Product) -> Result<Product, CatalogError> {
    let derived = [
        product.margin_percentage,
        product.margin_value,
        product.sale_price,
    ];
    if derived.iter().all(|v| v.is_finite()) {
        Ok(product)
    } else {
        Err(CatalogError::InvalidNumericEdit(format!(
            "{} has no finite price",
            product.name
        )))
    }
}

/// Apply an edit to one pricing field, returning the updated product.
///
/// The input product is never modified, so a failed edit leaves the last
/// known-good values in place.
pub fn apply_edit(
    product: &Product,
    field: EditableField,
    value: f64,
) -> Result<Product, CatalogError> {
    match field {
        EditableField::CostPrice => on_cost_change(product, value),
        EditableField::MarginPercentage => on_margin_percent_change(product, value),
        EditableField::SalePrice => on_sale_price_change(product, value),
        EditableField::MarginValue => on_margin_value_change(product, value),
        EditableField::Freight => on_freight_change(product, value),
    }
}

pub fn on_cost_change(product: &Product, new_cost: f64) -> Result<Product, CatalogError> {
    let new_cost = check_amount(new_cost)?;
    checked(Product {
        cost_price: new_cost,
        margin_value: margin_value(new_cost, product.margin_percentage),
        sale_price: sale_price(new_cost, product.margin_percentage, product.freight),
        ..product.clone()
    })
}

pub fn on_margin_percent_change(
    product: &Product,
    new_margin: f64,
) -> Result<Product, CatalogError> {
    let new_margin = check_amount(new_margin)?;
    checked(Product {
        margin_percentage: new_margin,
        margin_value: margin_value(product.cost_price, new_margin),
        sale_price: sale_price(product.cost_price, new_margin, product.freight),
        ..product.clone()
    })
}

/// Back-solve margin from a new sale price. Freight is not subtracted.
pub fn on_sale_price_change(product: &Product, new_sale: f64) -> Result<Product, CatalogError> {
    let new_sale = check_amount(new_sale)?;
    let raw_margin = new_sale - product.cost_price;
    let margin_percentage = margin_percentage_for(raw_margin, product.cost_price)?;
    checked(Product {
        sale_price: round_money(new_sale),
        margin_value: round_money(raw_margin),
        margin_percentage,
        ..product.clone()
    })
}

/// Back-solve the percentage from a new margin value. The sale price is
/// left as it was.
pub fn on_margin_value_change(
    product: &Product,
    new_margin_value: f64,
) -> Result<Product, CatalogError> {
    let new_margin_value = check_amount(new_margin_value)?;
    let margin_percentage = margin_percentage_for(new_margin_value, product.cost_price)?;
    checked(Product {
        margin_value: round_money(new_margin_value),
        margin_percentage,
        ..product.clone()
    })
}

pub fn on_freight_change(product: &Product, new_freight: f64) -> Result<Product, CatalogError> {
    let new_freight = check_amount(new_freight)?;
    checked(Product {
        freight: new_freight,
        sale_price: sale_price(product.cost_price, product.margin_percentage, new_freight),
        ..product.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(cost: f64, margin: f64, freight: f64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "iPhone 16 • 256GB".to_string(),
            cost_price: cost,
            margin_percentage: margin,
            margin_value: margin_value(cost, margin),
            sale_price: sale_price(cost, margin, freight),
            freight,
            category: Category::IPhone,
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_forward_consistent(p: &Product) {
        assert_eq!(p.margin_value, margin_value(p.cost_price, p.margin_percentage));
        assert_eq!(
            p.sale_price,
            sale_price(p.cost_price, p.margin_percentage, p.freight)
        );
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(2.675), 2.68);
        assert_eq!(round_money(1.005), 1.01);
        assert_eq!(round_money(10.004), 10.0);
        assert_eq!(round_money(3850.0), 3850.0);
    }

    #[test]
    fn test_cost_change_recomputes_sale_and_margin() {
        let edited = on_cost_change(&product(3500.0, 10.0, 50.0), 4000.0).unwrap();
        assert_eq!(edited.cost_price, 4000.0);
        assert_eq!(edited.margin_value, 400.0);
        assert_eq!(edited.sale_price, 4450.0);
        assert_forward_consistent(&edited);
    }

    #[test]
    fn test_margin_percent_change_recomputes_sale_and_margin() {
        let edited = on_margin_percent_change(&product(1200.0, 15.0, 0.0), 12.5).unwrap();
        assert_eq!(edited.margin_value, 150.0);
        assert_eq!(edited.sale_price, 1350.0);
        assert_forward_consistent(&edited);
    }

    #[test]
    fn test_sale_price_back_solve_ignores_freight() {
        let edited = on_sale_price_change(&product(1000.0, 10.0, 50.0), 1200.0).unwrap();
        assert_eq!(edited.sale_price, 1200.0);
        assert_eq!(edited.margin_value, 200.0);
        assert!((edited.margin_percentage - 20.0).abs() < 1e-9);
        assert_eq!(edited.freight, 50.0);
    }

    #[test]
    fn test_margin_value_change_leaves_sale_price() {
        let original = product(2000.0, 10.0, 0.0);
        let edited = on_margin_value_change(&original, 300.0).unwrap();
        assert_eq!(edited.margin_value, 300.0);
        assert!((edited.margin_percentage - 15.0).abs() < 1e-9);
        assert_eq!(edited.sale_price, original.sale_price);
    }

    #[test]
    fn test_freight_change_refreshes_sale_price() {
        let edited = on_freight_change(&product(2100.0, 15.0, 0.0), 35.0).unwrap();
        assert_eq!(edited.freight, 35.0);
        assert_eq!(edited.margin_value, 315.0);
        assert_eq!(edited.sale_price, 2450.0);
        assert_forward_consistent(&edited);
    }

    #[test]
    fn test_back_solve_with_zero_cost_is_rejected() {
        let zero = product(0.0, 10.0, 0.0);
        assert!(matches!(
            on_sale_price_change(&zero, 100.0),
            Err(CatalogError::DivisionByZero)
        ));
        assert!(matches!(
            on_margin_value_change(&zero, 10.0),
            Err(CatalogError::DivisionByZero)
        ));
    }

    #[test]
    fn test_negative_edit_is_rejected() {
        let p = product(100.0, 10.0, 0.0);
        assert!(matches!(
            apply_edit(&p, EditableField::Freight, -1.0),
            Err(CatalogError::InvalidNumericEdit(_))
        ));
        assert!(matches!(
            apply_edit(&p, EditableField::CostPrice, f64::NAN),
            Err(CatalogError::InvalidNumericEdit(_))
        ));
    }

    #[test]
    fn test_every_forward_edit_keeps_invariant() {
        let p = product(3500.0, 10.0, 25.0);
        for (field, value) in [
            (EditableField::CostPrice, 3333.33),
            (EditableField::MarginPercentage, 17.5),
            (EditableField::Freight, 12.0),
        ] {
            let edited = apply_edit(&p, field, value).unwrap();
            assert_forward_consistent(&edited);
        }
    }

    #[test]
    fn test_parse_numeric_input() {
        assert_eq!(parse_numeric_input("3500").unwrap(), 3500.0);
        assert_eq!(parse_numeric_input("12.5").unwrap(), 12.5);
        assert_eq!(parse_numeric_input("12,5").unwrap(), 12.5);
        assert_eq!(parse_numeric_input("R$ 3.500,00").unwrap(), 3500.0);
        assert_eq!(parse_numeric_input("15%").unwrap(), 15.0);
    }

    #[test]
    fn test_parse_numeric_input_rejects_garbage() {
        assert!(parse_numeric_input("").is_err());
        assert!(parse_numeric_input("abc").is_err());
        assert!(parse_numeric_input("-10").is_err());
        assert!(parse_numeric_input("1.2.3").is_err());
    }

    #[test]
    fn test_editable_field_names() {
        assert_eq!(
            "cost".parse::<EditableField>().unwrap(),
            EditableField::CostPrice
        );
        assert_eq!(
            "margin-value".parse::<EditableField>().unwrap(),
            EditableField::MarginValue
        );
        assert!(matches!(
            "volume".parse::<EditableField>(),
            Err(CatalogError::UnknownField(name)) if name == "volume"
        ));
        assert_eq!(EditableField::SalePrice.to_string(), "sale");
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        let huge = format!("1{}", "0".repeat(305));
        assert!(matches!(
            parse_numeric_input(&huge),
            Err(CatalogError::InvalidNumericEdit(_))
        ));

        let p = product(3500.0, 10.0, 0.0);
        for field in [
            EditableField::CostPrice,
            EditableField::MarginPercentage,
            EditableField::SalePrice,
            EditableField::MarginValue,
            EditableField::Freight,
        ] {
            assert!(matches!(
                apply_edit(&p, field, 1e300),
                Err(CatalogError::InvalidNumericEdit(_))
            ));
        }
    }

    #[test]
    fn test_largest_amounts_stay_finite() {
        let edited = apply_edit(
            &product(MAX_AMOUNT, 10.0, MAX_AMOUNT),
            EditableField::MarginPercentage,
            MAX_AMOUNT,
        )
        .unwrap();
        assert!(edited.sale_price.is_finite());
        assert!(edited.margin_value.is_finite());
        assert!(is_valid_amount(MAX_AMOUNT));
        assert!(!is_valid_amount(MAX_AMOUNT * 10.0));
    }
}
