//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{AUD, CAD, Currency, EUR, GBP, JPY, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, pricing::to_money, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product handle -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    /// Category
    pub category: String,

    /// Product price (e.g., "24.99 USD")
    pub price: String,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Barcode
    #[serde(default)]
    pub barcode: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_price(&fixture.price)?;

        Ok(Product {
            name: fixture.name,
            sku: fixture.sku,
            category: fixture.category,
            price,
            stock: fixture.stock,
            barcode: fixture.barcode,
            description: fixture.description,
        })
    }
}

/// Parse price string (e.g., "24.99 USD") into money
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match currency_code {
        "USD" => USD,
        "GBP" => GBP,
        "EUR" => EUR,
        "CAD" => CAD,
        "AUD" => AUD,
        "JPY" => JPY,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    to_money(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))
}

/// Parse percentage string (e.g., "10%" or "0.1") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "10%" for 10%
/// - Decimal format: "0.1" for 10%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(points) = trimmed.strip_suffix('%') {
        points
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
            / Decimal::ONE_HUNDRED
    } else {
        trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
    };

    Ok(Percentage::from(fraction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("24.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_trailing_tokens() {
        let result = parse_price("24.99 USD extra");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_uses_currency_exponent() -> Result<(), FixtureError> {
        let usd = parse_price("24.99 USD")?;
        let jpy = parse_price("1500 JPY")?;

        assert_eq!(usd.to_minor_units(), 2499);
        assert_eq!(usd.currency(), USD);
        assert_eq!(jpy.to_minor_units(), 1500);
        assert_eq!(jpy.currency(), JPY);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_percentage_format() -> Result<(), FixtureError> {
        let percent = parse_percentage("10%")?;

        assert_eq!(percent, Percentage::from(Decimal::new(1, 1)));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_decimal_format() -> Result<(), FixtureError> {
        let percent = parse_percentage("0.08")?;

        assert_eq!(percent, Percentage::from(Decimal::new(8, 2)));

        Ok(())
    }

    #[test]
    fn parse_percentage_handles_whitespace() -> Result<(), FixtureError> {
        let percent = parse_percentage("  15 %  ")?;

        assert_eq!(percent, Percentage::from(Decimal::new(15, 2)));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("lots");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }
}
