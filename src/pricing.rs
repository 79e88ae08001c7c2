//! Pricing
//!
//! Derived cart totals. Amounts are held as unrounded [`Decimal`]s in major
//! units and only rounded to currency precision when converted into [`Money`].

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{cart::LineItem, discounts::DiscountPercent};

/// Errors that can occur while converting totals into money.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount overflowed when scaled to minor units.
    #[error("amount {0} cannot be represented in minor units")]
    Conversion(Decimal),
}

/// Sales tax rate applied when none is configured: 8%.
pub fn default_tax_rate() -> Percentage {
    Percentage::from(Decimal::new(8, 2))
}

/// Whether `rate` lies within `[0, 1]` (0% to 100%).
pub fn is_valid_tax_rate(rate: Percentage) -> bool {
    (Decimal::ZERO..=Decimal::ONE).contains(&(rate * Decimal::ONE))
}

/// Clamp a tax rate into `[0, 1]`.
pub fn clamp_tax_rate(rate: Percentage) -> Percentage {
    Percentage::from((rate * Decimal::ONE).clamp(Decimal::ZERO, Decimal::ONE))
}

/// Totals derived from a cart's items, discount and tax rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    currency: &'static Currency,
}

impl Totals {
    /// All-zero totals in `currency`.
    #[must_use]
    pub fn zero(currency: &'static Currency) -> Self {
        Self {
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            currency,
        }
    }

    /// Sum of line totals before discount and tax.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Amount taken off the subtotal by the cart discount.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Subtotal after the cart discount.
    #[must_use]
    pub fn discounted_subtotal(&self) -> Decimal {
        self.subtotal - self.discount
    }

    /// Tax on the discounted subtotal.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        self.tax
    }

    /// Discounted subtotal plus tax.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.discounted_subtotal() + self.tax
    }

    /// Currency all amounts are expressed in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The total rounded to currency precision: the amount the customer pays.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Conversion`] if the total cannot be represented in minor units.
    pub fn amount_due(&self) -> Result<Money<'static, Currency>, PricingError> {
        to_money(self.total(), self.currency)
    }
}

/// Compute the totals for a set of line items.
///
/// Line totals are exact minor-unit amounts; the discount and tax are left
/// unrounded so repeated recomputation never compounds rounding error.
pub fn compute_totals(
    items: &[LineItem<'_>],
    discount: DiscountPercent,
    tax_rate: Percentage,
    currency: &'static Currency,
) -> Totals {
    let subtotal_minor = items
        .iter()
        .fold(0_i64, |acc, item| acc.saturating_add(item.line_total_minor()));

    let subtotal = minor_to_decimal(subtotal_minor, currency);
    let discount = discount.amount_off(subtotal);
    let tax = tax_rate * (subtotal - discount);

    Totals {
        subtotal,
        discount,
        tax,
        currency,
    }
}

/// Number of minor units in one major unit of `currency` (100 for USD).
fn minor_per_major(currency: &Currency) -> Decimal {
    Decimal::from(10_i64.pow(currency.exponent))
}

/// Convert a minor-unit amount into a major-unit decimal, exactly.
pub fn minor_to_decimal(minor: i64, currency: &Currency) -> Decimal {
    Decimal::from(minor) / minor_per_major(currency)
}

/// Round a major-unit amount to currency precision and wrap it as money.
///
/// Midpoints round away from zero.
///
/// # Errors
///
/// Returns [`PricingError::Conversion`] if the amount overflows when scaled to minor units.
pub fn to_money<'a>(
    amount: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = amount
        .checked_mul(minor_per_major(currency))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or(PricingError::Conversion(amount))?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{JPY, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn zero_totals() -> TestResult {
        let totals = Totals::zero(USD);

        assert_eq!(totals.subtotal(), Decimal::ZERO);
        assert_eq!(totals.total(), Decimal::ZERO);
        assert_eq!(totals.amount_due()?, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn tax_rate_range() {
        assert!(is_valid_tax_rate(default_tax_rate()));
        assert!(is_valid_tax_rate(Percentage::from(Decimal::ONE)));
        assert!(!is_valid_tax_rate(Percentage::from(Decimal::new(-5, 2))));
        assert!(!is_valid_tax_rate(Percentage::from(Decimal::from(8))));

        assert_eq!(
            clamp_tax_rate(Percentage::from(Decimal::new(-5, 1))),
            Percentage::from(Decimal::ZERO)
        );
        assert_eq!(
            clamp_tax_rate(Percentage::from(Decimal::from(8))),
            Percentage::from(Decimal::ONE)
        );
    }

    #[test]
    fn compute_totals_with_no_items_is_zero() {
        let totals = compute_totals(
            &[],
            DiscountPercent::new(Decimal::from(50)),
            default_tax_rate(),
            USD,
        );

        assert_eq!(totals, Totals::zero(USD));
    }

    #[test]
    fn minor_to_decimal_uses_currency_exponent() {
        assert_eq!(minor_to_decimal(2499, USD), Decimal::new(2499, 2));
        assert_eq!(minor_to_decimal(2499, JPY), Decimal::from(2499));
    }

    #[test]
    fn to_money_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(to_money(Decimal::new(12345, 3), USD)?, Money::from_minor(1235, USD));
        assert_eq!(to_money(Decimal::new(12344, 3), USD)?, Money::from_minor(1234, USD));
        assert_eq!(to_money(Decimal::new(243, 1), USD)?, Money::from_minor(2430, USD));

        Ok(())
    }

    #[test]
    fn to_money_overflow_returns_error() {
        let result = to_money(Decimal::MAX, USD);

        assert_eq!(result, Err(PricingError::Conversion(Decimal::MAX)));
    }
}
