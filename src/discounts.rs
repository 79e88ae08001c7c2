//! Discounts
//!
//! Cart-level percentage discounts. Values are percent points (`10` means 10%)
//! and are always held inside `[0, 100]`.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

/// A cart-level discount in percent points, clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    /// No discount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a discount, clamping `points` into `[0, 100]`.
    #[must_use]
    pub fn new(points: Decimal) -> Self {
        Self(points.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Whether `points` would be altered by clamping.
    #[must_use]
    pub fn is_out_of_range(points: Decimal) -> bool {
        points < Decimal::ZERO || points > Decimal::ONE_HUNDRED
    }

    /// Percent points, e.g. `10` for 10%.
    #[must_use]
    pub fn points(&self) -> Decimal {
        self.0
    }

    /// The discount as a fraction, e.g. `0.1` for 10%.
    #[must_use]
    pub fn as_percentage(&self) -> Percentage {
        Percentage::from(self.0 / Decimal::ONE_HUNDRED)
    }

    /// Whether any discount applies.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The amount taken off `amount`. Unrounded.
    #[must_use]
    pub fn amount_off(&self, amount: Decimal) -> Decimal {
        self.as_percentage() * amount
    }
}

impl From<Decimal> for DiscountPercent {
    fn from(points: Decimal) -> Self {
        Self::new(points)
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// Percent points of a fractional [`Percentage`] (`0.08` becomes `8`), for display.
pub fn percent_points(percentage: Percentage) -> Decimal {
    (percentage * Decimal::ONE_HUNDRED).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_negative_to_zero() {
        assert_eq!(DiscountPercent::new(Decimal::from(-5)), DiscountPercent::ZERO);
    }

    #[test]
    fn new_clamps_above_one_hundred() {
        let discount = DiscountPercent::new(Decimal::from(150));

        assert_eq!(discount.points(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn new_keeps_in_range_values() {
        let discount = DiscountPercent::new(Decimal::new(125, 1));

        assert_eq!(discount.points(), Decimal::new(125, 1));
        assert!(!DiscountPercent::is_out_of_range(Decimal::new(125, 1)));
        assert!(DiscountPercent::is_out_of_range(Decimal::from(101)));
    }

    #[test]
    fn amount_off_is_unrounded() {
        let discount = DiscountPercent::new(Decimal::from(10));

        assert_eq!(discount.amount_off(Decimal::new(333, 2)), Decimal::new(333, 3));
    }

    #[test]
    fn as_percentage_is_fractional() {
        let discount = DiscountPercent::new(Decimal::from(25));

        assert_eq!(discount.as_percentage(), Percentage::from(Decimal::new(25, 2)));
    }

    #[test]
    fn display_uses_percent_points() {
        assert_eq!(DiscountPercent::new(Decimal::new(1250, 2)).to_string(), "12.5%");
        assert_eq!(DiscountPercent::ZERO.to_string(), "0%");
    }

    #[test]
    fn percent_points_scales_fraction() {
        assert_eq!(
            percent_points(Percentage::from(Decimal::new(8, 2))),
            Decimal::from(8)
        );
    }
}
