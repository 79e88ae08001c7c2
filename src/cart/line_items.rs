//! Line Items

use rusty_money::{Money, iso::Currency};

use crate::products::{Product, ProductKey};

/// One product entry in a cart, with the unit price captured when it was added.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Create a line item for `product`, capturing its current name and price.
    ///
    /// `quantity` must be positive; the cart never stores an empty line.
    pub(crate) fn new(key: ProductKey, product: &Product<'a>, quantity: u32) -> Self {
        debug_assert!(quantity > 0, "line items must have a positive quantity");

        Self {
            product: key,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// Returns the product of the line
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Product name at the time the line was added.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the captured unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Quantity × unit price, in minor units.
    pub fn line_total_minor(&self) -> i64 {
        self.unit_price
            .to_minor_units()
            .saturating_mul(i64::from(self.quantity))
    }

    /// Quantity × unit price.
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.line_total_minor(), self.unit_price.currency())
    }

    pub(crate) fn add_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity > 0, "line items must have a positive quantity");

        self.quantity = quantity;
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn product(minor: i64) -> Product<'static> {
        Product::new("Classic Brown Bear", "TB-001", "Classic Bears", Money::from_minor(minor, USD), 25)
    }

    #[test]
    fn captures_name_and_price() {
        let item = LineItem::new(ProductKey::default(), &product(2499), 1);

        assert_eq!(item.name(), "Classic Brown Bear");
        assert_eq!(item.unit_price(), &Money::from_minor(2499, USD));
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        let mut item = LineItem::new(ProductKey::default(), &product(2499), 2);

        assert_eq!(item.line_total(), Money::from_minor(4998, USD));

        item.add_quantity(3);

        assert_eq!(item.quantity(), 5);
        assert_eq!(item.line_total_minor(), 12495);
    }

    #[test]
    fn line_total_saturates_instead_of_overflowing() {
        let item = LineItem::new(ProductKey::default(), &product(i64::MAX / 2), 3);

        assert_eq!(item.line_total_minor(), i64::MAX);
    }

    #[test]
    fn captured_price_ignores_later_catalog_changes() {
        let mut product = product(2499);
        let item = LineItem::new(ProductKey::default(), &product, 1);

        product.price = Money::from_minor(2999, USD);

        assert_eq!(item.unit_price(), &Money::from_minor(2499, USD));
    }
}
