//! Cart
//!
//! The in-progress sale. Every mutation is a reducer: it consumes the cart and
//! returns the next one, with totals recomputed before it returns.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tracing::{debug, warn};

use crate::{
    customers::CustomerKey,
    discounts::DiscountPercent,
    pricing::{Totals, clamp_tax_rate, compute_totals, default_tax_rate, is_valid_tax_rate},
    products::{Product, ProductCatalog, ProductKey},
};

mod line_items;

pub use line_items::LineItem;

/// A user action on the cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CartAction {
    /// Add `quantity` units of a product.
    Add {
        /// Product to add
        product: ProductKey,
        /// Units to add
        quantity: u32,
    },

    /// Remove a product's line.
    Remove(ProductKey),

    /// Set the quantity of a product's line. Zero or less removes it.
    UpdateQuantity {
        /// Product to update
        product: ProductKey,
        /// New quantity
        quantity: i64,
    },

    /// Attach or detach a customer.
    SetCustomer(Option<CustomerKey>),

    /// Set the cart discount in percent points.
    SetDiscount(Decimal),

    /// Empty the cart.
    Clear,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    customer: Option<CustomerKey>,
    discount: DiscountPercent,
    tax_rate: Percentage,
    currency: &'static Currency,
    totals: Totals,
}

impl<'a> Cart<'a> {
    /// Create an empty cart using the default tax rate.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_tax_rate(currency, default_tax_rate())
    }

    /// Create an empty cart with a specific tax rate, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_tax_rate(currency: &'static Currency, tax_rate: Percentage) -> Self {
        let tax_rate = if is_valid_tax_rate(tax_rate) {
            tax_rate
        } else {
            warn!(%tax_rate, "tax rate out of range, clamping");
            clamp_tax_rate(tax_rate)
        };

        Cart {
            items: Vec::new(),
            customer: None,
            discount: DiscountPercent::ZERO,
            tax_rate,
            currency,
            totals: Totals::zero(currency),
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the product keeps its captured unit price and has
    /// its quantity increased. Zero quantities and products priced in another
    /// currency leave the cart unchanged.
    #[must_use]
    pub fn add_item(mut self, key: ProductKey, product: &Product<'a>, quantity: u32) -> Self {
        if quantity == 0 {
            return self;
        }

        let product_currency = product.price.currency();

        if product_currency != self.currency {
            warn!(
                product = %product.name,
                product_currency = product_currency.iso_alpha_code,
                cart_currency = self.currency.iso_alpha_code,
                "ignoring product priced in another currency"
            );

            return self;
        }

        if let Some(item) = self.line_mut(key) {
            item.add_quantity(quantity);
        } else {
            self.items.push(LineItem::new(key, product, quantity));
        }

        debug!(product = %product.name, quantity, "added item to cart");

        self.recompute()
    }

    /// Remove the line for `key`, if present.
    #[must_use]
    pub fn remove_item(mut self, key: ProductKey) -> Self {
        let before = self.items.len();

        self.items.retain(|item| item.product() != key);

        if self.items.len() != before {
            debug!(?key, "removed item from cart");
        }

        self.recompute()
    }

    /// Set the quantity for `key`. Zero or negative quantities remove the line;
    /// products not in the cart are ignored.
    #[must_use]
    pub fn update_quantity(mut self, key: ProductKey, quantity: i64) -> Self {
        if quantity <= 0 {
            return self.remove_item(key);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(item) = self.line_mut(key) {
            item.set_quantity(quantity);
            debug!(?key, quantity, "updated item quantity");
        }

        self.recompute()
    }

    /// Attach a customer, or detach with `None`. Totals are unaffected.
    #[must_use]
    pub fn set_customer(mut self, customer: Option<CustomerKey>) -> Self {
        self.customer = customer;
        self
    }

    /// Set the discount in percent points, clamped to `[0, 100]`.
    #[must_use]
    pub fn set_discount(mut self, points: Decimal) -> Self {
        if DiscountPercent::is_out_of_range(points) {
            warn!(%points, "discount out of range, clamping");
        }

        self.discount = DiscountPercent::new(points);

        self.recompute()
    }

    /// Remove all items, the customer and the discount.
    #[must_use]
    pub fn clear(self) -> Self {
        Self::with_tax_rate(self.currency, self.tax_rate)
    }

    /// Reduce a single action, resolving products through `catalog`.
    ///
    /// Adding a product the catalog does not know is a no-op.
    #[must_use]
    pub fn apply<C>(self, action: CartAction, catalog: &C) -> Self
    where
        C: ProductCatalog<'a> + ?Sized,
    {
        match action {
            CartAction::Add { product, quantity } => match catalog.product(product) {
                Some(found) => self.add_item(product, found, quantity),
                None => {
                    warn!(?product, "ignoring unknown product");
                    self
                }
            },
            CartAction::Remove(product) => self.remove_item(product),
            CartAction::UpdateQuantity { product, quantity } => {
                self.update_quantity(product, quantity)
            }
            CartAction::SetCustomer(customer) => self.set_customer(customer),
            CartAction::SetDiscount(points) => self.set_discount(points),
            CartAction::Clear => self.clear(),
        }
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// The line for `key`, if present.
    #[must_use]
    pub fn get_item(&self, key: ProductKey) -> Option<&LineItem<'a>> {
        self.items.iter().find(|item| item.product() == key)
    }

    /// Attached customer.
    #[must_use]
    pub fn customer(&self) -> Option<CustomerKey> {
        self.customer
    }

    /// Cart discount.
    #[must_use]
    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }

    /// Tax rate as a fraction.
    #[must_use]
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Current totals.
    #[must_use]
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn line_mut(&mut self, key: ProductKey) -> Option<&mut LineItem<'a>> {
        self.items.iter_mut().find(|item| item.product() == key)
    }

    fn recompute(mut self) -> Self {
        self.totals = compute_totals(&self.items, self.discount, self.tax_rate, self.currency);
        self
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::products::Catalog;

    use super::*;

    fn product(name: &str, minor: i64) -> Product<'static> {
        Product::new(name, name, "Bears", Money::from_minor(minor, USD), 20)
    }

    fn keys<const N: usize>() -> [ProductKey; N] {
        let mut map = SlotMap::<ProductKey, ()>::with_key();
        std::array::from_fn(|_| map.insert(()))
    }

    #[test]
    fn new_cart_is_empty_with_default_tax() {
        let cart = Cart::new(USD);

        assert!(cart.is_empty());
        assert_eq!(cart.currency(), USD);
        assert_eq!(cart.tax_rate(), default_tax_rate());
        assert_eq!(cart.totals(), &Totals::zero(USD));
    }

    #[test]
    fn discounted_cart_totals() {
        let [a, b] = keys();
        let ten = product("Ten", 1000);
        let five = product("Five", 500);

        let cart = Cart::new(USD)
            .add_item(a, &ten, 2)
            .add_item(b, &five, 1)
            .set_discount(Decimal::from(10));

        let totals = cart.totals();

        assert_eq!(totals.subtotal(), Decimal::from(25));
        assert_eq!(totals.discounted_subtotal(), Decimal::new(225, 1));
        assert_eq!(totals.tax(), Decimal::new(18, 1));
        assert_eq!(totals.total(), Decimal::new(243, 1));
    }

    #[test]
    fn add_existing_product_increments_quantity_and_keeps_price() {
        let [a] = keys();
        let mut bear = product("Bear", 1000);

        let cart = Cart::new(USD).add_item(a, &bear, 1);

        bear.price = Money::from_minor(1500, USD);

        let cart = cart.add_item(a, &bear, 2);
        let line = cart.get_item(a);

        assert_eq!(cart.len(), 1);
        assert_eq!(line.map(LineItem::quantity), Some(3));
        assert_eq!(line.map(LineItem::line_total), Some(Money::from_minor(3000, USD)));
        assert_eq!(cart.totals().subtotal(), Decimal::from(30));
    }

    #[test]
    fn add_zero_quantity_is_noop() {
        let [a] = keys();
        let cart = Cart::new(USD).add_item(a, &product("Bear", 1000), 0);

        assert!(cart.is_empty());
    }

    #[test]
    fn add_other_currency_is_ignored() {
        let [a] = keys();
        let pounds = Product::new("Paddington", "TB-099", "Bears", Money::from_minor(1500, GBP), 3);

        let cart = Cart::new(USD).add_item(a, &pounds, 1);

        assert!(cart.is_empty());
        assert_eq!(cart.totals().total(), Decimal::ZERO);
    }

    #[test]
    fn items_keep_insertion_order() {
        let [a, b, c] = keys();

        let cart = Cart::new(USD)
            .add_item(c, &product("C", 300), 1)
            .add_item(a, &product("A", 100), 1)
            .add_item(c, &product("C", 300), 1)
            .add_item(b, &product("B", 200), 1);

        let names: Vec<&str> = cart.items().iter().map(LineItem::name).collect();

        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(cart.unit_count(), 4);
    }

    #[test]
    fn remove_absent_item_is_noop() {
        let [a, b] = keys();

        let cart = Cart::new(USD)
            .add_item(a, &product("Bear", 1000), 1)
            .remove_item(b);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals().subtotal(), Decimal::from(10));
    }

    #[test]
    fn update_quantity_sets_line_and_recomputes() {
        let [a] = keys();

        let cart = Cart::new(USD)
            .add_item(a, &product("Bear", 1000), 1)
            .update_quantity(a, 4);

        assert_eq!(cart.get_item(a).map(LineItem::quantity), Some(4));
        assert_eq!(cart.totals().subtotal(), Decimal::from(40));
    }

    #[test]
    fn update_quantity_to_zero_or_negative_removes() {
        let [a, b] = keys();
        let base = Cart::new(USD)
            .add_item(a, &product("A", 1000), 2)
            .add_item(b, &product("B", 500), 1);

        let zeroed = base.clone().update_quantity(a, 0);
        let negative = base.clone().update_quantity(a, -3);
        let removed = base.remove_item(a);

        assert_eq!(zeroed.items(), removed.items());
        assert_eq!(negative.items(), removed.items());
        assert_eq!(zeroed.totals(), removed.totals());
    }

    #[test]
    fn update_quantity_for_absent_product_is_noop() {
        let [a, b] = keys();

        let cart = Cart::new(USD)
            .add_item(a, &product("A", 1000), 2)
            .update_quantity(b, 5);

        assert_eq!(cart.len(), 1);
        assert!(cart.get_item(b).is_none());
    }

    #[test]
    fn set_discount_clamps() {
        let low = Cart::new(USD).set_discount(Decimal::from(-10));
        let high = Cart::new(USD).set_discount(Decimal::from(250));

        assert_eq!(low.discount().points(), Decimal::ZERO);
        assert_eq!(high.discount().points(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn full_discount_zeroes_total() {
        let [a] = keys();

        let cart = Cart::new(USD)
            .add_item(a, &product("Bear", 1999), 1)
            .set_discount(Decimal::ONE_HUNDRED);

        assert_eq!(cart.totals().subtotal(), Decimal::new(1999, 2));
        assert_eq!(cart.totals().tax(), Decimal::ZERO);
        assert_eq!(cart.totals().total(), Decimal::ZERO);
    }

    #[test]
    fn set_customer_does_not_touch_totals() {
        let [a] = keys();
        let mut customers = SlotMap::<CustomerKey, ()>::with_key();
        let customer = customers.insert(());

        let cart = Cart::new(USD).add_item(a, &product("Bear", 1000), 1);
        let totals = *cart.totals();
        let cart = cart.set_customer(Some(customer));

        assert_eq!(cart.customer(), Some(customer));
        assert_eq!(cart.totals(), &totals);
        assert_eq!(cart.set_customer(None).customer(), None);
    }

    #[test]
    fn clear_resets_everything_but_tax_rate() {
        let [a] = keys();
        let mut customers = SlotMap::<CustomerKey, ()>::with_key();
        let tax_rate = Percentage::from(Decimal::new(5, 2));

        let cart = Cart::with_tax_rate(USD, tax_rate)
            .add_item(a, &product("Bear", 1000), 3)
            .set_customer(Some(customers.insert(())))
            .set_discount(Decimal::from(15))
            .clear();

        assert!(cart.items().is_empty());
        assert_eq!(cart.customer(), None);
        assert_eq!(cart.discount(), DiscountPercent::ZERO);
        assert_eq!(cart.tax_rate(), tax_rate);
        assert_eq!(cart.totals().subtotal(), Decimal::ZERO);
        assert_eq!(cart.totals().tax(), Decimal::ZERO);
        assert_eq!(cart.totals().total(), Decimal::ZERO);
    }

    #[test]
    fn apply_resolves_products_through_catalog() -> TestResult {
        let mut catalog = Catalog::new(USD);
        let bear = catalog.insert(product("Bear", 1000))?;
        let panda = catalog.insert(product("Panda", 500))?;

        let cart = [
            CartAction::Add { product: bear, quantity: 2 },
            CartAction::Add { product: panda, quantity: 1 },
            CartAction::SetDiscount(Decimal::from(10)),
            CartAction::UpdateQuantity { product: panda, quantity: 3 },
            CartAction::Remove(bear),
        ]
        .into_iter()
        .fold(Cart::new(USD), |cart, action| cart.apply(action, &catalog));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals().subtotal(), Decimal::from(15));
        assert_eq!(cart.totals().discounted_subtotal(), Decimal::new(135, 1));

        Ok(())
    }

    #[test]
    fn apply_unknown_product_is_noop() {
        let catalog = Catalog::new(USD);

        let cart = Cart::new(USD).apply(
            CartAction::Add {
                product: ProductKey::default(),
                quantity: 1,
            },
            &catalog,
        );

        assert!(cart.is_empty());
    }

    #[test]
    fn apply_clear_empties_cart() -> TestResult {
        let mut catalog = Catalog::new(USD);
        let bear = catalog.insert(product("Bear", 1000))?;

        let cart = Cart::new(USD)
            .apply(CartAction::Add { product: bear, quantity: 1 }, &catalog)
            .apply(CartAction::Clear, &catalog);

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn tax_rate_outside_range_is_clamped() {
        let [bear] = keys();

        let negative = Cart::with_tax_rate(USD, Percentage::from(Decimal::new(-5, 1)))
            .add_item(bear, &product("Bear", 1000), 1);

        assert_eq!(negative.tax_rate(), Percentage::from(Decimal::ZERO));
        assert_eq!(negative.totals().tax(), Decimal::ZERO);
        assert_eq!(negative.totals().total(), Decimal::from(10));

        let huge = Cart::with_tax_rate(USD, Percentage::from(Decimal::from(8)));

        assert_eq!(huge.tax_rate(), Percentage::from(Decimal::ONE));
        assert_eq!(huge.clear().tax_rate(), Percentage::from(Decimal::ONE));
    }
}
