//! Register
//!
//! Holds the active cart for one sale session and drives it through checkout.

use decimal_percentage::Percentage;
use tracing::warn;

use crate::{
    cart::{Cart, CartAction},
    checkout::{CheckoutError, CheckoutSink, Sale, Tender, checkout},
    pricing::default_tax_rate,
    products::{Catalog, ProductCatalog},
};

/// A till: one catalog, one active cart, one sink for completed sales.
#[derive(Debug)]
pub struct Register<'c, 'a, C: ?Sized, S> {
    catalog: &'c C,
    cart: Cart<'a>,
    sink: S,
}

impl<'c, 'a, S: CheckoutSink<'a>> Register<'c, 'a, Catalog<'a>, S> {
    /// Open a register over a catalog, pricing in its currency with the default tax rate.
    pub fn for_catalog(catalog: &'c Catalog<'a>, sink: S) -> Self {
        Self::new(catalog, Cart::with_tax_rate(catalog.currency(), default_tax_rate()), sink)
    }

    /// Open a register over a catalog with a specific tax rate.
    pub fn with_tax_rate(catalog: &'c Catalog<'a>, tax_rate: Percentage, sink: S) -> Self {
        Self::new(catalog, Cart::with_tax_rate(catalog.currency(), tax_rate), sink)
    }
}

impl<'c, 'a, C, S> Register<'c, 'a, C, S>
where
    C: ProductCatalog<'a> + ?Sized,
    S: CheckoutSink<'a>,
{
    /// Open a register with an explicit starting cart.
    pub fn new(catalog: &'c C, cart: Cart<'a>, sink: S) -> Self {
        Self {
            catalog,
            cart,
            sink,
        }
    }

    /// Apply a user action to the active cart.
    pub fn dispatch(&mut self, action: CartAction) -> &Cart<'a> {
        self.cart = self.take_cart().apply(action, self.catalog);

        &self.cart
    }

    /// Check out the active cart.
    ///
    /// On success the sale is recorded and the cart is emptied. On failure the
    /// cart is untouched and the error is the notification for the operator.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the cart cannot be checked out.
    pub fn complete_sale(
        &mut self,
        tender: Tender<'a>,
        cashier: Option<&str>,
    ) -> Result<Sale<'a>, CheckoutError> {
        match checkout(&self.cart, tender, cashier, &mut self.sink) {
            Ok(sale) => {
                self.cart = self.take_cart().clear();
                Ok(sale)
            }
            Err(err) => {
                warn!(error = %err, "checkout rejected");
                Err(err)
            }
        }
    }

    /// The active cart.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The sink completed sales are recorded in.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Close the register, returning its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn take_cart(&mut self) -> Cart<'a> {
        let empty = Cart::with_tax_rate(self.cart.currency(), self.cart.tax_rate());

        std::mem::replace(&mut self.cart, empty)
    }
}
