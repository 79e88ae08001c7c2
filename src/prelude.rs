//! Teddy Bear POS prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartAction, LineItem},
    checkout::{
        CheckoutError, CheckoutSink, Payment, PaymentMethod, Sale, SinkError, Tender, checkout,
    },
    customers::{Customer, CustomerDirectory, CustomerKey, Customers},
    discounts::DiscountPercent,
    fixtures::{Fixture, FixtureError, sessions::SaleScript},
    ledger::{SalesLedger, SalesSummary},
    pricing::{PricingError, Totals, compute_totals, default_tax_rate, to_money},
    products::{Catalog, CatalogError, LOW_STOCK_THRESHOLD, Product, ProductCatalog, ProductKey},
    receipt::{Receipt, ReceiptError, write_summary},
    register::Register,
};
