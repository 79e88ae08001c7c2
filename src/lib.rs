//! Teddy Bear POS
//!
//! Cart and pricing engine for a teddy bear shop's point-of-sale register.
//! Carts are immutable values driven by reducers; totals are recomputed after
//! every change and only rounded to currency precision when money changes hands.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod customers;
pub mod discounts;
pub mod fixtures;
pub mod ledger;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod register;
