//! Session Fixtures
//!
//! A session is a scripted list of sales: the actions a cashier takes on the
//! cart and how the customer pays.

use serde::Deserialize;

use crate::{
    cart::CartAction,
    checkout::{PaymentMethod, Tender},
};

/// Wrapper for a session in YAML
#[derive(Debug, Deserialize)]
pub struct SessionFixture {
    /// Sales in the order they are rung up
    pub sales: Vec<SaleFixture>,
}

/// One scripted sale
#[derive(Debug, Deserialize)]
pub struct SaleFixture {
    /// Cashier display name
    #[serde(default)]
    pub cashier: Option<String>,

    /// Customer handle attached before any action runs
    #[serde(default)]
    pub customer: Option<String>,

    /// Cart actions, in order
    #[serde(default)]
    pub actions: Vec<ActionFixture>,

    /// How the sale is paid
    pub payment: PaymentFixture,
}

/// A cart action as written in YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionFixture {
    /// Add units of a product
    Add {
        /// Product handle
        product: String,

        /// Units to add
        #[serde(default = "one")]
        quantity: u32,
    },

    /// Remove a product's line
    Remove {
        /// Product handle
        product: String,
    },

    /// Set a product's quantity
    Update {
        /// Product handle
        product: String,

        /// New quantity; zero or below removes the line
        quantity: i64,
    },

    /// Set the cart discount (e.g., "10%")
    Discount {
        /// Discount percentage
        percent: String,
    },

    /// Attach or detach a customer
    Customer {
        /// Customer handle, or none to detach
        #[serde(default)]
        customer: Option<String>,
    },

    /// Empty the cart
    Clear,
}

/// Payment as written in YAML
#[derive(Debug, Deserialize)]
pub struct PaymentFixture {
    /// Payment method
    pub method: PaymentMethod,

    /// Cash handed over (e.g., "30.00 USD"); required for cash
    #[serde(default)]
    pub tendered: Option<String>,
}

/// A sale resolved against a fixture's catalog and customers.
#[derive(Debug, Clone)]
pub struct SaleScript<'a> {
    /// Cashier display name
    pub cashier: Option<String>,

    /// Actions to dispatch, in order
    pub actions: Vec<CartAction>,

    /// How the sale is paid
    pub tender: Tender<'a>,
}

fn one() -> u32 {
    1
}
