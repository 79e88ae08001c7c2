//! Checkout
//!
//! Validates a cart for payment, snapshots it as a [`Sale`] and hands the sale
//! to a [`CheckoutSink`]. Checkout never mutates the cart.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    cart::{Cart, LineItem},
    customers::CustomerKey,
    discounts::DiscountPercent,
    pricing::{PricingError, Totals},
};

/// Errors that reject a checkout. None of them change the cart.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to sell.
    #[error("cart is empty")]
    EmptyCart,

    /// Cash tendered is below the amount due.
    #[error("insufficient cash: {tendered} tendered, {due} due")]
    InsufficientCash {
        /// Amount due
        due: Money<'static, Currency>,
        /// Amount tendered
        tendered: Money<'static, Currency>,
    },

    /// Cash was tendered in a currency other than the cart's (tendered currency, cart currency).
    #[error("cash tendered in {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Totals could not be converted to money.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The sink refused the sale.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Errors raised by a [`CheckoutSink`].
#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    /// The recorder refused the sale.
    #[error("sale rejected: {0}")]
    Rejected(String),
}

/// Receives completed sales.
pub trait CheckoutSink<'a> {
    /// Record a completed sale.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the sale could not be recorded.
    fn record(&mut self, sale: Sale<'a>) -> Result<(), SinkError>;
}

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash, with change
    Cash,
    /// Card terminal
    Card,
    /// QR code payment
    Qr,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::Qr => write!(f, "QR"),
        }
    }
}

/// What the customer hands over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tender<'a> {
    /// Cash with the amount received
    Cash(Money<'a, Currency>),
    /// Card payment for the exact amount
    Card,
    /// QR payment for the exact amount
    Qr,
}

impl Tender<'_> {
    /// The payment method of this tender.
    pub fn method(&self) -> PaymentMethod {
        match self {
            Tender::Cash(_) => PaymentMethod::Cash,
            Tender::Card => PaymentMethod::Card,
            Tender::Qr => PaymentMethod::Qr,
        }
    }
}

/// Settled payment for a sale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payment<'a> {
    method: PaymentMethod,
    tendered: Option<Money<'a, Currency>>,
    change: Option<Money<'a, Currency>>,
}

impl<'a> Payment<'a> {
    /// Payment method
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Cash received, for cash payments.
    pub fn tendered(&self) -> Option<Money<'a, Currency>> {
        self.tendered
    }

    /// Change given back, for cash payments.
    pub fn change(&self) -> Option<Money<'a, Currency>> {
        self.change
    }
}

/// Snapshot of a completed sale.
#[derive(Debug, Clone)]
pub struct Sale<'a> {
    id: Uuid,
    completed_at: Timestamp,
    cashier: Option<String>,
    customer: Option<CustomerKey>,
    items: Vec<LineItem<'a>>,
    discount: DiscountPercent,
    tax_rate: Percentage,
    totals: Totals,
    amount_due: Money<'a, Currency>,
    payment: Payment<'a>,
}

impl<'a> Sale<'a> {
    /// Sale identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the sale completed
    pub fn completed_at(&self) -> Timestamp {
        self.completed_at
    }

    /// Cashier display name
    pub fn cashier(&self) -> Option<&str> {
        self.cashier.as_deref()
    }

    /// Attached customer
    pub fn customer(&self) -> Option<CustomerKey> {
        self.customer
    }

    /// Sold lines
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Cart discount at checkout
    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }

    /// Tax rate at checkout
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Unrounded totals
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Total rounded to currency precision
    pub fn amount_due(&self) -> Money<'a, Currency> {
        self.amount_due
    }

    /// Settled payment
    pub fn payment(&self) -> &Payment<'a> {
        &self.payment
    }

    /// Currency of the sale
    pub fn currency(&self) -> &'static Currency {
        self.totals.currency()
    }
}

/// Check out `cart`, record the sale in `sink` and return it.
///
/// The cart is left as it was; callers clear it once the sale is recorded.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: the cart has no items.
/// - [`CheckoutError::CurrencyMismatch`]: cash was tendered in another currency.
/// - [`CheckoutError::InsufficientCash`]: cash tendered is below the amount due.
/// - [`CheckoutError::Pricing`] or [`CheckoutError::Money`]: totals could not be settled.
/// - [`CheckoutError::Sink`]: the sink refused the sale.
pub fn checkout<'a, S>(
    cart: &Cart<'a>,
    tender: Tender<'a>,
    cashier: Option<&str>,
    sink: &mut S,
) -> Result<Sale<'a>, CheckoutError>
where
    S: CheckoutSink<'a> + ?Sized,
{
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let totals = *cart.totals();
    let amount_due = totals.amount_due()?;
    let payment = settle(tender, amount_due, cart.currency())?;

    let sale = Sale {
        id: Uuid::now_v7(),
        completed_at: Timestamp::now(),
        cashier: cashier.map(str::to_string),
        customer: cart.customer(),
        items: cart.items().to_vec(),
        discount: cart.discount(),
        tax_rate: cart.tax_rate(),
        totals,
        amount_due,
        payment,
    };

    sink.record(sale.clone())?;

    info!(
        sale = %sale.id,
        total = %amount_due,
        method = %payment.method,
        lines = sale.items.len(),
        "sale completed"
    );

    Ok(sale)
}

/// Settle a tender against the amount due.
fn settle<'a>(
    tender: Tender<'a>,
    due: Money<'a, Currency>,
    currency: &'static Currency,
) -> Result<Payment<'a>, CheckoutError> {
    let Tender::Cash(tendered) = tender else {
        return Ok(Payment {
            method: tender.method(),
            tendered: None,
            change: None,
        });
    };

    if tendered.currency() != currency {
        return Err(CheckoutError::CurrencyMismatch(
            tendered.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if tendered.to_minor_units() < due.to_minor_units() {
        return Err(CheckoutError::InsufficientCash {
            due: Money::from_minor(due.to_minor_units(), currency),
            tendered: Money::from_minor(tendered.to_minor_units(), currency),
        });
    }

    Ok(Payment {
        method: PaymentMethod::Cash,
        tendered: Some(tendered),
        change: Some(tendered.sub(due)?),
    })
}
