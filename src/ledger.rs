//! Sales Ledger
//!
//! In-memory record of completed sales, with the figures the dashboard shows.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};

use crate::{
    checkout::{CheckoutSink, PaymentMethod, Sale, SinkError},
    pricing::{PricingError, minor_to_decimal, to_money},
};

/// Aggregate figures over recorded sales.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    /// Number of completed sales
    pub transactions: usize,

    /// Sum of amounts due
    pub revenue: Money<'static, Currency>,

    /// Revenue divided by transactions, rounded to currency precision
    pub average_sale: Money<'static, Currency>,

    /// Distinct customers attached to sales
    pub customers_served: usize,

    /// Sales paid in cash
    pub cash: usize,

    /// Sales paid by card
    pub card: usize,

    /// Sales paid by QR code
    pub qr: usize,
}

/// In-memory checkout sink.
#[derive(Debug, Clone)]
pub struct SalesLedger<'a> {
    sales: Vec<Sale<'a>>,
    currency: &'static Currency,
}

impl<'a> SalesLedger<'a> {
    /// Create an empty ledger for sales in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            sales: Vec::new(),
            currency,
        }
    }

    /// Recorded sales, oldest first.
    #[must_use]
    pub fn sales(&self) -> &[Sale<'a>] {
        &self.sales
    }

    /// Number of recorded sales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    /// Whether no sales have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// Summarise the recorded sales.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the average cannot be represented in minor units.
    pub fn summary(&self) -> Result<SalesSummary, PricingError> {
        let revenue_minor = self
            .sales
            .iter()
            .fold(0_i64, |acc, sale| acc.saturating_add(sale.amount_due().to_minor_units()));

        let average_sale = if self.sales.is_empty() {
            Money::from_minor(0, self.currency)
        } else {
            let revenue = minor_to_decimal(revenue_minor, self.currency);
            to_money(revenue / Decimal::from(self.sales.len()), self.currency)?
        };

        let customers_served = self
            .sales
            .iter()
            .filter_map(Sale::customer)
            .collect::<FxHashSet<_>>()
            .len();

        let count = |method: PaymentMethod| {
            self.sales
                .iter()
                .filter(|sale| sale.payment().method() == method)
                .count()
        };

        Ok(SalesSummary {
            transactions: self.sales.len(),
            revenue: Money::from_minor(revenue_minor, self.currency),
            average_sale,
            customers_served,
            cash: count(PaymentMethod::Cash),
            card: count(PaymentMethod::Card),
            qr: count(PaymentMethod::Qr),
        })
    }
}

impl<'a> CheckoutSink<'a> for SalesLedger<'a> {
    fn record(&mut self, sale: Sale<'a>) -> Result<(), SinkError> {
        if sale.currency() != self.currency {
            return Err(SinkError::Rejected(format!(
                "sale in {}, ledger in {}",
                sale.currency().iso_alpha_code,
                self.currency.iso_alpha_code
            )));
        }

        self.sales.push(sale);

        Ok(())
    }
}
