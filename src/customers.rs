//! Customers

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Customer Key
    pub struct CustomerKey;
}

/// A known customer that can be attached to a sale.
#[derive(Debug, Clone)]
pub struct Customer<'a> {
    /// Display name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Loyalty points balance
    pub loyalty_points: u32,

    /// Lifetime spend
    pub total_spent: Money<'a, Currency>,

    /// Number of visits
    pub visits: u32,
}

impl<'a> Customer<'a> {
    /// Create a customer with no contact details and no history.
    pub fn new(name: impl Into<String>, currency: &'a Currency) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            loyalty_points: 0,
            total_spent: Money::from_minor(0, currency),
            visits: 0,
        }
    }
}

/// Read-only customer lookup.
pub trait CustomerDirectory<'a> {
    /// Return the customer for `key`, if it exists.
    fn customer(&self, key: CustomerKey) -> Option<&Customer<'a>>;
}

/// In-memory customer directory.
#[derive(Debug, Clone, Default)]
pub struct Customers<'a> {
    customers: SlotMap<CustomerKey, Customer<'a>>,
}

impl<'a> Customers<'a> {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            customers: SlotMap::with_key(),
        }
    }

    /// Add a customer.
    pub fn insert(&mut self, customer: Customer<'a>) -> CustomerKey {
        self.customers.insert(customer)
    }

    /// Get a customer by key.
    #[must_use]
    pub fn get(&self, key: CustomerKey) -> Option<&Customer<'a>> {
        self.customers.get(key)
    }

    /// Iterate over all customers.
    pub fn iter(&self) -> impl Iterator<Item = (CustomerKey, &Customer<'a>)> {
        self.customers.iter()
    }

    /// Number of customers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

impl<'a> CustomerDirectory<'a> for Customers<'a> {
    fn customer(&self, key: CustomerKey) -> Option<&Customer<'a>> {
        self.get(key)
    }
}
