//! Customer Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for customers in YAML
#[derive(Debug, Deserialize)]
pub struct CustomersFixture {
    /// Map of customer handle -> customer fixture
    pub customers: FxHashMap<String, CustomerFixture>,
}

/// Customer Fixture
#[derive(Debug, Deserialize)]
pub struct CustomerFixture {
    /// Display name
    pub name: String,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Loyalty points balance
    #[serde(default)]
    pub loyalty_points: u32,

    /// Lifetime spend (e.g., "1250.50 USD")
    #[serde(default)]
    pub total_spent: Option<String>,

    /// Number of visits
    #[serde(default)]
    pub visits: u32,
}
