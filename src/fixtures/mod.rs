//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::CartAction,
    checkout::{PaymentMethod, Tender},
    customers::{Customer, CustomerKey, Customers},
    discounts::percent_points,
    fixtures::{
        customers::CustomersFixture,
        products::{ProductsFixture, parse_percentage, parse_price},
        sessions::{ActionFixture, PaymentFixture, SaleFixture, SaleScript, SessionFixture},
    },
    products::{Catalog, CatalogError, Product, ProductKey},
};

pub mod customers;
pub mod products;
pub mod sessions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Cash payment without a tendered amount
    #[error("Cash payment requires a tendered amount")]
    MissingTender,

    /// Currency mismatch between fixture amounts
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Catalog rejected a product
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog, created when the first product is loaded
    catalog: Option<Catalog<'a>>,

    customers: Customers<'a>,

    /// String handle -> `SlotMap` key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,
    customer_keys: FxHashMap<String, CustomerKey>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            customers: Customers::new(),
            product_keys: FxHashMap::default(),
            customer_keys: FxHashMap::default(),
        }
    }

    /// Load a complete fixture set (products and customers with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::new().load_set(name)
    }

    /// Load a complete fixture set from this fixture's base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(mut self, name: &str) -> Result<Self, FixtureError> {
        self.load_products(name)?.load_customers(name)?;

        Ok(self)
    }

    /// Load products from a YAML fixture file
    ///
    /// The first product fixes the catalog currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        // handle order keeps catalog iteration stable between runs
        let mut entries: Vec<_> = fixture.products.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (handle, product_fixture) in entries {
            // Parse to get the currency first (before creating Product)
            let currency = parse_price(&product_fixture.price)?.currency();
            let product: Product<'a> = product_fixture.try_into()?;

            let catalog = self
                .catalog
                .get_or_insert_with(|| Catalog::new(currency));

            let key = catalog.insert(product)?;

            self.product_keys.insert(handle, key);
        }

        debug!(set = name, products = self.product_keys.len(), "loaded products");

        Ok(self)
    }

    /// Load customers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if no products
    /// have been loaded, or if a lifetime spend is in another currency.
    pub fn load_customers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;
        let fixture: CustomersFixture = self.read("customers", name)?;

        let mut entries: Vec<_> = fixture.customers.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (handle, customer_fixture) in entries {
            let total_spent = match customer_fixture.total_spent.as_deref() {
                Some(amount) => self.price_in(amount, currency)?,
                None => Money::from_minor(0, currency),
            };

            let key = self.customers.insert(Customer {
                name: customer_fixture.name,
                email: customer_fixture.email,
                phone: customer_fixture.phone,
                loyalty_points: customer_fixture.loyalty_points,
                total_spent,
                visits: customer_fixture.visits,
            });

            self.customer_keys.insert(handle, key);
        }

        debug!(set = name, customers = self.customer_keys.len(), "loaded customers");

        Ok(self)
    }

    /// Load a scripted session and resolve its handles
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a sale
    /// refers to an unknown product or customer, or has an invalid payment.
    pub fn session(&self, name: &str) -> Result<Vec<SaleScript<'a>>, FixtureError> {
        let fixture: SessionFixture = self.read("sessions", name)?;

        fixture
            .sales
            .into_iter()
            .map(|sale| self.resolve_sale(sale))
            .collect()
    }

    /// Get a product by its string handle
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, handle: &str) -> Result<&Product<'a>, FixtureError> {
        let key = self.product_key(handle)?;

        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.get(key))
            .ok_or_else(|| FixtureError::ProductNotFound(handle.to_string()))
    }

    /// Get a product key by its string handle
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, handle: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(handle.to_string()))
    }

    /// Get a customer key by its string handle
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is not found.
    pub fn customer_key(&self, handle: &str) -> Result<CustomerKey, FixtureError> {
        self.customer_keys
            .get(handle)
            .copied()
            .ok_or_else(|| FixtureError::CustomerNotFound(handle.to_string()))
    }

    /// The loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// The loaded customers
    pub fn customers(&self) -> &Customers<'a> {
        &self.customers
    }

    /// Get the currency used by the fixture's products
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.catalog().map(Catalog::currency)
    }

    fn read<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    fn price_in(
        &self,
        amount: &str,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, FixtureError> {
        let money = parse_price(amount)?;

        if money.currency() != currency {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                money.currency().iso_alpha_code.to_string(),
            ));
        }

        Ok(money)
    }

    fn resolve_sale(&self, sale: SaleFixture) -> Result<SaleScript<'a>, FixtureError> {
        let mut actions = Vec::with_capacity(sale.actions.len() + 1);

        if let Some(handle) = sale.customer.as_deref() {
            actions.push(CartAction::SetCustomer(Some(self.customer_key(handle)?)));
        }

        for action in sale.actions {
            actions.push(self.resolve_action(action)?);
        }

        Ok(SaleScript {
            cashier: sale.cashier,
            actions,
            tender: self.resolve_payment(sale.payment)?,
        })
    }

    fn resolve_action(&self, action: ActionFixture) -> Result<CartAction, FixtureError> {
        Ok(match action {
            ActionFixture::Add { product, quantity } => CartAction::Add {
                product: self.product_key(&product)?,
                quantity,
            },
            ActionFixture::Remove { product } => CartAction::Remove(self.product_key(&product)?),
            ActionFixture::Update { product, quantity } => CartAction::UpdateQuantity {
                product: self.product_key(&product)?,
                quantity,
            },
            ActionFixture::Discount { percent } => {
                CartAction::SetDiscount(discount_points(&percent)?)
            }
            ActionFixture::Customer { customer } => CartAction::SetCustomer(
                customer
                    .as_deref()
                    .map(|handle| self.customer_key(handle))
                    .transpose()?,
            ),
            ActionFixture::Clear => CartAction::Clear,
        })
    }

    fn resolve_payment(&self, payment: PaymentFixture) -> Result<Tender<'a>, FixtureError> {
        match payment.method {
            PaymentMethod::Cash => {
                let tendered = payment.tendered.ok_or(FixtureError::MissingTender)?;

                Ok(Tender::Cash(self.price_in(&tendered, self.currency()?)?))
            }
            PaymentMethod::Card => Ok(Tender::Card),
            PaymentMethod::Qr => Ok(Tender::Qr),
        }
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Discount percent points for a percentage string, e.g. "10%" becomes `10`.
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn discount_points(s: &str) -> Result<Decimal, FixtureError> {
    parse_percentage(s).map(percent_points)
}
