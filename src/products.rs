//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

/// Stock level below which the dashboard flags a product.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A product's currency differs from the catalog currency (product name, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    /// Category shown in the POS filter
    pub category: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Units in stock
    pub stock: u32,

    /// Optional barcode
    pub barcode: Option<String>,

    /// Optional long description
    pub description: Option<String>,
}

impl<'a> Product<'a> {
    /// Create a product with no barcode or description.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        category: impl Into<String>,
        price: Money<'a, Currency>,
        stock: u32,
    ) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            category: category.into(),
            price,
            stock,
            barcode: None,
            description: None,
        }
    }

    /// Whether the stock level is strictly below `threshold`.
    #[must_use]
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock < threshold
    }

    /// Case-insensitive match of `needle` (already lowercased) against name or SKU.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.sku.to_lowercase().contains(needle)
    }
}

/// Read-only product lookup used by the cart.
pub trait ProductCatalog<'a> {
    /// Return the product for `key`, if it exists.
    fn product(&self, key: ProductKey) -> Option<&Product<'a>>;
}

/// In-memory product catalog. All products share one currency.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            currency,
        }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] if the product is priced in another currency.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.name,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        Ok(self.products.insert(product))
    }

    /// Get a product by key.
    #[must_use]
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Iterate over all products in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Products whose name or SKU contains `term` (case-insensitive), optionally
    /// restricted to a single category. An empty term matches everything.
    pub fn search<'s>(
        &'s self,
        term: &str,
        category: Option<&'s str>,
    ) -> impl Iterator<Item = (ProductKey, &'s Product<'a>)> + 's {
        let needle = term.trim().to_lowercase();

        self.products.iter().filter(move |(_, product)| {
            category.is_none_or(|category| product.category == category) && product.matches(&needle)
        })
    }

    /// Distinct product categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .products
            .values()
            .map(|product| product.category.as_str())
            .collect();

        categories.sort_unstable();
        categories.dedup();

        categories
    }

    /// Products with stock strictly below `threshold`.
    pub fn low_stock(&self, threshold: u32) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products
            .iter()
            .filter(move |(_, product)| product.is_low_stock(threshold))
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Catalog currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

impl<'a> ProductCatalog<'a> for Catalog<'a> {
    fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn bear(name: &str, sku: &str, category: &str, stock: u32) -> Product<'static> {
        Product::new(name, sku, category, Money::from_minor(2499, USD), stock)
    }

    fn test_catalog() -> Result<Catalog<'static>, CatalogError> {
        let mut catalog = Catalog::new(USD);

        catalog.insert(bear("Classic Brown Bear", "TB-001", "Classic Bears", 25))?;
        catalog.insert(bear("Honey Panda", "TB-014", "Exotic Bears", 4))?;
        catalog.insert(bear("Polar Cuddles", "TB-022", "Exotic Bears", 10))?;

        Ok(catalog)
    }

    #[test]
    fn insert_rejects_other_currency() {
        let mut catalog = Catalog::new(USD);
        let result = catalog.insert(Product::new(
            "Paddington",
            "TB-099",
            "Classic Bears",
            Money::from_minor(1500, GBP),
            3,
        ));

        assert_eq!(
            result,
            Err(CatalogError::CurrencyMismatch(
                "Paddington".to_string(),
                GBP.iso_alpha_code,
                USD.iso_alpha_code,
            ))
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn search_matches_name_and_sku_case_insensitively() -> TestResult {
        let catalog = test_catalog()?;

        let by_name: Vec<&str> = catalog
            .search("PANDA", None)
            .map(|(_, product)| product.name.as_str())
            .collect();

        let by_sku: Vec<&str> = catalog
            .search("tb-02", None)
            .map(|(_, product)| product.name.as_str())
            .collect();

        assert_eq!(by_name, vec!["Honey Panda"]);
        assert_eq!(by_sku, vec!["Polar Cuddles"]);

        Ok(())
    }

    #[test]
    fn search_respects_category_filter() -> TestResult {
        let catalog = test_catalog()?;

        assert_eq!(catalog.search("", None).count(), 3);
        assert_eq!(catalog.search("", Some("Exotic Bears")).count(), 2);
        assert_eq!(catalog.search("brown", Some("Exotic Bears")).count(), 0);

        Ok(())
    }

    #[test]
    fn categories_are_sorted_and_distinct() -> TestResult {
        let catalog = test_catalog()?;

        assert_eq!(catalog.categories(), vec!["Classic Bears", "Exotic Bears"]);

        Ok(())
    }

    #[test]
    fn low_stock_is_strictly_below_threshold() -> TestResult {
        let catalog = test_catalog()?;

        let low: Vec<&str> = catalog
            .low_stock(LOW_STOCK_THRESHOLD)
            .map(|(_, product)| product.name.as_str())
            .collect();

        assert_eq!(low, vec!["Honey Panda"]);

        Ok(())
    }

    #[test]
    fn product_catalog_trait_returns_inserted_product() -> TestResult {
        let mut catalog = Catalog::new(USD);
        let key = catalog.insert(bear("Classic Brown Bear", "TB-001", "Classic Bears", 25))?;

        let product = catalog.product(key).ok_or("missing product")?;

        assert_eq!(product.sku, "TB-001");
        assert!(catalog.product(ProductKey::default()).is_none());

        Ok(())
    }
}
