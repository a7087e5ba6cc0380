//! # Catalog Store
//!
//! Holds products and the reference data around them (categories, brands,
//! clients, payment methods). Long-lived: owned by the application context
//! and lent to the cart engine (read) and the checkout processor (write).
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart Engine ───────── reads stock ─────────┐                           │
//! │                                              ▼                           │
//! │                                        ┌───────────┐                     │
//! │                                        │  Catalog  │                     │
//! │                                        └───────────┘                     │
//! │                                              ▲                           │
//! │  Checkout Processor ── decrements stock ─────┘  (only writer)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single process, single register: nothing else decrements stock between
//! the cart's check and checkout's commit. A multi-terminal deployment needs
//! a per-product version check in [`Catalog::apply_stock_decrements`].

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Brand, Category, Client, PaymentMethod, Product};
use crate::validation::{validate_product, validate_search_query};
use crate::DEFAULT_CLIENT_NAME;

/// Display name used when a category or brand id cannot be resolved.
pub const UNKNOWN_NAME: &str = "-";

/// In-memory product catalog.
///
/// Products keep insertion order; codes are unique.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    brands: Vec<Brand>,
    clients: Vec<Client>,
    payment_methods: Vec<PaymentMethod>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog from persisted products, validating each entry.
    pub fn with_products(products: Vec<Product>) -> CoreResult<Self> {
        let mut catalog = Catalog::new();
        for product in products {
            catalog.add_product(product)?;
        }
        Ok(catalog)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Adds a product after validating it and checking id/code uniqueness.
    pub fn add_product(&mut self, product: Product) -> CoreResult<()> {
        validate_product(&product)?;

        if self.products.iter().any(|p| p.id == product.id) {
            return Err(ValidationError::Duplicate {
                field: "product id".to_string(),
                value: product.id,
            }
            .into());
        }

        if self.find_by_code(&product.code).is_some() {
            return Err(ValidationError::Duplicate {
                field: "code".to_string(),
                value: product.code,
            }
            .into());
        }

        self.products.push(product);
        Ok(())
    }

    /// All products in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a product by id, failing with `ProductNotFound`.
    pub fn require(&self, id: &str) -> CoreResult<&Product> {
        self.get(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    /// Exact, case-sensitive match on the product code.
    pub fn find_by_code(&self, code: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.code == code)
    }

    /// Case-insensitive substring search over name and code, optionally
    /// restricted to one category. Used for list filtering only.
    pub fn search(&self, term: &str, category_id: Option<&str>) -> CoreResult<Vec<&Product>> {
        let term = validate_search_query(term)?.to_lowercase();

        Ok(self
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term) || p.code.to_lowercase().contains(&term)
            })
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .collect())
    }

    /// Products at or below their reorder threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_low_stock()).collect()
    }

    /// Decrements stock for every `(product_id, quantity)` pair, or none.
    ///
    /// All pairs are checked against live stock before any is applied, so a
    /// failure leaves the catalog untouched. Quantities for the same product
    /// are summed before checking.
    pub(crate) fn apply_stock_decrements(&mut self, decrements: &[(&str, i64)]) -> CoreResult<()> {
        let mut totals: Vec<(usize, i64)> = Vec::with_capacity(decrements.len());

        for (id, qty) in decrements {
            let index = self
                .products
                .iter()
                .position(|p| p.id == *id)
                .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

            match totals.iter_mut().find(|(i, _)| *i == index) {
                Some((_, total)) => *total += qty,
                None => totals.push((index, *qty)),
            }
        }

        for (index, requested) in &totals {
            let product = &self.products[*index];
            if !product.can_sell(*requested) {
                return Err(CoreError::StockExceeded {
                    code: product.code.clone(),
                    available: product.stock,
                    requested: *requested,
                });
            }
        }

        for (index, requested) in totals {
            self.products[index].stock -= requested;
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reference data
    // -------------------------------------------------------------------------

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn set_brands(&mut self, brands: Vec<Brand>) {
        self.brands = brands;
    }

    pub fn set_clients(&mut self, clients: Vec<Client>) {
        self.clients = clients;
    }

    pub fn set_payment_methods(&mut self, methods: Vec<PaymentMethod>) {
        self.payment_methods = methods;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Payment methods offered at checkout.
    pub fn active_payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_methods.iter().filter(|m| m.is_active)
    }

    /// Category display name, `-` when unknown.
    pub fn category_name(&self, id: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map_or(UNKNOWN_NAME, |c| c.name.as_str())
    }

    /// Brand display name, `-` when unknown.
    pub fn brand_name(&self, id: &str) -> &str {
        self.brands
            .iter()
            .find(|b| b.id == id)
            .map_or(UNKNOWN_NAME, |b| b.name.as_str())
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Client display name; absent or unknown clients are the walk-in
    /// customer.
    pub fn client_name(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.client(id))
            .map_or(DEFAULT_CLIENT_NAME, |c| c.name.as_str())
    }
}
