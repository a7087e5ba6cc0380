//! # Persisted State
//!
//! The fixed set of keys the register persists, and the snapshot type that
//! bundles them for startup and after each committed transition.

use serde::{Deserialize, Serialize};
use till_core::{
    Brand, CashRegisterSession, Category, Client, CompanySettings, PaymentMethod, Product, Sale,
    User,
};

/// Storage keys. Each holds one JSON document.
pub mod keys {
    /// The open cash-register session. Absent when the register is closed.
    pub const SESSION: &str = "pos_session";
    pub const SETTINGS: &str = "pos_settings";
    pub const PAYMENT_METHODS: &str = "pos_payment_methods";
    /// Logged-in operator.
    pub const USER: &str = "pos_user";
    pub const PRODUCTS: &str = "pos_products";
    pub const CATEGORIES: &str = "pos_categories";
    pub const BRANDS: &str = "pos_brands";
    pub const CLIENTS: &str = "pos_clients";
    pub const SALES: &str = "pos_sales";
    /// Closed sessions.
    pub const SESSION_HISTORY: &str = "pos_session_history";

    pub const ALL: [&str; 10] = [
        SESSION,
        SETTINGS,
        PAYMENT_METHODS,
        USER,
        PRODUCTS,
        CATEGORIES,
        BRANDS,
        CLIENTS,
        SALES,
        SESSION_HISTORY,
    ];
}

/// Everything the register persists.
///
/// `None` means "no value stored": on load the key was absent, on save the
/// key is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub session: Option<CashRegisterSession>,
    pub settings: Option<CompanySettings>,
    pub payment_methods: Option<Vec<PaymentMethod>>,
    pub user: Option<User>,
    pub products: Option<Vec<Product>>,
    pub categories: Option<Vec<Category>>,
    pub brands: Option<Vec<Brand>>,
    pub clients: Option<Vec<Client>>,
    pub sales: Option<Vec<Sale>>,
    pub session_history: Option<Vec<CashRegisterSession>>,
}

impl PersistedState {
    /// False on a fresh database, before any product list was stored.
    pub fn has_catalog(&self) -> bool {
        self.products.is_some()
    }
}
