//! # Register State
//!
//! The application context: catalog, sales ledger, cash register, the
//! cart in progress and company settings, owned together behind one lock.
//!
//! ## Register Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register State Operations                            │
//! │                                                                         │
//! │  Operator action         Command                 State change          │
//! │  ───────────────         ───────                 ────────────          │
//! │                                                                         │
//! │  scan P001 ────────────► cart::scan_code() ────► cart line + 1         │
//! │  qty P001 2 ───────────► cart::change_qty() ───► reads catalog stock   │
//! │  pay Efectivo ─────────► sale::checkout() ─────► catalog, ledger,      │
//! │                                                   cash register         │
//! │  close 1339 ───────────► session::close() ─────► cash register         │
//! │                                                                         │
//! │  NOTE: every command takes the lock for its whole state transition,    │
//! │        so a checkout never interleaves with a cart change.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use till_core::{
    Cart, CashRegister, Catalog, CompanySettings, CoreResult, Checkout, Sale, SalesLedger, User,
};
use till_store::PersistedState;

use super::config::ConfigState;

/// Everything one register owns.
#[derive(Debug, Clone)]
pub struct Register {
    pub catalog: Catalog,
    pub ledger: SalesLedger,
    pub cash: CashRegister,
    /// The sale in progress. Never persisted.
    pub cart: Cart,
    pub settings: CompanySettings,
    pub user: Option<User>,
}

impl Register {
    /// An empty register with the given settings.
    pub fn new(settings: CompanySettings) -> Self {
        Register {
            catalog: Catalog::new(),
            ledger: SalesLedger::new(),
            cash: CashRegister::new(),
            cart: Cart::new(settings.tax_rate),
            settings,
            user: None,
        }
    }

    /// Rebuilds the register from persisted state. Missing keys fall back
    /// to empty collections and the configured default settings.
    pub fn from_persisted(state: PersistedState, config: &ConfigState) -> CoreResult<Self> {
        let settings = state.settings.unwrap_or_else(|| config.default_settings());

        let mut catalog = Catalog::with_products(state.products.unwrap_or_default())?;
        catalog.set_categories(state.categories.unwrap_or_default());
        catalog.set_brands(state.brands.unwrap_or_default());
        catalog.set_clients(state.clients.unwrap_or_default());
        catalog.set_payment_methods(state.payment_methods.unwrap_or_default());

        Ok(Register {
            catalog,
            ledger: SalesLedger::from_sales(state.sales.unwrap_or_default()),
            cash: CashRegister::restore(
                state.session,
                state.session_history.unwrap_or_default(),
            ),
            cart: Cart::new(settings.tax_rate),
            settings,
            user: state.user,
        })
    }

    /// Everything to persist. The cart is not included.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            session: self.cash.current().cloned(),
            settings: Some(self.settings.clone()),
            payment_methods: Some(self.catalog.payment_methods().to_vec()),
            user: self.user.clone(),
            products: Some(self.catalog.products().to_vec()),
            categories: Some(self.catalog.categories().to_vec()),
            brands: Some(self.catalog.brands().to_vec()),
            clients: Some(self.catalog.clients().to_vec()),
            sales: Some(self.ledger.list().to_vec()),
            session_history: Some(self.cash.history().to_vec()),
        }
    }

    /// Commits the current cart. The cart is left for the caller to clear.
    pub fn checkout(&mut self, payment_method: &str, client_id: Option<&str>) -> CoreResult<Sale> {
        Checkout::new(&mut self.catalog, &mut self.ledger, &mut self.cash).process(
            &self.cart,
            payment_method,
            client_id,
        )
    }
}

/// Shared handle to the register.
///
/// ## Thread Safety
/// `Arc<Mutex<Register>>`: one command mutates at a time. A poisoned lock
/// is recovered; every engine operation is all-or-nothing, so a panic
/// elsewhere cannot leave a half-applied transition behind.
#[derive(Debug, Clone)]
pub struct RegisterState {
    register: Arc<Mutex<Register>>,
}

impl RegisterState {
    pub fn new(register: Register) -> Self {
        RegisterState {
            register: Arc::new(Mutex::new(register)),
        }
    }

    /// Executes a function with read access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = register_state.with_register(|r| r.cart.totals());
    /// ```
    pub fn with_register<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Register) -> R,
    {
        let register = self.register.lock().unwrap_or_else(PoisonError::into_inner);
        f(&register)
    }

    /// Executes a function with write access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// register_state.with_register_mut(|r| r.cart.set_price_tier(tier));
    /// ```
    pub fn with_register_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Register) -> R,
    {
        let mut register = self.register.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{Money, TaxRate};
    use till_store::demo::demo_state;

    #[test]
    fn test_from_persisted_demo() {
        let register = Register::from_persisted(demo_state(), &ConfigState::default()).unwrap();

        assert_eq!(register.catalog.products().len(), 4);
        assert_eq!(register.catalog.category_name("2"), "Electrónica");
        assert!(!register.cash.is_open());
        assert!(register.cart.is_empty());
        assert_eq!(register.cart.tax_rate(), TaxRate::from_bps(1800));
    }

    #[test]
    fn test_missing_settings_use_config() {
        let config = ConfigState {
            default_tax_rate_bps: 1600,
            ..ConfigState::default()
        };
        let register = Register::from_persisted(PersistedState::default(), &config).unwrap();

        assert_eq!(register.settings.tax_rate, TaxRate::from_bps(1600));
        assert!(register.catalog.products().is_empty());
    }

    #[test]
    fn test_snapshot_round_trip_keeps_open_session() {
        let mut register = Register::from_persisted(demo_state(), &ConfigState::default()).unwrap();
        register.cash.open(Money::from_major(100), None).unwrap();

        let snapshot = register.snapshot();
        let restored = Register::from_persisted(snapshot.clone(), &ConfigState::default()).unwrap();

        assert!(restored.cash.is_open());
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_checkout_through_context() {
        let mut register = Register::from_persisted(demo_state(), &ConfigState::default()).unwrap();
        register.cash.open(Money::from_major(100), None).unwrap();

        let product = register.catalog.find_by_code("P001").cloned().unwrap();
        register.cart.add_item(&product).unwrap();
        let sale = register.checkout("Efectivo", None).unwrap();

        assert_eq!(sale.total, Money::from_major(177));
        assert_eq!(register.catalog.find_by_code("P001").unwrap().stock, 49);
        assert_eq!(register.snapshot().sales.unwrap().len(), 1);
    }

    #[test]
    fn test_state_handle_shares_register() {
        let state = RegisterState::new(Register::new(CompanySettings::default()));
        let clone = state.clone();

        clone.with_register_mut(|r| r.settings.name = "Changed".to_string());

        assert_eq!(state.with_register(|r| r.settings.name.clone()), "Changed");
    }
}
