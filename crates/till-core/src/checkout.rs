//! # Checkout Processor
//!
//! Turns a cart into an immutable [`Sale`] in one logical transaction.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Preconditions (no mutation)                                         │
//! │     ├── cart not empty ─────────────────────────► EmptyCart             │
//! │     ├── payment label not blank ────────────────► MissingPaymentMethod  │
//! │     ├── payment label length ───────────────────► Validation            │
//! │     └── register open ──────────────────────────► SessionNotOpen        │
//! │                                                                         │
//! │  2. Stock decrement (all lines checked, then all applied)               │
//! │     └── any line over live stock ───────────────► StockExceeded         │
//! │                                                                         │
//! │  ═══════════════════════ commit point ═══════════════════════           │
//! │                                                                         │
//! │  3. Sale snapshot ──► ledger append ──► register.record_sale(total)     │
//! │     (cannot fail: the register was checked open in step 1)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is left as-is; the caller clears it after showing the receipt.

use chrono::Utc;
use uuid::Uuid;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::ledger::SalesLedger;
use crate::session::CashRegister;
use crate::types::{Sale, SaleStatus};
use crate::validation::validate_payment_label;

/// Borrows the long-lived stores a checkout mutates.
pub struct Checkout<'a> {
    catalog: &'a mut Catalog,
    ledger: &'a mut SalesLedger,
    register: &'a mut CashRegister,
}

impl<'a> Checkout<'a> {
    pub fn new(
        catalog: &'a mut Catalog,
        ledger: &'a mut SalesLedger,
        register: &'a mut CashRegister,
    ) -> Self {
        Checkout {
            catalog,
            ledger,
            register,
        }
    }

    /// Commits `cart` as a completed sale paid with `payment_method`.
    ///
    /// On any error nothing has changed: no stock moved, no sale appended,
    /// session total untouched.
    pub fn process(
        self,
        cart: &Cart,
        payment_method: &str,
        client_id: Option<&str>,
    ) -> CoreResult<Sale> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return Err(CoreError::MissingPaymentMethod);
        }
        validate_payment_label(payment_method)?;

        if !self.register.is_open() {
            return Err(CoreError::SessionNotOpen);
        }

        let decrements: Vec<(&str, i64)> = cart
            .lines()
            .iter()
            .map(|line| (line.id(), line.quantity))
            .collect();
        self.catalog.apply_stock_decrements(&decrements)?;

        let totals = cart.totals();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            number: 0,
            date: Utc::now(),
            client_id: client_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            payment_method: payment_method.to_string(),
            lines: cart.lines().to_vec(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            status: SaleStatus::Completed,
        };

        let sale = self.ledger.append(sale).clone();
        self.register.record_sale(sale.total)?;

        Ok(sale)
    }
}
