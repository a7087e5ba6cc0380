//! # till-core: Sales & Cash-Register Transaction Engine
//!
//! Pure business logic for the Till point of sale. No I/O, no logging, no
//! async: every operation is a synchronous state transition that returns a
//! [`CoreResult`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Architecture                           │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │                  apps/terminal (register console)                 │  │
//! │  └─────────────────────────────────┬─────────────────────────────────┘  │
//! │                                    │                                    │
//! │  ┌─────────────────────────────────▼─────────────────────────────────┐  │
//! │  │                     till-core (THIS CRATE)                        │  │
//! │  │                                                                   │  │
//! │  │  catalog ──► pricing ──► cart ──► checkout ──┬──► ledger          │  │
//! │  │     ▲                                        │                    │  │
//! │  │     └────────────── stock decrement ─────────┤                    │  │
//! │  │                                              └──► session         │  │
//! │  │                                                                   │  │
//! │  │  report ◄── ledger, catalog (read-only)                           │  │
//! │  └─────────────────────────────────┬─────────────────────────────────┘  │
//! │                                    │                                    │
//! │  ┌─────────────────────────────────▼─────────────────────────────────┐  │
//! │  │                till-store (SQLite key-value blobs)                │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! [`Catalog`], [`SalesLedger`] and [`CashRegister`] are long-lived and owned
//! by the application context. A [`Cart`] lives for one checkout flow and
//! borrows the catalog only when it needs live stock. [`Checkout`] borrows
//! all three stores mutably for the duration of one commit.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod report;
pub mod session;
pub mod types;
pub mod validation;

pub use cart::{AddOutcome, Cart, CartTotals, ScanOutcome};
pub use catalog::Catalog;
pub use checkout::Checkout;
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{SaleFilter, SalesLedger};
pub use money::Money;
pub use session::{CashRegister, SessionClosure};
pub use types::*;

/// Client name shown when a sale has no client attached.
pub const DEFAULT_CLIENT_NAME: &str = "Consumidor Final";

/// Maximum number of distinct lines in one cart.
pub const MAX_CART_LINES: usize = 100;
