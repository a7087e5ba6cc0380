//! # Commands Module
//!
//! Every operation the console can run against the register.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports, shared helpers)
//! ├── product.rs  ◄─── Catalog lookup and search
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── sale.rs     ◄─── Checkout and the sales ledger
//! ├── session.rs  ◄─── Cash register open / close
//! ├── report.rs   ◄─── Rollups, inventory, dashboard totals
//! └── config.rs   ◄─── Configuration and company settings
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  > pay Efectivo                                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  console::Command::Pay { method: ["Efectivo"], client: None }           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  fn checkout(                                                           │
//! │      register: &RegisterState,  ◄── Declares only the state it needs   │
//! │      payment_method: &str,                                              │
//! │  ) -> Result<ReceiptResponse, ApiError>                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  persist::save()  ◄── Console saves after committing commands          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are synchronous. None of them touch the database; the console
//! writes a snapshot after any command that commits.

pub mod cart;
pub mod config;
pub mod product;
pub mod report;
pub mod sale;
pub mod session;

use tracing::warn;

use crate::error::ApiError;
use till_core::{Catalog, CoreError, Product};

/// Converts a rejected engine operation to an API error, logging it.
pub(crate) fn rejected(err: CoreError) -> ApiError {
    warn!(error = %err, "Operation rejected");
    ApiError::from(err)
}

/// Finds a product by exact code, falling back to id.
pub(crate) fn lookup_product<'a>(catalog: &'a Catalog, code_or_id: &str) -> Option<&'a Product> {
    let key = code_or_id.trim();
    catalog.find_by_code(key).or_else(|| catalog.get(key))
}
