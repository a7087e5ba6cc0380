//! # State Module
//!
//! Application state for the terminal register.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Console loop                               │   │
//! │  │  Console::new(register_state, db_state, config_state)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   DbState    │  │RegisterState │  │   ConfigState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Database    │  │  Arc<Mutex<  │  │  store_name      │              │
//! │  │  (SQLite     │  │   Register   │  │  currency        │              │
//! │  │   pool)      │  │  >>          │  │  tax_rate        │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • RegisterState: catalog, ledger, session and cart behind one Mutex   │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog, ledger and cash register share one lock: checkout touches all
//! three and must commit them together.

mod config;
mod db;
mod register;

pub use config::ConfigState;
pub use db::DbState;
pub use register::{Register, RegisterState};
