//! # till-store: Persistence Boundary for Till POS
//!
//! Stores the register's state in SQLite as JSON documents keyed by name.
//! The engine in `till-core` never sees this crate; the terminal app loads
//! a [`PersistedState`] at startup and saves one after each committed
//! transition.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Data Flow                               │
//! │                                                                         │
//! │  Terminal command (pay Efectivo)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  till-core: Checkout::process ──► Sale                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    till-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐    ┌─────────────┐  │   │
//! │  │   │   Database    │    │ StateRepository │    │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ load / save     │    │ (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ snapshots       │    │ 001_kv.sql  │  │   │
//! │  │   └───────────────┘    └─────────────────┘    └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_store::{keys, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let state = db.state().load_snapshot().await?;
//! db.state().save(keys::SETTINGS, &settings).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod demo;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::state::StateRepository;
pub use snapshot::{keys, PersistedState};
