//! # Repository Module
//!
//! Database repositories for Till POS.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal command                                                      │
//! │       │                                                                 │
//! │       │  db.state().save(keys::SESSION, &session)                      │
//! │       ▼                                                                 │
//! │  StateRepository                                                       │
//! │  ├── load(&self, key)                                                  │
//! │  ├── save(&self, key, value)                                           │
//! │  ├── remove(&self, key)                                                │
//! │  └── load_snapshot / save_snapshot                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv_state table                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod state;
