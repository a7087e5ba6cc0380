//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! The pool inside `Database` is thread-safe; no extra locking here.

use till_store::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// db_state.inner().state().save_snapshot(&snapshot).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
