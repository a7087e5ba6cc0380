//! # Persistence Glue
//!
//! Loads the register at startup and writes it back after each committed
//! transition.
//!
//! ```text
//! startup:   load_snapshot ──► (no catalog? seed demo) ──► Register
//! commit:    lock ─► mutate ─► snapshot ─► unlock ─► save_snapshot
//! ```
//!
//! The save happens outside the register lock. A failed save leaves the
//! in-memory state committed and is reported as a database error.

use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState, Register, RegisterState};
use till_store::demo::demo_state;
use till_store::{Database, PersistedState};

/// Loads persisted state, seeding the demo catalog into an empty database
/// when the configuration asks for it. Settings are not seeded; until the
/// operator saves some, they come from the configuration.
pub async fn load_register(db: &Database, config: &ConfigState) -> ApiResult<Register> {
    let mut state = db.state().load_snapshot().await?;

    if !state.has_catalog() && config.seed_demo {
        let demo = demo_state();
        state = PersistedState {
            payment_methods: demo.payment_methods,
            user: state.user.or(demo.user),
            products: demo.products,
            categories: demo.categories,
            brands: demo.brands,
            clients: demo.clients,
            ..state
        };
        db.state().save_snapshot(&state).await?;
        info!("Seeded demo catalog");
    }

    let register = Register::from_persisted(state, config)?;
    info!(
        products = register.catalog.products().len(),
        sales = register.ledger.len(),
        session_open = register.cash.is_open(),
        "Register loaded"
    );
    Ok(register)
}

/// Writes the current register state.
pub async fn save(register: &RegisterState, db: &DbState) -> ApiResult<()> {
    let snapshot = register.with_register(Register::snapshot);
    save_snapshot(db, &snapshot).await
}

/// Writes an already-taken snapshot.
pub async fn save_snapshot(db: &DbState, snapshot: &PersistedState) -> ApiResult<()> {
    db.inner()
        .state()
        .save_snapshot(snapshot)
        .await
        .map_err(|e| {
            warn!("Committed state was not persisted");
            ApiError::from(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::Money;
    use till_store::DbConfig;

    async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_database_gets_demo_catalog() {
        let db = memory_db().await;
        let register = load_register(&db, &ConfigState::default()).await.unwrap();

        assert_eq!(register.catalog.products().len(), 4);
        assert!(db.state().load_snapshot().await.unwrap().has_catalog());
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let db = memory_db().await;
        let config = ConfigState {
            seed_demo: false,
            ..ConfigState::default()
        };
        let register = load_register(&db, &config).await.unwrap();

        assert!(register.catalog.products().is_empty());
        assert!(!db.state().load_snapshot().await.unwrap().has_catalog());
    }

    #[tokio::test]
    async fn test_save_then_reload() {
        let db = memory_db().await;
        let config = ConfigState::default();
        let state = RegisterState::new(load_register(&db, &config).await.unwrap());
        let db_state = DbState::new(db.clone());

        state
            .with_register_mut(|r| r.cash.open(Money::from_major(50), None).map(|_| ()))
            .unwrap();
        save(&state, &db_state).await.unwrap();

        let reloaded = load_register(&db, &config).await.unwrap();
        assert!(reloaded.cash.is_open());
        assert_eq!(
            reloaded.cash.current().unwrap().initial_amount,
            Money::from_major(50)
        );
    }
}
