//! # State Repository
//!
//! Key-value access to the `kv_state` table. Values are JSON documents; the
//! repository never looks inside them beyond (de)serialization.
//!
//! ## Snapshot Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save_snapshot(&state)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Serialize every field (nothing written yet)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. BEGIN                                                              │
//! │     ├── Some(v) ──► INSERT ... ON CONFLICT(key) DO UPDATE              │
//! │     └── None    ──► DELETE FROM kv_state WHERE key = ?                 │
//! │     COMMIT                                                             │
//! │                                                                         │
//! │  A sale and its stock decrement land together or not at all.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{keys, PersistedState};

/// Repository for key-value state.
#[derive(Debug, Clone)]
pub struct StateRepository {
    pool: SqlitePool,
}

impl StateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StateRepository { pool }
    }

    /// Loads and decodes the value under `key`. `Ok(None)` if absent.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        raw.map(|json| decode(key, &json)).transpose()
    }

    /// Encodes `value` and stores it under `key`, replacing any previous
    /// value.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = encode(key, value)?;
        debug!(key = %key, bytes = json.len(), "Saving state");
        upsert(&self.pool, key, &json).await
    }

    /// Removes `key`. Returns whether anything was stored under it.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM kv_state WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_state ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Loads every known key in one query.
    pub async fn load_snapshot(&self) -> StoreResult<PersistedState> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM kv_state")
            .fetch_all(&self.pool)
            .await?;

        let raw: HashMap<String, String> = rows.into_iter().collect();
        debug!(keys = raw.len(), "Loaded state snapshot");

        Ok(PersistedState {
            session: decode_entry(&raw, keys::SESSION)?,
            settings: decode_entry(&raw, keys::SETTINGS)?,
            payment_methods: decode_entry(&raw, keys::PAYMENT_METHODS)?,
            user: decode_entry(&raw, keys::USER)?,
            products: decode_entry(&raw, keys::PRODUCTS)?,
            categories: decode_entry(&raw, keys::CATEGORIES)?,
            brands: decode_entry(&raw, keys::BRANDS)?,
            clients: decode_entry(&raw, keys::CLIENTS)?,
            sales: decode_entry(&raw, keys::SALES)?,
            session_history: decode_entry(&raw, keys::SESSION_HISTORY)?,
        })
    }

    /// Writes every field of `state` in a single transaction.
    pub async fn save_snapshot(&self, state: &PersistedState) -> StoreResult<()> {
        let entries: [(&str, Option<String>); 10] = [
            (keys::SESSION, encode_entry(keys::SESSION, &state.session)?),
            (keys::SETTINGS, encode_entry(keys::SETTINGS, &state.settings)?),
            (
                keys::PAYMENT_METHODS,
                encode_entry(keys::PAYMENT_METHODS, &state.payment_methods)?,
            ),
            (keys::USER, encode_entry(keys::USER, &state.user)?),
            (keys::PRODUCTS, encode_entry(keys::PRODUCTS, &state.products)?),
            (
                keys::CATEGORIES,
                encode_entry(keys::CATEGORIES, &state.categories)?,
            ),
            (keys::BRANDS, encode_entry(keys::BRANDS, &state.brands)?),
            (keys::CLIENTS, encode_entry(keys::CLIENTS, &state.clients)?),
            (keys::SALES, encode_entry(keys::SALES, &state.sales)?),
            (
                keys::SESSION_HISTORY,
                encode_entry(keys::SESSION_HISTORY, &state.session_history)?,
            ),
        ];

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for (key, value) in &entries {
            match value {
                Some(json) => upsert(&mut *tx, key, json).await?,
                None => {
                    sqlx::query("DELETE FROM kv_state WHERE key = ?1")
                        .bind(*key)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        debug!("Saved state snapshot");
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn upsert<'e, E>(executor: E, key: &str, json: &str) -> StoreResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO kv_state (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(json)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::serialization(key, e))
}

fn decode<T: DeserializeOwned>(key: &str, json: &str) -> StoreResult<T> {
    serde_json::from_str(json).map_err(|e| StoreError::serialization(key, e))
}

fn encode_entry<T: Serialize>(key: &str, value: &Option<T>) -> StoreResult<Option<String>> {
    value.as_ref().map(|v| encode(key, v)).transpose()
}

fn decode_entry<T: DeserializeOwned>(
    raw: &HashMap<String, String>,
    key: &str,
) -> StoreResult<Option<T>> {
    raw.get(key).map(|json| decode(key, json)).transpose()
}

// =============================================================================
// Tests
// =============================================================================
