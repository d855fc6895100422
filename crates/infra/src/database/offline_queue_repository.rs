//! SQLite-backed device-local offline queue.
//!
//! Writes go through a transaction where a sequence number is assigned, so
//! `seq` stays gapless and monotonic per device even if two captures race.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orderbridge_core::OfflineQueue;
use orderbridge_domain::{
    NewOfflineOrder, OfflineOrderState, OrderBridgeError, OrderPayload, PendingOfflineOrder, Result,
};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio::task;
use tracing::warn;

use super::{from_epoch, map_join_error, map_sql_error, to_epoch, DbManager};

/// SQLite offline queue repository, scoped to one device identity.
pub struct SqliteOfflineQueueRepository {
    db: Arc<DbManager>,
    device_id: String,
}

impl SqliteOfflineQueueRepository {
    /// Construct a queue for the given device identity.
    pub fn new(db: Arc<DbManager>, device_id: impl Into<String>) -> Self {
        Self { db, device_id: device_id.into() }
    }
}

#[async_trait]
impl OfflineQueue for SqliteOfflineQueueRepository {
    async fn enqueue(&self, order: &NewOfflineOrder) -> Result<i64> {
        let db = Arc::clone(&self.db);
        let device_id = self.device_id.clone();
        let company_id = order.company_id;
        let created_by = order.created_by;
        let created_by_name = order.created_by_name.clone();
        let payload_json = serde_json::to_string(&order.payload)
            .map_err(|e| OrderBridgeError::Persistence(format!("payload encode failed: {e}")))?;
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let next_seq: i64 = tx
                .query_row(
                    "SELECT COALESCE(MAX(seq), 0) + 1 FROM offline_orders WHERE device_id = ?1",
                    params![device_id],
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;

            tx.execute(
                "INSERT INTO offline_orders (
                    device_id, seq, company_id, payload_json, state, attempts,
                    created_by, created_by_name, created_at
                ) VALUES (?1, ?2, ?3, ?4, 'queued', 0, ?5, ?6, ?7)",
                params![device_id, next_seq, company_id, payload_json, created_by, created_by_name, now],
            )
            .map_err(map_sql_error)?;
            let id = tx.last_insert_rowid();
            tx.commit().map_err(map_sql_error)?;
            Ok(id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn due_batch(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<PendingOfflineOrder>> {
        let db = Arc::clone(&self.db);
        let device_id = self.device_id.clone();
        let now = to_epoch(now);

        task::spawn_blocking(move || -> Result<Vec<PendingOfflineOrder>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "{OFFLINE_SELECT_SQL}
                     WHERE device_id = ?1 AND state = 'queued'
                       AND (next_attempt_at IS NULL OR next_attempt_at <= ?2)
                     ORDER BY seq ASC LIMIT ?3"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![device_id, now, limit as i64], map_offline_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_syncing(&self, id: i64) -> Result<()> {
        self.set_state(id, "UPDATE offline_orders SET state = 'syncing', updated_at = ?1 WHERE id = ?2")
            .await
    }

    async fn mark_synced(&self, id: i64) -> Result<()> {
        self.set_state(
            id,
            "UPDATE offline_orders
             SET state = 'synced', last_error = NULL, next_attempt_at = NULL, updated_at = ?1
             WHERE id = ?2",
        )
        .await
    }

    async fn mark_failed(
        &self,
        id: i64,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);
        let error = error.to_string();
        let now = to_epoch(Utc::now());
        let (state, next_at) = match next_attempt_at {
            Some(at) => ("queued", Some(to_epoch(at))),
            None => ("failed", None),
        };

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE offline_orders
                     SET state = ?1, attempts = attempts + 1, last_error = ?2,
                         next_attempt_at = ?3, updated_at = ?4
                     WHERE id = ?5",
                    params![state, error, next_at, now, id],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!("offline order {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn bind_submission(&self, id: i64, submission_id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let submission_id = submission_id.to_string();
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE offline_orders SET submission_id = ?1, updated_at = ?2 WHERE id = ?3",
                    params![submission_id, now, id],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!("offline order {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn requeue_stuck(&self, stale_before: DateTime<Utc>) -> Result<u32> {
        let db = Arc::clone(&self.db);
        let device_id = self.device_id.clone();
        let stale_before = to_epoch(stale_before);
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<u32> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE offline_orders
                     SET state = 'queued', updated_at = ?1
                     WHERE device_id = ?2 AND state = 'syncing'
                       AND COALESCE(updated_at, created_at) < ?3",
                    params![now, device_id, stale_before],
                )
                .map_err(map_sql_error)?;
            Ok(affected as u32)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: i64) -> Result<Option<PendingOfflineOrder>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<PendingOfflineOrder>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!("{OFFLINE_SELECT_SQL} WHERE id = ?1"))
                .map_err(map_sql_error)?;
            let mut rows = stmt.query_map(params![id], map_offline_row).map_err(map_sql_error)?;
            match rows.next() {
                Some(row) => Ok(Some(row.map_err(map_sql_error)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_join_error)?
    }
}

impl SqliteOfflineQueueRepository {
    async fn set_state(&self, id: i64, sql: &'static str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn.execute(sql, params![now, id]).map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!("offline order {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

const OFFLINE_SELECT_SQL: &str = "SELECT
        id, seq, device_id, company_id, payload_json, state, submission_id,
        attempts, last_error, next_attempt_at, created_by, created_by_name, created_at
    FROM offline_orders";

fn map_offline_row(row: &Row<'_>) -> rusqlite::Result<PendingOfflineOrder> {
    let id: i64 = row.get(0)?;
    let payload_json: String = row.get(4)?;
    let state_raw: String = row.get(5)?;

    let payload: OrderPayload = serde_json::from_str(&payload_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let state = match state_raw.parse::<OfflineOrderState>() {
        Ok(state) => state,
        Err(err) => {
            warn!(offline_order_id = id, raw_state = %state_raw, error = %err, "invalid state in storage, defaulting to failed");
            OfflineOrderState::Failed
        }
    };

    Ok(PendingOfflineOrder {
        id,
        seq: row.get(1)?,
        device_id: row.get(2)?,
        company_id: row.get(3)?,
        payload,
        state,
        submission_id: row.get(6)?,
        attempts: row.get(7)?,
        last_error: row.get(8)?,
        next_attempt_at: row.get::<_, Option<i64>>(9)?.map(from_epoch),
        created_by: row.get(10)?,
        created_by_name: row.get(11)?,
        created_at: from_epoch(row.get(12)?),
    })
}
