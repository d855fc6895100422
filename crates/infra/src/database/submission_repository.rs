//! SQLite-backed implementation of the submission outbox port.
//!
//! One row per logical submission. The insert happens before any gateway
//! call; all later mutations settle the same row in place. The attempt
//! counter is incremented in SQL so concurrent retries cannot lose updates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use orderbridge_core::SubmissionOutbox;
use orderbridge_domain::{
    FailureCode, OrderBridgeError, OrderPayload, Result, SubmissionFailure, SubmissionFilter,
    SubmissionOrigin, SubmissionRecord, SubmissionStatus, SubmissionSummary, Visibility,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, ToSql};
use tokio::task;
use tracing::warn;

use super::{from_epoch, map_join_error, map_sql_error, to_epoch, DbManager};

/// SQLite submission outbox repository.
pub struct SqliteSubmissionRepository {
    db: Arc<DbManager>,
}

impl SqliteSubmissionRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_record(conn: &Connection, record: &SubmissionRecord) -> Result<()> {
        let payload_json = serde_json::to_string(&record.payload)
            .map_err(|e| OrderBridgeError::Persistence(format!("payload encode failed: {e}")))?;
        let (error_code, error_message, error_at) = match &record.error {
            Some(failure) => (
                Some(failure.code.to_string()),
                Some(failure.message.clone()),
                Some(to_epoch(failure.occurred_at)),
            ),
            None => (None, None, None),
        };

        conn.execute(
            SUBMISSION_INSERT_SQL,
            params![
                record.id,
                record.company_id,
                record.origin.to_string(),
                record.lead_ref,
                payload_json,
                record.idempotency_key,
                record.status.to_string(),
                record.order_ref,
                error_code,
                error_message,
                error_at,
                record.attempt_count,
                record.created_by,
                record.created_by_name,
                to_epoch(record.created_at),
                to_epoch(record.last_attempt_at),
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionOutbox for SqliteSubmissionRepository {
    async fn insert(&self, record: &SubmissionRecord) -> Result<()> {
        let db = Arc::clone(&self.db);
        let to_insert = record.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            Self::insert_record(&conn, &to_insert)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_succeeded(&self, id: &str, order_ref: i64) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE order_submissions
                     SET status = 'succeeded', order_ref = ?1,
                         error_code = NULL, error_message = NULL, error_at = NULL,
                         last_attempt_at = ?2
                     WHERE id = ?3",
                    params![order_ref, now, id],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!("submission {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_failed(&self, id: &str, failure: &SubmissionFailure) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let code = failure.code.to_string();
        let message = failure.message.clone();
        let occurred_at = to_epoch(failure.occurred_at);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE order_submissions
                     SET status = 'failed', order_ref = NULL,
                         error_code = ?1, error_message = ?2, error_at = ?3,
                         last_attempt_at = ?3
                     WHERE id = ?4",
                    params![code, message, occurred_at, id],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!("submission {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record_attempt(&self, id: &str) -> Result<u32> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<u32> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE order_submissions
                     SET attempt_count = attempt_count + 1, last_attempt_at = ?1
                     WHERE id = ?2",
                    params![now, id],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!("submission {id} not found")));
            }
            conn.query_row(
                "SELECT attempt_count FROM order_submissions WHERE id = ?1",
                params![id],
                |row| row.get::<_, u32>(0),
            )
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<Option<SubmissionRecord>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!("{SUBMISSION_SELECT_SQL} WHERE id = ?1"))
                .map_err(map_sql_error)?;
            let mut rows = stmt
                .query_map(params![id], map_submission_row)
                .map_err(map_sql_error)?;
            match rows.next() {
                Some(row) => Ok(Some(row.map_err(map_sql_error)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list(
        &self,
        company_id: i64,
        filter: &SubmissionFilter,
        visibility: &Visibility,
    ) -> Result<Vec<SubmissionRecord>> {
        let db = Arc::clone(&self.db);
        let filter = *filter;
        let visibility = visibility.clone();

        task::spawn_blocking(move || -> Result<Vec<SubmissionRecord>> {
            let conn = db.get_connection()?;

            let mut sql = format!("{SUBMISSION_SELECT_SQL} WHERE company_id = ?");
            let mut binds: Vec<Box<dyn ToSql>> = vec![Box::new(company_id)];

            if let Some(origin) = filter.origin {
                sql.push_str(" AND origin = ?");
                binds.push(Box::new(origin.to_string()));
            }
            if let Some(status) = filter.status {
                sql.push_str(" AND status = ?");
                binds.push(Box::new(status.to_string()));
            }
            if let Some(lead_ref) = filter.lead_ref {
                sql.push_str(" AND lead_ref = ?");
                binds.push(Box::new(lead_ref));
            }
            append_visibility_clause(&mut sql, &mut binds, &visibility);
            sql.push_str(" ORDER BY created_at DESC");

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(binds.iter()), map_submission_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn summary(&self, company_id: i64, visibility: &Visibility) -> Result<SubmissionSummary> {
        let db = Arc::clone(&self.db);
        let visibility = visibility.clone();

        task::spawn_blocking(move || -> Result<SubmissionSummary> {
            let conn = db.get_connection()?;

            let mut sql =
                String::from("SELECT status, COUNT(*) FROM order_submissions WHERE company_id = ?");
            let mut binds: Vec<Box<dyn ToSql>> = vec![Box::new(company_id)];
            append_visibility_clause(&mut sql, &mut binds, &visibility);
            sql.push_str(" GROUP BY status");

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(binds.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
                })
                .map_err(map_sql_error)?;

            let mut summary = SubmissionSummary::default();
            for row in rows {
                let (status, count) = row.map_err(map_sql_error)?;
                match status.parse::<SubmissionStatus>() {
                    Ok(SubmissionStatus::Failed) => summary.failed_count = count,
                    Ok(SubmissionStatus::Succeeded) => summary.succeeded_count = count,
                    Err(err) => warn!(raw_status = %status, error = %err, "skipping unknown status in summary"),
                }
            }
            Ok(summary)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Compile a visibility tier into a parameterized predicate. Values always
/// travel as binds; an empty team compiles to an always-false clause.
fn append_visibility_clause(sql: &mut String, binds: &mut Vec<Box<dyn ToSql>>, visibility: &Visibility) {
    match visibility {
        Visibility::Unrestricted => {}
        Visibility::OwnedBy(user_id) => {
            sql.push_str(" AND created_by = ?");
            binds.push(Box::new(*user_id));
        }
        Visibility::TeamOf(user_ids) if user_ids.is_empty() => {
            sql.push_str(" AND 1 = 0");
        }
        Visibility::TeamOf(user_ids) => {
            let placeholders = vec!["?"; user_ids.len()].join(", ");
            sql.push_str(&format!(" AND created_by IN ({placeholders})"));
            for user_id in user_ids {
                binds.push(Box::new(*user_id));
            }
        }
    }
}

const SUBMISSION_INSERT_SQL: &str = "INSERT INTO order_submissions (
        id, company_id, origin, lead_ref, payload_json, idempotency_key, status, order_ref,
        error_code, error_message, error_at, attempt_count, created_by, created_by_name,
        created_at, last_attempt_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
    )";

const SUBMISSION_SELECT_SQL: &str = "SELECT
        id, company_id, origin, lead_ref, payload_json, idempotency_key, status, order_ref,
        error_code, error_message, error_at, attempt_count, created_by, created_by_name,
        created_at, last_attempt_at
    FROM order_submissions";

fn map_submission_row(row: &Row<'_>) -> rusqlite::Result<SubmissionRecord> {
    let id: String = row.get(0)?;
    let origin_raw: String = row.get(2)?;
    let payload_json: String = row.get(4)?;
    let status_raw: String = row.get(6)?;

    let payload: OrderPayload = serde_json::from_str(&payload_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    let error = read_failure(row, &id)?;

    Ok(SubmissionRecord {
        origin: parse_origin(&id, &origin_raw),
        status: parse_status(&id, &status_raw),
        id,
        company_id: row.get(1)?,
        lead_ref: row.get(3)?,
        payload,
        idempotency_key: row.get(5)?,
        order_ref: row.get(7)?,
        error,
        attempt_count: row.get(11)?,
        created_by: row.get(12)?,
        created_by_name: row.get(13)?,
        created_at: from_epoch(row.get(14)?),
        last_attempt_at: from_epoch(row.get(15)?),
    })
}

fn read_failure(row: &Row<'_>, id: &str) -> rusqlite::Result<Option<SubmissionFailure>> {
    let code_raw: Option<String> = row.get(8)?;
    let message: Option<String> = row.get(9)?;
    let occurred_at: Option<i64> = row.get(10)?;

    let Some(code_raw) = code_raw else { return Ok(None) };
    let code = match code_raw.parse::<FailureCode>() {
        Ok(code) => code,
        Err(err) => {
            warn!(submission_id = %id, raw_code = %code_raw, error = %err, "invalid failure code in storage, defaulting to transient");
            FailureCode::GatewayTransient
        }
    };

    Ok(Some(SubmissionFailure {
        code,
        message: message.unwrap_or_default(),
        occurred_at: from_epoch(occurred_at.unwrap_or_default()),
    }))
}

fn parse_origin(id: &str, raw: &str) -> SubmissionOrigin {
    match raw.parse::<SubmissionOrigin>() {
        Ok(origin) => origin,
        Err(err) => {
            warn!(submission_id = %id, raw_origin = %raw, error = %err, "invalid origin in storage, defaulting to quick");
            SubmissionOrigin::Quick
        }
    }
}

fn parse_status(id: &str, raw: &str) -> SubmissionStatus {
    match raw.parse::<SubmissionStatus>() {
        Ok(status) => status,
        Err(err) => {
            warn!(submission_id = %id, raw_status = %raw, error = %err, "invalid status in storage, defaulting to failed");
            SubmissionStatus::Failed
        }
    }
}
