//! SQLite-backed lead repository.
//!
//! Leads live in this store but belong to the CRM flow; the pipeline only
//! reads their status and marks them won after a successful order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use orderbridge_core::LeadRepository;
use orderbridge_domain::{LeadStatus, OrderBridgeError, Result};
use rusqlite::{params, OptionalExtension};
use tokio::task;
use tracing::warn;

use super::{map_join_error, map_sql_error, to_epoch, DbManager};

/// SQLite lead repository.
pub struct SqliteLeadRepository {
    db: Arc<DbManager>,
}

impl SqliteLeadRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeadRepository for SqliteLeadRepository {
    async fn status(&self, company_id: i64, lead_ref: i64) -> Result<Option<LeadStatus>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<LeadStatus>> {
            let conn = db.get_connection()?;
            let raw: Option<String> = conn
                .query_row(
                    "SELECT status FROM leads WHERE lead_ref = ?1 AND company_id = ?2",
                    params![lead_ref, company_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sql_error)?;

            Ok(raw.map(|raw| match LeadStatus::parse(&raw) {
                Some(status) => status,
                None => {
                    warn!(lead_ref, raw_status = %raw, "invalid lead status in storage, treating as in progress");
                    LeadStatus::InProgress
                }
            }))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_won(&self, company_id: i64, lead_ref: i64) -> Result<()> {
        let db = Arc::clone(&self.db);
        let now = to_epoch(Utc::now());

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE leads SET status = 'won', updated_at = ?1
                     WHERE lead_ref = ?2 AND company_id = ?3",
                    params![now, lead_ref, company_id],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(OrderBridgeError::NotFound(format!(
                    "lead {lead_ref} not found in company {company_id}"
                )));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
