//! SQLite-backed authorization gate.
//!
//! Resolves a user's role and seller linkage into a `UserAccess` context.
//! Managers (seller kind `G`) additionally resolve the user ids of the
//! sellers they manage, which the read paths compile into a team predicate.

use std::sync::Arc;

use async_trait::async_trait;
use orderbridge_core::AccessGate;
use orderbridge_domain::{OrderBridgeError, Result, UserAccess};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::{map_join_error, map_sql_error, DbManager};

const ADMIN_ROLES: &[&str] = &["Administrador", "ADMIN"];

/// SQLite access repository.
pub struct SqliteAccessRepository {
    db: Arc<DbManager>,
}

impl SqliteAccessRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn resolve(conn: &Connection, user_id: i64, company_id: i64) -> Result<UserAccess> {
        let row = conn
            .query_row(
                "SELECT role, seller_code FROM sales_users
                 WHERE user_id = ?1 AND company_id = ?2",
                params![user_id, company_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()
            .map_err(map_sql_error)?;

        let Some((role, seller_code)) = row else {
            return Err(OrderBridgeError::NotFound(format!(
                "user {user_id} not found in company {company_id}"
            )));
        };

        let is_admin = ADMIN_ROLES.contains(&role.as_str());
        let team_user_ids = match (is_admin, seller_code) {
            (false, Some(code)) => Self::team_for_seller(conn, company_id, user_id, code)?,
            _ => vec![user_id],
        };

        Ok(UserAccess { user_id, company_id, role, seller_code, is_admin, team_user_ids })
    }

    /// For managers, the team is the set of users linked to active sellers
    /// under this manager code, plus the manager themselves. Plain sellers
    /// get a singleton team.
    fn team_for_seller(
        conn: &Connection,
        company_id: i64,
        user_id: i64,
        seller_code: i64,
    ) -> Result<Vec<i64>> {
        let kind: Option<String> = conn
            .query_row(
                "SELECT kind FROM sellers WHERE seller_code = ?1 AND company_id = ?2 AND active = 1",
                params![seller_code, company_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)?;

        if kind.as_deref() != Some("G") {
            return Ok(vec![user_id]);
        }

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT u.user_id FROM sales_users u
                 JOIN sellers s ON s.seller_code = u.seller_code AND s.company_id = u.company_id
                 WHERE u.company_id = ?1 AND s.active = 1
                   AND (s.manager_code = ?2 OR s.seller_code = ?2)",
            )
            .map_err(map_sql_error)?;
        let mut team = stmt
            .query_map(params![company_id, seller_code], |row| row.get::<_, i64>(0))
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        if !team.contains(&user_id) {
            team.push(user_id);
        }
        Ok(team)
    }
}

#[async_trait]
impl AccessGate for SqliteAccessRepository {
    async fn user_access(&self, user_id: i64, company_id: i64) -> Result<UserAccess> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<UserAccess> {
            let conn = db.get_connection()?;
            Self::resolve(&conn, user_id, company_id)
        })
        .await
        .map_err(map_join_error)?
    }
}
