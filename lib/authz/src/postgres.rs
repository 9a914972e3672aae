//! Postgres-backed allow-list.

use crate::error::AuthzError;
use crate::store::AllowListStore;
use crate::types::AdminRecord;
use async_trait::async_trait;
use rootcause::prelude::Report;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

/// Row type for allow-list queries.
#[derive(FromRow)]
struct AdminRow {
    id: String,
    email: String,
}

impl From<AdminRow> for AdminRecord {
    fn from(row: AdminRow) -> Self {
        AdminRecord::new(row.id, row.email)
    }
}

/// Allow-list stored in the `admins` table.
///
/// The table is owned elsewhere; this client only reads it.
#[derive(Clone)]
pub struct PgAllowList {
    pool: PgPool,
}

impl PgAllowList {
    /// Creates an allow-list client over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and creates an allow-list client.
    pub async fn connect(database_url: &str) -> Result<Self, Report<AuthzError>> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await
            .map_err(|e| AuthzError::ConnectionFailed {
                details: e.to_string(),
            })?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl AllowListStore for PgAllowList {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, Report<AuthzError>> {
        let row: Option<AdminRow> = sqlx::query_as(
            r#"
            SELECT id::text AS id, email
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthzError::QueryFailed {
            email: email.to_string(),
            details: e.to_string(),
        })?;

        debug!(found = row.is_some(), "allow-list lookup result");
        Ok(row.map(AdminRecord::from))
    }
}
