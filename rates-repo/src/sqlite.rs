//! SQLite rate store adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use uuid::Uuid;

use rates_types::{NewRateRecord, PersistedRateRecord, RateStore, RepoError};

use crate::types::{DbRateRecord, sqlite_timestamp};

/// SQLite rate store.
pub struct SqliteRateStore {
    pool: SqlitePool,
}

impl SqliteRateStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the `exchange_rates` table if missing.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }

    /// Writes records with an explicit creation time.
    pub(crate) async fn insert_at(
        &self,
        records: &[NewRateRecord],
        created_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        if records.is_empty() {
            return Ok(());
        }

        let created_at = sqlite_timestamp(created_at);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        for record in records {
            sqlx::query(
                r#"INSERT INTO exchange_rates (id, from_currency, to_currency, rate, date, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.from_currency)
            .bind(&record.to_currency)
            .bind(record.rate)
            .bind(record.date.to_string())
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RateStore for SqliteRateStore {
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn insert_rate_records(&self, records: &[NewRateRecord]) -> Result<(), RepoError> {
        self.insert_at(records, Utc::now()).await
    }

    async fn query_recent_rate_records(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<PersistedRateRecord>, RepoError> {
        let rows: Vec<DbRateRecord> = sqlx::query_as(
            r#"SELECT from_currency, to_currency, rate, created_at
               FROM exchange_rates
               WHERE created_at >= ?
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(sqlite_timestamp(since))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.into_domain()).collect()
    }
}
