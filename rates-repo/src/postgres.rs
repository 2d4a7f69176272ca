//! PostgreSQL rate store adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rates_types::{NewRateRecord, PersistedRateRecord, RateStore, RepoError};

use crate::types::DbRateRecord;

/// PostgreSQL rate store.
pub struct PostgresRateStore {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl PostgresRateStore {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        execute_migration(
            &pool,
            include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
            "0001",
        )
        .await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RateStore for PostgresRateStore {
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn insert_rate_records(&self, records: &[NewRateRecord]) -> Result<(), RepoError> {
        if records.is_empty() {
            return Ok(());
        }

        let created_at = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        for record in records {
            sqlx::query(
                r#"INSERT INTO exchange_rates (id, from_currency, to_currency, rate, date, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6)"#,
            )
            .bind(Uuid::new_v4())
            .bind(&record.from_currency)
            .bind(&record.to_currency)
            .bind(record.rate)
            .bind(record.date)
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }

    async fn query_recent_rate_records(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<PersistedRateRecord>, RepoError> {
        let rows: Vec<DbRateRecord> = sqlx::query_as(
            r#"SELECT from_currency, to_currency, rate, created_at
               FROM exchange_rates
               WHERE created_at >= $1
               ORDER BY created_at DESC"#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.into_domain()).collect()
    }
}
