//! Shared database types with feature-gated fields for SQLite and PostgreSQL.
//!
//! The row layout follows the backend `Repo` delegates to: Postgres wins when
//! both features are enabled.

use sqlx::FromRow;

use rates_types::{PersistedRateRecord, RepoError};

#[cfg(feature = "postgres")]
use chrono::{DateTime, Utc};

/// Timestamp layout written to SQLite. Fixed width, so text order is time order.
#[cfg(feature = "sqlite")]
pub fn sqlite_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Rate row as read back by the recent-records query.
#[derive(FromRow)]
pub struct DbRateRecord {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,

    #[cfg(feature = "postgres")]
    pub created_at: DateTime<Utc>,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub created_at: String,
}

impl DbRateRecord {
    /// Convert database row to a domain record.
    pub fn into_domain(self) -> Result<PersistedRateRecord, RepoError> {
        #[cfg(feature = "postgres")]
        let created_at = self.created_at;

        #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| RepoError::Database(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(PersistedRateRecord {
            from_currency: self.from_currency,
            to_currency: self.to_currency,
            rate: self.rate,
            created_at,
        })
    }
}
