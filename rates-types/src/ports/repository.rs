//! Rate store port trait.
//!
//! The Postgres and SQLite adapters implement this trait. The cache only
//! writes fresh API rates and reads recent ones back as a fallback source.

use chrono::{DateTime, Utc};

use crate::domain::{NewRateRecord, PersistedRateRecord};
use crate::error::RepoError;

/// Persistence port for rate records.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Inserts a batch of rate records. The store stamps `created_at`.
    async fn insert_rate_records(&self, records: &[NewRateRecord]) -> Result<(), RepoError>;

    /// Returns records created at or after `since`, newest first.
    async fn query_recent_rate_records(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<PersistedRateRecord>, RepoError>;
}
