//! Cache introspection and refresh events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::rate::{RateEntry, RateSource};

/// Point-in-time snapshot of the rate cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CacheStatus {
    /// Number of directed pairs currently cached
    #[schema(example = 6)]
    pub rates_count: usize,
    /// When the cache was last refreshed; `None` if never
    pub last_update: Option<DateTime<Utc>>,
    /// Whether a refresh is in flight
    pub is_updating: bool,
    /// Tier that supplied the current contents
    pub source: Option<RateSource>,
    /// Cached entries ordered by pair
    pub rates: Vec<RateEntry>,
}

/// Observable outcome of a refresh step.
#[derive(Debug, Clone, PartialEq)]
pub enum RateEvent {
    /// A tier populated the cache with `rates` entries.
    RefreshCompleted { source: RateSource, rates: usize },
    /// A tier could not supply rates; the next tier is tried.
    SourceFailed { source: RateSource, reason: String },
    /// Writing fresh API rates to the store failed. The refresh itself succeeded.
    PersistFailed { reason: String },
    /// A refresh was requested while another one was in flight.
    RefreshSkipped,
}
