//! Domain models for the exchange-rate cache.

pub mod rate;
pub mod record;
pub mod status;

pub use rate::{RateEntry, RatePair, RateSource, Resolution, is_usable_rate};
pub use record::{NewRateRecord, PersistedRateRecord};
pub use status::{CacheStatus, RateEvent};
