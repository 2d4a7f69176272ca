//! # Rates Types
//!
//! Domain types and port traits for the exchange-rate cache service.
//! This crate has ZERO external IO dependencies - only data structures,
//! lookup rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (RatePair, RateEntry, PersistedRateRecord)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Source, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CacheStatus, NewRateRecord, PersistedRateRecord, RateEntry, RateEvent, RatePair, RateSource,
    Resolution, is_usable_rate,
};
pub use dto::*;
pub use error::{AppError, RepoError, SourceError};
pub use exchange_rates::{BASE_CURRENCY, CurrencyCode, FallbackTable, UnknownCurrency};
pub use ports::{ApiRates, Clock, EventSink, RateApi, RateStore, SystemClock};
