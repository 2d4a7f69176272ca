//! # Rates Hex
//!
//! Application service layer and HTTP adapter for the exchange-rate cache.
//!
//! ## Architecture
//!
//! - `service/` - The rate cache (three-tier refresh chain, lookup, conversion)
//! - `events/` - Default sink for refresh outcomes
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The cache is generic over `A: RateApi` and `S: RateStore`, allowing
//! different adapters to be injected.

pub mod events;
pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use events::TracingSink;
pub use service::{CacheConfig, DEFAULT_TTL_SECS, ExchangeRateCache};
