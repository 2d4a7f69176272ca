//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The rate cache depends on these traits, not concrete implementations.

mod exchange;
mod observe;
mod repository;

pub use exchange::{ApiRates, RateApi};
pub use observe::{Clock, EventSink, SystemClock};
pub use repository::RateStore;
