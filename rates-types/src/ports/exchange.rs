//! Live exchange rate API port.
//!
//! This trait defines the interface for the external rate feed.
//! Implementations can be HTTP clients, mock providers, etc.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CurrencyCode;
use crate::error::SourceError;

/// Rates from one base currency to every other currency the feed knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRates {
    pub base: String,
    /// Business date reported by the feed, when present.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Currency code -> units of that currency per one unit of `base`.
    pub rates: HashMap<String, f64>,
}

/// Port trait for the live rate API.
#[async_trait::async_trait]
pub trait RateApi: Send + Sync + 'static {
    /// Fetches the latest rates relative to `base` with a single request.
    async fn fetch_latest(&self, base: CurrencyCode) -> Result<ApiRates, SourceError>;
}
