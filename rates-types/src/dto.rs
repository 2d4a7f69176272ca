//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::CurrencyCode;

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query string for amount conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct ConvertQuery {
    /// Amount in `from` currency (major units, may be negative or fractional)
    #[schema(example = 100.0)]
    pub amount: f64,
    /// Source currency code
    #[schema(example = "USD")]
    pub from: String,
    /// Target currency code; defaults to the base currency (AED)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "AED")]
    pub to: Option<String>,
}

/// Result of converting an amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    #[schema(example = 100.0)]
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    #[schema(example = 3.67)]
    pub rate: f64,
    #[schema(example = 367.0)]
    pub converted: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A single resolved rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateResponse {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    #[schema(example = 3.67)]
    pub rate: f64,
}

/// Response after a forced refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    #[schema(example = 6)]
    pub rates_count: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub source: Option<crate::RateSource>,
}

/// Metadata for a supported currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    #[schema(example = "$")]
    pub symbol: String,
    #[schema(example = "US Dollar")]
    pub name: String,
    /// Whether this is the base currency
    pub base: bool,
}

impl From<CurrencyCode> for CurrencyInfo {
    fn from(code: CurrencyCode) -> Self {
        Self {
            code,
            symbol: code.symbol().to_string(),
            name: code.name().to_string(),
            base: code.is_base(),
        }
    }
}
