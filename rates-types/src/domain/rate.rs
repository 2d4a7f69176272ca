//! Rate domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::CurrencyCode;

/// An ordered currency pair. `(from, to)` and `(to, from)` are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RatePair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl RatePair {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    /// The opposite direction of this pair.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for RatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A directed conversion rate: `amount_in_to = amount_in_from * rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateEntry {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    #[schema(example = 3.67)]
    pub rate: f64,
}

impl RateEntry {
    pub fn new(from: CurrencyCode, to: CurrencyCode, rate: f64) -> Self {
        Self { from, to, rate }
    }

    pub fn pair(&self) -> RatePair {
        RatePair::new(self.from, self.to)
    }
}

/// Outcome of resolving a pair against one or more rate sources.
///
/// The public conversion API still returns a bare number: an unresolved pair
/// is converted at the identity rate at the boundary via [`Resolution::or_identity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Resolved(f64),
    Unresolved,
}

impl Resolution {
    /// Resolved only for finite, strictly positive rates.
    pub fn from_rate(rate: Option<f64>) -> Self {
        match rate {
            Some(r) if is_usable_rate(r) => Resolution::Resolved(r),
            _ => Resolution::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Keeps `self` when resolved, otherwise tries `next`.
    pub fn or_else(self, next: impl FnOnce() -> Resolution) -> Resolution {
        match self {
            Resolution::Resolved(_) => self,
            Resolution::Unresolved => next(),
        }
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            Resolution::Resolved(r) => Some(*r),
            Resolution::Unresolved => None,
        }
    }

    /// The rate, or `1.0` when every source failed.
    pub fn or_identity(&self) -> f64 {
        self.rate().unwrap_or(1.0)
    }
}

/// A rate is usable when it is finite and strictly positive.
pub fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// The tier that last populated the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateSource {
    Api,
    Database,
    Fallback,
}

impl std::fmt::Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RateSource::Api => "api",
            RateSource::Database => "database",
            RateSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}
