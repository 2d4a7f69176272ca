//! Persisted rate records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::rate::{RateEntry, is_usable_rate};
use crate::CurrencyCode;

/// A rate row as read back from the store.
///
/// Currency codes are kept as stored; rows naming a currency this build does
/// not know are skipped by [`PersistedRateRecord::to_entry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRateRecord {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub created_at: DateTime<Utc>,
}

impl PersistedRateRecord {
    /// Converts to a cache entry when both codes are known and the rate is usable.
    pub fn to_entry(&self) -> Option<RateEntry> {
        let from: CurrencyCode = self.from_currency.parse().ok()?;
        let to: CurrencyCode = self.to_currency.parse().ok()?;
        if from == to || !is_usable_rate(self.rate) {
            return None;
        }
        Some(RateEntry::new(from, to, self.rate))
    }
}

/// A rate row to be written after a successful API refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRateRecord {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    /// Business date the rate applies to.
    pub date: NaiveDate,
}

impl NewRateRecord {
    pub fn from_entry(entry: &RateEntry, date: NaiveDate) -> Self {
        Self {
            from_currency: entry.from.code().to_string(),
            to_currency: entry.to.code().to_string(),
            rate: entry.rate,
            date,
        }
    }
}
