//! HTTP adapter for the live exchange rate feed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use rates_types::{ApiRates, CurrencyCode, RateApi, SourceError};

/// Public endpoint serving `/{BASE}` documents.
pub const DEFAULT_RATES_API_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response body of `GET {base_url}/{BASE}`.
///
/// Every field is optional so a document without `rates` is reported as
/// malformed rather than as a decoding failure.
#[derive(Debug, Deserialize)]
struct LatestRatesBody {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// `RateApi` implementation backed by reqwest.
pub struct ExchangeRateApiClient {
    base_url: String,
    http: Client,
}

impl ExchangeRateApiClient {
    /// Creates a client for the given endpoint with the default timeout.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests fail after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RateApi for ExchangeRateApiClient {
    #[tracing::instrument(skip(self), fields(url = %self.base_url))]
    async fn fetch_latest(&self, base: CurrencyCode) -> Result<ApiRates, SourceError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, base.code()))
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: LatestRatesBody = resp
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        let rates = body
            .rates
            .ok_or_else(|| SourceError::Malformed("missing `rates` object".into()))?;

        // The feed's date is informational; an unparseable one is dropped.
        let date = body
            .date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

        Ok(ApiRates {
            base: body.base.unwrap_or_default(),
            date,
            rates,
        })
    }
}
