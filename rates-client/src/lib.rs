//! # Exchange Rates Client SDK
//!
//! A typed Rust client for the Exchange Rates API.

use rates_types::{
    CacheStatus, ConvertQuery, ConvertResponse, CurrencyCode, CurrencyInfo, RateResponse,
    RefreshResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exchange Rates API client.
pub struct ExchangeRatesClient {
    base_url: String,
    http: Client,
}

impl ExchangeRatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Lists supported currencies, base first.
    pub async fn currencies(&self) -> Result<Vec<CurrencyInfo>, ClientError> {
        self.get("/api/currencies", None).await
    }

    /// Gets the rate for a pair. The server refreshes its cache when stale.
    pub async fn rate(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<RateResponse, ClientError> {
        self.get(&format!("/api/rates/{}/{}", from, to), None).await
    }

    /// Converts an amount. `to` defaults to the base currency server-side.
    pub async fn convert(
        &self,
        amount: f64,
        from: CurrencyCode,
        to: Option<CurrencyCode>,
    ) -> Result<ConvertResponse, ClientError> {
        let query = convert_query(amount, from, to);
        self.get("/api/convert", Some(&query)).await
    }

    /// Converts an amount from the server's current cache only.
    pub async fn convert_cached(
        &self,
        amount: f64,
        from: CurrencyCode,
        to: Option<CurrencyCode>,
    ) -> Result<ConvertResponse, ClientError> {
        let query = convert_query(amount, from, to);
        self.get("/api/convert/cached", Some(&query)).await
    }

    /// Forces a cache refresh.
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        self.post("/api/rates/refresh").await
    }

    /// Gets a snapshot of the server's rate cache.
    pub async fn status(&self) -> Result<CacheStatus, ClientError> {
        self.get("/api/rates/status", None).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&ConvertQuery>,
    ) -> Result<T, ClientError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(query) = query {
            req = req.query(query);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn convert_query(amount: f64, from: CurrencyCode, to: Option<CurrencyCode>) -> ConvertQuery {
    ConvertQuery {
        amount,
        from: from.code().to_string(),
        to: to.map(|c| c.code().to_string()),
    }
}
