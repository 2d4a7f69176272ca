//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use rates_hex::DEFAULT_TTL_SECS;
use rates_repo::DEFAULT_RATES_API_URL;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rates_api_url: String,
    pub rates_ttl: Duration,
    pub rates_api_timeout: Duration,
    /// OTLP collector; tracing export and HTTP metrics are off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT").unwrap_or_else(|| "3000".to_string()).parse()?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rates_api_url = var("RATES_API_URL").unwrap_or_else(|| DEFAULT_RATES_API_URL.into());

        let ttl_secs: u64 = match var("RATES_TTL_SECS") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("RATES_TTL_SECS must be whole seconds: {e}"))?,
            None => DEFAULT_TTL_SECS as u64,
        };
        if ttl_secs == 0 {
            anyhow::bail!("RATES_TTL_SECS must be greater than zero");
        }

        let timeout_secs: u64 = match var("RATES_API_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("RATES_API_TIMEOUT_SECS must be whole seconds: {e}"))?,
            None => 10,
        };

        let otlp_endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            port,
            database_url,
            rates_api_url,
            rates_ttl: Duration::from_secs(ttl_secs),
            rates_api_timeout: Duration::from_secs(timeout_secs),
            otlp_endpoint,
        })
    }
}
