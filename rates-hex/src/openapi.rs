//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::{
    CacheStatus, ConvertQuery, ConvertResponse, CurrencyCode, CurrencyInfo, RateEntry,
    RateResponse, RateSource, RefreshResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List supported currencies
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Supported currencies, base first", body = Vec<CurrencyInfo>)
    )
)]
async fn list_currencies() {}

/// Get the conversion rate for a currency pair
///
/// Refreshes the cache first when it is stale.
#[utoipa::path(
    get,
    path = "/api/rates/{from}/{to}",
    tag = "rates",
    params(
        ("from" = String, Path, description = "Source currency code", example = "USD"),
        ("to" = String, Path, description = "Target currency code", example = "AED")
    ),
    responses(
        (status = 200, description = "Resolved rate", body = RateResponse),
        (status = 400, description = "Unknown currency code")
    )
)]
async fn get_rate() {}

/// Convert an amount between currencies
///
/// Refreshes the cache first when it is stale.
#[utoipa::path(
    get,
    path = "/api/convert",
    tag = "rates",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConvertResponse),
        (status = 400, description = "Unknown currency code or invalid amount")
    )
)]
async fn convert() {}

/// Convert an amount from the current cache contents only
///
/// Never performs I/O; answers from the hardcoded table when the cache is empty.
#[utoipa::path(
    get,
    path = "/api/convert/cached",
    tag = "rates",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount", body = ConvertResponse),
        (status = 400, description = "Unknown currency code or invalid amount")
    )
)]
async fn convert_cached() {}

/// Force a refresh of the rate cache
#[utoipa::path(
    post,
    path = "/api/rates/refresh",
    tag = "cache",
    responses(
        (status = 200, description = "Refresh completed", body = RefreshResponse)
    )
)]
async fn refresh() {}

/// Snapshot of the rate cache
#[utoipa::path(
    get,
    path = "/api/rates/status",
    tag = "cache",
    responses(
        (status = 200, description = "Cache contents and refresh state", body = CacheStatus)
    )
)]
async fn cache_status() {}

/// OpenAPI documentation for the Exchange Rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exchange Rate Cache API",
        version = "1.0.0",
        description = "Multi-currency conversion backed by a live rate feed, recently persisted rates, and a hardcoded fallback table.\n\nAll rates are expressed relative to the base currency (AED). Conversions never fail: an unresolvable pair converts at rate 1.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_currencies,
        get_rate,
        convert,
        convert_cached,
        refresh,
        cache_status,
    ),
    components(
        schemas(
            CurrencyCode,
            CurrencyInfo,
            RateEntry,
            RateSource,
            RateResponse,
            ConvertResponse,
            RefreshResponse,
            CacheStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "currencies", description = "Supported currencies"),
        (name = "rates", description = "Rate lookup and amount conversion"),
        (name = "cache", description = "Cache refresh and introspection"),
    )
)]
pub struct ApiDoc;
