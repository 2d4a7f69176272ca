//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use rates_types::{
    AppError, BASE_CURRENCY, ConvertQuery, ConvertResponse, CurrencyCode, CurrencyInfo, RateApi,
    RateResponse, RateStore, RefreshResponse,
};

use crate::ExchangeRateCache;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<A: RateApi, S: RateStore> {
    pub cache: ExchangeRateCache<A, S>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_currency(code: &str) -> Result<CurrencyCode, ApiError> {
    code.parse::<CurrencyCode>()
        .map_err(|e| ApiError(AppError::from(e)))
}

/// Parses `from` and the optional `to` (defaulting to the base currency).
fn parse_query_pair(query: &ConvertQuery) -> Result<(CurrencyCode, CurrencyCode), ApiError> {
    let from = parse_currency(&query.from)?;
    let to = match &query.to {
        Some(to) => parse_currency(to)?,
        None => BASE_CURRENCY,
    };
    if !query.amount.is_finite() {
        return Err(AppError::BadRequest("Amount must be a finite number".into()).into());
    }
    Ok((from, to))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// List supported currencies.
pub async fn list_currencies<A: RateApi, S: RateStore>(
    State(state): State<Arc<AppState<A, S>>>,
) -> impl IntoResponse {
    let currencies: Vec<CurrencyInfo> = state
        .cache
        .supported_currencies()
        .iter()
        .map(|&c| CurrencyInfo::from(c))
        .collect();
    Json(currencies)
}

/// Get the rate for a currency pair (may refresh the cache).
#[tracing::instrument(skip(state))]
pub async fn get_rate<A: RateApi, S: RateStore>(
    State(state): State<Arc<AppState<A, S>>>,
    Path((from, to)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let from = parse_currency(&from)?;
    let to = parse_currency(&to)?;

    let rate = state.cache.get_rate(from, to).await;
    Ok(Json(RateResponse { from, to, rate }))
}

/// Convert an amount (may refresh the cache).
#[tracing::instrument(skip(state), fields(amount = query.amount, from = %query.from))]
pub async fn convert<A: RateApi, S: RateStore>(
    State(state): State<Arc<AppState<A, S>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = parse_query_pair(&query)?;

    let rate = state.cache.get_rate(from, to).await;
    Ok(Json(ConvertResponse {
        amount: query.amount,
        from,
        to,
        rate,
        converted: query.amount * rate,
    }))
}

/// Convert an amount from the current cache contents only (no I/O).
#[tracing::instrument(skip(state), fields(amount = query.amount, from = %query.from))]
pub async fn convert_cached<A: RateApi, S: RateStore>(
    State(state): State<Arc<AppState<A, S>>>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = parse_query_pair(&query)?;

    let rate = state.cache.rate_cached(from, to);
    Ok(Json(ConvertResponse {
        amount: query.amount,
        from,
        to,
        rate,
        converted: state.cache.convert_currency(query.amount, from, Some(to)),
    }))
}

/// Force a refresh of the rate cache.
#[tracing::instrument(skip(state))]
pub async fn refresh<A: RateApi, S: RateStore>(
    State(state): State<Arc<AppState<A, S>>>,
) -> impl IntoResponse {
    state.cache.force_refresh().await;

    let status = state.cache.get_cache_status();
    Json(RefreshResponse {
        rates_count: status.rates_count,
        last_update: status.last_update,
        source: status.source,
    })
}

/// Snapshot of the rate cache.
pub async fn cache_status<A: RateApi, S: RateStore>(
    State(state): State<Arc<AppState<A, S>>>,
) -> impl IntoResponse {
    Json(state.cache.get_cache_status())
}
