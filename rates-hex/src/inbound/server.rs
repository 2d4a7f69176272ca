//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use rates_types::{RateApi, RateStore};

use super::handlers::{self, AppState};
use crate::ExchangeRateCache;

/// HTTP Server for the Exchange Rates API.
pub struct HttpServer<A: RateApi, S: RateStore> {
    state: Arc<AppState<A, S>>,
    metrics: bool,
}

impl<A: RateApi, S: RateStore> HttpServer<A, S> {
    /// Creates a new HTTP server around the given cache.
    pub fn new(cache: ExchangeRateCache<A, S>) -> Self {
        Self {
            state: Arc::new(AppState { cache }),
            metrics: false,
        }
    }

    /// Adds the OpenTelemetry HTTP metrics layer (uses the global MeterProvider).
    pub fn with_metrics(mut self) -> Self {
        self.metrics = true;
        self
    }

    /// Shared handle to the cache behind the router.
    pub fn cache(&self) -> &ExchangeRateCache<A, S> {
        &self.state.cache
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route("/api/currencies", get(handlers::list_currencies::<A, S>))
            .route("/api/rates/status", get(handlers::cache_status::<A, S>))
            .route("/api/rates/refresh", post(handlers::refresh::<A, S>))
            .route("/api/rates/{from}/{to}", get(handlers::get_rate::<A, S>))
            .route("/api/convert", get(handlers::convert::<A, S>))
            .route("/api/convert/cached", get(handlers::convert_cached::<A, S>));

        let router = if self.metrics {
            router.layer(axum_otel_metrics::HttpMetricsLayerBuilder::new().build())
        } else {
            router
        };

        router
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
