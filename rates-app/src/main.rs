//! # Exchange Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the rate store and the live rate API client
//! - Create the exchange-rate cache
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{
    metrics::SdkMeterProvider, propagation::TraceContextPropagator, trace as sdktrace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_hex::{CacheConfig, ExchangeRateCache, inbound::HttpServer};
use rates_repo::{ExchangeRateApiClient, build_repo};

/// OTLP pipeline handles kept alive until shutdown.
struct Telemetry {
    tracer: sdktrace::SdkTracerProvider,
    meter: SdkMeterProvider,
}

impl Telemetry {
    fn shutdown(self) {
        let _ = self.tracer.shutdown();
        let _ = self.meter.shutdown();
    }
}

/// Installs OTLP trace and metric exporters. The collector address is read by
/// the exporters from `OTEL_EXPORTER_OTLP_ENDPOINT`.
fn init_telemetry() -> anyhow::Result<(sdktrace::Tracer, Telemetry)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;
    let tracer_provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .build();
    global::set_tracer_provider(tracer_provider.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()?;
    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .build();
    global::set_meter_provider(meter_provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    let tracer = tracer_provider.tracer("rates-service");
    Ok((
        tracer,
        Telemetry {
            tracer: tracer_provider,
            meter: meter_provider,
        },
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let (otel_layer, telemetry) = match &config.otlp_endpoint {
        Some(_) => {
            let (tracer, telemetry) = init_telemetry()?;
            (
                Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                Some(telemetry),
            )
        }
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    tracing::info!("Starting exchange rates server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!(
        url = %config.rates_api_url,
        ttl_secs = config.rates_ttl.as_secs(),
        "Rate feed configured"
    );

    // Build store (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let api = ExchangeRateApiClient::with_timeout(&config.rates_api_url, config.rates_api_timeout)?;

    // Create the rate cache
    let cache = ExchangeRateCache::with_config(
        api,
        repo,
        CacheConfig {
            ttl: chrono::Duration::from_std(config.rates_ttl)?,
        },
    );

    // Create and run the HTTP server
    let server = HttpServer::new(cache);
    let server = if telemetry.is_some() {
        server.with_metrics()
    } else {
        server
    };
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces and metrics are flushed before exit
    if let Some(telemetry) = telemetry {
        telemetry.shutdown();
    }
    Ok(())
}
