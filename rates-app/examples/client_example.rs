//! Client example exercising the rate API against a running server.
//!
//! Run with: cargo run -p rates-app --example client_example --no-default-features --features sqlite
//!
//! Set `RATES_API_URL` to an unreachable address to watch the cache fall back
//! to the hardcoded table.

use rates_client::ExchangeRatesClient;
use rates_hex::{ExchangeRateCache, inbound::HttpServer};
use rates_repo::{DEFAULT_RATES_API_URL, ExchangeRateApiClient, build_repo};
use rates_types::CurrencyCode;
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("rates.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let api_url = std::env::var("RATES_API_URL").unwrap_or_else(|_| DEFAULT_RATES_API_URL.into());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");
    println!("   Rate feed: {api_url}");

    // Build store (handles connection and migration)
    let repo = build_repo(&db_url).await?;
    let api = ExchangeRateApiClient::new(api_url)?;

    // Start server in background
    let server = HttpServer::new(ExchangeRateCache::new(api, repo));
    let router = server.router();

    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    // Create client
    let client = ExchangeRatesClient::new(format!("http://127.0.0.1:{port}"));

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    // Served from the hardcoded table: nothing has been fetched yet
    let cached = client
        .convert_cached(100.0, CurrencyCode::USD, None)
        .await?;
    println!(
        "✅ Cache-only: {} {} = {:.2} {}",
        cached.amount, cached.from, cached.converted, cached.to
    );

    // First async lookup fills the cache
    let rate = client.rate(CurrencyCode::EUR, CurrencyCode::GBP).await?;
    println!("✅ EUR/GBP rate: {:.6}", rate.rate);

    let status = client.status().await?;
    println!(
        "   Cache: {} rates from {:?} (updated {:?})",
        status.rates_count, status.source, status.last_update
    );

    let converted = client
        .convert(-50.0, CurrencyCode::GBP, Some(CurrencyCode::AED))
        .await?;
    println!(
        "✅ Converted {} {} = {:.2} {}",
        converted.amount, converted.from, converted.converted, converted.to
    );

    let refreshed = client.refresh().await?;
    println!(
        "✅ Forced refresh: {} rates from {:?}",
        refreshed.rates_count, refreshed.source
    );

    println!("\n📋 Supported currencies:");
    for c in client.currencies().await? {
        println!("   - {} {} {}", c.code, c.symbol, c.name);
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
