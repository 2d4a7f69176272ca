//! Exchange Rates CLI
//!
//! Command-line interface for the Exchange Rates API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use rates_client::ExchangeRatesClient;
use rates_types::CurrencyCode;

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Exchange Rates API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Exchange Rates API
    #[arg(
        long,
        env = "RATES_SERVICE_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// List supported currencies
    Currencies,
    /// Show the rate for a currency pair
    Rate {
        /// Source currency (AED, USD, EUR, GBP)
        #[arg(value_parser = parse_currency)]
        from: CurrencyCode,
        /// Target currency
        #[arg(value_parser = parse_currency)]
        to: CurrencyCode,
    },
    /// Convert an amount
    Convert {
        /// Amount in the source currency
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Source currency
        #[arg(value_parser = parse_currency)]
        from: CurrencyCode,
        /// Target currency (defaults to AED)
        #[arg(value_parser = parse_currency)]
        to: Option<CurrencyCode>,
        /// Use the server's cached rates only
        #[arg(long)]
        cached: bool,
    },
    /// Force the server to refresh its rates
    Refresh,
    /// Show the server's cache status
    Status,
}

fn parse_currency(s: &str) -> Result<CurrencyCode, String> {
    s.parse::<CurrencyCode>().map_err(|e| {
        let supported: Vec<&str> = CurrencyCode::all().iter().map(|c| c.code()).collect();
        format!("{e}. Supported: {}", supported.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = ExchangeRatesClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currencies => {
            let currencies = client.currencies().await?;
            for c in currencies {
                let marker = if c.base { " (base)" } else { "" };
                println!("{} {:>3}  {}{}", c.code, c.symbol, c.name, marker);
            }
        }

        Commands::Rate { from, to } => {
            let rate = client.rate(from, to).await?;
            println!("{}", serde_json::to_string_pretty(&rate)?);
        }

        Commands::Convert {
            amount,
            from,
            to,
            cached,
        } => {
            let result = if cached {
                client.convert_cached(amount, from, to).await?
            } else {
                client.convert(amount, from, to).await?
            };
            println!(
                "{} {} = {:.4} {} (rate {})",
                result.amount, result.from, result.converted, result.to, result.rate
            );
        }

        Commands::Refresh => {
            let refreshed = client.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&refreshed)?);
        }

        Commands::Status => {
            let status = client.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
