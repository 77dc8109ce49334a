use anyhow::{anyhow, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn, Level};

use rust_momentum::universe::load_universe;

const CONSTITUENTS_URL: &str =
    "https://raw.githubusercontent.com/datasets/s-and-p-500-companies/main/data/constituents.csv";

/// Download the current S&P 500 list and write it as a ticker universe file
#[derive(Parser)]
#[command(name = "update_universe")]
#[command(about = "Refresh the S&P 500 ticker universe used by rust-momentum")]
struct Args {
    /// Where to write the universe CSV
    #[arg(long, short = 'o', default_value = "sp_500_stocks.csv")]
    output: PathBuf,

    /// Constituents CSV to download
    #[arg(long, default_value = CONSTITUENTS_URL)]
    source: String,
}

#[derive(Debug, Deserialize)]
struct Constituent {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Security", alias = "Name", default)]
    name: String,
    #[serde(rename = "GICS Sector", alias = "Sector", default)]
    sector: String,
}

#[derive(Debug, Serialize)]
struct UniverseRow<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
    #[serde(rename = "Company Name")]
    company_name: &'a str,
    #[serde(rename = "Sector")]
    sector: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("🌐 Fetching S&P 500 list from {}", args.source);
    let response = reqwest::get(&args.source).await?.error_for_status()?;
    let csv_text = response.text().await?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());
    let mut companies = Vec::new();

    for result in reader.deserialize::<Constituent>() {
        match result {
            Ok(company) if !company.symbol.is_empty() => companies.push(company),
            Ok(_) => warn!("Skipping row without a symbol"),
            Err(e) => warn!("Skipping malformed row: {}", e),
        }
    }

    if companies.is_empty() {
        return Err(anyhow!("No companies parsed from {}", args.source));
    }
    info!("✅ Parsed {} S&P 500 companies", companies.len());

    let mut writer = csv::Writer::from_path(&args.output)?;
    for company in &companies {
        writer.serialize(UniverseRow {
            ticker: &company.symbol,
            company_name: &company.name,
            sector: &company.sector,
        })?;
    }
    writer.flush()?;

    // Read it back through the same loader the screener uses
    let tickers = load_universe(&args.output)?;
    info!("✅ Wrote {} tickers to {}", tickers.len(), args.output.display());

    Ok(())
}
