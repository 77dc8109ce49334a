use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rust_momentum::api::IexClient;
use rust_momentum::models::{BatchPlan, Config, PercentileKind, Strategy};
use rust_momentum::pipeline::{self, MarketDataSource, RunSummary};
use rust_momentum::report::print_report;

/// Momentum stock screener producing a buy-list spreadsheet
#[derive(Parser)]
#[command(name = "rust-momentum")]
#[command(version)]
#[command(about = "Rank a stock universe by price momentum and write recommended trades to a spreadsheet")]
#[command(long_about = "
Fetches price and trailing-return statistics for every ticker in the universe file
from the IEX Cloud batch endpoint, ranks the stocks by momentum and writes the top
picks with position sizes to an .xlsx workbook.

Two strategies are available:
  simple  rank by one-year price return
  hqm     rank by High-Quality Momentum: the mean percentile rank of the
          1-month, 3-month, 6-month and 1-year returns

Settings come from environment variables (or a .env file); flags override them.
IEX_API_TOKEN is required unless --snapshot is given.

Examples:
  rust-momentum --strategy hqm -p 1000000 --holdings 25
  rust-momentum --strategy simple --batch-count 6 -o trades.xlsx
  rust-momentum --save-snapshot market.json     # fetch and keep the raw data
  rust-momentum --snapshot market.json -n 10    # re-rank offline
")]
struct Args {
    /// Ranking strategy
    #[arg(long, short = 's', value_enum)]
    strategy: Option<Strategy>,

    /// CSV file with a `Ticker` column
    #[arg(long, short = 'u')]
    universe: Option<PathBuf>,

    /// Output spreadsheet path
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// IEX Cloud API token
    #[arg(long)]
    token: Option<String>,

    /// IEX Cloud base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Total capital to allocate
    #[arg(long, short = 'p')]
    portfolio_size: Option<Decimal>,

    /// Number of holdings the capital is split across
    #[arg(long)]
    holdings: Option<u32>,

    /// Rows in the report (0 = all ranked stocks)
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Symbols per request (1-100)
    #[arg(long, short = 'b', conflicts_with = "batch_count")]
    batch_size: Option<usize>,

    /// Split the universe into this many requests instead
    #[arg(long)]
    batch_count: Option<usize>,

    /// Tie convention for percentile ranks
    #[arg(long, value_enum)]
    percentile_kind: Option<PercentileKind>,

    /// Batch requests allowed in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum requests per minute (0 = unlimited)
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Replay market data from a snapshot file instead of the network
    #[arg(long, conflicts_with = "save_snapshot")]
    snapshot: Option<PathBuf>,

    /// Save fetched market data to a snapshot file
    #[arg(long)]
    save_snapshot: Option<PathBuf>,

    /// Do not print the ranked table
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(path) = &self.universe {
            config.universe_path = path.clone();
        }
        if let Some(path) = &self.output {
            config.output_path = Some(path.clone());
        }
        if let Some(token) = &self.token {
            config.api_token = token.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(size) = self.portfolio_size {
            config.portfolio_size = size;
        }
        if let Some(holdings) = self.holdings {
            config.target_holdings = holdings;
        }
        if let Some(limit) = self.limit {
            config.report_limit = Some(limit);
        }
        if let Some(size) = self.batch_size {
            config.batch_plan = BatchPlan::Size(size);
        }
        if let Some(count) = self.batch_count {
            config.batch_plan = BatchPlan::Count(count);
        }
        if let Some(kind) = self.percentile_kind {
            config.percentile_kind = kind;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent_batches = concurrency;
        }
        if let Some(rate) = self.rate_limit {
            config.rate_limit_per_minute = rate;
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rust_momentum=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn load_config(args: &Args) -> Result<Config> {
    resolve_config(args, Config::from_env()?)
}

/// Apply flags over the loaded settings, then range-check the result once.
fn resolve_config(args: &Args, mut config: Config) -> Result<Config> {
    args.apply(&mut config);
    config.validate()?;
    if args.snapshot.is_none() {
        config.validate_for_network()?;
    }
    Ok(config)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 RUN SUMMARY ({})", summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("   Requested:      {}", summary.requested);
    println!("   Fetched:        {}", summary.fetched);
    println!("   Failed batches: {}", summary.failed_batches.len());
    for batch in &summary.failed_batches {
        println!("     - batch {} ({} symbols): {}", batch.batch_number, batch.symbols.len(), batch.error);
    }
    if !summary.missing_symbols.is_empty() {
        println!("   Missing:        {}", summary.missing_symbols.join(", "));
    }
    println!("   Invalid:        {}", summary.invalid.len());
    for problem in summary.invalid.iter().take(10) {
        println!("     - {}", problem);
    }
    if summary.invalid.len() > 10 {
        println!("     ... and {} more", summary.invalid.len() - 10);
    }
    println!("   Reported:       {}", summary.reported);
    println!("   Output:         {}", summary.output_path.display());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            eprintln!("❌ Configuration Error: {:#}", e);
            eprintln!("Set IEX_API_TOKEN in the environment or a .env file, or pass --snapshot.");
            std::process::exit(1);
        }
    };

    let source = match &args.snapshot {
        Some(path) => MarketDataSource::Snapshot(path.clone()),
        None => MarketDataSource::Live(Arc::new(IexClient::new(&config)?)),
    };

    let (report, summary) = match pipeline::run(&config, source, args.save_snapshot.as_deref()).await {
        Ok(result) => result,
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    if !args.quiet {
        print_report(&report);
    }
    print_summary(&summary);

    Ok(())
}
