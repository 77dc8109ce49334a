//! End-to-end run: universe → batched fetch → scoring → sizing → ranking → report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{rank_records, score_universe, RankedReport};
use crate::api::MarketDataProvider;
use crate::data_collector::{DataCollector, FailedBatch, FetchOutcome};
use crate::error::QuoteError;
use crate::models::Config;
use crate::report::write_xlsx;
use crate::snapshot::{load_snapshot, save_snapshot};
use crate::universe::load_universe;

/// Where market data comes from for a run
pub enum MarketDataSource {
    /// Load the universe file and query the provider batch by batch
    Live(Arc<dyn MarketDataProvider>),
    /// Replay a previously saved snapshot
    Snapshot(PathBuf),
}

/// What happened during a run, for the closing summary
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub requested: usize,
    pub fetched: usize,
    pub failed_batches: Vec<FailedBatch>,
    pub missing_symbols: Vec<String>,
    pub invalid: Vec<QuoteError>,
    pub reported: usize,
    pub output_path: PathBuf,
}

/// Get the run's quotes from the configured source.
pub async fn collect(config: &Config, source: MarketDataSource) -> Result<FetchOutcome> {
    match source {
        MarketDataSource::Live(provider) => {
            let universe = load_universe(&config.universe_path)?;
            let collector = DataCollector::new(provider, config.clone());
            Ok(collector.fetch_universe(&universe).await?)
        }
        MarketDataSource::Snapshot(path) => Ok(load_snapshot(&path)?),
    }
}

/// Score, size and rank a fetched universe. Pure: same input, same report.
pub fn build_report(outcome: &FetchOutcome, config: &Config) -> RankedReport {
    let scored = score_universe(outcome.quotes.clone(), config);
    let report = rank_records(scored, config.strategy, config.report_limit());

    for problem in &report.invalid {
        warn!("⚠️ Excluded from report: {}", problem);
    }
    info!(
        "🎯 Ranked {} stocks by {} strategy, {} excluded",
        report.rows.len(),
        config.strategy,
        report.invalid.len()
    );
    report
}

/// Run the whole pipeline and write the spreadsheet.
pub async fn run(
    config: &Config,
    source: MarketDataSource,
    snapshot_out: Option<&Path>,
) -> Result<(RankedReport, RunSummary)> {
    let outcome = collect(config, source).await?;

    if let Some(path) = snapshot_out {
        save_snapshot(&outcome, path)?;
    }

    let report = build_report(&outcome, config);

    let output_path = config.output_path();
    write_xlsx(&report, &output_path)
        .with_context(|| format!("failed to write report to {}", output_path.display()))?;

    let invalid = outcome
        .missing_symbols
        .iter()
        .map(|symbol| QuoteError::MissingSymbol {
            symbol: symbol.clone(),
        })
        .chain(report.invalid.iter().cloned())
        .collect();

    let summary = RunSummary {
        generated_at: Utc::now(),
        requested: outcome.requested,
        fetched: outcome.quotes.len(),
        failed_batches: outcome.failed_batches,
        missing_symbols: outcome.missing_symbols,
        invalid,
        reported: report.rows.len(),
        output_path,
    };

    Ok((report, summary))
}
