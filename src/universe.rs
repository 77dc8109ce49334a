//! Ticker universe loading.
//!
//! The universe is a CSV file with a `Ticker` column; any other columns are
//! ignored. It is read once at startup and never changes during a run.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::ConfigError;

pub const TICKER_COLUMN: &str = "Ticker";

/// Load the ordered ticker list. Duplicates keep their first position.
pub fn load_universe(path: &Path) -> Result<Vec<String>, ConfigError> {
    let read_err = |source| ConfigError::UniverseRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let column = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .position(|header| header == TICKER_COLUMN)
        .ok_or_else(|| ConfigError::MissingTickerColumn {
            path: path.to_path_buf(),
        })?;

    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    for result in reader.records() {
        let record = result.map_err(read_err)?;
        let ticker = record.get(column).unwrap_or_default();

        if ticker.is_empty() {
            return Err(ConfigError::BlankTicker {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or_default(),
            });
        }

        if !seen.insert(ticker.to_string()) {
            warn!("Duplicate ticker {} in {}, keeping first occurrence", ticker, path.display());
            continue;
        }
        tickers.push(ticker.to_string());
    }

    if tickers.is_empty() {
        return Err(ConfigError::EmptyUniverse {
            path: path.to_path_buf(),
        });
    }

    info!("📋 Loaded {} tickers from {}", tickers.len(), path.display());
    Ok(tickers)
}
