//! Saved market-data snapshots.
//!
//! A snapshot is the [`FetchOutcome`] of a run written as JSON. Replaying it
//! skips the network entirely, which makes runs reproducible.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::data_collector::FetchOutcome;
use crate::error::SnapshotError;

pub fn save_snapshot(outcome: &FetchOutcome, path: &Path) -> Result<(), SnapshotError> {
    let content = serde_json::to_string_pretty(outcome).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("💾 Saved snapshot of {} quotes to {}", outcome.quotes.len(), path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<FetchOutcome, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let outcome: FetchOutcome = serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "📂 Loaded snapshot of {} quotes fetched at {}",
        outcome.quotes.len(),
        outcome.fetched_at
    );
    Ok(outcome)
}
