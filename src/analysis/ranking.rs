use std::cmp::Ordering;

use crate::error::QuoteError;
use crate::models::{ScoredRecord, Strategy};

/// Ranked buy recommendations plus the records that could not be ranked
#[derive(Debug, Clone)]
pub struct RankedReport {
    pub strategy: Strategy,
    pub rows: Vec<ScoredRecord>,
    pub invalid: Vec<QuoteError>,
}

/// Ranking key for a record under `strategy`, if it has one.
pub fn ranking_key(record: &ScoredRecord, strategy: Strategy) -> Option<f64> {
    match strategy {
        Strategy::Simple => record.quote.returns.year1.filter(|r| r.is_finite()),
        Strategy::Hqm => record.hqm_score,
    }
}

/// Sort descending by the strategy's key, ties by fetch order, and keep the
/// top `limit` rows (0 keeps all). Records that were not sized or have no key
/// are moved to `invalid`.
pub fn rank_records(mut records: Vec<ScoredRecord>, strategy: Strategy, limit: usize) -> RankedReport {
    records.sort_by_key(|r| r.fetch_index);

    let mut invalid = Vec::new();
    let mut keyed = Vec::with_capacity(records.len());

    for record in records {
        if let Err(e) = &record.shares {
            invalid.push(e.clone());
            continue;
        }
        match ranking_key(&record, strategy) {
            Some(key) => keyed.push((key, record)),
            None => invalid.push(QuoteError::NoMomentumData {
                symbol: record.quote.symbol.clone(),
            }),
        }
    }

    // `sort_by` is stable, so equal keys keep fetch order
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut rows: Vec<ScoredRecord> = keyed.into_iter().map(|(_, record)| record).collect();
    if limit > 0 {
        rows.truncate(limit);
    }

    RankedReport {
        strategy,
        rows,
        invalid,
    }
}
