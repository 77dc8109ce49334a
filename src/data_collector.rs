use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::MarketDataProvider;
use crate::error::{ConfigError, QuoteError};
use crate::models::{Config, QuoteRecord, MAX_SYMBOLS_PER_REQUEST};
use crate::utils::{BatchCalculator, SymbolBatch};

/// A batch whose request failed; its symbols are left out of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedBatch {
    pub batch_number: usize,
    pub symbols: Vec<String>,
    pub error: String,
}

/// Everything fetched in one run, in universe order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub fetched_at: DateTime<Utc>,
    pub requested: usize,
    pub quotes: Vec<QuoteRecord>,
    pub failed_batches: Vec<FailedBatch>,
    /// Symbols requested in a successful batch but absent from its response
    pub missing_symbols: Vec<String>,
}

/// Batched market-data collection for the ticker universe
pub struct DataCollector {
    provider: Arc<dyn MarketDataProvider>,
    config: Config,
}

impl DataCollector {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: Config) -> Self {
        Self { provider, config }
    }

    /// Fetch quotes for the whole universe.
    ///
    /// A failed batch is logged and dropped whole; the remaining batches are
    /// still fetched. With `max_concurrent_batches > 1` requests overlap but
    /// results are merged strictly in batch order.
    pub async fn fetch_universe(&self, universe: &[String]) -> Result<FetchOutcome, ConfigError> {
        let largest = BatchCalculator::largest_batch(universe.len(), self.config.batch_plan);
        if largest > MAX_SYMBOLS_PER_REQUEST {
            return Err(ConfigError::InvalidValue {
                key: "BATCH_COUNT",
                value: format!("{:?}", self.config.batch_plan),
                reason: format!(
                    "produces batches of {} symbols, provider limit is {}",
                    largest, MAX_SYMBOLS_PER_REQUEST
                ),
            });
        }

        let batches = BatchCalculator::calculate_batches(universe, self.config.batch_plan);
        let total_batches = batches.len();
        let concurrency = self.config.max_concurrent_batches.max(1);

        info!(
            "📊 Fetching {} symbols in {} batches (concurrency {})",
            universe.len(),
            total_batches,
            concurrency
        );

        let provider = &self.provider;
        let mut results = stream::iter(batches)
            .map(|batch| async move {
                let result = provider.get_batch(&batch.symbols).await;
                (batch, result)
            })
            .buffered(concurrency);

        let mut outcome = FetchOutcome {
            fetched_at: Utc::now(),
            requested: universe.len(),
            quotes: Vec::with_capacity(universe.len()),
            failed_batches: Vec::new(),
            missing_symbols: Vec::new(),
        };
        let mut seen = HashSet::new();

        while let Some((batch, result)) = results.next().await {
            match result {
                Ok(quotes) => {
                    let added = merge_batch(&mut outcome, &mut seen, &batch, quotes);
                    info!("✅ Batch {}/{}: {} - {} quotes", batch.batch_number, total_batches, batch.description(), added);
                }
                Err(e) => {
                    error!("❌ Batch {}/{}: {} failed - {}", batch.batch_number, total_batches, batch.description(), e);
                    outcome.failed_batches.push(FailedBatch {
                        batch_number: batch.batch_number,
                        symbols: batch.symbols,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "✅ Collected {} of {} quotes ({} failed batches, {} missing symbols)",
            outcome.quotes.len(),
            outcome.requested,
            outcome.failed_batches.len(),
            outcome.missing_symbols.len()
        );
        Ok(outcome)
    }
}

/// Append one successful batch in request order. Returns the number added.
fn merge_batch(
    outcome: &mut FetchOutcome,
    seen: &mut HashSet<String>,
    batch: &SymbolBatch,
    mut quotes: crate::api::BatchQuotes,
) -> usize {
    let mut added = 0;
    for symbol in &batch.symbols {
        match quotes.remove(symbol) {
            Some(quote) => {
                if seen.insert(symbol.clone()) {
                    outcome.quotes.push(quote);
                    added += 1;
                } else {
                    debug!("Ignoring repeated quote for {}", symbol);
                }
            }
            None => {
                warn!("⚠️ {}", QuoteError::MissingSymbol { symbol: symbol.clone() });
                outcome.missing_symbols.push(symbol.clone());
            }
        }
    }
    for symbol in quotes.keys() {
        debug!("Ignoring unrequested symbol {} in response", symbol);
    }
    added
}
