pub mod momentum;
pub mod position_sizing;
pub mod ranking;

pub use momentum::{hqm_score, percentile_of_score, percentile_ranks};
pub use position_sizing::PositionSizer;
pub use ranking::{rank_records, RankedReport};

use crate::models::{Config, QuoteRecord, ScoredRecord};

/// Score and size every fetched quote. Output keeps fetch order.
pub fn score_universe(quotes: Vec<QuoteRecord>, config: &Config) -> Vec<ScoredRecord> {
    let ranks = percentile_ranks(&quotes, config.percentile_kind);
    let sizer = PositionSizer::new(config.portfolio_size, config.target_holdings);

    quotes
        .into_iter()
        .zip(ranks)
        .enumerate()
        .map(|(fetch_index, (quote, percentiles))| ScoredRecord {
            shares: sizer.shares_to_buy(&quote.symbol, quote.price),
            hqm_score: hqm_score(&percentiles),
            fetch_index,
            percentiles,
            quote,
        })
        .collect()
}
