// High-Quality Momentum scoring
// Cross-sectional percentile ranks of trailing returns, averaged over four horizons

use crate::models::{Horizon, HorizonValues, PercentileKind, QuoteRecord};

/// Percentile rank of `value` within a distribution sorted ascending.
///
/// Returns a fraction in [0, 1]; an empty distribution ranks 0.
pub fn percentile_of_score(sorted: &[f64], value: f64, kind: PercentileKind) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len() as f64;
    let less = sorted.partition_point(|x| *x < value) as f64;
    let less_or_equal = sorted.partition_point(|x| *x <= value) as f64;
    let equal = less_or_equal - less;

    let rank = match kind {
        PercentileKind::Rank if equal > 0.0 => less + (equal + 1.0) / 2.0,
        // A value outside the distribution sits between its neighbours
        PercentileKind::Rank => less,
        PercentileKind::Mean => less + equal / 2.0,
        PercentileKind::Weak => less_or_equal,
        PercentileKind::Strict => less,
    };

    rank / n
}

/// Per-horizon percentile ranks for every quote, relative to this universe.
///
/// A quote missing a return for a horizon is left out of that horizon's
/// distribution and gets no percentile for it. Non-finite returns count as
/// missing.
pub fn percentile_ranks(quotes: &[QuoteRecord], kind: PercentileKind) -> Vec<HorizonValues> {
    let mut ranks = vec![HorizonValues::default(); quotes.len()];

    for horizon in Horizon::ALL {
        let mut distribution: Vec<f64> = quotes
            .iter()
            .filter_map(|q| finite_return(q, horizon))
            .collect();
        distribution.sort_by(f64::total_cmp);

        for (quote, rank) in quotes.iter().zip(ranks.iter_mut()) {
            let percentile = finite_return(quote, horizon)
                .map(|value| percentile_of_score(&distribution, value, kind));
            rank.set(horizon, percentile);
        }
    }

    ranks
}

/// Composite HQM score: the mean of the available percentile ranks.
pub fn hqm_score(percentiles: &HorizonValues) -> Option<f64> {
    let (sum, count) = percentiles
        .present()
        .fold((0.0, 0usize), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn finite_return(quote: &QuoteRecord, horizon: Horizon) -> Option<f64> {
    quote.returns.get(horizon).filter(|r| r.is_finite())
}
