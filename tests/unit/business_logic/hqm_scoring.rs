//! HQM scoring, sizing and ranking tests through the public API

use test_log::test;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

use crate::common::fixtures::create_test_outcome;
use rust_momentum::analysis::{hqm_score, percentile_of_score, percentile_ranks, rank_records, score_universe};
use rust_momentum::models::{Config, Horizon, HorizonValues, PercentileKind, QuoteRecord, Strategy};
use rust_momentum::pipeline::build_report;

fn default_config() -> Config {
    Config::from_map(&HashMap::new()).unwrap()
}

fn flat_quote(symbol: &str, value: f64) -> QuoteRecord {
    QuoteRecord {
        symbol: symbol.to_string(),
        company_name: None,
        price: Some(rust_decimal::Decimal::from(100)),
        returns: HorizonValues {
            year1: Some(value),
            month6: Some(value),
            month3: Some(value),
            month1: Some(value),
        },
    }
}

#[test]
fn test_percentiles_stay_in_unit_interval() {
    let outcome = create_test_outcome(60);

    for kind in [PercentileKind::Rank, PercentileKind::Mean, PercentileKind::Weak, PercentileKind::Strict] {
        for ranks in percentile_ranks(&outcome.quotes, kind) {
            for p in ranks.present() {
                assert!((0.0..=1.0).contains(&p), "{:?} produced {}", kind, p);
            }
        }
    }
}

#[test]
fn test_unique_maximum_ranks_one() {
    let quotes: Vec<QuoteRecord> = [0.05, 0.40, -0.10, 0.22]
        .iter()
        .enumerate()
        .map(|(i, r)| flat_quote(&format!("S{}", i), *r))
        .collect();

    let ranks = percentile_ranks(&quotes, PercentileKind::Rank);
    for horizon in Horizon::ALL {
        assert_eq!(ranks[1].get(horizon), Some(1.0));
        assert_eq!(ranks[2].get(horizon), Some(0.25));
    }
}

#[test]
fn test_mid_rank_tie_convention() {
    let sorted = [0.1, 0.2, 0.2, 0.3];
    // Two values below, one tie on each side of the midpoint
    assert_eq!(percentile_of_score(&sorted, 0.2, PercentileKind::Mean), 0.5);
    assert_eq!(percentile_of_score(&sorted, 0.2, PercentileKind::Rank), 0.625);
    assert_eq!(percentile_of_score(&sorted, 0.2, PercentileKind::Weak), 0.75);
    assert_eq!(percentile_of_score(&sorted, 0.2, PercentileKind::Strict), 0.25);
}

#[test]
fn test_hqm_score_is_mean_of_percentiles() {
    let outcome = create_test_outcome(25);
    let config = default_config();
    let scored = score_universe(outcome.quotes, &config);

    for record in &scored {
        let present: Vec<f64> = record.percentiles.present().collect();
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        let score = record.hqm_score.unwrap();
        assert!((score - mean).abs() < 1e-12, "{}: {} vs {}", record.symbol(), score, mean);
        assert_eq!(hqm_score(&record.percentiles), record.hqm_score);
    }
}

#[test]
fn test_missing_horizon_uses_available_percentiles() {
    let mut quotes = vec![flat_quote("A", 0.1), flat_quote("B", 0.2), flat_quote("C", 0.3)];
    quotes[2].returns.month1 = None;
    quotes[1].returns.month3 = Some(f64::NAN);

    let ranks = percentile_ranks(&quotes, PercentileKind::Rank);

    assert_eq!(ranks[2].month1, None);
    assert_eq!(ranks[1].month3, None);
    // C is still the maximum of the horizons it has
    assert_eq!(hqm_score(&ranks[2]), Some(1.0));
    // Without B, A is the lower half of a two-value month3 distribution
    assert_eq!(ranks[0].month3, Some(0.5));
}

#[test]
fn test_reference_position_size() {
    let config = default_config();
    let scored = score_universe(vec![flat_quote("AAPL", 0.3)], &config);
    assert_eq!(scored[0].shares, Ok(2000));
}

#[test]
fn test_report_sorted_by_composite_score() {
    let quotes = vec![flat_quote("MID", 0.2), flat_quote("TOP", 0.5), flat_quote("LOW", -0.1)];
    let config = default_config();
    let report = rank_records(score_universe(quotes, &config), Strategy::Hqm, 0);

    let symbols: Vec<&str> = report.rows.iter().map(|r| r.symbol()).collect();
    assert_eq!(symbols, vec!["TOP", "MID", "LOW"]);

    let scores: Vec<f64> = report.rows.iter().filter_map(|r| r.hqm_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_report_limit_and_default_cap() {
    let outcome = create_test_outcome(80);

    // Default report limit follows TARGET_HOLDINGS
    let report = build_report(&outcome, &default_config());
    assert_eq!(report.rows.len(), 50);

    let mut config = default_config();
    config.report_limit = Some(0);
    let full = build_report(&outcome, &config);
    assert_eq!(full.rows.len(), 80);
    assert_eq!(full.rows[..50].to_vec(), report.rows);
}

#[test]
fn test_simple_strategy_matches_one_year_order() {
    let outcome = create_test_outcome(30);
    let mut config = default_config();
    config.strategy = Strategy::Simple;
    config.report_limit = Some(0);

    let report = build_report(&outcome, &config);

    let mut expected: Vec<(f64, String)> = outcome
        .quotes
        .iter()
        .map(|q| (q.returns.year1.unwrap(), q.symbol.clone()))
        .collect();
    // Stable sort keeps fetch order on ties
    expected.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

    let actual: Vec<String> = report.rows.iter().map(|r| r.symbol().to_string()).collect();
    let expected: Vec<String> = expected.into_iter().map(|(_, s)| s).collect();
    assert_eq!(actual, expected);
}
