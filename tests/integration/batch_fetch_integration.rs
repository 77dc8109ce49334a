//! Integration tests for batched fetching against a mock IEX endpoint

use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{batch_body, create_test_quote, test_config, tickers, write_universe};
use crate::common::logging::{init_test_logging, log_test_data, log_test_step};
use rust_momentum::api::IexClient;
use rust_momentum::models::{BatchPlan, QuoteRecord};
use rust_momentum::pipeline::{self, MarketDataSource};

/// Mount one mock per batch; `respond` decides the response for a batch index.
async fn mount_batches(
    server: &MockServer,
    universe: &[String],
    batch_size: usize,
    respond: impl Fn(usize, &[QuoteRecord]) -> ResponseTemplate,
) {
    let quotes: Vec<QuoteRecord> = universe
        .iter()
        .enumerate()
        .map(|(i, s)| create_test_quote(i, s))
        .collect();

    for (index, chunk) in quotes.chunks(batch_size).enumerate() {
        let symbols: Vec<&str> = chunk.iter().map(|q| q.symbol.as_str()).collect();
        Mock::given(method("GET"))
            .and(path("/stable/stock/market/batch"))
            .and(query_param("symbols", symbols.join(",")))
            .and(query_param("types", "price,stats"))
            .and(query_param("token", "Tpk_test_token"))
            .respond_with(respond(index, chunk))
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_failed_batch_isolation() {
    init_test_logging();
    log_test_step("One of six batches fails; the other five are reported");

    let server = MockServer::start().await;
    let universe = tickers(30);
    mount_batches(&server, &universe, 5, |index, chunk| {
        if index == 3 {
            ResponseTemplate::new(503).set_body_string("Service Unavailable")
        } else {
            ResponseTemplate::new(200).set_body_json(batch_body(chunk))
        }
    })
    .await;

    let dir = tempdir().unwrap();
    let universe_path = dir.path().join("universe.csv");
    write_universe(&universe_path, &universe);
    let mut config = test_config(
        &format!("{}/stable", server.uri()),
        &universe_path,
        &dir.path().join("hqm.xlsx"),
    );
    config.batch_plan = BatchPlan::Count(6);

    let client = IexClient::new(&config).unwrap();
    let (report, summary) = pipeline::run(&config, MarketDataSource::Live(Arc::new(client)), None)
        .await
        .expect("run should survive a failed batch");

    log_test_data("Summary", &summary);

    let failed: HashSet<String> = universe[15..20].iter().cloned().collect();
    let reported: HashSet<String> = report.rows.iter().map(|r| r.symbol().to_string()).collect();

    assert_eq!(summary.fetched, 25);
    assert_eq!(summary.failed_batches.len(), 1);
    assert_eq!(summary.failed_batches[0].batch_number, 4);
    assert_eq!(report.rows.len(), 25);
    assert!(reported.is_disjoint(&failed));
    assert!(dir.path().join("hqm.xlsx").exists());
}

#[tokio::test]
async fn test_malformed_batch_is_dropped() {
    init_test_logging();
    log_test_step("A batch with an undecodable body is dropped whole");

    let server = MockServer::start().await;
    let universe = tickers(6);
    mount_batches(&server, &universe, 3, |index, chunk| {
        if index == 0 {
            ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>")
        } else {
            ResponseTemplate::new(200).set_body_json(batch_body(chunk))
        }
    })
    .await;

    let dir = tempdir().unwrap();
    let universe_path = dir.path().join("universe.csv");
    write_universe(&universe_path, &universe);
    let mut config = test_config(
        &format!("{}/stable", server.uri()),
        &universe_path,
        &dir.path().join("out.xlsx"),
    );
    config.batch_plan = BatchPlan::Size(3);

    let client = IexClient::new(&config).unwrap();
    let outcome = pipeline::collect(&config, MarketDataSource::Live(Arc::new(client)))
        .await
        .unwrap();

    let symbols: Vec<&str> = outcome.quotes.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["T03", "T04", "T05"]);
    assert!(outcome.failed_batches[0].error.contains("malformed response"));
}

#[tokio::test]
async fn test_concurrent_batches_match_sequential() {
    init_test_logging();
    log_test_step("Concurrent fetching merges in universe order");

    let server = MockServer::start().await;
    let universe = tickers(40);
    let dir = tempdir().unwrap();
    let universe_path = dir.path().join("universe.csv");
    write_universe(&universe_path, &universe);

    let mut outcomes = Vec::new();
    for concurrency in [1, 4] {
        server.reset().await;
        mount_batches(&server, &universe, 7, |_, chunk| {
            ResponseTemplate::new(200).set_body_json(batch_body(chunk))
        })
        .await;

        let mut config = test_config(
            &format!("{}/stable", server.uri()),
            &universe_path,
            &dir.path().join("out.xlsx"),
        );
        config.batch_plan = BatchPlan::Size(7);
        config.max_concurrent_batches = concurrency;

        let client = IexClient::new(&config).unwrap();
        let outcome = pipeline::collect(&config, MarketDataSource::Live(Arc::new(client)))
            .await
            .unwrap();
        outcomes.push(outcome.quotes);
    }

    assert_eq!(outcomes[0].len(), 40);
    assert_eq!(outcomes[0], outcomes[1]);
    let symbols: Vec<String> = outcomes[1].iter().map(|q| q.symbol.clone()).collect();
    assert_eq!(symbols, universe);
}
