//! Snapshot save and replay across full pipeline runs

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{batch_body, create_test_outcome, test_config, tickers, write_universe};
use crate::common::logging::{init_test_logging, log_test_data, log_test_step};
use rust_momentum::api::IexClient;
use rust_momentum::models::BatchPlan;
use rust_momentum::pipeline::{self, MarketDataSource};
use rust_momentum::snapshot::load_snapshot;

#[tokio::test]
async fn test_snapshot_replay_reproduces_live_run() {
    init_test_logging();
    log_test_step("Live run saves a snapshot; replays produce the same report");

    let universe = tickers(12);
    let outcome = create_test_outcome(12);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stable/stock/market/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(batch_body(&outcome.quotes)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let universe_path = dir.path().join("universe.csv");
    let snapshot_path = dir.path().join("market.json");
    write_universe(&universe_path, &universe);

    let mut config = test_config(
        &format!("{}/stable", server.uri()),
        &universe_path,
        &dir.path().join("live.xlsx"),
    );
    config.batch_plan = BatchPlan::Size(100);

    let client = IexClient::new(&config).unwrap();
    let (live, _) = pipeline::run(
        &config,
        MarketDataSource::Live(Arc::new(client)),
        Some(snapshot_path.as_path()),
    )
    .await
    .unwrap();

    let saved = load_snapshot(&snapshot_path).unwrap();
    log_test_data("Snapshot fetched_at", &saved.fetched_at);
    assert_eq!(saved.quotes, outcome.quotes);

    // Replays never touch the network or the universe file
    std::fs::remove_file(&universe_path).unwrap();
    let mut replays = Vec::new();
    for name in ["replay1.xlsx", "replay2.xlsx"] {
        let mut replay_config = config.clone();
        replay_config.api_token.clear();
        replay_config.output_path = Some(dir.path().join(name));
        let (report, summary) = pipeline::run(
            &replay_config,
            MarketDataSource::Snapshot(snapshot_path.clone()),
            None,
        )
        .await
        .unwrap();
        assert_eq!(summary.fetched, 12);
        replays.push(report.rows);
    }

    assert_eq!(replays[0], live.rows);
    assert_eq!(replays[1], live.rows);
}

#[tokio::test]
async fn test_corrupt_snapshot_is_fatal() {
    init_test_logging();

    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("broken.json");
    std::fs::write(&snapshot_path, "{\"quotes\": [").unwrap();

    let config = test_config(
        "http://127.0.0.1:9/stable",
        &dir.path().join("universe.csv"),
        &dir.path().join("out.xlsx"),
    );
    let result = pipeline::run(&config, MarketDataSource::Snapshot(snapshot_path), None).await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("malformed snapshot"), "{}", message);
    assert!(!dir.path().join("out.xlsx").exists());
}
