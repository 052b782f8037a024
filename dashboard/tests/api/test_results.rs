//! Results browser against the backend

use std::sync::Arc;
use std::time::Duration;

use clue_dashboard::app::state::AppState;
use clue_dashboard::http::client::HttpClient;
use clue_dashboard::http::results::PanelKey;
use serde_json::json;

use crate::app;
use crate::mock::MockBackend;

fn seed_results(backend: &MockBackend) {
    *backend.state.results.lock().unwrap() = vec![
        json!({"uuid": "r1", "sut": "shop", "variants": "base", "workloads": "shaped",
               "timestamp": "2025-05-01_08-00-00", "n_iterations": 1, "status": "COMPLETED"}),
        json!({"id": "r2", "sut": "shop", "variants": "base,scaled", "workloads": "shaped,fixed",
               "timestamp": "2025-05-02_08-00-00", "n_iterations": 2, "status": "failed"}),
    ];
    *backend.state.archive.lock().unwrap() = b"PK\x03\x04 archive bytes".to_vec();
}

#[tokio::test]
async fn test_list_and_delete() {
    let backend = MockBackend::start().await;
    seed_results(&backend);
    let app = app(&backend);

    let entries = app.results.load().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].uuid, "r2");

    app.results.delete("r1").await.unwrap();
    assert_eq!(app.results.entries().len(), 1);
    assert_eq!(backend.state.recorded("DELETE", "/api/results/r1").len(), 1);

    // already gone on the backend: the local row stays
    assert!(app.results.delete("r9").await.is_err());
    assert_eq!(app.results.entries().len(), 1);
}

#[tokio::test]
async fn test_wrapped_result_list_is_accepted() {
    let backend = MockBackend::start().await;
    seed_results(&backend);
    *backend.state.results_wrapped.lock().unwrap() = true;
    let app = app(&backend);

    let entries = app.results.load().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].uuid, "r1");
}

#[tokio::test]
async fn test_start_results_server() {
    let backend = MockBackend::start().await;
    let app = app(&backend);
    app.results.start_server().await.unwrap();
    assert_eq!(
        backend
            .state
            .recorded("POST", "/api/results/startResultsServer")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_load_failure_degrades_to_empty() {
    let client = HttpClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
    let app = AppState::with_client(&crate::options(), Arc::new(client));
    assert!(app.results.load().await.is_empty());
}

#[tokio::test]
async fn test_download_streams_archive() {
    let backend = MockBackend::start().await;
    seed_results(&backend);
    let app = app(&backend);
    let dir = tempfile::tempdir().unwrap();

    let path = app.results.download("r1", dir.path()).await.unwrap();
    assert_eq!(path, dir.path().join("results-r1.zip"));
    assert_eq!(
        tokio::fs::read(&path).await.unwrap(),
        b"PK\x03\x04 archive bytes".to_vec()
    );

    assert!(app.results.download("missing", dir.path()).await.is_err());
    assert!(!dir.path().join("results-missing.zip").exists());
}

#[tokio::test]
async fn test_detail_and_panel() {
    let backend = MockBackend::start().await;
    seed_results(&backend);
    let app = app(&backend);

    let details = app.results.detail("r2").await.unwrap();
    assert_eq!(details.variants[0].name, "base");
    assert_eq!(details.configs.env_config["namespace"], json!("bench"));

    let key = PanelKey {
        workload: "shaped".into(),
        variant: "base".into(),
        iteration: 2,
    };
    let panel = app.results.panel("r2", &key).await;
    assert_eq!(panel.metrics[0].name, "p95 latency shaped/base/2");
    assert_eq!(panel.metrics[0].unit.as_deref(), Some("ms"));

    let url = app.http_client.absolute(&panel.plots[0].image_url).unwrap();
    assert_eq!(url.as_str(), format!("{}/api/results/r2/plots/cpu.png", backend.base_url));
}

#[tokio::test]
async fn test_repeat_uses_details_when_not_listed() {
    let backend = MockBackend::start().await;
    seed_results(&backend);
    let app = app(&backend);

    app.results.repeat("r1").await.unwrap();
    let sent = backend.state.recorded("POST", "/api/deploy/sut");
    assert_eq!(sent[0].body["sut"], json!("shop"));
    assert_eq!(sent[0].body["variants"], json!("base"));
    assert_eq!(sent[0].body["workloads"], json!("shaped"));
}
