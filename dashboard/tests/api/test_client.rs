//! Endpoint mapping tests

use clue_api::models::ClueConfig;
use clue_dashboard::http::config::ConfigApi;
use clue_dashboard::http::logs::LogsApi;
use clue_dashboard::http::queue::QueueApi;
use clue_dashboard::http::suts::CatalogApi;
use serde_json::json;

use crate::client;
use crate::mock::MockBackend;

#[tokio::test]
async fn test_catalog_accepts_wrapped_and_bare_lists() {
    let backend = MockBackend::start().await;
    let client = client(&backend);

    let suts = client.list_suts().await.unwrap();
    assert_eq!(suts.len(), 1);
    assert_eq!(suts[0].variants.len(), 2);
    assert_eq!(suts[0].workloads[0].timeout_duration, Some(180));

    *backend.state.suts.lock().unwrap() = json!([{"name": "bank"}, {"name": "shop"}]);
    let suts = client.list_suts().await.unwrap();
    assert_eq!(suts.len(), 2);
    assert!(suts[0].variants.is_empty());
}

#[tokio::test]
async fn test_malformed_catalog_is_an_error() {
    let backend = MockBackend::start().await;
    *backend.state.suts.lock().unwrap() = json!({"unexpected": true});
    assert!(client(&backend).list_suts().await.is_err());

    let app = crate::app(&backend);
    assert!(app.catalog.load().await.is_empty());
    assert!(app.catalog.find("shop").is_none());
}

#[tokio::test]
async fn test_current_run_404_is_none() {
    let backend = MockBackend::start().await;
    assert_eq!(client(&backend).current_run().await.unwrap(), None);
}

#[tokio::test]
async fn test_remove_uses_index_path() {
    let backend = MockBackend::start().await;
    *backend.state.queue.lock().unwrap() = vec![
        json!({"sut": "shop", "variants": "base", "workloads": "shaped"}),
        json!({"sut": "shop", "variants": "scaled", "workloads": "shaped"}),
    ];
    let client = client(&backend);

    client.remove(1).await.unwrap();
    assert_eq!(backend.state.recorded("DELETE", "/api/queue/remove/1").len(), 1);

    let err = client.remove(7).await.unwrap_err();
    assert!(err.is_not_found());

    let status = client.queue_status().await.unwrap();
    assert_eq!(status.queue_size, 1);
    assert_eq!(status.queue[0].variants.joined(), "base");
}

#[tokio::test]
async fn test_clear_logs_error_body_is_failure() {
    let backend = MockBackend::start().await;
    *backend.state.clear_reports_error.lock().unwrap() = true;
    assert!(client(&backend).clear_logs().await.is_err());
}

#[tokio::test]
async fn test_uploads_are_base64() {
    let backend = MockBackend::start().await;
    let client = client(&backend);

    client.upload_sut_config(b"name: shop\n").await.unwrap();
    let sent = backend.state.recorded("POST", "/api/suts");
    assert_eq!(sent[0].body, json!({"sut_config": "bmFtZTogc2hvcAo="}));

    client.upload_kubeconfig(b"apiVersion: v1", true).await.unwrap();
    let sent = backend.state.recorded("POST", "/api/cluster/config");
    assert_eq!(
        sent[0].body,
        json!({"kubeconfig": "YXBpVmVyc2lvbjogdjE=", "patch_local_cluster": true})
    );
}

#[tokio::test]
async fn test_clue_config_round_trip_keeps_unknown_keys() {
    let backend = MockBackend::start().await;
    let client = client(&backend);

    let config: ClueConfig = client.clue_config().await.unwrap();
    assert_eq!(config.experiment_timeout, Some(30));
    assert_eq!(config.extra.get("custom"), Some(&json!(1)));

    let stored = client.update_clue_config(&config).await.unwrap();
    assert_eq!(stored, config);
    let sent = backend.state.recorded("PUT", "/api/config/clue");
    assert_eq!(sent[0].body["custom"], json!(1));

    assert!(client.cluster_status().await.unwrap().configured);
    assert_eq!(client.raw_sut_config("shop").await.unwrap(), "name: shop\n");
}

#[test]
fn test_urls_encode_segments() {
    let client = clue_dashboard::http::client::HttpClient::new(
        "http://deployer:8000/",
        std::time::Duration::from_secs(1),
    )
    .unwrap();
    let url = client.url(&["api", "results", "a b/c"]).unwrap();
    assert_eq!(url.as_str(), "http://deployer:8000/api/results/a%20b%2Fc");

    let plot = client.absolute("/static/plot.png").unwrap();
    assert_eq!(plot.as_str(), "http://deployer:8000/static/plot.png");
}
