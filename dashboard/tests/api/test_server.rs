//! Local status server routes

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use clue_dashboard::server::serve::router;
use clue_dashboard::server::state::ServerState;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::app;
use crate::mock::MockBackend;

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_routes() {
    let backend = MockBackend::start().await;
    *backend.state.queue.lock().unwrap() =
        vec![serde_json::json!({"sut": "shop", "variants": "base", "workloads": "shaped"})];
    let app = app(&backend);
    app.sync.refresh().await;
    app.log_buffer.push("hello");

    let state = Arc::new(ServerState::new(
        app.sync.clone(),
        app.draft.clone(),
        app.streamer.clone(),
    ));

    let (status, body) = get_json(router(state.clone()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (_, body) = get_json(router(state.clone()), "/dashboard").await;
    assert_eq!(body["phase"], "idle");
    assert_eq!(body["deploying"], false);
    assert_eq!(body["entries"][0]["sut"], "shop");
    assert_eq!(body["cursor"], 0);

    let (_, body) = get_json(router(state.clone()), "/logs").await;
    assert_eq!(body["state"], "disconnected");
    assert_eq!(body["lines"][0], "hello");
    assert_eq!(body["capacity"], 200);

    let (status, _) = get_json(router(state), "/version").await;
    assert_eq!(status, StatusCode::OK);
}
