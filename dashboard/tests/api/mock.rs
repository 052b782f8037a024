//! In-process deployer backend

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub requests: Mutex<Vec<Recorded>>,
    pub suts: Mutex<Value>,
    pub queue: Mutex<Vec<Value>>,
    pub current: Mutex<Option<Value>>,
    pub logs: Mutex<Vec<String>>,
    /// `data:` payloads sent by the log stream before it closes
    pub stream_events: Mutex<Vec<String>>,
    /// Replaces `logs` when the stream is opened
    pub logs_after_stream: Mutex<Option<Vec<String>>>,
    pub stream_unavailable: Mutex<bool>,
    pub clear_reports_error: Mutex<bool>,
    pub results: Mutex<Vec<Value>>,
    /// Answer `GET /api/results` with `{"results": [...]}`
    pub results_wrapped: Mutex<bool>,
    pub archive: Mutex<Vec<u8>>,
}

impl MockState {
    fn record(&self, method: &'static str, path: impl Into<String>, body: Value) {
        self.requests.lock().unwrap().push(Recorded {
            method,
            path: path.into(),
            body,
        });
    }

    pub fn recorded(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        *state.suts.lock().unwrap() = json!({
            "suts": [{
                "name": "shop",
                "variants": [{"name": "base"}, {"name": "scaled", "autoscaling": "cpu"}],
                "workloads": [
                    {"name": "shaped", "timeout_duration": 180},
                    {"name": "fixed"}
                ]
            }]
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }
}

type Shared = State<Arc<MockState>>;

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/suts", get(list_suts).post(upload_sut))
        .route("/api/suts/raw/{sut}", get(raw_sut))
        .route("/api/config/sut/{sut}", get(sut_config))
        .route("/api/config/clue", get(clue_config).put(update_clue_config))
        .route("/api/cluster/config", post(upload_kubeconfig))
        .route("/api/cluster/status", get(cluster_status))
        .route("/api/deploy/sut", post(deploy))
        .route("/api/queue/enqueue", post(enqueue))
        .route("/api/queue/status", get(queue_status))
        .route("/api/queue/current", get(current))
        .route("/api/queue/deploy", post(start_next))
        .route("/api/queue/stop", delete(stop))
        .route("/api/queue/remove/{index}", delete(remove))
        .route("/api/queue/flush", delete(flush))
        .route("/api/queue/kill", delete(kill))
        .route("/api/status", get(deployer_status))
        .route("/api/logs", get(logs).delete(clear_logs))
        .route("/api/logs/stream", get(log_stream))
        .route("/api/results", get(results))
        .route("/api/results/startResultsServer", post(start_results_server))
        .route("/api/results/{id}", get(result_details).delete(delete_result))
        .route("/api/results/{id}/download", get(download))
        .route("/api/results/{id}/metrics", get(metrics))
        .route("/api/results/{id}/plots", get(plots))
        .with_state(state)
}

async fn list_suts(State(s): Shared) -> Json<Value> {
    Json(s.suts.lock().unwrap().clone())
}

async fn upload_sut(State(s): Shared, Json(body): Json<Value>) -> Json<Value> {
    s.record("POST", "/api/suts", body);
    Json(json!({"message": "uploaded"}))
}

async fn raw_sut(Path(sut): Path<String>) -> String {
    format!("name: {}\n", sut)
}

async fn sut_config(Path(sut): Path<String>) -> impl IntoResponse {
    if sut != "shop" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "unknown"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "sut": "shop",
            "wait_before_workloads": 60,
            "wait_after_workloads": 60,
            "variants": [],
            "workloads": [{"name": "shaped", "timeout_duration": 240}]
        })),
    )
}

async fn clue_config() -> Json<Value> {
    Json(json!({"experiment_timeout": 30, "prometheus_url": "http://prom:9090", "custom": 1}))
}

async fn update_clue_config(State(s): Shared, Json(body): Json<Value>) -> Json<Value> {
    s.record("PUT", "/api/config/clue", body.clone());
    Json(body)
}

async fn upload_kubeconfig(State(s): Shared, Json(body): Json<Value>) -> Json<Value> {
    s.record("POST", "/api/cluster/config", body);
    Json(json!({"message": "stored"}))
}

async fn cluster_status() -> Json<Value> {
    Json(json!({"configured": true, "patch_local_cluster": false}))
}

async fn deploy(State(s): Shared, Json(body): Json<Value>) -> Json<Value> {
    s.record("POST", "/api/deploy/sut", body.clone());
    let mut run = body;
    run["phase"] = json!("running");
    *s.current.lock().unwrap() = Some(run);
    Json(json!({"message": "deploying"}))
}

async fn enqueue(State(s): Shared, Json(body): Json<Value>) -> Json<Value> {
    s.record("POST", "/api/queue/enqueue", body.clone());
    if let Value::Array(entries) = body {
        s.queue.lock().unwrap().extend(entries);
    }
    Json(json!({"message": "queued"}))
}

async fn queue_status(State(s): Shared) -> Json<Value> {
    let queue = s.queue.lock().unwrap().clone();
    Json(json!({"queue_size": queue.len(), "queue": queue}))
}

async fn current(State(s): Shared) -> impl IntoResponse {
    match s.current.lock().unwrap().clone() {
        Some(run) => (StatusCode::OK, Json(run)),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "no deployment"}))),
    }
}

async fn start_next(State(s): Shared) -> impl IntoResponse {
    s.record("POST", "/api/queue/deploy", Value::Null);
    let mut queue = s.queue.lock().unwrap();
    if queue.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "queue empty"})));
    }
    let mut run = queue.remove(0);
    run["phase"] = json!("running");
    *s.current.lock().unwrap() = Some(run);
    (StatusCode::OK, Json(json!({"message": "started"})))
}

async fn stop(State(s): Shared) -> Json<Value> {
    s.record("DELETE", "/api/queue/stop", Value::Null);
    *s.current.lock().unwrap() = None;
    Json(json!({"message": "stopped"}))
}

async fn remove(State(s): Shared, Path(index): Path<usize>) -> impl IntoResponse {
    s.record("DELETE", format!("/api/queue/remove/{}", index), Value::Null);
    let mut queue = s.queue.lock().unwrap();
    if index >= queue.len() {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "no such entry"})));
    }
    queue.remove(index);
    (StatusCode::OK, Json(json!({"message": "removed"})))
}

async fn flush(State(s): Shared) -> Json<Value> {
    s.record("DELETE", "/api/queue/flush", Value::Null);
    s.queue.lock().unwrap().clear();
    Json(json!({"message": "flushed"}))
}

async fn kill(State(s): Shared) -> Json<Value> {
    s.record("DELETE", "/api/queue/kill", Value::Null);
    *s.current.lock().unwrap() = None;
    Json(json!({"message": "killed"}))
}

async fn deployer_status(State(s): Shared) -> Json<Value> {
    Json(json!({"is_deploying": s.current.lock().unwrap().is_some()}))
}

async fn logs(State(s): Shared) -> Json<Value> {
    let logs = s.logs.lock().unwrap().clone();
    Json(json!({"count": logs.len(), "logs": logs}))
}

async fn clear_logs(State(s): Shared) -> Json<Value> {
    s.record("DELETE", "/api/logs", Value::Null);
    if *s.clear_reports_error.lock().unwrap() {
        return Json(json!({"error": "log buffer locked"}));
    }
    s.logs.lock().unwrap().clear();
    Json(json!({"message": "cleared"}))
}

async fn log_stream(State(s): Shared) -> impl IntoResponse {
    if *s.stream_unavailable.lock().unwrap() {
        return (StatusCode::SERVICE_UNAVAILABLE, [(header::CONTENT_TYPE, "text/plain")], String::new());
    }
    if let Some(logs) = s.logs_after_stream.lock().unwrap().take() {
        *s.logs.lock().unwrap() = logs;
    }
    let body: String = s
        .stream_events
        .lock()
        .unwrap()
        .iter()
        .map(|data| format!("data: {}\n\n", data))
        .collect();
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/event-stream")], body)
}

fn has_id(result: &Value, id: &str) -> bool {
    result.get("uuid").or_else(|| result.get("id")) == Some(&json!(id))
}

async fn results(State(s): Shared) -> Json<Value> {
    let results = Value::Array(s.results.lock().unwrap().clone());
    if *s.results_wrapped.lock().unwrap() {
        return Json(json!({ "results": results }));
    }
    Json(results)
}

async fn start_results_server(State(s): Shared) -> Json<Value> {
    s.record("POST", "/api/results/startResultsServer", Value::Null);
    Json(json!({"message": "results server started"}))
}

async fn result_details(State(s): Shared, Path(id): Path<String>) -> impl IntoResponse {
    let results = s.results.lock().unwrap();
    match results.iter().find(|r| has_id(r, &id)) {
        Some(r) => (
            StatusCode::OK,
            Json(json!({
                "uuid": id,
                "sut": r["sut"],
                "timestamp": r["timestamp"],
                "n_iterations": r["n_iterations"],
                "deploy_only": false,
                "status": r["status"],
                "variants": [{"name": "base"}],
                "workloads": [{"name": "shaped", "timeout_duration": 180}],
                "configs": {"env_config": {"namespace": "bench"}, "clue_config": {}, "sut_config": {}}
            })),
        ),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"}))),
    }
}

async fn delete_result(State(s): Shared, Path(id): Path<String>) -> impl IntoResponse {
    s.record("DELETE", format!("/api/results/{}", id), Value::Null);
    let mut results = s.results.lock().unwrap();
    let before = results.len();
    results.retain(|r| !has_id(r, &id));
    if results.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"})));
    }
    (StatusCode::OK, Json(json!({"message": "deleted"})))
}

async fn download(State(s): Shared, Path(id): Path<String>) -> impl IntoResponse {
    let known = s.results.lock().unwrap().iter().any(|r| has_id(r, &id));
    if !known {
        return (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "application/json")], Vec::new());
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/zip")],
        s.archive.lock().unwrap().clone(),
    )
}

async fn metrics(
    Path(_id): Path<String>,
    Query(q): Query<std::collections::HashMap<String, String>>,
) -> Json<Value> {
    Json(json!([{
        "name": format!("p95 latency {}/{}/{}", q["workload"], q["variant"], q["iteration"]),
        "value": 120.5,
        "unit": "ms"
    }]))
}

async fn plots(Path(id): Path<String>) -> Json<Value> {
    Json(json!([{
        "id": "cpu",
        "name": "CPU",
        "image_url": format!("/api/results/{}/plots/cpu.png", id)
    }]))
}
