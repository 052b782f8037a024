//! HTTP request handlers

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::server::state::ServerState;
use crate::state::queue::QueueSnapshot;
use crate::sync::phase::RunPhase;
use crate::utils::{version_info, VersionInfo};
use crate::workers::log_stream::StreamState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "clue-dashboard".to_string(),
        version: version_info().version,
    })
}

/// Version handler
pub async fn version_handler() -> Json<VersionInfo> {
    Json(version_info())
}

/// Dashboard view
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub queue: QueueSnapshot,
    pub phase: RunPhase,
    pub phase_error: Option<String>,
    pub deploying: bool,
}

/// Dashboard handler
pub async fn dashboard_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(DashboardResponse {
        queue: state.sync.snapshot(),
        phase: state.sync.phase(),
        phase_error: state.sync.phase_error(),
        deploying: state.draft.is_deploying(),
    })
}

/// Log view
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub state: StreamState,
    pub capacity: usize,
    pub lines: Vec<String>,
    pub last_error: Option<String>,
}

/// Logs handler
pub async fn logs_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let buffer = state.streamer.buffer();
    Json(LogsResponse {
        state: state.streamer.state(),
        capacity: buffer.capacity(),
        lines: buffer.lines(),
        last_error: state.streamer.last_error(),
    })
}
