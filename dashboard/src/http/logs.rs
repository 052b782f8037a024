//! Deployment log API

use async_trait::async_trait;
use clue_api::models::{LogsResponse, MessageResponse};
use tracing::warn;

use crate::errors::DashboardError;
use crate::http::client::HttpClient;
use crate::http::{body_stream, ByteStream};

/// Log endpoints
#[async_trait]
pub trait LogsApi: Send + Sync {
    /// `GET /api/logs`, flattened to lines
    async fn fetch_logs(&self) -> Result<Vec<String>, DashboardError>;

    /// `DELETE /api/logs`
    async fn clear_logs(&self) -> Result<(), DashboardError>;

    /// `GET /api/logs/stream` as raw event-stream bytes
    async fn open_log_stream(&self) -> Result<ByteStream, DashboardError>;
}

#[async_trait]
impl LogsApi for HttpClient {
    async fn fetch_logs(&self) -> Result<Vec<String>, DashboardError> {
        let response: LogsResponse = self.get(self.url(&["api", "logs"])?).await?;
        if let Some(err) = &response.error {
            warn!("Backend reported a log buffer error: {}", err);
        }
        Ok(response.logs.into_lines())
    }

    async fn clear_logs(&self) -> Result<(), DashboardError> {
        let response: MessageResponse = self.delete(self.url(&["api", "logs"])?).await?;
        // the backend answers 200 with {"error": ..} when clearing fails
        match response.error {
            Some(err) => Err(DashboardError::Backend(err)),
            None => Ok(()),
        }
    }

    async fn open_log_stream(&self) -> Result<ByteStream, DashboardError> {
        let response = self
            .get_event_stream(self.url(&["api", "logs", "stream"])?)
            .await?;
        Ok(body_stream(response))
    }
}
