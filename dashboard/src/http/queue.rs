//! Deployment queue API

use async_trait::async_trait;
use clue_api::models::{ActiveRun, DeployRequest, DeployerStatus, QueueStatus};

use crate::errors::DashboardError;
use crate::http::client::HttpClient;

/// Queue and deployment endpoints
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// `POST /api/deploy/sut`
    async fn deploy(&self, request: &DeployRequest) -> Result<(), DashboardError>;

    /// `POST /api/queue/enqueue`
    async fn enqueue(&self, requests: &[DeployRequest]) -> Result<(), DashboardError>;

    /// `GET /api/queue/status`
    async fn queue_status(&self) -> Result<QueueStatus, DashboardError>;

    /// `GET /api/queue/current`. A null body or 404 means nothing is running.
    async fn current_run(&self) -> Result<Option<ActiveRun>, DashboardError>;

    /// `POST /api/queue/deploy`
    async fn start_next(&self) -> Result<(), DashboardError>;

    /// `DELETE /api/queue/stop`
    async fn stop(&self) -> Result<(), DashboardError>;

    /// `DELETE /api/queue/remove/{index}`
    async fn remove(&self, index: usize) -> Result<(), DashboardError>;

    /// `DELETE /api/queue/flush`
    async fn flush(&self) -> Result<(), DashboardError>;

    /// `GET /api/status`
    async fn status(&self) -> Result<DeployerStatus, DashboardError>;

    /// `DELETE /api/queue/kill`. Terminates the active run without cleanup.
    async fn kill(&self) -> Result<(), DashboardError>;
}

#[async_trait]
impl QueueApi for HttpClient {
    async fn deploy(&self, request: &DeployRequest) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.post(self.url(&["api", "deploy", "sut"])?, request).await?;
        Ok(())
    }

    async fn enqueue(&self, requests: &[DeployRequest]) -> Result<(), DashboardError> {
        let _: serde_json::Value = self
            .post(self.url(&["api", "queue", "enqueue"])?, requests)
            .await?;
        Ok(())
    }

    async fn queue_status(&self) -> Result<QueueStatus, DashboardError> {
        self.get(self.url(&["api", "queue", "status"])?).await
    }

    async fn current_run(&self) -> Result<Option<ActiveRun>, DashboardError> {
        let value: serde_json::Value =
            match self.get(self.url(&["api", "queue", "current"])?).await {
                Ok(value) => value,
                Err(e) if e.is_not_found() => return Ok(None),
                Err(e) => return Err(e),
            };
        // an idle backend may also answer with an empty object or a message
        if value.get("sut").is_none() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DashboardError::Malformed(format!("current run: {}", e)))
    }

    async fn start_next(&self) -> Result<(), DashboardError> {
        let _: serde_json::Value = self
            .post_empty(self.url(&["api", "queue", "deploy"])?)
            .await?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.delete(self.url(&["api", "queue", "stop"])?).await?;
        Ok(())
    }

    async fn remove(&self, index: usize) -> Result<(), DashboardError> {
        let index = index.to_string();
        let _: serde_json::Value = self
            .delete(self.url(&["api", "queue", "remove", &index])?)
            .await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.delete(self.url(&["api", "queue", "flush"])?).await?;
        Ok(())
    }

    async fn status(&self) -> Result<DeployerStatus, DashboardError> {
        self.get(self.url(&["api", "status"])?).await
    }

    async fn kill(&self) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.delete(self.url(&["api", "queue", "kill"])?).await?;
        Ok(())
    }
}
