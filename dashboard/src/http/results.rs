//! Results API

use async_trait::async_trait;
use clue_api::models::{Metric, Plot, ResultDetails, ResultEntry, ResultListResponse};

use crate::errors::DashboardError;
use crate::http::client::HttpClient;
use crate::http::{body_stream, ByteStream};

/// Identifies one cell of a result: workload x variant x iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelKey {
    pub workload: String,
    pub variant: String,
    pub iteration: u32,
}

impl PanelKey {
    fn query(&self) -> [(&'static str, String); 3] {
        [
            ("workload", self.workload.clone()),
            ("variant", self.variant.clone()),
            ("iteration", self.iteration.to_string()),
        ]
    }
}

/// Result endpoints
#[async_trait]
pub trait ResultsApi: Send + Sync {
    /// `GET /api/results`
    async fn list_results(&self) -> Result<Vec<ResultEntry>, DashboardError>;

    /// `GET /api/results/{id}`
    async fn result_details(&self, id: &str) -> Result<ResultDetails, DashboardError>;

    /// `DELETE /api/results/{id}`
    async fn delete_result(&self, id: &str) -> Result<(), DashboardError>;

    /// `GET /api/results/{id}/download` as a ZIP byte stream
    async fn download_result(&self, id: &str) -> Result<ByteStream, DashboardError>;

    /// `GET /api/results/{id}/metrics`
    async fn result_metrics(&self, id: &str, key: &PanelKey) -> Result<Vec<Metric>, DashboardError>;

    /// `GET /api/results/{id}/plots`
    async fn result_plots(&self, id: &str, key: &PanelKey) -> Result<Vec<Plot>, DashboardError>;

    /// `POST /api/results/startResultsServer`
    async fn start_results_server(&self) -> Result<(), DashboardError>;
}

#[async_trait]
impl ResultsApi for HttpClient {
    async fn list_results(&self) -> Result<Vec<ResultEntry>, DashboardError> {
        let response: ResultListResponse = self.get(self.url(&["api", "results"])?).await?;
        Ok(response.into_results())
    }

    async fn result_details(&self, id: &str) -> Result<ResultDetails, DashboardError> {
        self.get(self.url(&["api", "results", id])?).await
    }

    async fn delete_result(&self, id: &str) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.delete(self.url(&["api", "results", id])?).await?;
        Ok(())
    }

    async fn download_result(&self, id: &str) -> Result<ByteStream, DashboardError> {
        let response = self
            .get_raw(self.url(&["api", "results", id, "download"])?)
            .await?;
        Ok(body_stream(response))
    }

    async fn result_metrics(&self, id: &str, key: &PanelKey) -> Result<Vec<Metric>, DashboardError> {
        let mut url = self.url(&["api", "results", id, "metrics"])?;
        url.query_pairs_mut().extend_pairs(key.query());
        self.get(url).await
    }

    async fn result_plots(&self, id: &str, key: &PanelKey) -> Result<Vec<Plot>, DashboardError> {
        let mut url = self.url(&["api", "results", id, "plots"])?;
        url.query_pairs_mut().extend_pairs(key.query());
        self.get(url).await
    }

    async fn start_results_server(&self) -> Result<(), DashboardError> {
        let _: serde_json::Value = self
            .post_empty(self.url(&["api", "results", "startResultsServer"])?)
            .await?;
        Ok(())
    }
}
