//! SUT catalog API

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clue_api::models::{Sut, SutConfig, SutConfigUpload, SutListResponse};

use crate::errors::DashboardError;
use crate::http::client::HttpClient;

/// Catalog endpoints
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /api/suts`
    async fn list_suts(&self) -> Result<Vec<Sut>, DashboardError>;

    /// `GET /api/config/sut/{name}`
    async fn sut_config(&self, sut: &str) -> Result<SutConfig, DashboardError>;

    /// `GET /api/suts/raw/{sut}`
    async fn raw_sut_config(&self, sut: &str) -> Result<String, DashboardError>;

    /// `POST /api/suts` with the YAML document base64 encoded
    async fn upload_sut_config(&self, yaml: &[u8]) -> Result<(), DashboardError>;
}

#[async_trait]
impl CatalogApi for HttpClient {
    async fn list_suts(&self) -> Result<Vec<Sut>, DashboardError> {
        let response: SutListResponse = self.get(self.url(&["api", "suts"])?).await?;
        Ok(response.into_suts())
    }

    async fn sut_config(&self, sut: &str) -> Result<SutConfig, DashboardError> {
        self.get(self.url(&["api", "config", "sut", sut])?).await
    }

    async fn raw_sut_config(&self, sut: &str) -> Result<String, DashboardError> {
        self.get_text(self.url(&["api", "suts", "raw", sut])?).await
    }

    async fn upload_sut_config(&self, yaml: &[u8]) -> Result<(), DashboardError> {
        let body = SutConfigUpload {
            sut_config: STANDARD.encode(yaml),
        };
        let _: serde_json::Value = self.post(self.url(&["api", "suts"])?, &body).await?;
        Ok(())
    }
}
