//! Global configuration and cluster API

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clue_api::models::{ClueConfig, ClusterStatus, KubeConfigUpload};

use crate::errors::DashboardError;
use crate::http::client::HttpClient;

/// Configuration endpoints
#[async_trait]
pub trait ConfigApi: Send + Sync {
    /// `GET /api/config/clue`
    async fn clue_config(&self) -> Result<ClueConfig, DashboardError>;

    /// `PUT /api/config/clue`, returns the stored config
    async fn update_clue_config(&self, config: &ClueConfig) -> Result<ClueConfig, DashboardError>;

    /// `POST /api/cluster/config` with the kubeconfig base64 encoded
    async fn upload_kubeconfig(
        &self,
        kubeconfig: &[u8],
        patch_local_cluster: bool,
    ) -> Result<(), DashboardError>;

    /// `GET /api/cluster/status`
    async fn cluster_status(&self) -> Result<ClusterStatus, DashboardError>;
}

#[async_trait]
impl ConfigApi for HttpClient {
    async fn clue_config(&self) -> Result<ClueConfig, DashboardError> {
        self.get(self.url(&["api", "config", "clue"])?).await
    }

    async fn update_clue_config(&self, config: &ClueConfig) -> Result<ClueConfig, DashboardError> {
        self.put(self.url(&["api", "config", "clue"])?, config).await
    }

    async fn upload_kubeconfig(
        &self,
        kubeconfig: &[u8],
        patch_local_cluster: bool,
    ) -> Result<(), DashboardError> {
        let body = KubeConfigUpload {
            kubeconfig: STANDARD.encode(kubeconfig),
            patch_local_cluster,
        };
        let _: serde_json::Value = self.post(self.url(&["api", "cluster", "config"])?, &body).await?;
        Ok(())
    }

    async fn cluster_status(&self) -> Result<ClusterStatus, DashboardError> {
        self.get(self.url(&["api", "cluster", "status"])?).await
    }
}
