//! In-memory stand-ins for the backend traits

use std::sync::Mutex;

use async_trait::async_trait;
use clue_api::models::{
    ActiveRun, DeployRequest, DeployerStatus, Metric, Plot, QueueStatus, ResultDetails,
    ResultEntry, Sut, SutConfig,
};
use futures::StreamExt;
use clue_dashboard::errors::DashboardError;
use clue_dashboard::http::queue::QueueApi;
use clue_dashboard::http::results::{PanelKey, ResultsApi};
use clue_dashboard::http::suts::CatalogApi;
use clue_dashboard::http::ByteStream;

fn unavailable() -> DashboardError {
    DashboardError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub suts: Vec<Sut>,
    pub config: Option<SutConfig>,
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_suts(&self) -> Result<Vec<Sut>, DashboardError> {
        Ok(self.suts.clone())
    }

    async fn sut_config(&self, _sut: &str) -> Result<SutConfig, DashboardError> {
        self.config.clone().ok_or_else(unavailable)
    }

    async fn raw_sut_config(&self, _sut: &str) -> Result<String, DashboardError> {
        Err(unavailable())
    }

    async fn upload_sut_config(&self, _yaml: &[u8]) -> Result<(), DashboardError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeQueue {
    pub status: Mutex<QueueStatus>,
    pub deployed: Mutex<Vec<DeployRequest>>,
    pub enqueued: Mutex<Vec<DeployRequest>>,
}

impl FakeQueue {
    pub fn set_status(&self, status: QueueStatus) {
        *self.status.lock().unwrap() = status;
    }
}

#[async_trait]
impl QueueApi for FakeQueue {
    async fn deploy(&self, request: &DeployRequest) -> Result<(), DashboardError> {
        self.deployed.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn enqueue(&self, requests: &[DeployRequest]) -> Result<(), DashboardError> {
        self.enqueued.lock().unwrap().extend_from_slice(requests);
        Ok(())
    }

    async fn queue_status(&self) -> Result<QueueStatus, DashboardError> {
        Ok(self.status.lock().unwrap().clone())
    }

    async fn current_run(&self) -> Result<Option<ActiveRun>, DashboardError> {
        Ok(None)
    }

    async fn start_next(&self) -> Result<(), DashboardError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), DashboardError> {
        Ok(())
    }

    async fn remove(&self, index: usize) -> Result<(), DashboardError> {
        let mut status = self.status.lock().unwrap();
        if index >= status.queue.len() {
            return Err(DashboardError::Status {
                status: 404,
                body: "no such entry".to_string(),
            });
        }
        status.queue.remove(index);
        status.queue_size = status.queue.len();
        Ok(())
    }

    async fn flush(&self) -> Result<(), DashboardError> {
        self.set_status(QueueStatus::default());
        Ok(())
    }

    async fn status(&self) -> Result<DeployerStatus, DashboardError> {
        Ok(DeployerStatus::default())
    }

    async fn kill(&self) -> Result<(), DashboardError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeResults {
    pub entries: Vec<ResultEntry>,
    pub fail_delete: bool,
    pub deleted: Mutex<Vec<String>>,
    /// Chunks served by `download_result`; no archive when empty
    pub archive: Vec<Vec<u8>>,
    /// End the archive stream with an error after the chunks
    pub archive_breaks: bool,
}

#[async_trait]
impl ResultsApi for FakeResults {
    async fn list_results(&self) -> Result<Vec<ResultEntry>, DashboardError> {
        Ok(self.entries.clone())
    }

    async fn result_details(&self, _id: &str) -> Result<ResultDetails, DashboardError> {
        Err(unavailable())
    }

    async fn delete_result(&self, id: &str) -> Result<(), DashboardError> {
        if self.fail_delete {
            return Err(unavailable());
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn download_result(&self, _id: &str) -> Result<ByteStream, DashboardError> {
        if self.archive.is_empty() {
            return Err(unavailable());
        }
        let mut chunks: Vec<Result<Vec<u8>, DashboardError>> =
            self.archive.iter().cloned().map(Ok).collect();
        if self.archive_breaks {
            chunks.push(Err(unavailable()));
        }
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn result_metrics(&self, _id: &str, _key: &PanelKey) -> Result<Vec<Metric>, DashboardError> {
        Err(unavailable())
    }

    async fn result_plots(&self, _id: &str, _key: &PanelKey) -> Result<Vec<Plot>, DashboardError> {
        Ok(Vec::new())
    }

    async fn start_results_server(&self) -> Result<(), DashboardError> {
        Ok(())
    }
}
