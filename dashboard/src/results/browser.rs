//! Results browser
//!
//! Lists finished experiments and acts on single records. Deletion is the
//! one optimistic operation: the row leaves the local list as soon as the
//! backend confirms, without re-fetching.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clue_api::models::{DeployRequest, Metric, Plot, ResultDetails, ResultEntry, ResultStatus};
use futures::StreamExt;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::form::submit::{ExperimentForm, Navigation};
use crate::http::results::{PanelKey, ResultsApi};
use crate::http::ByteStream;
use crate::state::results::{ResultsStore, SortOrder};

/// Metrics and charts for one workload x variant x iteration cell
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultPanel {
    pub metrics: Vec<Metric>,
    pub plots: Vec<Plot>,
}

/// File name a result archive is saved under
pub fn archive_name(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("results-{}.zip", safe)
}

pub struct ResultsBrowser {
    api: Arc<dyn ResultsApi>,
    store: ResultsStore,
    form: Arc<ExperimentForm>,
}

impl ResultsBrowser {
    pub fn new(api: Arc<dyn ResultsApi>, form: Arc<ExperimentForm>) -> Self {
        Self {
            api,
            store: ResultsStore::new(),
            form,
        }
    }

    pub fn store(&self) -> &ResultsStore {
        &self.store
    }

    pub fn entries(&self) -> Vec<ResultEntry> {
        self.store.entries()
    }

    /// Fetch the result list. A failure leaves the list empty.
    pub async fn load(&self) -> Vec<ResultEntry> {
        match self.api.list_results().await {
            Ok(entries) => {
                info!("Loaded {} results", entries.len());
                self.store.replace(entries);
            }
            Err(e) => {
                error!("Failed to load results: {}", e);
                self.store.replace(Vec::new());
            }
        }
        self.store.entries()
    }

    pub fn sort(&self, order: SortOrder) -> Vec<ResultEntry> {
        self.store.sort(order);
        self.store.entries()
    }

    /// Delete on the backend, then drop the row locally
    pub async fn delete(&self, id: &str) -> Result<(), DashboardError> {
        if let Err(e) = self.api.delete_result(id).await {
            error!("Failed to delete result {}: {}", id, e);
            return Err(e);
        }
        if self.store.remove(id).is_none() {
            warn!("Deleted result {} was not in the local list", id);
        }
        info!("Deleted result {}", id);
        Ok(())
    }

    /// Stream the result archive to `dest/results-{id}.zip`
    pub async fn download(&self, id: &str, dest: &Path) -> Result<PathBuf, DashboardError> {
        let mut body = self.api.download_result(id).await?;
        let target = File::new(dest.join(archive_name(id)));

        let out = target.create().await?;
        let written = match write_archive(out, &mut body).await {
            Ok(written) => written,
            Err(e) => {
                // partial archives are useless
                if let Err(cleanup) = target.delete().await {
                    warn!("Failed to remove {}: {}", target.path().display(), cleanup);
                }
                return Err(e);
            }
        };

        info!("Saved {} bytes to {}", written, target.path().display());
        Ok(target.path().to_path_buf())
    }

    /// Ask the backend to launch its results viewer
    pub async fn start_server(&self) -> Result<(), DashboardError> {
        match self.api.start_results_server().await {
            Ok(()) => {
                info!("Results server started");
                Ok(())
            }
            Err(e) => {
                error!("Failed to start results server: {}", e);
                Err(e)
            }
        }
    }

    /// Submit the configuration of a past result as a new experiment
    pub async fn repeat(&self, id: &str) -> Result<Navigation, DashboardError> {
        let entry = match self.store.find(id) {
            Some(entry) => entry,
            None => {
                // not loaded in this view, ask the backend
                let details = self.api.result_details(id).await?;
                return self.form.submit_request(request_from_details(&details)?).await;
            }
        };
        self.form.submit_request(request_from_entry(&entry)?).await
    }

    /// `GET /api/results/{id}`
    pub async fn detail(&self, id: &str) -> Result<ResultDetails, DashboardError> {
        self.api.result_details(id).await
    }

    /// Metrics and plots for one cell. Either part failing leaves it empty.
    pub async fn panel(&self, id: &str, key: &PanelKey) -> ResultPanel {
        let (metrics, plots) = tokio::join!(
            self.api.result_metrics(id, key),
            self.api.result_plots(id, key)
        );
        ResultPanel {
            metrics: metrics.unwrap_or_else(|e| {
                warn!("No metrics for {} {:?}: {}", id, key, e);
                Vec::new()
            }),
            plots: plots.unwrap_or_else(|e| {
                warn!("No plots for {} {:?}: {}", id, key, e);
                Vec::new()
            }),
        }
    }
}

/// Copy the body into `out`. The file is closed when this returns.
async fn write_archive(mut out: fs::File, body: &mut ByteStream) -> Result<usize, DashboardError> {
    let mut written = 0usize;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len();
    }
    out.flush().await?;
    out.sync_all().await?;
    Ok(written)
}

fn request_from_entry(entry: &ResultEntry) -> Result<DeployRequest, DashboardError> {
    if entry.sut.is_empty() || entry.variants.is_empty() {
        return Err(DashboardError::Validation(format!(
            "result {} has no SUT or variants to repeat",
            entry.uuid
        )));
    }
    Ok(DeployRequest {
        sut: entry.sut.clone(),
        variants: entry.variants.clone(),
        workloads: entry.workloads.clone(),
        n_iterations: entry.n_iterations.max(1),
        deploy_only: entry.deploy_only,
    })
}

fn request_from_details(details: &ResultDetails) -> Result<DeployRequest, DashboardError> {
    let entry = ResultEntry {
        uuid: details.uuid.clone(),
        sut: details.sut.clone(),
        variants: details.variants.iter().map(|v| v.name.clone()).collect::<Vec<_>>().into(),
        workloads: details.workloads.iter().map(|w| w.name.clone()).collect::<Vec<_>>().into(),
        timestamp: details.timestamp.clone(),
        n_iterations: details.n_iterations,
        deploy_only: details.deploy_only,
        status: details.status.clone().unwrap_or(ResultStatus::Completed),
    };
    request_from_entry(&entry)
}
