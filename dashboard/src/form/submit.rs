//! Experiment submission

use std::slice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clue_api::models::{DeployRequest, NameList};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::DashboardError;
use crate::http::queue::QueueApi;
use crate::state::draft::{DraftConfiguration, DraftStore};
use crate::sync::dashboard::DashboardSync;

/// Endpoint a new experiment is sent to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubmitTarget {
    /// `POST /api/deploy/sut`, starts right away
    #[default]
    Deploy,
    /// `POST /api/queue/enqueue`, waits in the queue
    Enqueue,
}

/// Where the caller should go after a submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Dashboard,
}

/// Build the deploy request for a draft, rejecting drafts that are not ready.
///
/// A draft is ready with a SUT, at least one variant, at least one workload
/// (unless deploy-only) and at least one iteration.
pub fn build_request(draft: &DraftConfiguration) -> Result<DeployRequest, DashboardError> {
    let sut = draft
        .sut
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DashboardError::Validation("no SUT selected".to_string()))?;
    if draft.variants.is_empty() {
        return Err(DashboardError::Validation("select at least one variant".to_string()));
    }
    if draft.workloads.is_empty() && !draft.deploy_only {
        return Err(DashboardError::Validation("select at least one workload".to_string()));
    }
    if draft.iterations < 1 {
        return Err(DashboardError::Validation("iterations must be at least 1".to_string()));
    }

    Ok(DeployRequest {
        sut: sut.to_string(),
        variants: NameList::new(draft.variants.clone()),
        workloads: NameList::new(draft.workloads.clone()),
        n_iterations: draft.iterations,
        deploy_only: draft.deploy_only,
    })
}

pub fn is_ready(draft: &DraftConfiguration) -> bool {
    build_request(draft).is_ok()
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, DashboardError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| DashboardError::State("a submission is already in flight".to_string()))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits drafts (and repeated results) to the backend
pub struct ExperimentForm {
    draft: Arc<DraftStore>,
    api: Arc<dyn QueueApi>,
    sync: Arc<DashboardSync>,
    target: SubmitTarget,
    in_flight: AtomicBool,
}

impl ExperimentForm {
    pub fn new(
        draft: Arc<DraftStore>,
        api: Arc<dyn QueueApi>,
        sync: Arc<DashboardSync>,
        target: SubmitTarget,
    ) -> Self {
        Self {
            draft,
            api,
            sync,
            target,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> SubmitTarget {
        self.target
    }

    pub fn draft(&self) -> &Arc<DraftStore> {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit the current draft
    pub async fn submit(&self) -> Result<Navigation, DashboardError> {
        let request = build_request(&self.draft.get())?;
        self.submit_request(request).await
    }

    /// Submit an already built request
    pub async fn submit_request(&self, request: DeployRequest) -> Result<Navigation, DashboardError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let result = match self.target {
            SubmitTarget::Deploy => self.api.deploy(&request).await,
            SubmitTarget::Enqueue => self.api.enqueue(slice::from_ref(&request)).await,
        };
        if let Err(e) = result {
            error!("Failed to submit {} ({:?}): {}", request.sut, self.target, e);
            return Err(e);
        }

        info!(
            "Submitted {} with variants [{}] and workloads [{}] x{}",
            request.sut, request.variants, request.workloads, request.n_iterations
        );
        self.draft.set_deploying(true);
        if self.target == SubmitTarget::Deploy {
            self.sync.mark_started();
        }
        self.sync.refresh().await;
        Ok(Navigation::Dashboard)
    }
}
