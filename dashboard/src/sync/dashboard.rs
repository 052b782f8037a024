//! Queue/dashboard synchroniser
//!
//! Keeps [`QueueStore`] in line with the backend. Queue mutations are never
//! applied locally: every action is followed by a full refresh.

use std::sync::{Arc, Mutex};

use clue_api::models::{DeployerStatus, QueueStatus};
use tracing::{debug, error, info, warn};

use crate::errors::DashboardError;
use crate::http::queue::QueueApi;
use crate::state::draft::DraftStore;
use crate::state::queue::{QueueSnapshot, QueueStore};
use crate::sync::phase::{PhaseEvent, RunPhase, RunPhaseMachine, ServerPhase};

pub struct DashboardSync {
    api: Arc<dyn QueueApi>,
    queue: Arc<QueueStore>,
    draft: Arc<DraftStore>,
    phase: Mutex<RunPhaseMachine>,
}

impl DashboardSync {
    pub fn new(api: Arc<dyn QueueApi>, queue: Arc<QueueStore>, draft: Arc<DraftStore>) -> Self {
        Self {
            api,
            queue,
            draft,
            phase: Mutex::new(RunPhaseMachine::new()),
        }
    }

    pub fn queue(&self) -> &Arc<QueueStore> {
        &self.queue
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.queue.snapshot()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase.lock().unwrap_or_else(|e| e.into_inner()).phase()
    }

    pub fn phase_error(&self) -> Option<String> {
        self.phase
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .error()
            .map(str::to_string)
    }

    /// Fetch queue status and the current run concurrently and apply them.
    ///
    /// Returns false when a newer refresh already landed. Fetch failures
    /// degrade to an empty queue / no run; a failed current-run fetch does not
    /// move the run phase.
    pub async fn refresh(&self) -> bool {
        let token = self.queue.issue_token();
        let (status, current) = tokio::join!(self.api.queue_status(), self.api.current_run());

        let status = status.unwrap_or_else(|e| {
            warn!("Failed to fetch queue status: {}", e);
            QueueStatus::default()
        });
        let (run, run_known) = match current {
            Ok(run) => (run, true),
            Err(e) => {
                warn!("Failed to fetch current run: {}", e);
                (None, false)
            }
        };

        let applied = self.queue.apply(token, status, run.clone());
        if !applied {
            return false;
        }
        debug!("Applied queue refresh {}", token);

        if run_known {
            let server = ServerPhase::from_run(run.as_ref());
            let phase = {
                let mut fsm = self.phase.lock().unwrap_or_else(|e| e.into_inner());
                if let Err(e) = fsm.observe(&server) {
                    warn!("Ignoring server status {:?}: {}", server, e);
                }
                fsm.phase()
            };
            // a run still winding down after a local stop is not deploying
            self.draft.set_deploying(run.is_some() && phase != RunPhase::Stopped);
        }
        true
    }

    /// Record that a run was started by this client
    pub fn mark_started(&self) {
        self.transition(PhaseEvent::Start);
    }

    fn transition(&self, event: PhaseEvent) {
        let mut fsm = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = fsm.process(event) {
            warn!("{}", e);
        }
    }

    /// Move the paged view forward
    pub fn next(&self) -> usize {
        self.queue.next()
    }

    /// Move the paged view back
    pub fn prev(&self) -> usize {
        self.queue.prev()
    }

    /// `POST /api/queue/deploy`
    pub async fn start_next(&self) -> Result<(), DashboardError> {
        let result = self.api.start_next().await;
        match &result {
            Ok(()) => {
                info!("Deployment worker started");
                self.mark_started();
                self.draft.set_deploying(true);
            }
            Err(e) => error!("Failed to start next deployment: {}", e),
        }
        self.refresh().await;
        result
    }

    /// `DELETE /api/queue/stop`
    pub async fn stop(&self) -> Result<(), DashboardError> {
        let result = self.api.stop().await;
        match &result {
            Ok(()) => {
                info!("Deployment stopped");
                self.transition(PhaseEvent::Stop);
                self.draft.set_deploying(false);
            }
            Err(e) => error!("Failed to stop deployment: {}", e),
        }
        self.refresh().await;
        result
    }

    /// `DELETE /api/queue/kill`
    pub async fn kill(&self) -> Result<(), DashboardError> {
        let result = self.api.kill().await;
        match &result {
            Ok(()) => {
                warn!("Deployment killed");
                self.transition(PhaseEvent::Stop);
                self.draft.set_deploying(false);
            }
            Err(e) => error!("Failed to kill deployment: {}", e),
        }
        self.refresh().await;
        result
    }

    /// `GET /api/status`
    pub async fn deployer_status(&self) -> Result<DeployerStatus, DashboardError> {
        self.api.status().await
    }

    /// `DELETE /api/queue/remove/{index}`
    pub async fn remove(&self, index: usize) -> Result<(), DashboardError> {
        let result = self.api.remove(index).await;
        match &result {
            Ok(()) => info!("Removed queue entry {}", index),
            Err(e) => error!("Failed to remove queue entry {}: {}", index, e),
        }
        self.refresh().await;
        result
    }

    /// Remove the entry under the cursor
    pub async fn remove_current(&self) -> Result<(), DashboardError> {
        let snapshot = self.queue.snapshot();
        if snapshot.entries.is_empty() {
            return Err(DashboardError::Validation("queue is empty".to_string()));
        }
        self.remove(snapshot.cursor).await
    }

    /// `DELETE /api/queue/flush`
    pub async fn flush(&self) -> Result<(), DashboardError> {
        let result = self.api.flush().await;
        match &result {
            Ok(()) => info!("Queue flushed"),
            Err(e) => error!("Failed to flush queue: {}", e),
        }
        self.refresh().await;
        result
    }
}
