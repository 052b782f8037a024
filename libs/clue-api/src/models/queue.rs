use serde::{Deserialize, Serialize};

use super::NameList;

fn default_iterations() -> u32 {
    1
}

/// Body of `POST /api/deploy/sut`, and the element type of `POST /api/queue/enqueue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub sut: String,
    pub variants: NameList,
    pub workloads: NameList,
    #[serde(default = "default_iterations")]
    pub n_iterations: u32,
    #[serde(default)]
    pub deploy_only: bool,
}

/// A queued deploy request as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub sut: String,
    #[serde(default)]
    pub variants: NameList,
    #[serde(default)]
    pub workloads: NameList,
    #[serde(default = "default_iterations", alias = "iterations")]
    pub n_iterations: u32,
    #[serde(default)]
    pub deploy_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<DeployRequest> for QueueEntry {
    fn from(req: DeployRequest) -> Self {
        Self {
            sut: req.sut,
            variants: req.variants,
            workloads: req.workloads,
            n_iterations: req.n_iterations,
            deploy_only: req.deploy_only,
            status: None,
        }
    }
}

/// The run the backend is currently executing (`GET /api/queue/current`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRun {
    #[serde(flatten)]
    pub entry: QueueEntry,
    /// Server-side phase, e.g. `running`, `completed`, `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

/// `GET /api/queue/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    #[serde(default)]
    pub queue: Vec<QueueEntry>,
    #[serde(default)]
    pub queue_size: usize,
}

/// `GET /api/status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployerStatus {
    #[serde(default)]
    pub is_deploying: bool,
}
