//! API models

mod config;
mod logs;
mod names;
mod queue;
mod results;
mod sut;

pub use config::{ClueConfig, ClusterStatus, KubeConfigUpload, MessageResponse};
pub use logs::{LogLines, LogsResponse, StreamPayload};
pub use names::NameList;
pub use queue::{ActiveRun, DeployRequest, DeployerStatus, QueueEntry, QueueStatus};
pub use results::{
    Configs, Metric, Plot, ResultDetails, ResultEntry, ResultListResponse, ResultStatus,
};
pub use sut::{Sut, SutConfig, SutConfigUpload, SutListResponse, Variant, Workload};
