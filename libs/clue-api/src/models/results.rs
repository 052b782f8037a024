use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{NameList, Variant, Workload};

/// Lifecycle status of a recorded experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Started,
    Completed,
    Failed,
    Stopped,
    Other(String),
}

impl ResultStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResultStatus::Started => "STARTED",
            ResultStatus::Completed => "COMPLETED",
            ResultStatus::Failed => "FAILED",
            ResultStatus::Stopped => "STOPPED",
            ResultStatus::Other(s) => s,
        }
    }

    /// Ordering used when sorting by status
    pub fn rank(&self) -> u8 {
        match self {
            ResultStatus::Started => 0,
            ResultStatus::Completed => 1,
            ResultStatus::Failed => 2,
            ResultStatus::Stopped => 3,
            ResultStatus::Other(_) => 4,
        }
    }
}

impl From<&str> for ResultStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "STARTED" => ResultStatus::Started,
            "COMPLETED" => ResultStatus::Completed,
            "FAILED" => ResultStatus::Failed,
            "STOPPED" => ResultStatus::Stopped,
            _ => ResultStatus::Other(s.to_string()),
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResultStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResultStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ResultStatus::from(s.as_str()))
    }
}

/// One row of `GET /api/results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    #[serde(alias = "id")]
    pub uuid: String,
    #[serde(default)]
    pub sut: String,
    #[serde(default)]
    pub variants: NameList,
    #[serde(default)]
    pub workloads: NameList,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub n_iterations: u32,
    #[serde(default)]
    pub deploy_only: bool,
    pub status: ResultStatus,
}

/// `GET /api/results` answers with a bare array on current backends and with
/// `{ "results": [...] }` on older ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResultListResponse {
    List(Vec<ResultEntry>),
    Wrapped { results: Vec<ResultEntry> },
}

impl ResultListResponse {
    pub fn into_results(self) -> Vec<ResultEntry> {
        match self {
            ResultListResponse::List(results) => results,
            ResultListResponse::Wrapped { results } => results,
        }
    }
}

/// Configuration snapshots recorded with a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configs {
    #[serde(default)]
    pub env_config: serde_json::Value,
    #[serde(default)]
    pub clue_config: serde_json::Value,
    #[serde(default)]
    pub sut_config: serde_json::Value,
}

/// `GET /api/results/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDetails {
    #[serde(alias = "id")]
    pub uuid: String,
    #[serde(default)]
    pub sut: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub n_iterations: u32,
    #[serde(default)]
    pub deploy_only: bool,
    #[serde(default)]
    pub status: Option<ResultStatus>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub workloads: Vec<Workload>,
    #[serde(default)]
    pub configs: Configs,
}

/// A scalar metric for one (workload, variant, iteration) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A chart asset. `image_url` is opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
}
