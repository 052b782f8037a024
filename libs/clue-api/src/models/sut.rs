use serde::{Deserialize, Serialize};

/// A deployable variant of a SUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_autoscale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colocated_workload: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critical_services: Vec<String>,
}

impl Variant {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            target_branch: None,
            autoscaling: None,
            max_autoscale: None,
            colocated_workload: None,
            critical_services: Vec::new(),
        }
    }
}

/// A load profile that can be run against a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Run time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub workload_settings: serde_json::Map<String, serde_json::Value>,
}

impl Workload {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            timeout_duration: None,
            workload_settings: serde_json::Map::new(),
        }
    }
}

/// A system under test as listed by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sut {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub workloads: Vec<Workload>,
}

/// `GET /api/suts` answers with a bare array on current backends and with
/// `{ "suts": [...] }` on older ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SutListResponse {
    List(Vec<Sut>),
    Wrapped { suts: Vec<Sut> },
}

impl SutListResponse {
    pub fn into_suts(self) -> Vec<Sut> {
        match self {
            SutListResponse::List(suts) => suts,
            SutListResponse::Wrapped { suts } => suts,
        }
    }
}

/// Subset of the SUT configuration needed for run time estimates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SutConfig {
    #[serde(default)]
    pub sut: Option<String>,
    /// Seconds to wait before the workloads start
    #[serde(default)]
    pub wait_before_workloads: u64,
    /// Seconds to wait after the workloads finish
    #[serde(default)]
    pub wait_after_workloads: u64,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub workloads: Vec<Workload>,
}

impl SutConfig {
    pub fn workload(&self, name: &str) -> Option<&Workload> {
        self.workloads.iter().find(|w| w.name == name)
    }
}

/// Body of `POST /api/suts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SutConfigUpload {
    /// Base64 encoded YAML document
    pub sut_config: String,
}
