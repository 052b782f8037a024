use serde::{Deserialize, Serialize};

/// Global deployer configuration (`GET/PUT /api/config/clue`).
///
/// Only the commonly edited fields are typed; everything else is carried
/// through `extra` so a round trip does not drop keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClueConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_public_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_platform_arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_platform_arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_registry_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_utilization: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST /api/cluster/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeConfigUpload {
    /// Base64 encoded kubeconfig
    pub kubeconfig: String,
    #[serde(default)]
    pub patch_local_cluster: bool,
}

/// `GET /api/cluster/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub patch_local_cluster: bool,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
