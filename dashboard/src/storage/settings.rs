//! Settings file management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::form::submit::SubmitTarget;
use crate::logs::LogLevel;

/// Dashboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Also write a daily rolling log file under the storage layout
    #[serde(default)]
    pub log_to_file: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Queue and log polling
    #[serde(default)]
    pub polling: PollingSettings,

    /// Lines kept in the local log buffer
    #[serde(default = "default_log_buffer_capacity")]
    pub log_buffer_capacity: usize,

    /// Minutes assumed for a workload without a known duration
    #[serde(default = "default_workload_minutes")]
    pub default_workload_minutes: u64,

    /// Where new experiments are sent
    #[serde(default)]
    pub submit_target: SubmitTarget,

    /// Local status server used in watch mode
    #[serde(default)]
    pub status_server: StatusServerSettings,
}

fn default_true() -> bool {
    true
}

fn default_log_buffer_capacity() -> usize {
    200
}

fn default_workload_minutes() -> u64 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            log_to_file: false,
            backend: BackendSettings::default(),
            polling: PollingSettings::default(),
            log_buffer_capacity: default_log_buffer_capacity(),
            default_workload_minutes: default_workload_minutes(),
            submit_target: SubmitTarget::default(),
            status_server: StatusServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `file`, falling back to defaults when it does not exist
    pub async fn load(file: &File) -> Result<Self, DashboardError> {
        if !file.exists().await {
            info!("No settings file at {}, using defaults", file.path().display());
            return Ok(Self::default());
        }
        file.read_json().await.map_err(|e| {
            warn!("Failed to read settings {}: {}", file.path().display(), e);
            DashboardError::Config(format!("{}: {}", file.path().display(), e))
        })
    }

    pub async fn save(&self, file: &File) -> Result<(), DashboardError> {
        file.write_json(self).await
    }
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the deployer service
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Not applied to the log stream.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Polling intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Enable the queue poller in watch mode
    #[serde(default = "default_true")]
    pub enable_queue_poller: bool,

    /// Queue poll interval in seconds
    #[serde(default = "default_queue_interval")]
    pub queue_interval_secs: u64,

    /// Log poll interval in seconds while the stream is unavailable
    #[serde(default = "default_log_interval")]
    pub log_interval_secs: u64,
}

fn default_queue_interval() -> u64 {
    5
}

fn default_log_interval() -> u64 {
    2
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            enable_queue_poller: true,
            queue_interval_secs: default_queue_interval(),
            log_interval_secs: default_log_interval(),
        }
    }
}

/// Local status server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusServerSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_status_host")]
    pub host: String,

    #[serde(default = "default_status_port")]
    pub port: u16,
}

fn default_status_host() -> String {
    "127.0.0.1".to_string()
}

fn default_status_port() -> u16 {
    7878
}

impl Default for StatusServerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_status_host(),
            port: default_status_port(),
        }
    }
}
