//! Application configuration options

use std::time::Duration;

use crate::form::submit::SubmitTarget;
use crate::state::log_buffer::DEFAULT_CAPACITY;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::workers::{log_stream, poller};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Backend API
    pub backend: BackendOptions,

    /// Storage configuration
    pub storage: StorageOptions,

    /// Enable the local status server in watch mode
    pub enable_status_server: bool,

    /// Enable the queue poller in watch mode
    pub enable_poller: bool,

    /// Server configuration
    pub server: ServerOptions,

    /// Poller worker options
    pub poller: poller::Options,

    /// Log streamer options
    pub log_stream: log_stream::Options,

    /// Lines kept in the local log buffer
    pub log_buffer_capacity: usize,

    /// Minutes assumed for a workload without a known duration
    pub default_workload_minutes: u64,

    /// Where submissions go
    pub submit_target: SubmitTarget,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            backend: BackendOptions::default(),
            storage: StorageOptions::default(),
            enable_status_server: true,
            enable_poller: true,
            server: ServerOptions::default(),
            poller: poller::Options::default(),
            log_stream: log_stream::Options::default(),
            log_buffer_capacity: DEFAULT_CAPACITY,
            default_workload_minutes: 3,
            submit_target: SubmitTarget::default(),
        }
    }
}

impl AppOptions {
    /// Derive options from a settings file
    pub fn from_settings(settings: &Settings, layout: StorageLayout) -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            backend: BackendOptions {
                base_url: settings.backend.base_url.clone(),
                request_timeout: settings.backend.request_timeout(),
            },
            storage: StorageOptions { layout },
            enable_status_server: settings.status_server.enabled,
            enable_poller: settings.polling.enable_queue_poller,
            server: ServerOptions {
                host: settings.status_server.host.clone(),
                port: settings.status_server.port,
            },
            poller: poller::Options {
                interval: Duration::from_secs(settings.polling.queue_interval_secs.max(1)),
                ..Default::default()
            },
            log_stream: log_stream::Options {
                poll_interval: Duration::from_secs(settings.polling.log_interval_secs.max(1)),
            },
            log_buffer_capacity: settings.log_buffer_capacity,
            default_workload_minutes: settings.default_workload_minutes,
            submit_target: settings.submit_target,
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(10),
        }
    }
}

/// Backend connection options
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Base URL of the deployer service
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Storage configuration options
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    /// Storage layout paths
    pub layout: StorageLayout,
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
        }
    }
}
