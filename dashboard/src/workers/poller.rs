//! Polling worker for the queue mirror

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info};

use crate::sync::dashboard::DashboardSync;

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval
    pub interval: Duration,

    /// Initial delay before first poll
    pub initial_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            initial_delay: Duration::ZERO,
        }
    }
}

/// Run the poller worker
pub async fn run<S, F>(
    options: &Options,
    sync: &DashboardSync,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Queue poller starting...");

    tokio::select! {
        _ = &mut shutdown_signal => {
            info!("Queue poller shutting down...");
            return;
        }
        _ = sleep_fn(options.initial_delay) => {}
    }

    loop {
        debug!("Polling queue...");
        if !sync.refresh().await {
            debug!("Queue refresh superseded by a newer one");
        }

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Queue poller shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {}
        }
    }
}
