//! Command line front end

pub mod args;
pub mod commands;
pub mod output;

use tracing::info;

use crate::cli::args::{Args, Command};
use crate::storage::settings::Settings;

/// Apply command line flags on top of the settings file
pub fn apply_overrides(args: &Args, settings: &mut Settings) {
    if let Some(url) = &args.backend_url {
        settings.backend.base_url = url.clone();
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    if let Some(target) = args.command.submit_target() {
        settings.submit_target = target;
    }
    if let Command::Watch { no_server, port } = &args.command {
        if *no_server {
            settings.status_server.enabled = false;
        }
        if let Some(port) = port {
            settings.status_server.port = *port;
        }
    }
}

/// Resolve on SIGINT, SIGTERM or Ctrl+C
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                _ => {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Ctrl+C received, shutting down...");
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
