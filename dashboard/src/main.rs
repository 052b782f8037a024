//! CLUE Dashboard - Entry Point
//!
//! Terminal client for the CLUE benchmark deployer: compose experiments,
//! manage the deployment queue, follow logs and browse results.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use clue_dashboard::app::options::AppOptions;
use clue_dashboard::app::state::AppState;
use clue_dashboard::cli::apply_overrides;
use clue_dashboard::cli::args::Args;
use clue_dashboard::cli::commands::execute;
use clue_dashboard::filesys::file::File;
use clue_dashboard::logs::{init_logging, LogOptions};
use clue_dashboard::storage::layout::StorageLayout;
use clue_dashboard::storage::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Retrieve the settings file
    let layout = StorageLayout::default();
    let settings_file = args
        .settings
        .clone()
        .map(File::new)
        .unwrap_or_else(|| layout.settings_file());
    let mut settings = Settings::load(&settings_file)
        .await
        .context("unable to read settings")?;
    apply_overrides(&args, &mut settings);

    // Initialize logging
    let log_dir = if settings.log_to_file {
        layout
            .setup()
            .await
            .with_context(|| format!("unable to create {}", layout.base_dir.display()))?;
        Some(layout.logs_dir())
    } else {
        None
    };
    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.log_json,
        log_dir,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let options = AppOptions::from_settings(&settings, layout);
    debug!("Running CLUE dashboard with options: {:?}", options);

    let state = Arc::new(AppState::init(&options).context("invalid backend configuration")?);
    if let Err(e) = execute(args.command, state, options).await {
        error!("Command failed: {e}");
        return Err(e).context("command failed");
    }
    Ok(())
}
