//! Command implementations

use std::sync::Arc;
use std::time::Duration;

use clue_api::models::ClueConfig;
use colored::Colorize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::app::options::AppOptions;
use crate::app::run::run;
use crate::app::state::AppState;
use crate::cli::args::{
    ClusterCommand, Command, ConfigCommand, ExperimentArgs, QueueCommand, ResultsCommand,
    SutCommand,
};
use crate::cli::output;
use crate::cli::shutdown_signal;
use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::form::estimate::{estimate, DurationTable};
use crate::form::selection::FormOptions;
use crate::form::submit::Navigation;
use crate::http::config::ConfigApi;
use crate::http::results::PanelKey;
use crate::http::suts::CatalogApi;
use crate::state::draft::DraftConfiguration;
use crate::state::results::SortOrder;
use crate::utils::version_info;
use crate::workers::poller;

/// Run one command against the backend
pub async fn execute(
    command: Command,
    state: Arc<AppState>,
    options: AppOptions,
) -> Result<(), DashboardError> {
    match command {
        Command::Status => {
            let (status, _, results) = tokio::join!(
                state.sync.deployer_status(),
                state.sync.refresh(),
                state.results.load()
            );
            let status = match status {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!("Failed to fetch deployer status: {}", e);
                    None
                }
            };
            output::print_overview(status.as_ref(), state.sync.snapshot().size, results.len());
        }
        Command::Suts => {
            let suts = state.catalog.load().await;
            if suts.is_empty() {
                println!("No SUTs available");
            } else {
                println!("{}", output::suts_table(&suts));
            }
        }
        Command::Estimate { experiment } => {
            let draft = prepare_draft(&state, &experiment).await?;
            let table = DurationTable::load(
                state.http_client.as_ref(),
                &experiment.sut,
                &state.catalog.workloads_for(&experiment.sut),
                options.default_workload_minutes,
            )
            .await;
            output::print_estimate(estimate(&draft, &table).as_ref());
        }
        Command::Submit { experiment, .. } => {
            prepare_draft(&state, &experiment).await?;
            let Navigation::Dashboard = state.form.submit().await?;
            output::success(&format!("Submitted {} ({:?})", experiment.sut, state.form.target()));
            output::print_queue(&state.sync.snapshot(), state.sync.phase());
        }
        Command::Queue { subcommand } => queue(subcommand, &state).await?,
        Command::Logs { follow, clear } => {
            if clear {
                state.streamer.clear().await?;
                output::success("Log cleared");
            } else if follow {
                follow_logs(&state, &options).await;
            } else {
                for line in state.streamer.seed().await {
                    println!("{}", line);
                }
            }
        }
        Command::Results { subcommand } => results(subcommand, &state, &options).await?,
        Command::Config { subcommand } => match subcommand {
            ConfigCommand::Get => {
                output::print_json(&state.http_client.clue_config().await?)?;
            }
            ConfigCommand::Set { file } => {
                let config: ClueConfig = File::new(file).read_json().await?;
                let stored = state.http_client.update_clue_config(&config).await?;
                output::success("Configuration updated");
                output::print_json(&stored)?;
            }
        },
        Command::Cluster { subcommand } => match subcommand {
            ClusterCommand::Upload {
                file,
                patch_local_cluster,
            } => {
                let kubeconfig = File::new(file).read_bytes().await?;
                state
                    .http_client
                    .upload_kubeconfig(&kubeconfig, patch_local_cluster)
                    .await?;
                output::success("Kubeconfig uploaded");
            }
            ClusterCommand::Status => {
                let status = state.http_client.cluster_status().await?;
                if status.configured {
                    output::success("Cluster configured");
                } else {
                    println!("{}", "No cluster configured".yellow());
                }
                output::print_json(&status)?;
            }
        },
        Command::Sut { subcommand } => match subcommand {
            SutCommand::Upload { file } => {
                let yaml = File::new(file).read_bytes().await?;
                state.http_client.upload_sut_config(&yaml).await?;
                output::success("SUT configuration uploaded");
            }
            SutCommand::Raw { name } => {
                print!("{}", state.http_client.raw_sut_config(&name).await?);
            }
        },
        Command::Watch { .. } => watch(state, options).await?,
        Command::Version => output::print_json(&version_info())?,
    }
    Ok(())
}

/// Fill the draft from the command line. Empty variant or workload lists
/// select everything the SUT offers.
async fn prepare_draft(
    state: &AppState,
    args: &ExperimentArgs,
) -> Result<DraftConfiguration, DashboardError> {
    state.catalog.load().await;
    let sut = state
        .catalog
        .find(&args.sut)
        .ok_or_else(|| DashboardError::Validation(format!("unknown SUT {}", args.sut)))?;

    let draft = &state.draft;
    draft.reset();
    draft.select_sut(Some(sut.name.clone()));
    let choices = FormOptions::for_draft(&state.catalog, &draft.get());

    if args.variant.is_empty() {
        choices.toggle_all_variants(draft);
    } else {
        let names = validated_names(&args.variant, &choices.variant_names(), &sut.name, "variant")?;
        draft.set_all_variants(names);
    }

    if args.workload.is_empty() {
        if !args.deploy_only {
            choices.toggle_all_workloads(draft);
        }
    } else {
        let names =
            validated_names(&args.workload, &choices.workload_names(), &sut.name, "workload")?;
        draft.set_all_workloads(names);
    }

    draft.set_iterations(args.iterations);
    draft.set_deploy_only(args.deploy_only);
    Ok(draft.get())
}

/// Requested names in first-seen order without repeats. Fails on the first
/// name the SUT does not offer.
fn validated_names(
    requested: &[String],
    known: &[String],
    sut: &str,
    kind: &str,
) -> Result<Vec<String>, DashboardError> {
    let mut names: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested {
        if !known.contains(name) {
            return Err(DashboardError::Validation(format!("{} has no {} {}", sut, kind, name)));
        }
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    Ok(names)
}

async fn queue(command: QueueCommand, state: &AppState) -> Result<(), DashboardError> {
    let sync = &state.sync;
    match command {
        QueueCommand::Status => {
            sync.refresh().await;
            output::print_queue(&sync.snapshot(), sync.phase());
        }
        QueueCommand::Next { from } => {
            sync.refresh().await;
            sync.queue().seek(from);
            sync.next();
            output::print_queue_entry(&sync.snapshot());
        }
        QueueCommand::Prev { from } => {
            sync.refresh().await;
            sync.queue().seek(from);
            sync.prev();
            output::print_queue_entry(&sync.snapshot());
        }
        QueueCommand::Start => {
            sync.start_next().await?;
            output::success("Deployment started");
            output::print_queue(&sync.snapshot(), sync.phase());
        }
        QueueCommand::Stop => {
            sync.stop().await?;
            output::success("Deployment stopped");
        }
        QueueCommand::Kill => {
            sync.kill().await?;
            output::success("Deployment killed");
        }
        QueueCommand::Remove { index } => {
            sync.remove(index).await?;
            output::success(&format!("Removed entry {}", index));
            output::print_queue(&sync.snapshot(), sync.phase());
        }
        QueueCommand::Flush => {
            sync.flush().await?;
            output::success("Queue flushed");
        }
    }
    Ok(())
}

async fn results(
    command: ResultsCommand,
    state: &AppState,
    options: &AppOptions,
) -> Result<(), DashboardError> {
    let browser = &state.results;
    match command {
        ResultsCommand::List { sort, direction } => {
            browser.load().await;
            let entries = browser.sort(SortOrder::new(sort, direction));
            if entries.is_empty() {
                println!("No results");
            } else {
                println!("{}", output::results_table(&entries));
            }
        }
        ResultsCommand::Show {
            id,
            workload,
            variant,
            iteration,
        } => match (workload, variant, iteration) {
            (Some(workload), Some(variant), Some(iteration)) => {
                let key = PanelKey {
                    workload,
                    variant,
                    iteration,
                };
                let panel = browser.panel(&id, &key).await;
                output::print_panel(&panel, &state.http_client);
            }
            _ => output::print_details(&browser.detail(&id).await?)?,
        },
        ResultsCommand::Delete { id } => {
            browser.load().await;
            browser.delete(&id).await?;
            output::success(&format!("Deleted {}", id));
        }
        ResultsCommand::Download { id, output: dest } => {
            let dest = dest.unwrap_or_else(|| options.storage.layout.downloads_dir());
            let path = browser.download(&id, &dest).await?;
            output::success(&format!("Saved {}", path.display()));
        }
        ResultsCommand::Repeat { id, .. } => {
            browser.load().await;
            let Navigation::Dashboard = browser.repeat(&id).await?;
            output::success(&format!("Resubmitted {}", id));
            output::print_queue(&state.sync.snapshot(), state.sync.phase());
        }
        ResultsCommand::Server => {
            browser.start_server().await?;
            output::success("Results server started");
        }
    }
    Ok(())
}

/// Print log lines until the run ends or the user interrupts
async fn follow_logs(state: &Arc<AppState>, options: &AppOptions) {
    state.sync.refresh().await;
    if !state.draft.is_deploying() {
        println!("{}", "No active run".dimmed());
        for line in state.streamer.seed().await {
            println!("{}", line);
        }
        return;
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let printer = spawn_log_printer(state, shutdown_tx.subscribe());

    let sync = state.sync.clone();
    let poller_options = options.poller.clone();
    let mut poller_rx = shutdown_tx.subscribe();
    let poller_handle = tokio::spawn(async move {
        poller::run(
            &poller_options,
            sync.as_ref(),
            tokio::time::sleep,
            Box::pin(async move {
                let _ = poller_rx.recv().await;
            }),
        )
        .await;
    });

    let mut deploying = state.draft.subscribe_deploying();
    state
        .streamer
        .follow(&tokio::time::sleep, async {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = async {
                    let _ = deploying.wait_for(|d| !*d).await;
                } => {}
            }
        })
        .await;

    let _ = shutdown_tx.send(());
    for handle in [poller_handle, printer] {
        if let Err(e) = handle.await {
            warn!("Log follow task failed: {}", e);
        }
    }
}

fn spawn_log_printer(
    state: &AppState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let mut lines = state.log_buffer.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                line = lines.recv() => match line {
                    Ok(line) => println!("{}", line),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!("Log printer skipped {} lines", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                },
            }
        }
    })
}

/// Watch mode: background workers plus a running summary on stdout
async fn watch(state: Arc<AppState>, options: AppOptions) -> Result<(), DashboardError> {
    if options.enable_status_server {
        println!(
            "{} http://{}:{}/dashboard",
            "Status server:".bold(),
            options.server.host,
            options.server.port
        );
    }

    let (stop_tx, _) = broadcast::channel::<()>(1);
    let printer = spawn_log_printer(&state, stop_tx.subscribe());

    let mut queue_rx = state.queue.subscribe();
    let sync = state.sync.clone();
    let mut stop_rx = stop_tx.subscribe();
    let summary = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop_rx.recv() => return,
                changed = queue_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let snapshot = queue_rx.borrow_and_update().clone();
                    output::print_queue(&snapshot, sync.phase());
                }
            }
        }
    });

    let result = run(state, options, shutdown_signal()).await;

    let _ = stop_tx.send(());
    for handle in [printer, summary] {
        if tokio::time::timeout(Duration::from_secs(1), handle).await.is_err() {
            warn!("Watch output task did not stop in time");
        }
    }
    result
}
