use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::form::submit::SubmitTarget;
use crate::logs::LogLevel;
use crate::state::results::{SortDirection, SortKey};

#[derive(Debug, Parser)]
#[command(name = "clue")]
#[command(about = "Terminal client for the CLUE benchmark deployer", long_about = None)]
pub struct Args {
    /// Deployer base URL, overrides the settings file
    #[arg(long, global = true, env = "CLUE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Settings file (default: $CLUE_HOME/settings.json)
    #[arg(long, global = true, env = "CLUE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Log level, overrides the settings file
    #[arg(long, global = true, env = "CLUE_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deployer state, queue length and result count
    Status,
    /// List the SUTs the deployer knows
    Suts,
    /// Estimate the run time of an experiment
    Estimate {
        #[command(flatten)]
        experiment: ExperimentArgs,
    },
    /// Deploy an experiment or add it to the queue
    Submit {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Deploy now or enqueue
        #[arg(long, value_enum, env = "CLUE_SUBMIT_TARGET")]
        target: Option<SubmitTarget>,
    },
    /// Deployment queue
    Queue {
        #[command(subcommand)]
        subcommand: QueueCommand,
    },
    /// Deployment log
    Logs {
        /// Keep following the log while a run is active
        #[arg(long)]
        follow: bool,

        /// Clear the backend log buffer
        #[arg(long, conflicts_with = "follow")]
        clear: bool,
    },
    /// Experiment results
    Results {
        #[command(subcommand)]
        subcommand: ResultsCommand,
    },
    /// Global deployer configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommand,
    },
    /// Kubernetes cluster access
    Cluster {
        #[command(subcommand)]
        subcommand: ClusterCommand,
    },
    /// SUT configuration files
    Sut {
        #[command(subcommand)]
        subcommand: SutCommand,
    },
    /// Follow queue and log in the foreground and serve local status
    Watch {
        /// Disable the local status server
        #[arg(long)]
        no_server: bool,

        /// Status server port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Submit target requested on the command line, if any
    pub fn submit_target(&self) -> Option<SubmitTarget> {
        match self {
            Command::Submit { target, .. } => *target,
            Command::Results {
                subcommand: ResultsCommand::Repeat { target, .. },
            } => *target,
            _ => None,
        }
    }
}

/// Selection for a new experiment
#[derive(Debug, Clone, clap::Args)]
pub struct ExperimentArgs {
    /// SUT name
    #[arg(long)]
    pub sut: String,

    /// Variants (comma separated, repeatable). Defaults to all.
    #[arg(long, value_delimiter = ',')]
    pub variant: Vec<String>,

    /// Workloads (comma separated, repeatable). Defaults to all.
    #[arg(long, value_delimiter = ',')]
    pub workload: Vec<String>,

    /// Iterations per variant
    #[arg(long, short = 'n', default_value_t = 1)]
    pub iterations: u32,

    /// Only deploy the SUT, run no workloads
    #[arg(long)]
    pub deploy_only: bool,
}

#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Show the queue and the active run
    Status,
    /// Show the entry after `--from`
    Next {
        #[arg(long, default_value_t = 0)]
        from: usize,
    },
    /// Show the entry before `--from`
    Prev {
        #[arg(long, default_value_t = 0)]
        from: usize,
    },
    /// Start the deployment worker on the queue
    Start,
    /// Stop the running deployment
    Stop,
    /// Terminate the running deployment without cleanup
    Kill,
    /// Remove one queue entry
    Remove {
        /// Zero-based queue position
        index: usize,
    },
    /// Remove every queue entry
    Flush,
}

#[derive(Debug, Subcommand)]
pub enum ResultsCommand {
    /// List results
    List {
        #[arg(long, value_enum, default_value_t = SortKey::Timestamp)]
        sort: SortKey,

        #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
        direction: SortDirection,
    },
    /// Show one result, or one workload x variant x iteration cell of it
    Show {
        id: String,

        #[arg(long, requires_all = ["variant", "iteration"])]
        workload: Option<String>,

        #[arg(long)]
        variant: Option<String>,

        #[arg(long)]
        iteration: Option<u32>,
    },
    /// Delete a result
    Delete { id: String },
    /// Download a result archive
    Download {
        id: String,

        /// Target directory (default: $CLUE_HOME/downloads)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Run a result's configuration again
    Repeat {
        id: String,

        #[arg(long, value_enum)]
        target: Option<SubmitTarget>,
    },
    /// Start the backend's results viewer
    Server,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration as JSON
    Get,
    /// Replace the configuration with a JSON file
    Set { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum ClusterCommand {
    /// Upload a kubeconfig
    Upload {
        file: PathBuf,

        /// Rewrite local cluster addresses for in-cluster access
        #[arg(long)]
        patch_local_cluster: bool,
    },
    /// Show whether a cluster is configured
    Status,
}

#[derive(Debug, Subcommand)]
pub enum SutCommand {
    /// Upload a SUT YAML file
    Upload { file: PathBuf },
    /// Print a SUT's YAML
    Raw { name: String },
}
