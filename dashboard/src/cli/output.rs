//! Terminal rendering

use clue_api::models::{
    ActiveRun, DeployerStatus, ResultDetails, ResultEntry, ResultStatus, Sut,
};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::errors::DashboardError;
use crate::form::estimate::Estimate;
use crate::http::client::HttpClient;
use crate::results::browser::ResultPanel;
use crate::state::queue::QueueSnapshot;
use crate::sync::phase::RunPhase;
use crate::utils::format_minutes;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn status_color(status: &ResultStatus) -> Option<Color> {
    match status {
        ResultStatus::Started => Some(Color::Yellow),
        ResultStatus::Completed => Some(Color::Green),
        ResultStatus::Failed => Some(Color::Red),
        ResultStatus::Stopped => Some(Color::DarkGrey),
        ResultStatus::Other(_) => None,
    }
}

fn status_cell(status: &ResultStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status_color(status) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), DashboardError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn suts_table(suts: &[Sut]) -> Table {
    let mut table = new_table();
    table.set_header(["SUT", "Variants", "Workloads"]);
    for sut in suts {
        let variants: Vec<&str> = sut.variants.iter().map(|v| v.name.as_str()).collect();
        let workloads: Vec<&str> = sut.workloads.iter().map(|w| w.name.as_str()).collect();
        table.add_row([sut.name.clone(), variants.join(", "), workloads.join(", ")]);
    }
    table
}

pub fn print_estimate(estimate: Option<&Estimate>) {
    let Some(estimate) = estimate else {
        println!("{}", "Deploy only: no workloads run, no estimate".dimmed());
        return;
    };

    let mut table = new_table();
    table.set_header(["Variant", "Per iteration", "Total"]);
    for v in &estimate.variants {
        table.add_row([
            v.variant.clone(),
            format_minutes(v.per_iteration_minutes),
            format_minutes(v.total_minutes),
        ]);
    }
    println!("{table}");
    println!(
        "{} {}",
        "Estimated total:".bold(),
        format_minutes(estimate.total_minutes)
    );
}

fn active_run_line(run: Option<&ActiveRun>, phase: RunPhase) -> String {
    match run {
        Some(run) => format!(
            "{} {} [{}] x [{}] x{}{}",
            "Running:".green().bold(),
            run.entry.sut,
            run.entry.variants,
            run.entry.workloads,
            run.entry.n_iterations,
            run.phase
                .as_deref()
                .map(|p| format!(" ({})", p))
                .unwrap_or_default()
        ),
        None => format!("{} {:?}", "No active run, last phase:".dimmed(), phase),
    }
}

pub fn print_queue(snapshot: &QueueSnapshot, phase: RunPhase) {
    println!("{}", active_run_line(snapshot.active_run.as_ref(), phase));
    if snapshot.entries.is_empty() {
        println!("Queue is empty");
        return;
    }

    let mut table = new_table();
    table.set_header(["#", "SUT", "Variants", "Workloads", "Iterations", "Deploy only"]);
    for (i, entry) in snapshot.entries.iter().enumerate() {
        let marker = if i == snapshot.cursor {
            format!("> {}", i)
        } else {
            i.to_string()
        };
        table.add_row([
            marker,
            entry.sut.clone(),
            entry.variants.to_string(),
            entry.workloads.to_string(),
            entry.n_iterations.to_string(),
            entry.deploy_only.to_string(),
        ]);
    }
    println!("{table}");
    println!("{} entries", snapshot.size);
}

/// Home overview: deployer state and what is waiting or recorded
pub fn print_overview(status: Option<&DeployerStatus>, queued: usize, results: usize) {
    let state = match status {
        Some(status) if status.is_deploying => "deploying".green().bold(),
        Some(_) => "idle".normal(),
        None => "unreachable".red().bold(),
    };
    println!("{} {}", "Deployer:".bold(), state);
    println!("{} {}", "Queued:".bold(), queued);
    println!("{} {}", "Results:".bold(), results);
}

/// One entry of the paged queue view
pub fn print_queue_entry(snapshot: &QueueSnapshot) {
    match snapshot.current() {
        Some(entry) => {
            println!(
                "{} {}/{}",
                "Entry".bold(),
                snapshot.cursor + 1,
                snapshot.entries.len()
            );
            println!("  SUT:        {}", entry.sut);
            println!("  Variants:   {}", entry.variants);
            println!("  Workloads:  {}", entry.workloads);
            println!("  Iterations: {}", entry.n_iterations);
            println!("  Deploy only: {}", entry.deploy_only);
        }
        None => println!("Queue is empty"),
    }
}

pub fn results_table(entries: &[ResultEntry]) -> Table {
    let mut table = new_table();
    table.set_header(["ID", "SUT", "Variants", "Workloads", "Iterations", "Timestamp", "Status"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.uuid),
            Cell::new(&entry.sut),
            Cell::new(entry.variants.to_string()),
            Cell::new(entry.workloads.to_string()),
            Cell::new(entry.n_iterations),
            Cell::new(&entry.timestamp),
            status_cell(&entry.status),
        ]);
    }
    table
}

pub fn print_details(details: &ResultDetails) -> Result<(), DashboardError> {
    println!("{} {}", "Result".bold(), details.uuid);
    println!("  SUT:         {}", details.sut);
    println!("  Timestamp:   {}", details.timestamp);
    println!("  Iterations:  {}", details.n_iterations);
    println!("  Deploy only: {}", details.deploy_only);
    if let Some(status) = &details.status {
        let label = match status {
            ResultStatus::Completed => status.as_str().green(),
            ResultStatus::Failed => status.as_str().red(),
            ResultStatus::Started => status.as_str().yellow(),
            _ => status.as_str().normal(),
        };
        println!("  Status:      {}", label);
    }

    let mut table = new_table();
    table.set_header(["Variant", "Branch", "Autoscaling", "Critical services"]);
    for v in &details.variants {
        table.add_row([
            v.name.clone(),
            v.target_branch.clone().unwrap_or_default(),
            v.autoscaling.clone().unwrap_or_default(),
            v.critical_services.join(", "),
        ]);
    }
    println!("{table}");

    let mut table = new_table();
    table.set_header(["Workload", "Timeout", "Description"]);
    for w in &details.workloads {
        table.add_row([
            w.name.clone(),
            w.timeout_duration.map(|t| format!("{}s", t)).unwrap_or_default(),
            w.description.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");

    for (title, value) in [
        ("Environment config", &details.configs.env_config),
        ("CLUE config", &details.configs.clue_config),
        ("SUT config", &details.configs.sut_config),
    ] {
        if value.is_null() {
            continue;
        }
        println!("{}", title.bold());
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

pub fn print_panel(panel: &ResultPanel, client: &HttpClient) {
    if panel.metrics.is_empty() {
        println!("{}", "No metrics".dimmed());
    } else {
        let mut table = new_table();
        table.set_header(["Metric", "Value", "Unit"]);
        for m in &panel.metrics {
            let value = match &m.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            table.add_row([m.name.clone(), value, m.unit.clone().unwrap_or_default()]);
        }
        println!("{table}");
    }

    for plot in &panel.plots {
        let url = client
            .absolute(&plot.image_url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| plot.image_url.clone());
        println!("{} {}", plot.name.bold(), url.underline());
        if let Some(desc) = &plot.description {
            println!("  {}", desc);
        }
    }
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
