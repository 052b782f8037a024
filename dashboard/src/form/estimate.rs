//! Run time estimation
//!
//! For every selected variant the estimate is
//! `(sum of workload minutes + wait before + wait after) * iterations`,
//! and the grand total sums the variants. Workload durations are seconds
//! in the SUT config and are rounded up to whole minutes.

use std::collections::HashMap;

use clue_api::models::{SutConfig, Workload};
use serde::Serialize;
use tracing::warn;

use crate::http::suts::CatalogApi;
use crate::state::draft::DraftConfiguration;
use crate::utils::ceil_minutes;

/// Minutes per workload plus the fixed waits around them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationTable {
    workloads: HashMap<String, u64>,
    wait_before: u64,
    wait_after: u64,
    default_minutes: u64,
}

impl DurationTable {
    /// Every workload takes `default_minutes`, no waits
    pub fn fallback(default_minutes: u64) -> Self {
        Self {
            workloads: HashMap::new(),
            wait_before: 0,
            wait_after: 0,
            default_minutes,
        }
    }

    /// Durations from workload definitions, e.g. the catalog's
    pub fn from_workloads(workloads: &[Workload], default_minutes: u64) -> Self {
        let mut table = Self::fallback(default_minutes);
        for w in workloads {
            if let Some(secs) = w.timeout_duration {
                table.workloads.insert(w.name.clone(), ceil_minutes(secs));
            }
        }
        table
    }

    pub fn from_sut_config(config: &SutConfig, default_minutes: u64) -> Self {
        let mut table = Self::from_workloads(&config.workloads, default_minutes);
        table.wait_before = ceil_minutes(config.wait_before_workloads);
        table.wait_after = ceil_minutes(config.wait_after_workloads);
        table
    }

    /// Load the SUT config. When it is unavailable, fall back to `known`
    /// workload definitions and the default duration.
    pub async fn load(
        api: &dyn CatalogApi,
        sut: &str,
        known: &[Workload],
        default_minutes: u64,
    ) -> Self {
        match api.sut_config(sut).await {
            Ok(config) => Self::from_sut_config(&config, default_minutes),
            Err(e) => {
                warn!("No SUT config for {}, estimating with defaults: {}", sut, e);
                Self::from_workloads(known, default_minutes)
            }
        }
    }

    pub fn workload_minutes(&self, name: &str) -> u64 {
        self.workloads.get(name).copied().unwrap_or(self.default_minutes)
    }

    pub fn wait_minutes(&self) -> u64 {
        self.wait_before + self.wait_after
    }
}

/// Estimate for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantEstimate {
    pub variant: String,
    pub per_iteration_minutes: u64,
    pub total_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub variants: Vec<VariantEstimate>,
    pub total_minutes: u64,
}

/// Estimate the draft's run time. `None` in deploy-only mode, where no
/// workloads run.
pub fn estimate(draft: &DraftConfiguration, table: &DurationTable) -> Option<Estimate> {
    if draft.deploy_only {
        return None;
    }

    let workload_minutes: u64 = draft
        .workloads
        .iter()
        .map(|w| table.workload_minutes(w))
        .sum();
    let per_iteration = workload_minutes + table.wait_minutes();
    let iterations = u64::from(draft.iterations.max(1));

    let variants: Vec<VariantEstimate> = draft
        .variants
        .iter()
        .map(|v| VariantEstimate {
            variant: v.clone(),
            per_iteration_minutes: per_iteration,
            total_minutes: per_iteration * iterations,
        })
        .collect();
    let total_minutes = variants.iter().map(|v| v.total_minutes).sum();

    Some(Estimate {
        variants,
        total_minutes,
    })
}
