//! Draft experiment configuration
//!
//! The draft is what the user is editing. It is never mixed with what the
//! backend is running; see [`crate::state::queue`] for that.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// An experiment being configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftConfiguration {
    pub sut: Option<String>,
    pub variants: Vec<String>,
    pub workloads: Vec<String>,
    pub iterations: u32,
    pub deploy_only: bool,
}

impl Default for DraftConfiguration {
    fn default() -> Self {
        Self {
            sut: None,
            variants: Vec::new(),
            workloads: Vec::new(),
            iterations: 1,
            deploy_only: false,
        }
    }
}

/// Partial update of a draft. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub sut: Option<Option<String>>,
    pub variants: Option<Vec<String>>,
    pub workloads: Option<Vec<String>>,
    pub iterations: Option<u32>,
    pub deploy_only: Option<bool>,
}

impl DraftPatch {
    fn apply(self, draft: &mut DraftConfiguration) {
        if let Some(sut) = self.sut {
            if sut != draft.sut {
                draft.variants.clear();
                draft.workloads.clear();
            }
            draft.sut = sut;
        }
        if let Some(variants) = self.variants {
            draft.variants = variants;
        }
        if let Some(workloads) = self.workloads {
            draft.workloads = workloads;
        }
        if let Some(iterations) = self.iterations {
            draft.iterations = iterations;
        }
        if let Some(deploy_only) = self.deploy_only {
            draft.deploy_only = deploy_only;
        }
    }
}

/// Observable store holding the draft and the deploying flag
#[derive(Debug)]
pub struct DraftStore {
    draft: watch::Sender<DraftConfiguration>,
    deploying: watch::Sender<bool>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore {
    pub fn new() -> Self {
        Self {
            draft: watch::Sender::new(DraftConfiguration::default()),
            deploying: watch::Sender::new(false),
        }
    }

    pub fn get(&self) -> DraftConfiguration {
        self.draft.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DraftConfiguration> {
        self.draft.subscribe()
    }

    /// Apply a partial update. Subscribers are only woken on an actual change.
    pub fn set(&self, patch: DraftPatch) {
        self.draft.send_if_modified(|draft| {
            let before = draft.clone();
            patch.apply(draft);
            *draft != before
        });
    }

    pub fn select_sut(&self, sut: Option<String>) {
        self.set(DraftPatch {
            sut: Some(sut),
            ..Default::default()
        });
    }

    pub fn toggle_variant(&self, name: &str) {
        self.draft.send_modify(|draft| toggle(&mut draft.variants, name));
    }

    pub fn toggle_workload(&self, name: &str) {
        self.draft.send_modify(|draft| toggle(&mut draft.workloads, name));
    }

    pub fn set_all_variants(&self, names: Vec<String>) {
        self.set(DraftPatch {
            variants: Some(names),
            ..Default::default()
        });
    }

    pub fn set_all_workloads(&self, names: Vec<String>) {
        self.set(DraftPatch {
            workloads: Some(names),
            ..Default::default()
        });
    }

    /// Set the iteration count, clamped to at least one
    pub fn set_iterations(&self, iterations: u32) {
        self.set(DraftPatch {
            iterations: Some(iterations.max(1)),
            ..Default::default()
        });
    }

    pub fn set_deploy_only(&self, deploy_only: bool) {
        self.set(DraftPatch {
            deploy_only: Some(deploy_only),
            ..Default::default()
        });
    }

    pub fn reset(&self) {
        self.draft.send_replace(DraftConfiguration::default());
    }

    pub fn is_deploying(&self) -> bool {
        *self.deploying.borrow()
    }

    pub fn set_deploying(&self, deploying: bool) {
        self.deploying.send_if_modified(|current| {
            let changed = *current != deploying;
            *current = deploying;
            changed
        });
    }

    pub fn subscribe_deploying(&self) -> watch::Receiver<bool> {
        self.deploying.subscribe()
    }
}

fn toggle(names: &mut Vec<String>, name: &str) {
    if let Some(pos) = names.iter().position(|n| n == name) {
        names.remove(pos);
    } else {
        names.push(name.to_string());
    }
}
