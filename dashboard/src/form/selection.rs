//! Option lists and select-all state for the form

use clue_api::models::{Variant, Workload};
use serde::Serialize;

use crate::state::catalog::SutCatalog;
use crate::state::draft::{DraftConfiguration, DraftStore};

/// Tri-state of a "select all" control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl SelectAllState {
    /// `selected` counts only names that are actually available
    pub fn from_counts(selected: usize, available: usize) -> Self {
        if available == 0 || selected == 0 {
            SelectAllState::Unchecked
        } else if selected >= available {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }

    pub fn of<'a>(selected: &[String], available: impl IntoIterator<Item = &'a str>) -> Self {
        let mut total = 0;
        let mut hits = 0;
        for name in available {
            total += 1;
            if selected.iter().any(|s| s == name) {
                hits += 1;
            }
        }
        Self::from_counts(hits, total)
    }
}

/// Choices offered for the selected SUT
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormOptions {
    pub variants: Vec<Variant>,
    pub workloads: Vec<Workload>,
}

impl FormOptions {
    /// Filter the catalog by the draft's SUT. Empty when no SUT is selected.
    pub fn for_draft(catalog: &SutCatalog, draft: &DraftConfiguration) -> Self {
        match draft.sut.as_deref() {
            Some(sut) => Self {
                variants: catalog.variants_for(sut),
                workloads: catalog.workloads_for(sut),
            },
            None => Self::default(),
        }
    }

    pub fn variant_names(&self) -> Vec<String> {
        self.variants.iter().map(|v| v.name.clone()).collect()
    }

    pub fn workload_names(&self) -> Vec<String> {
        self.workloads.iter().map(|w| w.name.clone()).collect()
    }

    pub fn variants_state(&self, draft: &DraftConfiguration) -> SelectAllState {
        SelectAllState::of(&draft.variants, self.variants.iter().map(|v| v.name.as_str()))
    }

    pub fn workloads_state(&self, draft: &DraftConfiguration) -> SelectAllState {
        SelectAllState::of(&draft.workloads, self.workloads.iter().map(|w| w.name.as_str()))
    }

    /// Clicking "select all": clears a full selection, otherwise selects everything
    pub fn toggle_all_variants(&self, store: &DraftStore) {
        match self.variants_state(&store.get()) {
            SelectAllState::Checked => store.set_all_variants(Vec::new()),
            _ => store.set_all_variants(self.variant_names()),
        }
    }

    pub fn toggle_all_workloads(&self, store: &DraftStore) {
        match self.workloads_state(&store.get()) {
            SelectAllState::Checked => store.set_all_workloads(Vec::new()),
            _ => store.set_all_workloads(self.workload_names()),
        }
    }
}
