//! SUT catalog

use std::sync::{Arc, RwLock};

use clue_api::models::{Sut, Variant, Workload};
use tracing::{error, info};

use crate::http::suts::CatalogApi;

/// Catalog of deployable SUTs as last loaded from the backend
pub struct SutCatalog {
    api: Arc<dyn CatalogApi>,
    suts: RwLock<Vec<Sut>>,
}

impl SutCatalog {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            suts: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the catalog once. Any failure leaves an empty catalog.
    pub async fn load(&self) -> Vec<Sut> {
        let suts = match self.api.list_suts().await {
            Ok(suts) => {
                info!("Loaded {} SUTs", suts.len());
                suts
            }
            Err(e) => {
                error!("Failed to load SUT catalog: {}", e);
                Vec::new()
            }
        };
        *self.suts.write().unwrap_or_else(|e| e.into_inner()) = suts.clone();
        suts
    }

    pub fn suts(&self) -> Vec<Sut> {
        self.suts.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn find(&self, name: &str) -> Option<Sut> {
        self.suts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    pub fn variants_for(&self, name: &str) -> Vec<Variant> {
        self.find(name).map(|s| s.variants).unwrap_or_default()
    }

    pub fn workloads_for(&self, name: &str) -> Vec<Workload> {
        self.find(name).map(|s| s.workloads).unwrap_or_default()
    }
}
