use std::sync::Arc;

use anyhow::Result;

use shared_config::AppConfig;

use crate::store::ClinicalStore;

/// Shared handle passed to every cell router.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ClinicalStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: ClinicalStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Open the store described by `config`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = ClinicalStore::open(&config)?;
        Ok(Self::new(config, store))
    }
}
