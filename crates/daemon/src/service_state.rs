use std::collections::BTreeMap;
use std::sync::Arc;

use doc_store::DocumentStore;

use crate::service_config::Config;

/// Main service state - the document store plus the device-key table.
///
/// Built once from [`Config`] at startup and cloned into every handler.
/// The key table is immutable for the life of the process.
#[derive(Debug, Clone)]
pub struct State {
    store: DocumentStore,
    device_keys: Arc<BTreeMap<String, String>>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let store = DocumentStore::new(&config.data_dir).await?;
        tracing::info!(data_dir = %config.data_dir.display(), "document store ready");

        if config.device_keys.is_empty() {
            tracing::warn!("no device keys configured; every data request will be rejected");
        }

        Ok(Self {
            store,
            device_keys: Arc::new(config.device_keys.clone()),
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn device_keys(&self) -> &BTreeMap<String, String> {
        &self.device_keys
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("document store setup failed: {0}")]
    Store(#[from] doc_store::StoreError),
}
