use std::sync::Arc;

use anyhow::Context;

use depot_infra::{InMemoryItemStore, ItemRegistry, ItemStore, SqliteItemStore};
use depot_inventory::IdentifierEncoder;

use crate::config::{ApiConfig, StoreBackend};

/// Store handle chosen at startup.
pub type SharedStore = Arc<dyn ItemStore>;

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    registry: ItemRegistry<SharedStore>,
}

impl AppServices {
    pub fn new(registry: ItemRegistry<SharedStore>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ItemRegistry<SharedStore> {
        &self.registry
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory item store; records are lost on exit");
            Arc::new(InMemoryItemStore::new())
        }
        StoreBackend::Sqlite { url } => {
            let store = SqliteItemStore::connect(url)
                .await
                .with_context(|| format!("failed to open item store at {url}"))?;
            tracing::info!(%url, "sqlite item store ready");
            Arc::new(store)
        }
    };

    let encoder = IdentifierEncoder::new(config.render).context("invalid render options")?;

    Ok(AppServices::new(ItemRegistry::new(store, encoder)))
}
