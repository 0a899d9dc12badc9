use std::sync::Arc;

use stockroom_inventory::InventoryStore;
use stockroom_store::{InMemoryInventoryStore, SqliteInventoryStore};

/// Shared application state: the inventory store backend, constructed once
/// at process start and injected into every handler.
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
}

impl AppServices {
    /// In-memory backend (dev/tests; nothing is persisted).
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryInventoryStore::new()),
        }
    }

    /// SQLite backend at `url` (e.g. `sqlite://stockroom.db`); applies
    /// pending schema migrations before serving.
    pub async fn sqlite(url: &str) -> anyhow::Result<Self> {
        let store = SqliteInventoryStore::connect(url).await?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> &dyn InventoryStore {
        &*self.store
    }
}
