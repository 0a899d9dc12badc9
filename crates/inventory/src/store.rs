//! Storage seam for the inventory domain.
//!
//! Backends (in-memory, SQLite) live in `stockroom-store`; everything above
//! this trait is backend-agnostic. Implementations must guarantee
//! read-your-writes within a single process and per-record atomicity: a
//! concurrent `list_items` observes the fully-old or fully-new version of a
//! record, never a partial write. Cross-item atomicity is not required.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{CategoryKey, ItemId, StoreKey};

use crate::category::Category;
use crate::item::{Item, ItemDraft, ItemPatch};

/// A registered business location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub key: StoreKey,
    #[serde(default)]
    pub name: String,
}

impl StoreRecord {
    pub fn new(key: StoreKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }
}

/// Errors surfaced by `InventoryStore` backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown store: {0}")]
    UnknownStore(StoreKey),

    #[error("unknown category: {0}")]
    UnknownCategory(CategoryKey),

    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("duplicate item name '{name}' in {store}/{category}")]
    DuplicateName {
        store: StoreKey,
        category: CategoryKey,
        name: String,
    },

    /// The persistence layer cannot be reached or failed mid-operation.
    /// Surfaced as-is; retry policy belongs to the caller.
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
}

/// The inventory storage backend.
///
/// All operations against a store key that was never registered fail with
/// `UnknownStore` (an unknown store is an error, not an empty result).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Register a store location. Idempotent upsert on the key.
    async fn register_store(&self, record: StoreRecord) -> Result<(), StoreError>;

    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StoreError>;

    /// Create or replace a category (PUT semantics on the key).
    async fn put_category(&self, store: &StoreKey, category: Category) -> Result<(), StoreError>;

    /// Categories of a store, sorted by (sort_order, key).
    async fn list_categories(&self, store: &StoreKey) -> Result<Vec<Category>, StoreError>;

    /// Delete a category. Cascades: every item referencing it is deleted too.
    async fn delete_category(&self, store: &StoreKey, key: &CategoryKey)
        -> Result<(), StoreError>;

    /// Display label for a category key, falling back to the raw key when no
    /// label is registered. The fallback is not an error.
    async fn get_category_label(
        &self,
        store: &StoreKey,
        key: &CategoryKey,
    ) -> Result<String, StoreError>;

    /// Create an item. Rejects a duplicate name within (store, category).
    async fn add_item(
        &self,
        store: &StoreKey,
        category: &CategoryKey,
        draft: ItemDraft,
    ) -> Result<Item, StoreError>;

    async fn get_item(&self, store: &StoreKey, id: &ItemId) -> Result<Item, StoreError>;

    /// Apply a partial update and refresh `updated_at` (non-decreasing).
    async fn update_item(
        &self,
        store: &StoreKey,
        id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, StoreError>;

    /// Immediate, unrecoverable delete.
    async fn delete_item(&self, store: &StoreKey, id: &ItemId) -> Result<(), StoreError>;

    /// Every live item of the store, in unspecified order. Must reflect all
    /// mutations committed before the call started.
    async fn list_items(&self, store: &StoreKey) -> Result<Vec<Item>, StoreError>;
}
