use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{CategoryKey, ItemId, Quantity, StoreKey};
use stockroom_inventory::{
    Category, InventoryStore, Item, ItemDraft, ItemPatch, StoreError, StoreRecord,
};

#[derive(Debug, Default)]
struct StoreState {
    name: String,
    categories: BTreeMap<CategoryKey, Category>,
    items: HashMap<ItemId, Item>,
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Not optimized for performance. Mutations take the
/// write lock for the whole single-record operation, which gives readers the
/// fully-old or fully-new record, never a partial write.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    stores: RwLock<HashMap<StoreKey, StoreState>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn register_store(&self, record: StoreRecord) -> Result<(), StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        let state = stores.entry(record.key).or_default();
        state.name = record.name;
        Ok(())
    }

    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let mut records: Vec<_> = stores
            .iter()
            .map(|(key, state)| StoreRecord::new(key.clone(), state.name.clone()))
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }

    async fn put_category(&self, store: &StoreKey, category: Category) -> Result<(), StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        let state = stores
            .get_mut(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        state.categories.insert(category.key.clone(), category);
        Ok(())
    }

    async fn list_categories(&self, store: &StoreKey) -> Result<Vec<Category>, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let state = stores
            .get(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        let mut categories: Vec<_> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| (a.sort_order, &a.key).cmp(&(b.sort_order, &b.key)));
        Ok(categories)
    }

    async fn delete_category(
        &self,
        store: &StoreKey,
        key: &CategoryKey,
    ) -> Result<(), StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        let state = stores
            .get_mut(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        if state.categories.remove(key).is_none() {
            return Err(StoreError::UnknownCategory(key.clone()));
        }
        // Cascade: the category's items go with it.
        state.items.retain(|_, item| &item.category_key != key);
        Ok(())
    }

    async fn get_category_label(
        &self,
        store: &StoreKey,
        key: &CategoryKey,
    ) -> Result<String, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let state = stores
            .get(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        Ok(state
            .categories
            .get(key)
            .map(|c| c.display_label().to_string())
            .unwrap_or_else(|| key.to_string()))
    }

    async fn add_item(
        &self,
        store: &StoreKey,
        category: &CategoryKey,
        draft: ItemDraft,
    ) -> Result<Item, StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        let state = stores
            .get_mut(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;

        let duplicate = state
            .items
            .values()
            .any(|i| &i.category_key == category && i.name == draft.name);
        if duplicate {
            return Err(StoreError::DuplicateName {
                store: store.clone(),
                category: category.clone(),
                name: draft.name,
            });
        }

        let item = Item {
            id: ItemId::new(),
            store_id: store.clone(),
            category_key: category.clone(),
            name: draft.name.clone(),
            current_stock: Quantity::Number(draft.current_stock),
            min_stock: Quantity::Number(draft.min_stock),
            unit: draft.unit.clone(),
            details: draft.details(),
            updated_at: Utc::now(),
        };
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, store: &StoreKey, id: &ItemId) -> Result<Item, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let state = stores
            .get(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        state
            .items
            .get(id)
            .cloned()
            .ok_or(StoreError::UnknownItem(*id))
    }

    async fn update_item(
        &self,
        store: &StoreKey,
        id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        let state = stores
            .get_mut(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;

        // Rename must not collide with a sibling item.
        if let Some(new_name) = &patch.name {
            let current_category = state
                .items
                .get(id)
                .ok_or(StoreError::UnknownItem(*id))?
                .category_key
                .clone();
            let duplicate = state.items.values().any(|i| {
                &i.id != id && i.category_key == current_category && &i.name == new_name
            });
            if duplicate {
                return Err(StoreError::DuplicateName {
                    store: store.clone(),
                    category: current_category,
                    name: new_name.clone(),
                });
            }
        }

        let item = state.items.get_mut(id).ok_or(StoreError::UnknownItem(*id))?;
        patch.apply_to(item);
        // updated_at is non-decreasing even if the wall clock steps back.
        item.updated_at = Utc::now().max(item.updated_at);
        Ok(item.clone())
    }

    async fn delete_item(&self, store: &StoreKey, id: &ItemId) -> Result<(), StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        let state = stores
            .get_mut(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        state
            .items
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::UnknownItem(*id))
    }

    async fn list_items(&self, store: &StoreKey) -> Result<Vec<Item>, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let state = stores
            .get(store)
            .ok_or_else(|| StoreError::UnknownStore(store.clone()))?;
        Ok(state.items.values().cloned().collect())
    }
}
