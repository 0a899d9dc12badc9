//! The shortage view: items below their configured minimum stock.
//!
//! A pure, read-only computation over one store's current snapshot. Calling
//! it twice with no intervening writes yields identical sequences. The
//! multi-item read is a snapshot scan without cross-item atomicity; that
//! weak-consistency contract is deliberate (small-business dashboard,
//! tolerates staleness on the order of milliseconds).

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use stockroom_core::{CategoryKey, ItemId, StoreKey};

use crate::category::Category;
use crate::item::Item;
use crate::store::{InventoryStore, StoreError};

/// One reported shortage. `need` is strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortageRow {
    pub item_id: ItemId,
    pub category_key: CategoryKey,
    pub category_label: String,
    pub name: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub need: f64,
    pub unit: String,
}

/// Ordered shortage report for one store.
///
/// Canonical order: category sort order ascending, then category key, then
/// item name case-insensitive ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortageReport {
    pub store: StoreKey,
    pub rows: Vec<ShortageRow>,
}

impl ShortageReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Presentation-layer re-sort: largest `need` first. Applied on top of
    /// the canonical result (ties keep canonical order), never a replacement
    /// for it.
    pub fn most_urgent_first(mut self) -> Self {
        self.rows.sort_by(|a, b| {
            b.need
                .partial_cmp(&a.need)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self
    }
}

#[derive(Debug, Error)]
pub enum ShortageError {
    /// The requested store does not exist. Never reported as an empty list.
    #[error("unknown store: {0}")]
    NotFound(StoreKey),

    #[error(transparent)]
    Store(StoreError),
}

fn lift(err: StoreError) -> ShortageError {
    match err {
        StoreError::UnknownStore(key) => ShortageError::NotFound(key),
        other => ShortageError::Store(other),
    }
}

/// Compute the shortage report for `key`.
///
/// Read-only: no stored field (including `updated_at`) is mutated. A record
/// with non-numeric stock fields is skipped with a warning; one corrupt
/// record must not abort the whole report.
pub async fn shortage_report(
    store: &dyn InventoryStore,
    key: &StoreKey,
) -> Result<ShortageReport, ShortageError> {
    let items = store.list_items(key).await.map_err(lift)?;
    let categories = store.list_categories(key).await.map_err(lift)?;

    let mut labels: HashMap<CategoryKey, String> = HashMap::new();
    for item in &items {
        if !labels.contains_key(&item.category_key) {
            let label = store
                .get_category_label(key, &item.category_key)
                .await
                .map_err(lift)?;
            labels.insert(item.category_key.clone(), label);
        }
    }

    Ok(ShortageReport {
        store: key.clone(),
        rows: build_rows(items, &categories, &labels),
    })
}

/// Pure core: filter to shortages and apply the canonical ordering.
fn build_rows(
    items: Vec<Item>,
    categories: &[Category],
    labels: &HashMap<CategoryKey, String>,
) -> Vec<ShortageRow> {
    let order: HashMap<&CategoryKey, i64> = categories
        .iter()
        .map(|c| (&c.key, c.sort_order))
        .collect();

    let mut rows = Vec::new();
    for item in items {
        let (Some(current), Some(min)) = (item.current_stock.as_f64(), item.min_stock.as_f64())
        else {
            tracing::warn!(
                item_id = %item.id,
                name = %item.name,
                category = %item.category_key,
                "skipping item with non-numeric stock fields"
            );
            continue;
        };

        // min_stock <= 0 disables tracking: "no minimum" cannot be violated.
        if !(min > 0.0 && current < min) {
            continue;
        }

        let category_label = labels
            .get(&item.category_key)
            .cloned()
            .unwrap_or_else(|| item.category_key.to_string());

        rows.push(ShortageRow {
            item_id: item.id,
            category_key: item.category_key,
            category_label,
            name: item.name,
            current_stock: current,
            min_stock: min,
            need: min - current,
            unit: item.unit,
        });
    }

    // Items in categories with no registered sort order go last, by key.
    rows.sort_by_cached_key(|r| {
        let rank = order.get(&r.category_key).copied().unwrap_or(i64::MAX);
        (
            rank,
            r.category_key.clone(),
            r.name.to_lowercase(),
            r.name.clone(),
        )
    });

    rows
}
