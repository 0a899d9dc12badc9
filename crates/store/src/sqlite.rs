//! SQLite-backed inventory store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows: a unique-constraint
//! violation on `(store_key, category_key, name)` becomes `DuplicateName`;
//! everything else (connection failures, pool closed, unexpected rows)
//! becomes `Unavailable` and fails the whole operation. Retry policy, if
//! any, belongs to the caller.
//!
//! ## Thread Safety
//!
//! Uses the SQLx connection pool, which is thread-safe. Single-statement
//! writes are atomic per record; multi-item reads are snapshot scans without
//! cross-item transactions, which is all the shortage view requires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{error::ErrorKind, Row};
use std::str::FromStr;

use stockroom_core::{CategoryKey, ItemId, Quantity, StoreKey};
use stockroom_inventory::{
    Category, InventoryStore, Item, ItemDetails, ItemDraft, ItemPatch, StoreError, StoreRecord,
};

use crate::migrations::apply_migrations;

/// SQLite-backed inventory store.
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    /// Open (creating if missing) a database file and apply pending
    /// migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database (tests/dev). Pinned to one connection:
    /// every `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        apply_migrations(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn ensure_store(&self, store: &StoreKey) -> Result<(), StoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM stores WHERE key = ?")
            .bind(store.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(store, None, e))?;
        if exists.is_none() {
            return Err(StoreError::UnknownStore(store.clone()));
        }
        Ok(())
    }
}

fn map_sqlx_error(store: &StoreKey, scope: Option<(&CategoryKey, &str)>, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.kind() == ErrorKind::UniqueViolation {
            if let Some((category, name)) = scope {
                return StoreError::DuplicateName {
                    store: store.clone(),
                    category: category.clone(),
                    name: name.to_string(),
                };
            }
        }
    }
    StoreError::Unavailable(err.to_string())
}

fn item_from_row(row: &SqliteRow) -> Result<Item, StoreError> {
    let id: String = row.try_get("id").map_err(row_error)?;
    let store_key: String = row.try_get("store_key").map_err(row_error)?;
    let category_key: String = row.try_get("category_key").map_err(row_error)?;
    let current_stock: String = row.try_get("current_stock").map_err(row_error)?;
    let min_stock: String = row.try_get("min_stock").map_err(row_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(row_error)?;

    Ok(Item {
        id: id.parse().map_err(|_| {
            StoreError::Unavailable(format!("corrupt item id in storage: {id}"))
        })?,
        store_id: StoreKey::new(&store_key)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?,
        category_key: CategoryKey::new(&category_key)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?,
        name: row.try_get("name").map_err(row_error)?,
        // Lenient decode: junk stays Raw and is handled per-record upstream.
        current_stock: Quantity::parse(&current_stock),
        min_stock: Quantity::parse(&min_stock),
        unit: row.try_get("unit").map_err(row_error)?,
        details: ItemDetails {
            price: row.try_get("price").map_err(row_error)?,
            vendor: row.try_get("vendor").map_err(row_error)?,
            storage: row.try_get("storage").map_err(row_error)?,
            origin: row.try_get("origin").map_err(row_error)?,
            buy_link: row.try_get("buy_link").map_err(row_error)?,
            memo: row.try_get("memo").map_err(row_error)?,
        },
        updated_at: match DateTime::parse_from_rfc3339(&updated_at) {
            Ok(d) => d.with_timezone(&Utc),
            Err(err) => {
                // Malformed timestamps degrade per-record, same as stock
                // fields, but never silently.
                tracing::warn!(
                    item_id = %id,
                    value = %updated_at,
                    error = %err,
                    "corrupt updated_at in storage; falling back to epoch"
                );
                DateTime::<Utc>::default()
            }
        },
    })
}

fn row_error(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("failed to decode item row: {err}"))
}

const ITEM_COLUMNS: &str = "id, store_key, category_key, name, current_stock, min_stock, \
     unit, price, vendor, storage, origin, buy_link, memo, updated_at";

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn register_store(&self, record: StoreRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO stores (key, name) VALUES (?, ?)
             ON CONFLICT (key) DO UPDATE SET name = excluded.name",
        )
        .bind(record.key.as_str())
        .bind(&record.name)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(&record.key, None, e))?;
        Ok(())
    }

    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StoreError> {
        let rows = sqlx::query("SELECT key, name FROM stores ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key").map_err(row_error)?;
            records.push(StoreRecord::new(
                StoreKey::new(&key).map_err(|e| StoreError::Unavailable(e.to_string()))?,
                row.try_get::<String, _>("name").map_err(row_error)?,
            ));
        }
        Ok(records)
    }

    async fn put_category(&self, store: &StoreKey, category: Category) -> Result<(), StoreError> {
        self.ensure_store(store).await?;
        sqlx::query(
            "INSERT INTO categories (store_key, key, label, sort_order) VALUES (?, ?, ?, ?)
             ON CONFLICT (store_key, key)
             DO UPDATE SET label = excluded.label, sort_order = excluded.sort_order",
        )
        .bind(store.as_str())
        .bind(category.key.as_str())
        .bind(&category.label)
        .bind(category.sort_order)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(store, None, e))?;
        Ok(())
    }

    async fn list_categories(&self, store: &StoreKey) -> Result<Vec<Category>, StoreError> {
        self.ensure_store(store).await?;
        let rows = sqlx::query(
            "SELECT key, label, sort_order FROM categories
             WHERE store_key = ? ORDER BY sort_order, key",
        )
        .bind(store.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(store, None, e))?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key").map_err(row_error)?;
            categories.push(Category::new(
                CategoryKey::new(&key).map_err(|e| StoreError::Unavailable(e.to_string()))?,
                row.try_get::<String, _>("label").map_err(row_error)?,
                row.try_get::<i64, _>("sort_order").map_err(row_error)?,
            ));
        }
        Ok(categories)
    }

    async fn delete_category(
        &self,
        store: &StoreKey,
        key: &CategoryKey,
    ) -> Result<(), StoreError> {
        self.ensure_store(store).await?;

        let result = sqlx::query("DELETE FROM categories WHERE store_key = ? AND key = ?")
            .bind(store.as_str())
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(store, None, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownCategory(key.clone()));
        }

        // Cascade: items are not FK-bound to categories (they may reference
        // unregistered keys), so the cascade is explicit.
        sqlx::query("DELETE FROM items WHERE store_key = ? AND category_key = ?")
            .bind(store.as_str())
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(store, None, e))?;
        Ok(())
    }

    async fn get_category_label(
        &self,
        store: &StoreKey,
        key: &CategoryKey,
    ) -> Result<String, StoreError> {
        self.ensure_store(store).await?;
        let label: Option<String> = sqlx::query_scalar(
            "SELECT label FROM categories WHERE store_key = ? AND key = ?",
        )
        .bind(store.as_str())
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(store, None, e))?;

        Ok(match label {
            Some(label) if !label.trim().is_empty() => label,
            _ => key.to_string(),
        })
    }

    async fn add_item(
        &self,
        store: &StoreKey,
        category: &CategoryKey,
        draft: ItemDraft,
    ) -> Result<Item, StoreError> {
        self.ensure_store(store).await?;

        let id = ItemId::new();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO items (id, store_key, category_key, name, current_stock, min_stock,
                                unit, price, vendor, storage, origin, buy_link, memo, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(store.as_str())
        .bind(category.as_str())
        .bind(&draft.name)
        .bind(draft.current_stock.to_string())
        .bind(draft.min_stock.to_string())
        .bind(&draft.unit)
        .bind(&draft.price)
        .bind(&draft.vendor)
        .bind(&draft.storage)
        .bind(&draft.origin)
        .bind(&draft.buy_link)
        .bind(&draft.memo)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(store, Some((category, &draft.name)), e))?;

        Ok(Item {
            id,
            store_id: store.clone(),
            category_key: category.clone(),
            name: draft.name.clone(),
            current_stock: Quantity::Number(draft.current_stock),
            min_stock: Quantity::Number(draft.min_stock),
            unit: draft.unit.clone(),
            details: draft.details(),
            updated_at: now,
        })
    }

    async fn get_item(&self, store: &StoreKey, id: &ItemId) -> Result<Item, StoreError> {
        self.ensure_store(store).await?;
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE store_key = ? AND id = ?"
        ))
        .bind(store.as_str())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(store, None, e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(StoreError::UnknownItem(*id)),
        }
    }

    async fn update_item(
        &self,
        store: &StoreKey,
        id: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item, StoreError> {
        self.ensure_store(store).await?;

        // Read-modify-write in one transaction so concurrent patches to the
        // same item cannot lose each other's fields.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(store, None, e))?;

        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE store_key = ? AND id = ?"
        ))
        .bind(store.as_str())
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(store, None, e))?;
        let mut item = match row {
            Some(row) => item_from_row(&row)?,
            None => return Err(StoreError::UnknownItem(*id)),
        };

        patch.apply_to(&mut item);
        // Non-decreasing even if the wall clock steps back.
        item.updated_at = Utc::now().max(item.updated_at);

        sqlx::query(
            "UPDATE items SET name = ?, current_stock = ?, min_stock = ?, unit = ?,
                              price = ?, vendor = ?, storage = ?, origin = ?,
                              buy_link = ?, memo = ?, updated_at = ?
             WHERE store_key = ? AND id = ?",
        )
        .bind(&item.name)
        .bind(item.current_stock.to_string())
        .bind(item.min_stock.to_string())
        .bind(&item.unit)
        .bind(&item.details.price)
        .bind(&item.details.vendor)
        .bind(&item.details.storage)
        .bind(&item.details.origin)
        .bind(&item.details.buy_link)
        .bind(&item.details.memo)
        .bind(item.updated_at.to_rfc3339())
        .bind(store.as_str())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(store, Some((&item.category_key, &item.name)), e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(store, None, e))?;

        Ok(item)
    }

    async fn delete_item(&self, store: &StoreKey, id: &ItemId) -> Result<(), StoreError> {
        self.ensure_store(store).await?;
        let result = sqlx::query("DELETE FROM items WHERE store_key = ? AND id = ?")
            .bind(store.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(store, None, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownItem(*id));
        }
        Ok(())
    }

    async fn list_items(&self, store: &StoreKey) -> Result<Vec<Item>, StoreError> {
        self.ensure_store(store).await?;
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE store_key = ?"
        ))
        .bind(store.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(store, None, e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(item_from_row(row)?);
        }
        Ok(items)
    }
}
