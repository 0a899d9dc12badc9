use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryKey, DomainError, ItemId, Quantity, StoreKey};

/// Free-text descriptive fields. Carried through unchanged, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDetails {
    pub price: String,
    pub vendor: String,
    pub storage: String,
    pub origin: String,
    pub buy_link: String,
    pub memo: String,
}

/// One stocked unit within one category of one store.
///
/// Invariant (enforced by the store): at most one live item per
/// `(store_id, category_key, name)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub store_id: StoreKey,
    pub category_key: CategoryKey,
    pub name: String,
    /// Stock on hand. Lenient: a corrupt stored value decodes as `Raw`.
    pub current_stock: Quantity,
    /// Shortage threshold. `<= 0` means shortage tracking is disabled.
    pub min_stock: Quantity,
    pub unit: String,
    #[serde(flatten)]
    pub details: ItemDetails,
    /// Set by the store on every mutation; non-decreasing per item.
    pub updated_at: DateTime<Utc>,
}

/// Typed creation payload. Only these fields are recognized; unknown keys in
/// a request body are rejected rather than silently carried along.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemDraft {
    pub name: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub unit: String,
    pub price: String,
    pub vendor: String,
    pub storage: String,
    pub origin: String,
    pub buy_link: String,
    pub memo: String,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            current_stock: 0.0,
            min_stock: 0.0,
            unit: String::new(),
            price: String::new(),
            vendor: String::new(),
            storage: String::new(),
            origin: String::new(),
            buy_link: String::new(),
            memo: String::new(),
        }
    }
}

impl ItemDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_stock(mut self, current: f64, min: f64) -> Self {
        self.current_stock = current;
        self.min_stock = min;
        self
    }

    /// Validate before handing to a store.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        validate_stock("current_stock", self.current_stock)?;
        validate_stock("min_stock", self.min_stock)?;
        Ok(())
    }

    pub fn details(&self) -> ItemDetails {
        ItemDetails {
            price: self.price.clone(),
            vendor: self.vendor.clone(),
            storage: self.storage.clone(),
            origin: self.origin.clone(),
            buy_link: self.buy_link.clone(),
            memo: self.memo.clone(),
        }
    }
}

/// Partial update. `None` leaves the stored field untouched; the store
/// refreshes `updated_at` on every applied patch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub current_stock: Option<f64>,
    pub min_stock: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<String>,
    pub vendor: Option<String>,
    pub storage: Option<String>,
    pub origin: Option<String>,
    pub buy_link: Option<String>,
    pub memo: Option<String>,
}

impl ItemPatch {
    pub fn set_current_stock(value: f64) -> Self {
        Self {
            current_stock: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(v) = self.current_stock {
            validate_stock("current_stock", v)?;
        }
        if let Some(v) = self.min_stock {
            validate_stock("min_stock", v)?;
        }
        Ok(())
    }

    /// Apply to an item in place. Does not touch `updated_at`; that is the
    /// store's job (it also owns the monotonicity clamp).
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(v) = self.current_stock {
            item.current_stock = Quantity::Number(v);
        }
        if let Some(v) = self.min_stock {
            item.min_stock = Quantity::Number(v);
        }
        if let Some(unit) = &self.unit {
            item.unit = unit.clone();
        }
        if let Some(v) = &self.price {
            item.details.price = v.clone();
        }
        if let Some(v) = &self.vendor {
            item.details.vendor = v.clone();
        }
        if let Some(v) = &self.storage {
            item.details.storage = v.clone();
        }
        if let Some(v) = &self.origin {
            item.details.origin = v.clone();
        }
        if let Some(v) = &self.buy_link {
            item.details.buy_link = v.clone();
        }
        if let Some(v) = &self.memo {
            item.details.memo = v.clone();
        }
    }
}

fn validate_stock(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{field} must be a number")));
    }
    if value < 0.0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}
