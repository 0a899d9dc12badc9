use serde::{Deserialize, Serialize};

use stockroom_core::CategoryKey;

/// A label partitioning items within a store.
///
/// `sort_order` drives display ordering (and the canonical shortage-report
/// ordering); lower values sort first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub label: String,
    pub sort_order: i64,
}

impl Category {
    pub fn new(key: CategoryKey, label: impl Into<String>, sort_order: i64) -> Self {
        Self {
            key,
            label: label.into(),
            sort_order,
        }
    }

    /// Display label, falling back to the raw key when none was registered.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            self.key.as_str()
        } else {
            &self.label
        }
    }
}
