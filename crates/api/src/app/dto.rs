use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterStoreRequest {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PutCategoryRequest {
    pub label: String,
    pub sort_order: i64,
}

impl Default for PutCategoryRequest {
    fn default() -> Self {
        Self {
            label: String::new(),
            sort_order: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortageQuery {
    /// `order=urgency` re-sorts the canonical report by descending need.
    pub order: Option<String>,
}
