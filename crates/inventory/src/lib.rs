//! Inventory domain module.
//!
//! This crate contains the business rules for stock tracking: the item and
//! category types, the storage seam (`InventoryStore`), and the shortage
//! view computed over it. No HTTP, no concrete storage.

pub mod category;
pub mod item;
pub mod shortage;
pub mod store;

pub use category::Category;
pub use item::{Item, ItemDetails, ItemDraft, ItemPatch};
pub use shortage::{shortage_report, ShortageError, ShortageReport, ShortageRow};
pub use store::{InventoryStore, StoreError, StoreRecord};
