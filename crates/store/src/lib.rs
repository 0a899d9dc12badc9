//! Inventory storage backends.
//!
//! Two implementations of `stockroom_inventory::InventoryStore`: an
//! in-memory map for tests/dev and a SQLite-backed store for deployments.
//! Both honor the same contract; the HTTP layer picks one at startup.

pub mod in_memory;
pub mod migrations;
pub mod sqlite;

pub use in_memory::InMemoryInventoryStore;
pub use sqlite::SqliteInventoryStore;
