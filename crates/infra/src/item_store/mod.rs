//! Item storage abstractions and implementations.
//!
//! - `trait.rs`: `ItemStore` + `StoreError`
//! - `in_memory.rs`: lock-guarded map for tests/dev
//! - `sqlite.rs`: durable SQLite adapter (sqlx)

pub mod r#trait;
pub mod in_memory;
pub mod sqlite;

pub use r#trait::{ItemStore, StoreError};
pub use in_memory::InMemoryItemStore;
pub use sqlite::SqliteItemStore;
