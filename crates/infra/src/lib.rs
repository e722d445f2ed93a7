//! Infrastructure layer: item storage adapters and the registry that
//! orchestrates check-in/check-out over them.

pub mod item_store;
pub mod registry;

pub use item_store::{InMemoryItemStore, ItemStore, SqliteItemStore, StoreError};
pub use registry::{ItemRegistry, RegistryError};

#[cfg(test)]
mod integration_tests;
