use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use depot_core::{DomainError, Entity};
use depot_inventory::{Checkout, Item, ItemId};

use super::r#trait::{ItemStore, StoreError};

#[derive(Debug, Default)]
struct Records {
    items: HashMap<ItemId, Item>,
    payloads: HashSet<String>,
}

/// In-memory item store.
///
/// Intended for tests/dev. Every write happens under one write lock, so the
/// checkout check-and-set is atomic with respect to all other writers. The
/// lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    records: RwLock<Records>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().map_err(poisoned)?.items.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn insert(&self, item: &Item) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;

        let id = *item.id();
        if records.items.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        if records.payloads.contains(item.identifier_payload()) {
            return Err(StoreError::DuplicatePayload(
                item.identifier_payload().to_string(),
            ));
        }

        records.payloads.insert(item.identifier_payload().to_string());
        records.items.insert(id, item.clone());
        Ok(())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.items.get(&id).cloned())
    }

    async fn list_recent_first(&self) -> Result<Vec<Item>, StoreError> {
        let mut items: Vec<Item> = {
            let records = self.records.read().map_err(poisoned)?;
            records.items.values().cloned().collect()
        };
        items.sort_by(|a, b| {
            b.time_in()
                .cmp(&a.time_in())
                .then_with(|| b.id().cmp(a.id()))
        });
        Ok(items)
    }

    async fn record_checkout(&self, id: ItemId, checkout: &Checkout) -> Result<Item, StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let item = records.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        item.apply_checkout(checkout.clone()).map_err(|e| match e {
            DomainError::AlreadyCheckedOut { taken_by } => {
                StoreError::AlreadyCheckedOut { id, taken_by }
            }
            other => StoreError::Rejected(other),
        })?;
        Ok(item.clone())
    }
}
