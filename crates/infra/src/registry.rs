//! Item registry: the single entry point for check-in, check-out and reads.
//!
//! ```text
//! check_in(input)
//!   1. Item::register: validate, stamp time_in, derive payload, render artifact
//!   2. store.insert (all-or-nothing, unique id + payload)
//!
//! check_out(id, taken_by)
//!   1. store.get            -> NotFound
//!   2. Item::check_out      -> Validation / AlreadyCheckedOut (fast path)
//!   3. store.record_checkout (atomic check-and-set) -> AlreadyCheckedOut on a lost race
//! ```
//!
//! The registry holds no records of its own; every read goes to the store.

use chrono::Utc;
use thiserror::Error;

use depot_core::DomainError;
use depot_inventory::{IdentifierEncoder, Item, ItemId, NewItem};

use crate::item_store::{ItemStore, StoreError};

/// Failure of a registry operation, sorted so callers can tell bad input
/// from a lost race from a missing record.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("item not found")]
    NotFound,

    #[error("item already checked out by {taken_by}")]
    AlreadyCheckedOut { taken_by: String },

    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Identifier payload (or id) collided with an existing record.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for RegistryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => RegistryError::Validation(msg),
            DomainError::InvalidId(msg) => RegistryError::Validation(msg),
            DomainError::InvariantViolation(msg) => RegistryError::InvariantViolation(msg),
            DomainError::NotFound => RegistryError::NotFound,
            DomainError::AlreadyCheckedOut { taken_by } => {
                RegistryError::AlreadyCheckedOut { taken_by }
            }
            DomainError::Encoding(msg) => RegistryError::Encoding(msg),
            DomainError::Conflict(msg) => RegistryError::Conflict(msg),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => RegistryError::NotFound,
            StoreError::AlreadyCheckedOut { taken_by, .. } => {
                RegistryError::AlreadyCheckedOut { taken_by }
            }
            StoreError::DuplicatePayload(payload) => {
                RegistryError::Conflict(format!("identifier payload {payload:?} already in use"))
            }
            StoreError::DuplicateId(id) => {
                RegistryError::Conflict(format!("item id {id} already in use"))
            }
            StoreError::Rejected(e) => RegistryError::from(e),
            other => RegistryError::Store(other),
        }
    }
}

/// Gatekeeper of item records and their state transitions.
///
/// `S` is the injected persistence handle; in tests use `InMemoryItemStore`,
/// in production `SqliteItemStore` (or `Arc<dyn ItemStore>` to pick at runtime).
#[derive(Debug)]
pub struct ItemRegistry<S> {
    store: S,
    encoder: IdentifierEncoder,
}

impl<S> ItemRegistry<S> {
    pub fn new(store: S, encoder: IdentifierEncoder) -> Self {
        Self { store, encoder }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn encoder(&self) -> &IdentifierEncoder {
        &self.encoder
    }
}

impl<S> ItemRegistry<S>
where
    S: ItemStore,
{
    /// Register a new item. Nothing is persisted unless the payload renders.
    pub async fn check_in(&self, input: NewItem) -> Result<Item, RegistryError> {
        let item = Item::register(ItemId::new(), &input, Utc::now(), &self.encoder)
            .inspect_err(|e| tracing::debug!(error = %e, "check-in rejected"))?;

        self.store.insert(&item).await?;

        tracing::info!(
            item_id = %item.id_typed(),
            payload = item.identifier_payload(),
            location = item.location(),
            "item checked in"
        );
        Ok(item)
    }

    /// Mark an item as taken. Exactly one call per item can ever succeed.
    pub async fn check_out(&self, id: ItemId, taken_by: &str) -> Result<Item, RegistryError> {
        let current = self.store.get(id).await?.ok_or(RegistryError::NotFound)?;
        let checkout = current.check_out(taken_by, Utc::now())?;

        match self.store.record_checkout(id, &checkout).await {
            Ok(item) => {
                tracing::info!(item_id = %id, taken_by = %checkout.taken_by, "item checked out");
                Ok(item)
            }
            Err(StoreError::AlreadyCheckedOut { taken_by, .. }) => {
                tracing::warn!(
                    item_id = %id,
                    attempted_by = %checkout.taken_by,
                    %taken_by,
                    "checkout lost race"
                );
                Err(RegistryError::AlreadyCheckedOut { taken_by })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: ItemId) -> Result<Item, RegistryError> {
        self.store.get(id).await?.ok_or(RegistryError::NotFound)
    }

    /// All items, most recent check-in first. Each call reads the store afresh.
    pub async fn list(&self) -> Result<Vec<Item>, RegistryError> {
        Ok(self.store.list_recent_first().await?)
    }
}
