use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use depot_core::DomainError;
use depot_inventory::{Checkout, Item, ItemId};

/// Item store operation error.
///
/// These are **storage outcomes** (missing rows, lost races, uniqueness
/// violations, backend faults) as opposed to input validation, which happens
/// in the domain before a store is touched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// The conditional write lost: a checkout was already recorded.
    #[error("item {id} already checked out by {taken_by}")]
    AlreadyCheckedOut { id: ItemId, taken_by: String },

    #[error("item id already exists: {0}")]
    DuplicateId(ItemId),

    #[error("identifier payload already in use: {0}")]
    DuplicatePayload(String),

    /// The domain refused a write the store was asked to apply.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    /// A stored row could not be turned back into an `Item`.
    #[error("corrupt item record: {0}")]
    Corrupt(String),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("sqlite: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Durable collection of items keyed by id.
///
/// ## Implementation Requirements
///
/// - `insert` is all-or-nothing and enforces unique ids and unique
///   identifier payloads.
/// - `record_checkout` is a single atomic check-and-set: it writes only if
///   no checkout exists yet, otherwise it fails with
///   `StoreError::AlreadyCheckedOut` and leaves the record untouched.
/// - `list_recent_first` orders by `time_in` descending, ties broken by id
///   descending, and reflects the store at call time.
/// - No implementation may cache records outside its own persisted state.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert(&self, item: &Item) -> Result<(), StoreError>;

    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    async fn list_recent_first(&self) -> Result<Vec<Item>, StoreError>;

    /// Atomically populate the checkout of an available item and return the
    /// updated record.
    async fn record_checkout(&self, id: ItemId, checkout: &Checkout) -> Result<Item, StoreError>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn insert(&self, item: &Item) -> Result<(), StoreError> {
        (**self).insert(item).await
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(id).await
    }

    async fn list_recent_first(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list_recent_first().await
    }

    async fn record_checkout(&self, id: ItemId, checkout: &Checkout) -> Result<Item, StoreError> {
        (**self).record_checkout(id, checkout).await
    }
}
