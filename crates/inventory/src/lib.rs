//! Warehouse inventory domain: tracked items and their scannable identifiers.
//!
//! This crate contains business rules for item check-in/check-out and the
//! identifier encoder, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod encoder;
pub mod item;

pub use encoder::{IdentifierEncoder, RenderOptions, ScanArtifact, decode_artifact};
pub use item::{Checkout, Item, ItemId, ItemParts, ItemState, ItemStatus, NewItem};
