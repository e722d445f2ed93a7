use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DomainResult, Entity, RecordId, required};

use crate::encoder::{IdentifierEncoder, ScanArtifact};

/// Tracked item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub RecordId);

impl ItemId {
    pub fn new() -> Self {
        Self(RecordId::new())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Check-in form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub brought_by: String,
    pub location: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        brought_by: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            brought_by: brought_by.into(),
            location: location.into(),
        }
    }
}

/// Who took the item and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub taken_by: String,
    pub time_out: DateTime<Utc>,
}

/// Lifecycle state. `CheckedOut` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemState {
    Available,
    CheckedOut(Checkout),
}

impl ItemState {
    /// Rebuild from nullable storage columns; both or neither must be set.
    pub fn from_parts(
        taken_by: Option<String>,
        time_out: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        match (taken_by, time_out) {
            (None, None) => Ok(Self::Available),
            (Some(taken_by), Some(time_out)) => Ok(Self::CheckedOut(Checkout { taken_by, time_out })),
            _ => Err(DomainError::invariant("checkout record is partially populated")),
        }
    }

    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Available => ItemStatus::Available,
            Self::CheckedOut(_) => ItemStatus::CheckedOut,
        }
    }

    pub fn checkout(&self) -> Option<&Checkout> {
        match self {
            Self::Available => None,
            Self::CheckedOut(c) => Some(c),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    CheckedOut,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::CheckedOut => "checked_out",
        }
    }
}

/// Every persisted column of an item, for storage adapters rebuilding records.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemParts {
    pub id: ItemId,
    pub name: String,
    pub brought_by: String,
    pub location: String,
    pub time_in: DateTime<Utc>,
    pub identifier_payload: String,
    pub scan_artifact: ScanArtifact,
    #[serde(flatten)]
    pub state: ItemState,
}

/// A piece of equipment registered in the warehouse.
///
/// Deserialization goes through [`Item::restore`], so it enforces the same
/// invariants as any other rebuilt record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemParts")]
pub struct Item {
    id: ItemId,
    name: String,
    brought_by: String,
    location: String,
    time_in: DateTime<Utc>,
    identifier_payload: String,
    scan_artifact: ScanArtifact,
    #[serde(flatten)]
    state: ItemState,
}

impl Item {
    /// Build a freshly checked-in item: validate input, derive the payload and
    /// render the artifact. Nothing exists until every step succeeds.
    ///
    /// `time_in` is truncated to milliseconds, the precision of the payload.
    pub fn register(
        id: ItemId,
        input: &NewItem,
        time_in: DateTime<Utc>,
        encoder: &IdentifierEncoder,
    ) -> DomainResult<Self> {
        let name = required("name", &input.name)?;
        let brought_by = required("broughtBy", &input.brought_by)?;
        let location = required("location", &input.location)?;
        let time_in = time_in.trunc_subsecs(3);

        let identifier_payload = encoder.derive_payload(&name, &brought_by, time_in);
        let scan_artifact = encoder.render_artifact(&identifier_payload)?;

        Ok(Self {
            id,
            name,
            brought_by,
            location,
            time_in,
            identifier_payload,
            scan_artifact,
            state: ItemState::Available,
        })
    }

    /// Rehydrate a stored record, re-checking the invariants storage could break.
    pub fn restore(parts: ItemParts) -> DomainResult<Self> {
        if let ItemState::CheckedOut(c) = &parts.state {
            if c.time_out < parts.time_in {
                return Err(DomainError::invariant("time_out precedes time_in"));
            }
        }
        Ok(Self {
            id: parts.id,
            name: parts.name,
            brought_by: parts.brought_by,
            location: parts.location,
            time_in: parts.time_in,
            identifier_payload: parts.identifier_payload,
            scan_artifact: parts.scan_artifact,
            state: parts.state,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brought_by(&self) -> &str {
        &self.brought_by
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn time_in(&self) -> DateTime<Utc> {
        self.time_in
    }

    pub fn identifier_payload(&self) -> &str {
        &self.identifier_payload
    }

    pub fn scan_artifact(&self) -> &ScanArtifact {
        &self.scan_artifact
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn status(&self) -> ItemStatus {
        self.state.status()
    }

    pub fn checkout(&self) -> Option<&Checkout> {
        self.state.checkout()
    }

    pub fn is_checked_out(&self) -> bool {
        matches!(self.state, ItemState::CheckedOut(_))
    }

    /// Decide the checkout record for `taken_by` at `at` without mutating.
    ///
    /// `time_out` never precedes `time_in`, even if the clock stepped back.
    pub fn check_out(&self, taken_by: &str, at: DateTime<Utc>) -> DomainResult<Checkout> {
        let taken_by = required("takenBy", taken_by)?;
        self.ensure_available()?;
        Ok(Checkout {
            taken_by,
            time_out: at.trunc_subsecs(3).max(self.time_in),
        })
    }

    /// Record a decided checkout. Rejects (never overwrites) a second one.
    pub fn apply_checkout(&mut self, checkout: Checkout) -> DomainResult<()> {
        self.ensure_available()?;
        if checkout.taken_by.trim().is_empty() {
            return Err(DomainError::validation("takenBy cannot be empty"));
        }
        if checkout.time_out < self.time_in {
            return Err(DomainError::invariant("time_out precedes time_in"));
        }
        self.state = ItemState::CheckedOut(checkout);
        Ok(())
    }

    fn ensure_available(&self) -> DomainResult<()> {
        match &self.state {
            ItemState::Available => Ok(()),
            ItemState::CheckedOut(c) => Err(DomainError::already_checked_out(&c.taken_by)),
        }
    }
}

impl TryFrom<ItemParts> for Item {
    type Error = DomainError;

    fn try_from(parts: ItemParts) -> Result<Self, Self::Error> {
        Self::restore(parts)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
