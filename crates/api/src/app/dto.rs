use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_inventory::{Item, NewItem};

// -------------------------
// Request DTOs
// -------------------------

/// Missing fields deserialize as empty strings so they fail validation in the
/// domain, with the same error as a blank field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brought_by: String,
    #[serde(default)]
    pub location: String,
}

impl From<CheckInRequest> for NewItem {
    fn from(value: CheckInRequest) -> Self {
        NewItem::new(value.name, value.brought_by, value.location)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub taken_by: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub taken_by: String,
    pub time_out: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub brought_by: String,
    pub location: String,
    pub time_in: DateTime<Utc>,
    pub status: &'static str,
    pub identifier_payload: String,
    /// `data:image/svg+xml;base64,...`, ready for an `<img src>`.
    pub barcode: String,
    pub checkout: Option<CheckoutResponse>,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id_typed().to_string(),
            name: item.name().to_string(),
            brought_by: item.brought_by().to_string(),
            location: item.location().to_string(),
            time_in: item.time_in(),
            status: item.status().as_str(),
            identifier_payload: item.identifier_payload().to_string(),
            barcode: item.scan_artifact().to_data_uri(),
            checkout: item.checkout().map(|c| CheckoutResponse {
                taken_by: c.taken_by.clone(),
                time_out: c.time_out,
            }),
        }
    }
}
