use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use depot_inventory::{ItemId, ScanArtifact};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items))
        .route("/items/add", post(check_in))
        .route("/items/checkout", post(check_out))
        .route("/items/:id", get(get_item))
        .route("/items/:id/barcode.svg", get(download_barcode))
}

fn parse_item_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
    })
}

pub async fn check_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CheckInRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.registry().check_in(body.into()).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::ItemResponse::from(&item))).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn check_out(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CheckOutRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let id = match parse_item_id(&body.item_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.registry().check_out(id, &body.taken_by).await {
        Ok(item) => (StatusCode::OK, Json(dto::ItemResponse::from(&item))).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.registry().get(id).await {
        Ok(item) => Json(dto::ItemResponse::from(&item)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry().list().await {
        Ok(items) => Json(
            items
                .iter()
                .map(dto::ItemResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

/// The artifact as a downloadable file, for printing labels.
pub async fn download_barcode(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.registry().get(id).await {
        Ok(item) => {
            let disposition = format!(
                "attachment; filename=\"item-{id}.{}\"",
                ScanArtifact::FILE_EXTENSION
            );
            (
                [
                    (header::CONTENT_TYPE, ScanArtifact::MEDIA_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                item.scan_artifact().as_bytes().to_vec(),
            )
                .into_response()
        }
        Err(e) => errors::registry_error_to_response(e),
    }
}
