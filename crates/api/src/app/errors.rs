use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use depot_infra::RegistryError;

pub fn registry_error_to_response(err: RegistryError) -> axum::response::Response {
    match err {
        RegistryError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        RegistryError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
        RegistryError::AlreadyCheckedOut { taken_by } => json_error(
            StatusCode::CONFLICT,
            "already_checked_out",
            format!("item already checked out by {taken_by}"),
        ),
        RegistryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        RegistryError::Encoding(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "encoding_error", msg)
        }
        RegistryError::InvariantViolation(msg) => {
            tracing::error!(%msg, "item invariant violated");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invariant_violation", msg)
        }
        RegistryError::Store(e) => {
            tracing::error!(error = %e, "item store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

/// Unreadable request bodies (wrong content type, bad JSON) keep the error envelope.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
