use axum::Router;

pub mod items;
pub mod system;

/// Item routes. `/items/add` and `/items/checkout` accept JSON bodies only.
pub fn router() -> Router {
    items::router()
}
