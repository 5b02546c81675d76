use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::ItemStore;
use crate::models::Item;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_items(State(store): State<ItemStore>) -> Json<Vec<Item>> {
    Json(store.snapshot())
}

/// Replace the whole collection. Duplicate ids are rejected and nothing is stored.
pub async fn replace_items(
    State(store): State<ItemStore>,
    Json(items): Json<Vec<Item>>,
) -> Result<StatusCode, (StatusCode, String)> {
    let count = items.len();
    match store.replace(items) {
        Ok(()) => {
            tracing::info!(count, "Replaced item collection");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            tracing::warn!("Validation error: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}
