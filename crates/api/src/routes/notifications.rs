//! Notice board endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::BookingService;
use common::Notice;
use storage::KeyValueStore;

use crate::AppState;

/// GET /notifications: notices still within their display window, oldest first.
pub async fn list<K, B>(State(state): State<Arc<AppState<K, B>>>) -> Json<Vec<Notice>>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    Json(state.notices.visible())
}

/// DELETE /notifications/{id}: close a notice before it expires.
pub async fn dismiss<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
    Path(id): Path<u64>,
) -> StatusCode
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    if state.notices.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
