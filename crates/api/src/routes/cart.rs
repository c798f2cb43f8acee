//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart::{CartEntry, EventSummary, Money};
use checkout::BookingService;
use serde::{Deserialize, Serialize};
use storage::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

/// Body of `POST /cart/items`: a stored cart entry or the catalog event
/// the user is viewing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddItemRequest {
    Entry(CartEntry),
    Event(EventSummary),
}

impl From<AddItemRequest> for CartEntry {
    fn from(req: AddItemRequest) -> Self {
        match req {
            AddItemRequest::Entry(entry) => entry,
            AddItemRequest::Event(event) => CartEntry::from_event(&event),
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub entries: Vec<CartEntry>,
    pub count: usize,
    pub total: Money,
}

impl CartResponse {
    fn from_entries(entries: Vec<CartEntry>) -> Self {
        let total = entries.iter().map(CartEntry::line_total).sum();
        Self {
            count: entries.len(),
            entries,
            total,
        }
    }
}

// -- Handlers --

/// GET /cart: entries in order, with count and total.
pub async fn get<K, B>(State(state): State<Arc<AppState<K, B>>>) -> Json<CartResponse>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    Json(CartResponse::from_entries(state.cart().snapshot()))
}

/// POST /cart/items: add one event to the cart.
#[tracing::instrument(skip(state, req))]
pub async fn add<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    state.cart().add(req.into())?;
    Ok((
        StatusCode::CREATED,
        Json(CartResponse::from_entries(state.cart().snapshot())),
    ))
}

/// DELETE /cart/items/{index}: remove the entry at a snapshot position.
#[tracing::instrument(skip(state))]
pub async fn remove<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
    Path(index): Path<usize>,
) -> Result<Json<CartEntry>, ApiError>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    let removed = state.cart().remove(index)?;
    Ok(Json(removed))
}

/// DELETE /cart: empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
) -> Result<Json<CartResponse>, ApiError>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    state.cart().clear()?;
    Ok(Json(CartResponse::from_entries(Vec::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_accepts_cart_entry() {
        let raw = r#"{"eventId":5,"title":"Rock Night","price":150,"category":"KONSER",
                      "location":"Istanbul","startDateTime":"2025-06-01T20:00:00","quantity":1}"#;
        let req: AddItemRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(req, AddItemRequest::Entry(_)));
    }

    #[test]
    fn test_add_request_accepts_catalog_event() {
        let raw = r#"{"id":5,"title":"Rock Night","price":99.99,
                      "startDateTime":"2025-06-01T20:00:00","capacity":300}"#;
        let req: AddItemRequest = serde_json::from_str(raw).unwrap();
        let entry = CartEntry::from(req);
        assert_eq!(entry.event_id, common::EventId::new(5));
        assert_eq!(entry.price, Money::from_cents(9999));
        assert_eq!(entry.quantity, 1);
    }

    #[test]
    fn test_cart_response_totals() {
        let raw = r#"[
            {"eventId":1,"title":"A","price":150.00,"category":"","location":"",
             "startDateTime":"2025-06-01T20:00:00"},
            {"eventId":2,"title":"B","price":99.99,"category":"","location":"",
             "startDateTime":"2025-06-02T20:00:00"}
        ]"#;
        let entries: Vec<CartEntry> = serde_json::from_str(raw).unwrap();
        let response = CartResponse::from_entries(entries);
        assert_eq!(response.count, 2);
        assert_eq!(response.total, Money::from_cents(24999));
    }
}
