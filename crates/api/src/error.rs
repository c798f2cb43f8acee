//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::CheckoutError;
use storage::StorageError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Cart operation error.
    Cart(CartError),
    /// Checkout could not start.
    Checkout(CheckoutError),
    /// Session storage error.
    Storage(StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "session storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    let status = match &err {
        CartError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CartError::DuplicateEntry(_) => StatusCode::CONFLICT,
        CartError::InvalidEntry { .. } => StatusCode::BAD_REQUEST,
        CartError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        CartError::PersistenceCorruption(_)
        | CartError::Storage(_)
        | CartError::Serialization(_) => {
            tracing::error!(error = %err, "cart persistence failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
        CheckoutError::AlreadyInProgress => StatusCode::CONFLICT,
        CheckoutError::Interrupted(_) => {
            tracing::error!(error = %err, "checkout task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err)
    }
}

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to open storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use common::EventId;

    use super::*;

    #[test]
    fn test_cart_error_statuses() {
        let cases = [
            (CartError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CartError::DuplicateEntry(EventId::new(1)), StatusCode::CONFLICT),
            (
                CartError::IndexOutOfRange { index: 3, len: 1 },
                StatusCode::NOT_FOUND,
            ),
            (
                CartError::InvalidEntry {
                    event_id: EventId::new(1),
                    reason: "negative price".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn test_checkout_error_statuses() {
        let cases = [
            (CheckoutError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CheckoutError::EmptyCart, StatusCode::BAD_REQUEST),
            (CheckoutError::AlreadyInProgress, StatusCode::CONFLICT),
            (
                CheckoutError::Interrupted("panicked".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
