//! Cart error types.

use common::{EventId, NoticeLevel};
use storage::StorageError;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The operation needs a signed-in user and there is none.
    #[error("No authenticated user")]
    Unauthenticated,

    /// The event is already in the cart.
    #[error("Event {0} is already in the cart")]
    DuplicateEntry(EventId),

    /// The entry violates a cart invariant.
    #[error("Invalid cart entry for event {event_id}: {reason}")]
    InvalidEntry { event_id: EventId, reason: String },

    /// A positional operation referenced an index past the end of the cart.
    #[error("Index {index} is out of range for a cart of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// Persisted cart data could not be read back.
    #[error("Persisted cart is unreadable: {0}")]
    PersistenceCorruption(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CartError {
    /// Severity of the notice shown for this error.
    pub fn notice_level(&self) -> NoticeLevel {
        match self {
            CartError::Unauthenticated
            | CartError::DuplicateEntry(_)
            | CartError::IndexOutOfRange { .. } => NoticeLevel::Warning,
            CartError::InvalidEntry { .. }
            | CartError::PersistenceCorruption(_)
            | CartError::Storage(_)
            | CartError::Serialization(_) => NoticeLevel::Danger,
        }
    }

    /// Text of the notice shown for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            CartError::Unauthenticated => "Please log in first.",
            CartError::DuplicateEntry(_) => "This event is already in your cart!",
            CartError::InvalidEntry { .. } => "Event details could not be found.",
            CartError::IndexOutOfRange { .. } => "That item is no longer in your cart.",
            CartError::PersistenceCorruption(_) => "Your saved cart could not be restored.",
            CartError::Storage(_) | CartError::Serialization(_) => {
                "Your cart could not be saved. Please try again."
            }
        }
    }
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
