//! Checkout error types.

use common::NoticeLevel;
use serde::Serialize;
use thiserror::Error;

/// Reasons a checkout cannot start.
///
/// Failures of individual bookings are not errors of the checkout; they
/// are tallied in the outcome as [`BookingFailure`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// No user is signed in.
    #[error("No authenticated user")]
    Unauthenticated,

    /// The cart has no entries.
    #[error("Cart is empty")]
    EmptyCart,

    /// Another checkout on this coordinator has not finished yet.
    #[error("A checkout is already in progress")]
    AlreadyInProgress,

    /// The task running the checkout ended without reporting back.
    #[error("Checkout task did not finish: {0}")]
    Interrupted(String),
}

impl CheckoutError {
    /// Severity of the notice shown for this error.
    pub fn notice_level(&self) -> NoticeLevel {
        match self {
            CheckoutError::Interrupted(_) => NoticeLevel::Danger,
            _ => NoticeLevel::Warning,
        }
    }

    /// Text of the notice shown for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckoutError::Unauthenticated => "Please log in first.",
            CheckoutError::EmptyCart => "Your cart is empty!",
            CheckoutError::AlreadyInProgress => "Your purchase is already being processed.",
            CheckoutError::Interrupted(_) => "Your purchase could not be completed.",
        }
    }
}

/// Why a single booking request did not produce a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingFailure {
    /// The backend refused the booking because the event is sold out or over.
    #[error("Not enough tickets or the event has passed: {message}")]
    NoCapacity { message: String },

    /// The backend answered with any other non-success status.
    #[error("Booking rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// No response arrived.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A success response whose body is not a ticket.
    #[error("Invalid booking response: {message}")]
    InvalidResponse { message: String },
}

impl BookingFailure {
    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 400 {
            BookingFailure::NoCapacity { message }
        } else {
            BookingFailure::Rejected { status, message }
        }
    }

    /// True for the condition a user can be told about in plain terms.
    pub fn is_capacity_problem(&self) -> bool {
        matches!(self, BookingFailure::NoCapacity { .. })
    }
}
