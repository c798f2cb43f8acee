//! Checkout for the storefront cart.
//!
//! The coordinator books every cart entry in insertion order, one request
//! at a time, through a [`BookingService`]. A failed booking never stops
//! the remaining ones; the tally of successes and failures is returned as
//! a [`CheckoutOutcome`] and the cart is emptied afterwards either way.

pub mod coordinator;
pub mod error;
pub mod outcome;
pub mod services;
pub mod state;

pub use coordinator::CheckoutCoordinator;
pub use error::{BookingFailure, CheckoutError};
pub use outcome::{BookingAttempt, CheckoutOutcome, OutcomeClass};
pub use services::{
    BookingRequest, BookingService, HttpBookingService, InMemoryBookingService, Ticket,
    TicketStatus,
};
pub use state::CheckoutState;
