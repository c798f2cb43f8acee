//! Booking collaborator trait and its implementations.

pub mod booking;
pub mod http;

pub use booking::{BookingRequest, BookingService, InMemoryBookingService, Ticket, TicketStatus};
pub use http::HttpBookingService;
