//! Shared types for the ticketing storefront.
//!
//! Identifiers used across the cart and checkout crates, and the
//! transient notification board every user-facing operation reports to.

pub mod notice;
pub mod types;

pub use notice::{Notice, NoticeLevel, NotificationCenter};
pub use types::{CheckoutId, EventId, UserId};
