//! Client-side shopping cart for the ticketing storefront.
//!
//! This crate provides:
//! - `Money` with exact minor-unit arithmetic
//! - `CartEntry` and the ordered, duplicate-free `Cart`
//! - `SessionProvider` and a key-value backed `StoredSession`
//! - `CartStore`, the authoritative cart with write-through persistence

pub mod cart;
pub mod entry;
pub mod error;
pub mod session;
pub mod store;
pub mod value_objects;

pub use cart::Cart;
pub use entry::{CartEntry, EventSummary};
pub use error::CartError;
pub use session::{SessionProvider, StoredSession, User};
pub use store::CartStore;
pub use value_objects::Money;
