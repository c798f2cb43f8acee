//! Key-value persistence for the storefront client.
//!
//! Mirrors the browser storage contract the storefront relies on: string
//! values under fixed string keys, each write durable before it returns.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{Result, StorageError};
pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use store::{KeyValueStore, keys};
