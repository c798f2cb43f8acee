use crate::Result;

/// Well-known keys shared by the storefront components.
pub mod keys {
    /// Serialized cart entries.
    pub const CART: &str = "cart";

    /// JSON record of the signed-in user.
    pub const CURRENT_USER: &str = "currentUser";

    /// Bearer token issued at login.
    pub const AUTH_TOKEN: &str = "jwtToken";
}

/// Core trait for key-value store implementations.
///
/// Writes are synchronous: once `set` or `remove` returns `Ok`, a fresh
/// store opened on the same backing medium observes the change.
/// All implementations must be thread-safe (Send + Sync).
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
