//! Session collaborator: who is signed in and with which token.

use common::UserId;
use serde::{Deserialize, Serialize};
use storage::{KeyValueStore, keys};

/// The signed-in user as recorded by the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: String::new(),
            roles: Vec::new(),
        }
    }
}

/// Read access to the current session.
///
/// The cart and checkout read this but never sign users in or out.
pub trait SessionProvider: Send + Sync {
    /// Returns the signed-in user, if any.
    fn current_user(&self) -> Option<User>;

    /// Returns the bearer token used to authorize backend calls.
    fn auth_token(&self) -> Option<String>;
}

impl<T: SessionProvider + ?Sized> SessionProvider for std::sync::Arc<T> {
    fn current_user(&self) -> Option<User> {
        (**self).current_user()
    }

    fn auth_token(&self) -> Option<String> {
        (**self).auth_token()
    }
}

/// Session kept in the key-value store under `currentUser` and `jwtToken`.
#[derive(Debug, Clone)]
pub struct StoredSession<K> {
    storage: K,
}

impl<K: KeyValueStore> StoredSession<K> {
    pub fn new(storage: K) -> Self {
        Self { storage }
    }

    /// Records a successful login.
    #[tracing::instrument(skip(self, user, token), fields(user_id = %user.id))]
    pub fn sign_in(&self, user: &User, token: Option<&str>) -> storage::Result<()> {
        let json = serde_json::to_string(user)?;
        self.storage.set(keys::CURRENT_USER, &json)?;
        match token {
            Some(token) => self.storage.set(keys::AUTH_TOKEN, token)?,
            None => self.storage.remove(keys::AUTH_TOKEN)?,
        }
        tracing::info!("user signed in");
        Ok(())
    }

    /// Forgets the current user and token.
    #[tracing::instrument(skip(self))]
    pub fn sign_out(&self) -> storage::Result<()> {
        self.storage.remove(keys::CURRENT_USER)?;
        self.storage.remove(keys::AUTH_TOKEN)?;
        tracing::info!("user signed out");
        Ok(())
    }
}

impl<K: KeyValueStore> SessionProvider for StoredSession<K> {
    fn current_user(&self) -> Option<User> {
        let raw = match self.storage.get(keys::CURRENT_USER) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session user");
                return None;
            }
        };
        match serde_json::from_str::<Option<User>>(&raw) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "stored session user is unreadable");
                None
            }
        }
    }

    fn auth_token(&self) -> Option<String> {
        match self.storage.get(keys::AUTH_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read auth token");
                None
            }
        }
    }
}
