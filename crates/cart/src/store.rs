//! Authoritative cart state with write-through persistence.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::{EventId, NotificationCenter};
use storage::{KeyValueStore, keys};

use crate::cart::Cart;
use crate::entry::CartEntry;
use crate::error::{CartError, Result};
use crate::session::SessionProvider;
use crate::value_objects::Money;

/// Owns the current cart and keeps it durable.
///
/// Every mutator writes the full cart under the `cart` key before returning
/// and only then commits the change in memory, so a failed write leaves
/// both copies as they were. Each mutator call posts exactly one notice.
///
/// Clones share the same cart.
#[derive(Debug, Clone)]
pub struct CartStore<K, S> {
    storage: K,
    session: S,
    notices: NotificationCenter,
    cart: Arc<RwLock<Cart>>,
}

impl<K, S> CartStore<K, S>
where
    K: KeyValueStore,
    S: SessionProvider,
{
    /// Restores the persisted cart, or starts empty.
    ///
    /// Missing, unreadable or corrupt data all yield an empty cart; this
    /// never fails.
    #[tracing::instrument(skip_all)]
    pub fn open(storage: K, session: S, notices: NotificationCenter) -> Self {
        let cart = load_cart(&storage);
        tracing::debug!(entries = cart.len(), "cart restored");
        Self {
            storage,
            session,
            notices,
            cart: Arc::new(RwLock::new(cart)),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    /// Adds an entry for a signed-in user and returns the new entry count.
    ///
    /// Fails with [`CartError::Unauthenticated`] when nobody is signed in
    /// and [`CartError::DuplicateEntry`] when the event is already present;
    /// neither changes the cart.
    #[tracing::instrument(skip(self, entry), fields(event_id = %entry.event_id))]
    pub fn add(&self, entry: CartEntry) -> Result<usize> {
        let result = self.try_add(entry);
        match &result {
            Ok(_) => {
                self.notices.success("Event added to cart!");
            }
            Err(e) => self.report(e),
        }
        result
    }

    fn try_add(&self, entry: CartEntry) -> Result<usize> {
        if self.session.current_user().is_none() {
            return Err(CartError::Unauthenticated);
        }
        self.mutate("add", |cart| cart.add(entry))
    }

    /// Removes the entry at `index`, keeping the rest in order.
    ///
    /// `index` must come from a current [`snapshot`](Self::snapshot); a
    /// stale index past the end returns [`CartError::IndexOutOfRange`].
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, index: usize) -> Result<CartEntry> {
        let result = self.mutate("remove", |cart| cart.remove(index));
        match &result {
            Ok(_) => {
                self.notices.info("Event removed from cart.");
            }
            Err(e) => self.report(e),
        }
        result
    }

    /// Empties the cart. Clearing an empty cart is fine.
    #[tracing::instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        let result = self.mutate("clear", |cart| {
            cart.clear();
            Ok(())
        });
        match &result {
            Ok(()) => {
                self.notices.info("Cart cleared.");
            }
            Err(e) => self.report(e),
        }
        result
    }

    /// Removes the entries a checkout attempted, leaving anything added meanwhile.
    ///
    /// The in-memory cart loses them even if the write fails, so the same
    /// entries can never be booked twice; the write error is still returned.
    /// Posts no notice: the checkout reports its own outcome.
    #[tracing::instrument(skip(self, event_ids), fields(attempted = event_ids.len()))]
    pub fn remove_checked_out(&self, event_ids: &[EventId]) -> Result<()> {
        let remaining = {
            let mut cart = self.write();
            let removed = cart.remove_events(event_ids);
            tracing::debug!(removed, remaining = cart.len(), "checked-out entries removed");
            cart.clone()
        };
        metrics::counter!("cart_mutations_total", "op" => "checkout_clear").increment(1);
        self.persist(&remaining)
    }

    /// Drops the cart entirely on logout: empties it and removes the key.
    #[tracing::instrument(skip(self))]
    pub fn discard(&self) -> Result<()> {
        self.write().clear();
        self.storage.remove(keys::CART)?;
        Ok(())
    }

    /// Returns a copy of the current entries in order.
    pub fn snapshot(&self) -> Vec<CartEntry> {
        self.read().entries().to_vec()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, event_id: EventId) -> bool {
        self.read().contains(event_id)
    }

    /// Exact sum of `price * quantity` over the cart.
    pub fn total_value(&self) -> Money {
        self.read().total_value()
    }

    fn mutate<T>(&self, op: &'static str, apply: impl FnOnce(&mut Cart) -> Result<T>) -> Result<T> {
        let mut current = self.write();
        let mut next = current.clone();
        let value = apply(&mut next)?;
        self.persist(&next)?;
        *current = next;
        metrics::counter!("cart_mutations_total", "op" => op).increment(1);
        tracing::debug!(op, entries = current.len(), "cart updated");
        Ok(value)
    }

    fn persist(&self, cart: &Cart) -> Result<()> {
        let json = cart.to_json()?;
        self.storage.set(keys::CART, &json)?;
        Ok(())
    }

    fn report(&self, error: &CartError) {
        match error {
            CartError::Storage(_) | CartError::Serialization(_) => {
                tracing::error!(error = %error, "cart persistence failed");
            }
            _ => tracing::debug!(error = %error, "cart operation rejected"),
        }
        self.notices.push(error.notice_level(), error.user_message());
    }

    fn read(&self) -> RwLockReadGuard<'_, Cart> {
        self.cart.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.cart.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_cart<K: KeyValueStore>(storage: &K) -> Cart {
    let raw = match storage.get(keys::CART) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read persisted cart, starting empty");
            return Cart::new();
        }
    };
    match Cart::from_json(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(error = %e, "persisted cart is corrupt, starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use common::NoticeLevel;
    use storage::InMemoryKeyValueStore;

    use super::*;
    use crate::session::{StoredSession, User};

    type TestStore = CartStore<InMemoryKeyValueStore, StoredSession<InMemoryKeyValueStore>>;

    fn entry(id: i64, cents: i64) -> CartEntry {
        let start =
            NaiveDateTime::parse_from_str("2025-06-01T20:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        CartEntry::new(
            id,
            format!("Event {id}"),
            Money::from_cents(cents),
            "KONSER",
            "Istanbul",
            start,
        )
    }

    fn setup(signed_in: bool) -> (TestStore, InMemoryKeyValueStore) {
        let storage = InMemoryKeyValueStore::new();
        let session = StoredSession::new(storage.clone());
        if signed_in {
            session.sign_in(&User::new(1, "ayse"), Some("token")).unwrap();
        }
        let store = CartStore::open(storage.clone(), session, NotificationCenter::new());
        (store, storage)
    }

    #[test]
    fn test_open_empty() {
        let (store, _) = setup(true);
        assert!(store.is_empty());
        assert_eq!(store.total_value(), Money::zero());
    }

    #[test]
    fn test_add_persists_before_returning() {
        let (store, storage) = setup(true);
        assert_eq!(store.add(entry(1, 15000)).unwrap(), 1);

        let raw = storage.get(keys::CART).unwrap().unwrap();
        let persisted = Cart::from_json(&raw).unwrap();
        assert_eq!(persisted.entries(), store.snapshot().as_slice());
    }

    #[test]
    fn test_add_requires_user() {
        let (store, storage) = setup(false);
        let err = store.add(entry(1, 100)).unwrap_err();

        assert!(matches!(err, CartError::Unauthenticated));
        assert!(store.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap(), None);

        let notices = store.notices().visible();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(notices[0].message, "Please log in first.");
    }

    #[test]
    fn test_duplicate_add_is_noop_with_notice() {
        let (store, _) = setup(true);
        store.add(entry(1, 100)).unwrap();
        let before = store.snapshot();

        let err = store.add(entry(1, 100)).unwrap_err();
        assert!(matches!(err, CartError::DuplicateEntry(_)));
        assert_eq!(store.snapshot(), before);

        let notices = store.notices().visible();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].message, "This event is already in your cart!");
    }

    #[test]
    fn test_remove_and_clear_notify() {
        let (store, storage) = setup(true);
        store.add(entry(1, 100)).unwrap();
        store.add(entry(2, 200)).unwrap();

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.event_id, EventId::new(1));
        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some("[]"));

        let messages: Vec<String> = store
            .notices()
            .visible()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Event added to cart!",
                "Event added to cart!",
                "Event removed from cart.",
                "Cart cleared.",
                "Cart cleared.",
            ]
        );
    }

    #[test]
    fn test_remove_out_of_range_keeps_cart() {
        let (store, _) = setup(true);
        store.add(entry(1, 100)).unwrap();

        assert!(matches!(
            store.remove(3),
            Err(CartError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let (store, _) = setup(true);
        store.add(entry(1, 100)).unwrap();

        let mut snapshot = store.snapshot();
        snapshot.clear();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_checked_out_is_silent() {
        let (store, storage) = setup(true);
        store.add(entry(1, 100)).unwrap();

        store.remove_checked_out(&[EventId::new(1)]).unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some("[]"));
        assert_eq!(store.notices().visible().len(), 1);
    }

    #[test]
    fn test_remove_checked_out_keeps_unattempted_entries() {
        let (store, storage) = setup(true);
        for id in [1, 2, 3] {
            store.add(entry(id, 100)).unwrap();
        }

        store
            .remove_checked_out(&[EventId::new(1), EventId::new(3)])
            .unwrap();

        let ids: Vec<EventId> = store.snapshot().iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![EventId::new(2)]);
        let persisted = Cart::from_json(&storage.get(keys::CART).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 1);
        assert!(persisted.contains(EventId::new(2)));
    }

    #[test]
    fn test_discard_removes_key() {
        let (store, storage) = setup(true);
        store.add(entry(1, 100)).unwrap();

        store.discard().unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_clones_share_cart() {
        let (store, _) = setup(true);
        let other = store.clone();
        store.add(entry(1, 100)).unwrap();
        assert!(other.contains(EventId::new(1)));
    }
}
