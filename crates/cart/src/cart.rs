//! Ordered cart of purchase intents.

use common::EventId;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entry::CartEntry;
use crate::error::{CartError, Result};
use crate::value_objects::Money;

/// Cart state: entries in insertion order, at most one per event.
///
/// Serializes as a bare JSON array of entries. Deserializing re-checks every
/// invariant, so a hand-edited or truncated payload is rejected instead of
/// producing a cart that breaks them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted cart.
    ///
    /// Any parse or validation failure is reported as
    /// [`CartError::PersistenceCorruption`].
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CartError::PersistenceCorruption(e.to_string()))
    }

    /// Serializes the cart to its persisted form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the cart holds an entry for `event_id`.
    pub fn contains(&self, event_id: EventId) -> bool {
        self.entries.iter().any(|e| e.event_id == event_id)
    }

    pub fn get(&self, index: usize) -> Option<&CartEntry> {
        self.entries.get(index)
    }

    /// Sum of `price * quantity` over all entries.
    pub fn total_value(&self) -> Money {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Appends an entry and returns the new entry count.
    pub fn add(&mut self, entry: CartEntry) -> Result<usize> {
        validate_entry(&entry)?;
        if self.contains(entry.event_id) {
            return Err(CartError::DuplicateEntry(entry.event_id));
        }
        self.entries.push(entry);
        Ok(self.entries.len())
    }

    /// Removes the entry at `index`, keeping the others in order.
    pub fn remove(&mut self, index: usize) -> Result<CartEntry> {
        if index >= self.entries.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes every entry whose event is in `event_ids` and returns how many went.
    pub fn remove_events(&mut self, event_ids: &[EventId]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !event_ids.contains(&e.event_id));
        before - self.entries.len()
    }
}

fn validate_entry(entry: &CartEntry) -> Result<()> {
    if entry.price.is_negative() {
        return Err(CartError::InvalidEntry {
            event_id: entry.event_id,
            reason: format!("price {} is negative", entry.price),
        });
    }
    if entry.quantity != 1 {
        return Err(CartError::InvalidEntry {
            event_id: entry.event_id,
            reason: format!("quantity must be 1, got {}", entry.quantity),
        });
    }
    Ok(())
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = CartError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self> {
        let mut cart = Cart::new();
        for entry in entries {
            cart.add(entry)?;
        }
        Ok(cart)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = Vec::<CartEntry>::deserialize(deserializer)?;
        Cart::try_from(entries).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

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

    #[test]
    fn test_add_appends_in_order() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(entry(1, 100)).unwrap(), 1);
        assert_eq!(cart.add(entry(2, 200)).unwrap(), 2);

        let ids: Vec<i64> = cart.entries().iter().map(|e| e.event_id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_add_duplicate_fails_without_change() {
        let mut cart = Cart::new();
        cart.add(entry(1, 100)).unwrap();

        let err = cart.add(entry(1, 999)).unwrap_err();
        assert!(matches!(err, CartError::DuplicateEntry(id) if id == EventId::new(1)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.entries()[0].price, Money::from_cents(100));
    }

    #[test]
    fn test_add_negative_price_fails() {
        let mut cart = Cart::new();
        let err = cart.add(entry(1, -1)).unwrap_err();
        assert!(matches!(err, CartError::InvalidEntry { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_free_event_is_allowed() {
        let mut cart = Cart::new();
        cart.add(entry(1, 0)).unwrap();
        assert_eq!(cart.total_value(), Money::zero());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut cart = Cart::new();
        for id in 1..=4 {
            cart.add(entry(id, 100)).unwrap();
        }

        let removed = cart.remove(1).unwrap();
        assert_eq!(removed.event_id, EventId::new(2));

        let ids: Vec<i64> = cart.entries().iter().map(|e| e.event_id.get()).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut cart = Cart::new();
        cart.add(entry(1, 100)).unwrap();

        let err = cart.remove(1).unwrap_err();
        assert!(matches!(err, CartError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_value_is_exact() {
        let mut cart = Cart::new();
        cart.add(entry(1, 15000)).unwrap();
        cart.add(entry(2, 9999)).unwrap();
        assert_eq!(cart.total_value(), Money::from_cents(24999));
        assert_eq!(cart.total_value().to_string(), "249.99");
    }

    #[test]
    fn test_total_value_of_extreme_prices_does_not_overflow() {
        let mut cart = Cart::new();
        cart.add(entry(1, 9_000_000_000_000_000_000)).unwrap();
        cart.add(entry(2, 9_000_000_000_000_000_000)).unwrap();
        assert_eq!(cart.total_value().cents(), i64::MAX);
    }

    #[test]
    fn test_remove_events() {
        let mut cart = Cart::new();
        for id in [1, 2, 3, 4] {
            cart.add(entry(id, 100)).unwrap();
        }

        let removed = cart.remove_events(&[EventId::new(3), EventId::new(1), EventId::new(9)]);

        assert_eq!(removed, 2);
        let ids: Vec<EventId> = cart.entries().iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![EventId::new(2), EventId::new(4)]);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut cart = Cart::new();
        cart.add(entry(5, 15000)).unwrap();
        cart.add(entry(3, 9999)).unwrap();

        let json = cart.to_json().unwrap();
        assert!(json.starts_with('['));
        assert_eq!(Cart::from_json(&json).unwrap(), cart);
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let mut cart = Cart::new();
        cart.add(entry(1, 100)).unwrap();
        let one = serde_json::to_value(&cart.entries()[0]).unwrap();
        let raw = serde_json::to_string(&vec![one.clone(), one]).unwrap();

        let err = Cart::from_json(&raw).unwrap_err();
        assert!(matches!(err, CartError::PersistenceCorruption(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        for raw in ["", "{", "null", "{\"eventId\":1}", "[{\"eventId\":\"x\"}]"] {
            assert!(
                matches!(Cart::from_json(raw), Err(CartError::PersistenceCorruption(_))),
                "accepted {raw:?}"
            );
        }
    }
}
