//! Cart entries and the catalog record they are built from.

use chrono::NaiveDateTime;
use common::EventId;
use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

fn default_quantity() -> u32 {
    1
}

/// One event the user intends to buy a single ticket for.
///
/// Field names match the persisted browser format (`eventId`,
/// `startDateTime`, ...), so carts saved by older clients load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub event_id: EventId,
    pub title: String,
    pub price: Money,
    pub category: String,
    pub location: String,
    pub start_date_time: NaiveDateTime,
    /// Always 1; per-entry quantities are not supported.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartEntry {
    /// Creates an entry for a single ticket.
    pub fn new(
        event_id: impl Into<EventId>,
        title: impl Into<String>,
        price: Money,
        category: impl Into<String>,
        location: impl Into<String>,
        start_date_time: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            title: title.into(),
            price,
            category: category.into(),
            location: location.into(),
            start_date_time,
            quantity: 1,
        }
    }

    /// Builds an entry from the event the user is looking at.
    pub fn from_event(event: &EventSummary) -> Self {
        Self::new(
            event.id,
            event.title.clone(),
            event.price,
            event.category.clone(),
            event.location.clone(),
            event.start_date_time,
        )
    }

    /// Returns `price * quantity`.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// The subset of a catalog event the cart needs.
///
/// Parsed from the backend's event JSON; fields the cart does not use
/// (capacity, organizer, description) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    pub start_date_time: NaiveDateTime,
}

impl From<&EventSummary> for CartEntry {
    fn from(event: &EventSummary) -> Self {
        CartEntry::from_event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-06-01T20:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_new_entry_has_quantity_one() {
        let entry = CartEntry::new(
            1,
            "Concert",
            Money::from_units(150),
            "KONSER",
            "Istanbul",
            start(),
        );
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.line_total(), Money::from_units(150));
    }

    #[test]
    fn test_persisted_field_names() {
        let entry = CartEntry::new(
            7,
            "Play",
            Money::from_cents(9999),
            "TİYATRO",
            "Ankara",
            start(),
        );
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["eventId"], 7);
        assert_eq!(json["title"], "Play");
        assert_eq!(json["price"], 99.99);
        assert_eq!(json["startDateTime"], "2025-06-01T20:00:00");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_parse_legacy_entry_without_quantity() {
        let raw = r#"{"eventId":3,"title":"Match","price":250,"category":"SPOR",
                      "location":"Izmir","startDateTime":"2025-09-10T19:30:00"}"#;
        let entry: CartEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.price, Money::from_units(250));
    }

    #[test]
    fn test_from_event_ignores_extra_fields() {
        let raw = r#"{"id":12,"title":"Expo","price":75.5,"category":"SERGİ",
                      "location":"Bursa","startDateTime":"2025-10-01T10:00:00.000",
                      "availableTickets":40,"description":"Art"}"#;
        let event: EventSummary = serde_json::from_str(raw).unwrap();
        let entry = CartEntry::from_event(&event);

        assert_eq!(entry.event_id, EventId::new(12));
        assert_eq!(entry.price.cents(), 7550);
        assert_eq!(entry.location, "Bursa");
    }
}
