//! Booking service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use cart::Money;
use chrono::NaiveDateTime;
use common::{EventId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::BookingFailure;

/// One booking request: a single ticket for `event_id` bought by `buyer_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub event_id: EventId,
    pub buyer_id: UserId,
    /// Bearer token from the session, sent when present.
    pub auth_token: Option<String>,
}

/// Lifecycle status the backend reports for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
}

/// A confirmed ticket as returned by the booking endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: Option<i64>,
    pub ticket_number: String,
    pub price: Money,
    pub status: TicketStatus,
    #[serde(default)]
    pub purchase_date: Option<NaiveDateTime>,
}

/// Trait for ticket booking operations.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Books one ticket. Every failure mode, including transport errors,
    /// comes back as a [`BookingFailure`].
    async fn book_ticket(&self, request: &BookingRequest) -> Result<Ticket, BookingFailure>;
}

#[async_trait]
impl<T: BookingService + ?Sized> BookingService for Arc<T> {
    async fn book_ticket(&self, request: &BookingRequest) -> Result<Ticket, BookingFailure> {
        (**self).book_ticket(request).await
    }
}

#[derive(Debug, Default)]
struct InMemoryBookingState {
    requests: Vec<BookingRequest>,
    tickets: Vec<Ticket>,
    failures: HashMap<EventId, BookingFailure>,
    prices: HashMap<EventId, Money>,
    delay: Option<Duration>,
    next_id: u32,
}

/// In-memory booking service for testing and offline use.
///
/// Records every request in call order. Specific events can be configured
/// to fail, and an artificial delay keeps a checkout in flight long enough
/// to observe it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingService {
    state: Arc<RwLock<InMemoryBookingState>>,
}

impl InMemoryBookingService {
    /// Creates a new in-memory booking service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every booking for `event_id` fail with `failure`.
    pub fn fail_event(&self, event_id: impl Into<EventId>, failure: BookingFailure) {
        self.write().failures.insert(event_id.into(), failure);
    }

    /// Removes a failure configured with [`fail_event`](Self::fail_event).
    pub fn restore_event(&self, event_id: impl Into<EventId>) {
        self.write().failures.remove(&event_id.into());
    }

    /// Sets the price stamped on tickets for `event_id`.
    pub fn set_price(&self, event_id: impl Into<EventId>, price: Money) {
        self.write().prices.insert(event_id.into(), price);
    }

    /// Delays every booking by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.write().delay = Some(delay);
    }

    /// Returns every request received, in call order.
    pub fn requests(&self) -> Vec<BookingRequest> {
        self.read().requests.clone()
    }

    /// Returns the event ids of every request received, in call order.
    pub fn attempted_events(&self) -> Vec<EventId> {
        self.read().requests.iter().map(|r| r.event_id).collect()
    }

    /// Returns the number of tickets issued.
    pub fn ticket_count(&self) -> usize {
        self.read().tickets.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryBookingState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryBookingState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BookingService for InMemoryBookingService {
    async fn book_ticket(&self, request: &BookingRequest) -> Result<Ticket, BookingFailure> {
        let delay = {
            let mut state = self.write();
            state.requests.push(request.clone());
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write();
        if let Some(failure) = state.failures.get(&request.event_id) {
            return Err(failure.clone());
        }

        state.next_id += 1;
        let ticket = Ticket {
            id: Some(i64::from(state.next_id)),
            ticket_number: format!("TKT-{:04}", state.next_id),
            price: state
                .prices
                .get(&request.event_id)
                .copied()
                .unwrap_or_default(),
            status: TicketStatus::Active,
            purchase_date: Some(chrono::Utc::now().naive_utc()),
        };
        state.tickets.push(ticket.clone());
        Ok(ticket)
    }
}
