//! Checkout coordinator for booking every cart entry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cart::{CartStore, SessionProvider};
use common::{CheckoutId, EventId};
use storage::KeyValueStore;
use tracing::Instrument;

use crate::error::CheckoutError;
use crate::outcome::{BookingAttempt, CheckoutOutcome};
use crate::services::booking::{BookingRequest, BookingService};
use crate::state::CheckoutState;

/// Converts the cart into tickets, one booking at a time.
///
/// Entries are booked strictly in cart order, each request awaited before
/// the next is sent. The cart is read again before every booking: an entry
/// added while a checkout runs is booked in the same run, one removed before
/// its turn is skipped. A failed booking is recorded and the loop moves on.
/// Once every entry has been attempted the attempted entries leave the cart,
/// failed ones included; there is no retry.
///
/// A coordinator runs at most one checkout at a time. A second call while
/// one is in flight is rejected with [`CheckoutError::AlreadyInProgress`]
/// and sends no requests.
///
/// Clones share the same cart and in-flight state.
pub struct CheckoutCoordinator<K, S, B>
where
    K: KeyValueStore,
    S: SessionProvider,
    B: BookingService,
{
    inner: Arc<Inner<K, S, B>>,
}

struct Inner<K, S, B> {
    cart: CartStore<K, S>,
    booking: B,
    state: Mutex<CheckoutState>,
}

impl<K, S, B> Clone for CheckoutCoordinator<K, S, B>
where
    K: KeyValueStore,
    S: SessionProvider,
    B: BookingService,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, S, B> CheckoutCoordinator<K, S, B>
where
    K: KeyValueStore + 'static,
    S: SessionProvider + 'static,
    B: BookingService + 'static,
{
    /// Creates a new checkout coordinator.
    pub fn new(cart: CartStore<K, S>, booking: B) -> Self {
        Self {
            inner: Arc::new(Inner {
                cart,
                booking,
                state: Mutex::new(CheckoutState::Idle),
            }),
        }
    }

    pub fn cart(&self) -> &CartStore<K, S> {
        &self.inner.cart
    }

    pub fn booking(&self) -> &B {
        &self.inner.booking
    }

    /// Returns the current state of the coordinator.
    pub fn state(&self) -> CheckoutState {
        *lock(&self.inner.state)
    }

    /// Books every entry of the current cart for the signed-in user.
    ///
    /// The checkout runs on its own task: dropping the returned future
    /// stops waiting for the result but not the bookings, which still run
    /// to the end and clear the cart. Needs a Tokio runtime.
    ///
    /// Posts exactly one notice: the outcome's message, or the reason the
    /// checkout could not start.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self) -> Result<CheckoutOutcome, CheckoutError> {
        let this = self.clone();
        let task = tokio::spawn(async move { this.run_and_report().await }.in_current_span());
        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "checkout task ended abnormally");
                let err = CheckoutError::Interrupted(e.to_string());
                self.cart().notices().push(err.notice_level(), err.user_message());
                Err(err)
            }
        }
    }

    async fn run_and_report(&self) -> Result<CheckoutOutcome, CheckoutError> {
        let notices = self.cart().notices();
        match self.run().await {
            Ok(outcome) => {
                notices.push(outcome.notice_level(), outcome.message());
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(error = %e, "checkout rejected");
                notices.push(e.notice_level(), e.user_message());
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<CheckoutOutcome, CheckoutError> {
        let cart = self.cart();
        let user = cart
            .session()
            .current_user()
            .ok_or(CheckoutError::Unauthenticated)?;

        let mut in_flight = InFlight::begin(&self.inner.state, cart)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        metrics::counter!("checkout_executions_total").increment(1);
        let started = std::time::Instant::now();
        let token = cart.session().auth_token();
        let checkout_id = CheckoutId::new();
        let mut outcome = CheckoutOutcome::new(checkout_id);

        tracing::info!(
            %checkout_id,
            user_id = %user.id,
            entries = cart.len(),
            has_token = token.is_some(),
            "checkout started"
        );

        loop {
            let next = cart
                .snapshot()
                .into_iter()
                .find(|e| !in_flight.was_attempted(e.event_id));
            let Some(entry) = next else {
                break;
            };
            let request = BookingRequest {
                event_id: entry.event_id,
                buyer_id: user.id,
                auth_token: token.clone(),
            };
            let position = in_flight.attempted.len();
            tracing::info!(position, event_id = %entry.event_id, "booking started");
            in_flight.attempted.push(entry.event_id);

            let result = self.inner.booking.book_ticket(&request).await;
            match &result {
                Ok(ticket) => {
                    metrics::counter!("checkout_bookings_total", "result" => "success")
                        .increment(1);
                    tracing::info!(
                        event_id = %entry.event_id,
                        ticket_number = %ticket.ticket_number,
                        "ticket booked"
                    );
                }
                Err(failure) => {
                    metrics::counter!("checkout_bookings_total", "result" => "failure")
                        .increment(1);
                    tracing::warn!(event_id = %entry.event_id, error = %failure, "booking failed");
                }
            }

            outcome.record(BookingAttempt {
                event_id: entry.event_id,
                title: entry.title,
                result,
            });
        }

        in_flight.complete();

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        tracing::info!(
            %checkout_id,
            succeeded = outcome.success_count,
            failed = outcome.fail_count,
            duration,
            "checkout completed"
        );

        Ok(outcome)
    }
}

/// Marks the coordinator busy for the lifetime of one checkout.
///
/// Keeps the event ids whose booking request has gone out. [`complete`]
/// and an unfinished drop both take those entries out of the cart and mark
/// the checkout completed, so nothing that may have been booked is offered
/// again. A drop before any request puts the previous state back.
///
/// [`complete`]: Self::complete
struct InFlight<'a, K, S>
where
    K: KeyValueStore,
    S: SessionProvider,
{
    state: &'a Mutex<CheckoutState>,
    cart: &'a CartStore<K, S>,
    previous: CheckoutState,
    attempted: Vec<EventId>,
    completed: bool,
}

impl<'a, K, S> InFlight<'a, K, S>
where
    K: KeyValueStore,
    S: SessionProvider,
{
    fn begin(
        state: &'a Mutex<CheckoutState>,
        cart: &'a CartStore<K, S>,
    ) -> Result<Self, CheckoutError> {
        let mut current = lock(state);
        if !current.can_start() {
            return Err(CheckoutError::AlreadyInProgress);
        }
        let previous = *current;
        *current = CheckoutState::InProgress;
        Ok(Self {
            state,
            cart,
            previous,
            attempted: Vec::new(),
            completed: false,
        })
    }

    fn was_attempted(&self, event_id: EventId) -> bool {
        self.attempted.contains(&event_id)
    }

    fn complete(&mut self) {
        self.finish();
        self.completed = true;
    }

    fn finish(&self) {
        if let Err(e) = self.cart.remove_checked_out(&self.attempted) {
            tracing::error!(error = %e, "failed to persist cart after checkout");
        }
        *lock(self.state) = CheckoutState::Completed;
    }
}

impl<K, S> Drop for InFlight<'_, K, S>
where
    K: KeyValueStore,
    S: SessionProvider,
{
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if self.attempted.is_empty() {
            *lock(self.state) = self.previous;
        } else {
            tracing::warn!(
                attempted = self.attempted.len(),
                "checkout stopped early, dropping attempted entries"
            );
            self.finish();
        }
    }
}

fn lock(state: &Mutex<CheckoutState>) -> MutexGuard<'_, CheckoutState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
