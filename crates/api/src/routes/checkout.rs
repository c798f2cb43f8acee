//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use checkout::{
    BookingAttempt, BookingFailure, BookingService, CheckoutOutcome, OutcomeClass, Ticket,
};
use common::{CheckoutId, EventId};
use serde::Serialize;
use storage::KeyValueStore;

use crate::AppState;
use crate::error::ApiError;

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_id: CheckoutId,
    pub outcome: OutcomeClass,
    pub message: String,
    pub success_count: usize,
    pub fail_count: usize,
    pub attempts: Vec<AttemptResponse>,
}

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub event_id: EventId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BookingFailure>,
}

impl From<BookingAttempt> for AttemptResponse {
    fn from(attempt: BookingAttempt) -> Self {
        let (ticket, failure) = match attempt.result {
            Ok(ticket) => (Some(ticket), None),
            Err(failure) => (None, Some(failure)),
        };
        Self {
            event_id: attempt.event_id,
            title: attempt.title,
            ticket,
            failure,
        }
    }
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            checkout_id: outcome.checkout_id,
            outcome: outcome.class(),
            message: outcome.message(),
            success_count: outcome.success_count,
            fail_count: outcome.fail_count,
            attempts: outcome.attempts.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// POST /checkout: book every cart entry for the signed-in user.
///
/// Partial and total booking failures are still a 200; only a checkout
/// that could not start is an error.
#[tracing::instrument(skip(state))]
pub async fn run<K, B>(
    State(state): State<Arc<AppState<K, B>>>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    let outcome = state.checkout.checkout().await?;
    Ok(Json(outcome.into()))
}
