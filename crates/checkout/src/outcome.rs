//! Result tally of one checkout.

use common::{CheckoutId, EventId, NoticeLevel};
use serde::Serialize;

use crate::error::BookingFailure;
use crate::services::Ticket;

/// What happened to one cart entry during checkout.
#[derive(Debug, Clone, Serialize)]
pub struct BookingAttempt {
    pub event_id: EventId,
    pub title: String,
    pub result: Result<Ticket, BookingFailure>,
}

impl BookingAttempt {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Which of the three user-facing results a checkout produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    AllSucceeded,
    Mixed,
    AllFailed,
}

/// Tally of one checkout, with the attempts in the order they were made.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub checkout_id: CheckoutId,
    pub success_count: usize,
    pub fail_count: usize,
    pub attempts: Vec<BookingAttempt>,
}

impl CheckoutOutcome {
    pub fn new(checkout_id: CheckoutId) -> Self {
        Self {
            checkout_id,
            success_count: 0,
            fail_count: 0,
            attempts: Vec::new(),
        }
    }

    /// Appends an attempt and updates the counts.
    pub fn record(&mut self, attempt: BookingAttempt) {
        if attempt.succeeded() {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }
        self.attempts.push(attempt);
    }

    pub fn class(&self) -> OutcomeClass {
        match (self.success_count, self.fail_count) {
            (s, 0) if s > 0 => OutcomeClass::AllSucceeded,
            (s, _) if s > 0 => OutcomeClass::Mixed,
            _ => OutcomeClass::AllFailed,
        }
    }

    /// Tickets booked, in cart order.
    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.attempts.iter().filter_map(|a| a.result.as_ref().ok())
    }

    pub fn notice_level(&self) -> NoticeLevel {
        match self.class() {
            OutcomeClass::AllSucceeded => NoticeLevel::Success,
            OutcomeClass::Mixed => NoticeLevel::Warning,
            OutcomeClass::AllFailed => NoticeLevel::Danger,
        }
    }

    /// The notice text for this outcome.
    pub fn message(&self) -> String {
        match self.class() {
            OutcomeClass::AllSucceeded => format!(
                "{} purchased successfully!",
                tickets(self.success_count)
            ),
            OutcomeClass::Mixed => format!(
                "{} purchased, {} could not be purchased.",
                tickets(self.success_count),
                self.fail_count
            ),
            OutcomeClass::AllFailed => "Ticket purchase failed.".to_string(),
        }
    }
}

fn tickets(n: usize) -> String {
    if n == 1 {
        "1 ticket".to_string()
    } else {
        format!("{n} tickets")
    }
}
