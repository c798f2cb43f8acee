//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of a checkout coordinator.
///
/// State transitions:
/// ```text
/// Idle ──► InProgress ──► Completed
///   ▲                         │
///   └──── (next checkout) ◄───┘
/// ```
/// There is no cancelled state: a started checkout attempts every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// No checkout has run yet.
    #[default]
    Idle,

    /// Bookings are being issued.
    InProgress,

    /// The last checkout attempted every entry.
    Completed,
}

impl CheckoutState {
    /// Returns true if a new checkout may begin.
    pub fn can_start(&self) -> bool {
        !matches!(self, CheckoutState::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "Idle",
            CheckoutState::InProgress => "InProgress",
            CheckoutState::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
