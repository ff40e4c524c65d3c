//! Checkout session state machine.

use serde::{Deserialize, Serialize};

/// Per-user checkout progress.
///
/// State transitions:
/// ```text
/// Idle ──► AwaitingAddress ──► (cleared back to Idle on completion
///                               or abandonment)
/// ```
///
/// Completion and abandonment are both terminal and both clear the session;
/// a stale `AwaitingAddress` entry is harmless because the next checkout
/// request overwrites it. Cart emptiness is checked when the address is
/// committed, not when checkout begins, since the cart can still change
/// while the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// No checkout in flight.
    #[default]
    Idle,

    /// A delivery address has been prompted for and is awaited as free text.
    AwaitingAddress,
}

impl CheckoutState {
    /// Returns true if free-text input should be treated as an address.
    pub fn is_awaiting_address(&self) -> bool {
        matches!(self, CheckoutState::AwaitingAddress)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "Idle",
            CheckoutState::AwaitingAddress => "AwaitingAddress",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(CheckoutState::default(), CheckoutState::Idle);
    }

    #[test]
    fn only_awaiting_address_consumes_free_text() {
        assert!(!CheckoutState::Idle.is_awaiting_address());
        assert!(CheckoutState::AwaitingAddress.is_awaiting_address());
    }

    #[test]
    fn display() {
        assert_eq!(CheckoutState::Idle.to_string(), "Idle");
        assert_eq!(
            CheckoutState::AwaitingAddress.to_string(),
            "AwaitingAddress"
        );
    }

    #[test]
    fn serialization_roundtrip() {
        let state = CheckoutState::AwaitingAddress;
        let json = serde_json::to_string(&state).unwrap();
        let back: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
