//! Per-user checkout session state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::UserId;
use domain::CheckoutState;

/// Stores each user's position in the checkout conversation.
///
/// The default state is [`CheckoutState::Idle`]; a missing entry and an
/// idle entry are indistinguishable. Stale sessions are simply overwritten
/// the next time the user starts a checkout.
pub trait SessionStore: Send + Sync {
    /// Returns the user's current checkout state.
    fn get(&self, user: UserId) -> CheckoutState;

    /// Replaces the user's checkout state.
    fn set(&self, user: UserId, state: CheckoutState);

    /// Resets the user to idle.
    fn clear(&self, user: UserId);
}

/// Process-local session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<UserId, CheckoutState>>>,
}

impl InMemorySessionStore {
    /// Creates a new empty session store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user: UserId) -> CheckoutState {
        self.sessions
            .read()
            .unwrap()
            .get(&user)
            .copied()
            .unwrap_or_default()
    }

    fn set(&self, user: UserId, state: CheckoutState) {
        self.sessions.write().unwrap().insert(user, state);
    }

    fn clear(&self, user: UserId) {
        self.sessions.write().unwrap().remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_is_idle() {
        let sessions = InMemorySessionStore::new();
        assert_eq!(sessions.get(UserId::new(1)), CheckoutState::Idle);
    }

    #[test]
    fn set_and_clear_roundtrip() {
        let sessions = InMemorySessionStore::new();
        let user = UserId::new(1);

        sessions.set(user, CheckoutState::AwaitingAddress);
        assert!(sessions.get(user).is_awaiting_address());

        sessions.clear(user);
        assert_eq!(sessions.get(user), CheckoutState::Idle);
    }

    #[test]
    fn sessions_are_per_user() {
        let sessions = InMemorySessionStore::new();
        sessions.set(UserId::new(1), CheckoutState::AwaitingAddress);
        assert_eq!(sessions.get(UserId::new(2)), CheckoutState::Idle);
    }
}
