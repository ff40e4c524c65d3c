//! Transient per-(user, product) quantity selection.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use common::{ProductId, UserId};

/// Holds the quantity a user is dialing in on a product screen before
/// committing it to the cart.
///
/// This state is a UI convenience, not committed state: it is process-local
/// and non-durable by design, so losing it on restart or having it diverge
/// across instances under load balancing is a known, accepted gap.
pub trait QuantityStore: Send + Sync {
    /// Returns the current selection, defaulting to 1.
    fn current(&self, user: UserId, product: ProductId) -> u32;

    /// Increments the selection and returns the new value.
    fn increment(&self, user: UserId, product: ProductId) -> u32;

    /// Decrements the selection, clamping at a floor of 1, and returns the
    /// new value.
    fn decrement(&self, user: UserId, product: ProductId) -> u32;

    /// Drops the selection; the next read starts over at 1. Called when the
    /// product screen is (re)opened and after a successful add-to-cart.
    fn reset(&self, user: UserId, product: ProductId);
}

/// Process-local quantity store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuantityStore {
    selections: Arc<RwLock<HashMap<(UserId, ProductId), u32>>>,
}

impl InMemoryQuantityStore {
    /// Creates a new empty quantity store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuantityStore for InMemoryQuantityStore {
    fn current(&self, user: UserId, product: ProductId) -> u32 {
        self.selections
            .read()
            .unwrap()
            .get(&(user, product))
            .copied()
            .unwrap_or(1)
    }

    fn increment(&self, user: UserId, product: ProductId) -> u32 {
        let mut selections = self.selections.write().unwrap();
        let entry = selections.entry((user, product)).or_insert(1);
        *entry = entry.saturating_add(1);
        *entry
    }

    fn decrement(&self, user: UserId, product: ProductId) -> u32 {
        let mut selections = self.selections.write().unwrap();
        let entry = selections.entry((user, product)).or_insert(1);
        *entry = (*entry - 1).max(1);
        *entry
    }

    fn reset(&self, user: UserId, product: ProductId) {
        self.selections.write().unwrap().remove(&(user, product));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one() {
        let store = InMemoryQuantityStore::new();
        assert_eq!(store.current(UserId::new(1), ProductId::new(1)), 1);
    }

    #[test]
    fn three_increments_read_four() {
        let store = InMemoryQuantityStore::new();
        let (user, product) = (UserId::new(1), ProductId::new(1));

        store.increment(user, product);
        store.increment(user, product);
        assert_eq!(store.increment(user, product), 4);
        assert_eq!(store.current(user, product), 4);
    }

    #[test]
    fn decrement_clamps_at_one() {
        let store = InMemoryQuantityStore::new();
        let (user, product) = (UserId::new(1), ProductId::new(1));

        assert_eq!(store.decrement(user, product), 1);
        store.increment(user, product);
        assert_eq!(store.decrement(user, product), 1);
        assert_eq!(store.decrement(user, product), 1);
    }

    #[test]
    fn reset_starts_over() {
        let store = InMemoryQuantityStore::new();
        let (user, product) = (UserId::new(1), ProductId::new(1));

        store.increment(user, product);
        store.reset(user, product);
        assert_eq!(store.current(user, product), 1);
    }

    #[test]
    fn selections_are_keyed_per_user_and_product() {
        let store = InMemoryQuantityStore::new();
        store.increment(UserId::new(1), ProductId::new(1));

        assert_eq!(store.current(UserId::new(2), ProductId::new(1)), 1);
        assert_eq!(store.current(UserId::new(1), ProductId::new(2)), 1);
    }
}
