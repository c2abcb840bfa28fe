//! RAII guard for store subscriptions.

use std::fmt;

use super::{FieldStore, SubscriptionId};
use crate::path::Path;

/// Keeps a store subscription alive; unsubscribes when dropped.
pub struct Subscription<S: FieldStore> {
    store: S,
    id: SubscriptionId,
}

impl<S: FieldStore> Subscription<S> {
    /// Takes ownership of an already registered subscription.
    pub fn new(store: S, id: SubscriptionId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Replaces the watched patterns of a dynamic subscription.
    pub fn retarget(&self, patterns: Vec<Path>) -> bool {
        self.store.retarget(self.id, patterns)
    }
}

impl<S: FieldStore> Drop for Subscription<S> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.id);
    }
}

impl<S: FieldStore> fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}
