//! Keyed dynamic lists.
//!
//! * [`KeyManager`] owns the identity counter and the identity sequence.
//! * [`ListController`] binds a key manager to an array field in a store.
//! * [`ListListeners`] lets callers intercept operator calls.

use serde_json::Value;

mod controller;
mod keys;
mod listeners;

pub use controller::{FieldInfo, ListController};
pub use keys::{KeyManager, ListKey};
pub use listeners::{InterceptedList, ListListeners};

/// The operator set of a dynamic list.
///
/// `remove` and `move_item` return `false` when they were a no-op.
pub trait ListOperators {
    fn add(&self, value: Value);
    fn unshift(&self, value: Value);
    fn remove(&self, index: usize) -> bool;
    fn move_item(&self, from: usize, to: usize) -> bool;
}
