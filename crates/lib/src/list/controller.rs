//! Keyed list controller.
//!
//! A `ListController` exposes an array-valued field as a list of
//! `{key, index, value}` entries plus the `add`/`unshift`/`remove`/`move`
//! operators. Identities follow their elements through every operator. When
//! the array is replaced by anyone else, identities are invalidated and
//! re-issued on the next read.
//!
//! Self-triggered writes are recognised by causation token: every operator
//! mints a [`Cause`], remembers it as pending and attaches it to its dispatch.
//! A notification carrying the pending token is our own echo; any other
//! notification that may have replaced the array is external.

use std::{cell::RefCell, fmt, rc::Rc};

use serde_json::Value;

use super::{KeyManager, ListKey, ListOperators};
use crate::{
    path::Path,
    scope::ScopedForm,
    store::{Callback, Cause, FieldStore, Notification, SubscribeOptions, Subscription},
};

/// One element of a list as seen at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub key: ListKey,
    pub index: usize,
    pub value: Value,
}

#[derive(Debug, Default)]
struct ListState {
    keys: KeyManager,
    pending: Option<Cause>,
    signature: u64,
}

impl ListState {
    /// Starts a self-mutation and returns the token to dispatch with.
    fn begin(&mut self) -> Cause {
        let cause = Cause::mint();
        self.pending = Some(cause);
        cause
    }

    fn reconcile(&mut self, notification: &Notification) {
        match (notification.cause, self.pending) {
            (Some(cause), Some(pending)) if cause == pending => {
                self.pending = None;
                tracing::debug!(path = %notification.path, "list changed by its own operator");
            }
            _ if notification.relation.replaces_watched() => {
                self.keys.reset();
                tracing::debug!(
                    path = %notification.path,
                    relation = ?notification.relation,
                    "list replaced externally, identities invalidated"
                );
            }
            _ => {}
        }
        self.signature += 1;
    }
}

/// Manages identity and mutation of one array-valued field.
pub struct ListController<S: FieldStore> {
    form: ScopedForm<S>,
    name: Path,
    state: Rc<RefCell<ListState>>,
    subscription: Subscription<S>,
}

impl<S: FieldStore + Clone> ListController<S> {
    /// Creates a controller for the array at `name`, relative to `form`.
    ///
    /// The controller subscribes immediately; it unsubscribes when dropped.
    pub fn new(form: ScopedForm<S>, name: Path) -> Self {
        let state = Rc::new(RefCell::new(ListState::default()));
        let weak = Rc::downgrade(&state);
        let callback: Callback = Rc::new(move |notification: &Notification| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().reconcile(notification);
            }
        });

        let id = form.store().subscribe(
            vec![form.absolute(&name)],
            SubscribeOptions {
                dynamic: true,
                immediate: true,
            },
            callback,
        );
        let subscription = Subscription::new(form.store().clone(), id);

        Self {
            form,
            name,
            state,
            subscription,
        }
    }

    /// The list path relative to the controller's form.
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// The absolute path of the backing array.
    pub fn path(&self) -> Path {
        self.form.absolute(&self.name)
    }

    /// Incremented on every notification the controller receives.
    pub fn signature(&self) -> u64 {
        self.state.borrow().signature
    }

    /// Current identities, without assigning missing ones.
    pub fn keys(&self) -> Vec<ListKey> {
        self.state.borrow().keys.keys().to_vec()
    }

    /// Points the controller at a different array.
    ///
    /// Identities are dropped since they described the old array.
    pub fn retarget(&mut self, name: Path) {
        self.name = name;
        self.subscription.retarget(vec![self.path()]);
        self.state.borrow_mut().keys.reset();
    }

    /// Derives the render list, assigning identities to any element lacking one.
    pub fn fields(&self) -> Vec<FieldInfo> {
        let items = self.current();
        let mut state = self.state.borrow_mut();
        state.keys.sync(items.len());
        state
            .keys
            .keys()
            .iter()
            .copied()
            .zip(items)
            .enumerate()
            .map(|(index, (key, value))| FieldInfo { key, index, value })
            .collect()
    }

    /// Appends `value` with a fresh identity.
    pub fn add(&self, value: Value) {
        let mut items = self.current();
        let cause = {
            let mut state = self.state.borrow_mut();
            state.keys.sync(items.len());
            state.keys.push();
            state.begin()
        };
        items.push(value);
        self.commit(items, cause);
    }

    /// Prepends `value` with a fresh identity.
    pub fn unshift(&self, value: Value) {
        let mut items = self.current();
        let cause = {
            let mut state = self.state.borrow_mut();
            state.keys.sync(items.len());
            state.keys.unshift();
            state.begin()
        };
        items.insert(0, value);
        self.commit(items, cause);
    }

    /// Removes the element at `index` together with its identity.
    ///
    /// An out-of-range index is a no-op: nothing is written and `false` is returned.
    pub fn remove(&self, index: usize) -> bool {
        let mut items = self.current();
        if index >= items.len() {
            tracing::debug!(index, len = items.len(), path = %self.path(), "remove out of range ignored");
            return false;
        }
        let cause = {
            let mut state = self.state.borrow_mut();
            state.keys.sync(items.len());
            state.keys.remove(index);
            state.begin()
        };
        items.remove(index);
        self.commit(items, cause);
        true
    }

    /// Moves the element at `from` to `to`, keeping its identity.
    ///
    /// Equal or out-of-range indices are a no-op and return `false`.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        let mut items = self.current();
        if from == to || from >= items.len() || to >= items.len() {
            tracing::debug!(from, to, len = items.len(), path = %self.path(), "move ignored");
            return false;
        }
        let cause = {
            let mut state = self.state.borrow_mut();
            state.keys.sync(items.len());
            state.keys.relocate(from, to);
            state.begin()
        };
        let item = items.remove(from);
        items.insert(to, item);
        self.commit(items, cause);
        true
    }

    fn current(&self) -> Vec<Value> {
        match self.form.get(&self.name) {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                tracing::warn!(path = %self.path(), value = %other, "list field is not an array, treating as empty");
                Vec::new()
            }
        }
    }

    fn commit(&self, items: Vec<Value>, cause: Cause) {
        self.form
            .dispatch_caused(&self.name, Value::Array(items), cause);
    }
}

impl<S: FieldStore + Clone> ListOperators for ListController<S> {
    fn add(&self, value: Value) {
        ListController::add(self, value)
    }

    fn unshift(&self, value: Value) {
        ListController::unshift(self, value)
    }

    fn remove(&self, index: usize) -> bool {
        ListController::remove(self, index)
    }

    fn move_item(&self, from: usize, to: usize) -> bool {
        ListController::move_item(self, from, to)
    }
}

impl<S: FieldStore> fmt::Debug for ListController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("name", &self.name)
            .field("state", &self.state.borrow())
            .field("subscription", &self.subscription)
            .finish()
    }
}
