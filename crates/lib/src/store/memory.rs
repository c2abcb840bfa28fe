//! In-memory field store.
//!
//! `MemoryStore` keeps every value in one `serde_json::Value` tree, remembers
//! the initial tree for resets, and tracks which field paths have been
//! registered (and with which rules). It is suitable for tests, headless use
//! and as a reference for wiring a real reactive store behind [`FieldStore`].

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
    fmt,
    rc::Rc,
};

use handle_trait::Handle;
use serde_json::Value;

use super::{
    Callback, Dispatch, FieldErrors, FieldFilter, FieldMeta, FieldStore, Notification, Relation,
    SubscribeOptions, SubscriptionId, ValidationFailure,
    value::{copy_path, get_in, set_in},
};
use crate::path::Path;

/// A validation rule attached to a registered field.
///
/// Returning `Err(message)` marks the field as failed with that message.
pub type Rule = Rc<dyn Fn(&Value) -> Result<(), String>>;

/// A cheap, clonable handle to a shared in-memory store.
///
/// All clones observe and mutate the same state. The store is single-threaded.
#[derive(Clone, Handle)]
pub struct MemoryStore {
    inner: Rc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    state: RefCell<StoreState>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_subscription: Cell<u64>,
}

#[derive(Default)]
struct StoreState {
    values: Value,
    initial: Value,
    fields: BTreeMap<Path, Vec<Rule>>,
    touched: BTreeSet<Path>,
}

struct Subscriber {
    id: SubscriptionId,
    patterns: Vec<Path>,
    dynamic: bool,
    callback: Callback,
}

impl MemoryStore {
    /// Creates an empty store whose root value is `null`.
    pub fn new() -> Self {
        Self::with_initial(Value::Null)
    }

    /// Creates a store seeded with `initial`, which [`FieldStore::reset`] restores.
    pub fn with_initial(initial: Value) -> Self {
        let state = StoreState {
            values: initial.clone(),
            initial,
            ..Default::default()
        };
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                ..Default::default()
            }),
        }
    }

    /// Registers a field so it takes part in validation and filtered queries.
    pub fn register_field(&self, path: Path) {
        self.inner.state.borrow_mut().fields.entry(path).or_default();
    }

    /// Registers a field and attaches a validation rule to it.
    pub fn register_field_with(&self, path: Path, rule: Rule) {
        self.inner
            .state
            .borrow_mut()
            .fields
            .entry(path)
            .or_default()
            .push(rule);
    }

    /// Removes a field registration. Its value stays in the store.
    pub fn unregister_field(&self, path: &Path) {
        self.inner.state.borrow_mut().fields.remove(path);
    }

    /// Returns a copy of the whole value tree.
    pub fn snapshot(&self) -> Value {
        self.inner.state.borrow().values.clone()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Delivers a change at `changed` to every related subscriber.
    ///
    /// Callbacks are collected first and invoked with no borrow held, so they
    /// are free to read, write, subscribe or unsubscribe.
    fn notify(&self, changed: &Path, cause: Option<super::Cause>) {
        let pending: Vec<(Callback, Notification)> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .filter_map(|sub| {
                sub.patterns.iter().find_map(|pattern| {
                    Relation::between(pattern, changed).map(|relation| {
                        (
                            Rc::clone(&sub.callback),
                            Notification {
                                path: changed.clone(),
                                pattern: pattern.clone(),
                                cause,
                                relation,
                            },
                        )
                    })
                })
            })
            .collect();

        tracing::trace!(path = %changed, subscribers = pending.len(), "notifying subscribers");
        for (callback, notification) in pending {
            callback(&notification);
        }
    }

    fn is_touched(state: &StoreState, path: &Path) -> bool {
        state
            .touched
            .iter()
            .any(|t| t.is_prefix_of(path) || path.is_prefix_of(t))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("MemoryStore")
            .field("values", &state.values)
            .field("fields", &state.fields.keys().collect::<Vec<_>>())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl FieldStore for MemoryStore {
    fn get_value(&self, path: &Path) -> Value {
        get_in(&self.inner.state.borrow().values, path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn get_values(&self, patterns: &[Path], filter: Option<&FieldFilter>) -> Value {
        let state = self.inner.state.borrow();
        let mut result = Value::Null;

        match filter {
            None => {
                for pattern in patterns {
                    copy_path(&state.values, &mut result, pattern);
                }
            }
            Some(filter) => {
                for path in state.fields.keys() {
                    if !patterns.iter().any(|p| p.is_prefix_of(path)) {
                        continue;
                    }
                    let meta = FieldMeta {
                        path: path.clone(),
                        touched: Self::is_touched(&state, path),
                    };
                    if filter(&meta) {
                        copy_path(&state.values, &mut result, path);
                    }
                }
            }
        }
        result
    }

    fn dispatch(&self, dispatch: Dispatch) {
        let Dispatch { path, value, cause } = dispatch;
        {
            let mut state = self.inner.state.borrow_mut();
            if !set_in(&mut state.values, &path, value) {
                return;
            }
            state.touched.insert(path.clone());
        }
        self.notify(&path, cause);
    }

    fn validate(&self, paths: Option<&[Path]>) -> Result<Value, ValidationFailure> {
        let state = self.inner.state.borrow();
        let targets: Vec<&Path> = state
            .fields
            .keys()
            .filter(|field| match paths {
                None => true,
                Some(paths) => paths.iter().any(|p| p.is_prefix_of(field)),
            })
            .collect();

        let mut values = Value::Null;
        let mut failed = Vec::new();
        for path in targets {
            copy_path(&state.values, &mut values, path);
            let current = get_in(&state.values, path).unwrap_or(&Value::Null);
            let errors: Vec<String> = state.fields[path]
                .iter()
                .filter_map(|rule| rule(current).err())
                .collect();
            if !errors.is_empty() {
                failed.push(FieldErrors {
                    path: path.clone(),
                    errors,
                });
            }
        }

        if failed.is_empty() {
            Ok(values)
        } else {
            tracing::debug!(failed = failed.len(), "validation failed");
            Err(ValidationFailure::new(failed, values))
        }
    }

    fn reset(&self, paths: Option<&[Path]>) {
        let changed: Vec<Path> = {
            let mut state = self.inner.state.borrow_mut();
            match paths {
                None => {
                    state.values = state.initial.clone();
                    state.touched.clear();
                    vec![Path::root()]
                }
                Some(paths) => {
                    let mut changed = Vec::with_capacity(paths.len());
                    for path in paths {
                        let initial = get_in(&state.initial, path)
                            .cloned()
                            .unwrap_or(Value::Null);
                        if set_in(&mut state.values, path, initial) {
                            state.touched.retain(|t| !path.is_prefix_of(t));
                            changed.push(path.clone());
                        }
                    }
                    changed
                }
            }
        };

        for path in &changed {
            self.notify(path, None);
        }
    }

    fn registered_paths(&self, prefix: &Path) -> Vec<Path> {
        self.inner
            .state
            .borrow()
            .fields
            .keys()
            .filter(|field| prefix.is_prefix_of(field))
            .cloned()
            .collect()
    }

    fn subscribe(
        &self,
        patterns: Vec<Path>,
        options: SubscribeOptions,
        callback: Callback,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);

        let initial = options.immediate.then(|| {
            let pattern = patterns.first().cloned().unwrap_or_default();
            Notification {
                path: pattern.clone(),
                pattern,
                cause: None,
                relation: Relation::Initial,
            }
        });

        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            patterns,
            dynamic: options.dynamic,
            callback: Rc::clone(&callback),
        });
        tracing::trace!(%id, "subscribed");

        if let Some(notification) = initial {
            callback(&notification);
        }
        id
    }

    fn retarget(&self, id: SubscriptionId, patterns: Vec<Path>) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        match subscribers.iter_mut().find(|s| s.id == id) {
            Some(sub) if sub.dynamic => {
                sub.patterns = patterns;
                true
            }
            _ => false,
        }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.subscribers.borrow_mut().retain(|s| s.id != id);
        tracing::trace!(%id, "unsubscribed");
    }
}
