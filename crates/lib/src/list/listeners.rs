//! Operator interception for list views.
//!
//! List renderers often want to veto or decorate user actions, e.g. confirm
//! before removing or fill in a template value on add. `ListListeners` holds
//! optional interceptors; [`InterceptedList`] routes each operator call
//! through the matching interceptor and falls back to the plain operator when
//! none is set.

use std::fmt;

use serde_json::Value;

use super::ListOperators;

type ValueHook = Box<dyn Fn(Value, &dyn ListOperators)>;
type IndexHook = Box<dyn Fn(usize, &dyn ListOperators)>;
type MoveHook = Box<dyn Fn(usize, usize, &dyn ListOperators)>;

/// Optional interceptors for list operators plus a default value for new items.
#[derive(Default)]
pub struct ListListeners {
    on_add: Option<ValueHook>,
    on_unshift: Option<ValueHook>,
    on_remove: Option<IndexHook>,
    on_move: Option<MoveHook>,
    initial_value: Option<Value>,
}

impl ListListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value used by `add`/`unshift` when the caller passes none.
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn on_add(mut self, hook: impl Fn(Value, &dyn ListOperators) + 'static) -> Self {
        self.on_add = Some(Box::new(hook));
        self
    }

    pub fn on_unshift(mut self, hook: impl Fn(Value, &dyn ListOperators) + 'static) -> Self {
        self.on_unshift = Some(Box::new(hook));
        self
    }

    pub fn on_remove(mut self, hook: impl Fn(usize, &dyn ListOperators) + 'static) -> Self {
        self.on_remove = Some(Box::new(hook));
        self
    }

    pub fn on_move(mut self, hook: impl Fn(usize, usize, &dyn ListOperators) + 'static) -> Self {
        self.on_move = Some(Box::new(hook));
        self
    }

    /// Binds these listeners to a concrete list.
    pub fn bind<'a, L: ListOperators>(&'a self, list: &'a L) -> InterceptedList<'a, L> {
        InterceptedList {
            list,
            listeners: self,
        }
    }
}

impl fmt::Debug for ListListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListListeners")
            .field("on_add", &self.on_add.is_some())
            .field("on_unshift", &self.on_unshift.is_some())
            .field("on_remove", &self.on_remove.is_some())
            .field("on_move", &self.on_move.is_some())
            .field("initial_value", &self.initial_value)
            .finish()
    }
}

/// A list whose operator calls pass through a set of [`ListListeners`].
pub struct InterceptedList<'a, L: ListOperators> {
    list: &'a L,
    listeners: &'a ListListeners,
}

impl<L: ListOperators> InterceptedList<'_, L> {
    fn value_or_initial(&self, value: Option<Value>) -> Value {
        value
            .or_else(|| self.listeners.initial_value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn add(&self, value: Option<Value>) {
        let value = self.value_or_initial(value);
        match &self.listeners.on_add {
            Some(hook) => hook(value, self.list),
            None => self.list.add(value),
        }
    }

    pub fn unshift(&self, value: Option<Value>) {
        let value = self.value_or_initial(value);
        match &self.listeners.on_unshift {
            Some(hook) => hook(value, self.list),
            None => self.list.unshift(value),
        }
    }

    pub fn remove(&self, index: usize) {
        match &self.listeners.on_remove {
            Some(hook) => hook(index, self.list),
            None => {
                self.list.remove(index);
            }
        }
    }

    pub fn move_item(&self, from: usize, to: usize) {
        match &self.listeners.on_move {
            Some(hook) => hook(from, to, self.list),
            None => {
                self.list.move_item(from, to);
            }
        }
    }
}
