use std::{cell::RefCell, rc::Rc};

use formweave::{
    FieldStore, MemoryStore, ScopedForm,
    list::ListController,
    path::Path,
    store::{Callback, Notification, Rule},
};
use serde_json::Value;

// ==========================
// STORE FACTORIES
// ==========================

/// A store seeded with `initial` as both its current and reset value.
pub fn store_with(initial: Value) -> MemoryStore {
    MemoryStore::with_initial(initial)
}

/// A rule failing with `message` when the value is null or an empty string.
pub fn required(message: &str) -> Rule {
    let message = message.to_owned();
    Rc::new(move |value: &Value| match value {
        Value::Null => Err(message.clone()),
        Value::String(s) if s.is_empty() => Err(message.clone()),
        _ => Ok(()),
    })
}

/// Creates a list controller at `name`, relative to the store root.
pub fn root_list(store: &MemoryStore, name: Path) -> ListController<MemoryStore> {
    ListController::new(ScopedForm::root(store.clone()), name)
}

/// Identity values of the list's current render entries.
pub fn key_values(list: &ListController<MemoryStore>) -> Vec<u64> {
    list.fields().iter().map(|f| f.key.value()).collect()
}

// ==========================
// NOTIFICATION RECORDING
// ==========================

/// Records every notification delivered to its callback.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl Recorder {
    pub fn callback(&self) -> Callback {
        let seen = Rc::clone(&self.seen);
        Rc::new(move |n: &Notification| seen.borrow_mut().push(n.clone()))
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }
}

/// Reads `path` straight from the store.
pub fn value_at(store: &MemoryStore, path: &Path) -> Value {
    store.get_value(path)
}
