//! Explicit field context threaded through rendering.
//!
//! A `FieldContext` carries the store handle and the prefix of the current
//! position in the view tree. Entering a named section with
//! [`access`](FieldContext::access) yields a child context with a deeper
//! prefix; nothing is looked up from ambient state.

use std::{cell::OnceCell, rc::Rc};

use serde_json::Value;

use crate::{
    path::{Path, concat, look_upward},
    scope::{ScopeMode, ScopeOptions, ScopedForm},
    store::{Callback, FieldStore, SubscribeOptions, Subscription},
};

/// The store and prefix visible at one point of the view tree.
#[derive(Debug, Clone)]
pub struct FieldContext<S> {
    store: S,
    prefix: Path,
    local: Rc<OnceCell<ScopedForm<S>>>,
}

impl<S> FieldContext<S> {
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: FieldStore + Clone> FieldContext<S> {
    /// Creates the root context for `store`.
    pub fn new(store: S) -> Self {
        Self::with_prefix(store, Path::root())
    }

    pub fn with_prefix(store: S, prefix: Path) -> Self {
        Self {
            store,
            prefix,
            local: Rc::new(OnceCell::new()),
        }
    }

    /// Enters `name`, returning a context whose prefix is `prefix ++ name`.
    pub fn access(&self, name: impl Into<Path>) -> FieldContext<S> {
        Self::with_prefix(self.store.clone(), concat(&self.prefix, &name.into()))
    }

    /// The scoped view for this context, created on first use and reused after.
    pub fn local_form(&self) -> &ScopedForm<S> {
        self.local
            .get_or_init(|| ScopedForm::new(self.store.clone(), self.prefix.clone()))
    }

    /// A view over the whole store, regardless of the current prefix.
    pub fn global_form(&self) -> ScopedForm<S> {
        ScopedForm::root(self.store.clone())
    }

    /// Builds a scoped view according to `options`.
    pub fn form(&self, options: &ScopeOptions) -> ScopedForm<S> {
        ScopedForm::new(self.store.clone(), self.scope_prefix(options))
    }

    /// Reads each of `names` relative to the scope described by `options`.
    pub fn fields_value(&self, names: &[Path], options: &ScopeOptions) -> Vec<Value> {
        let form = self.form(options);
        names.iter().map(|name| form.get(name)).collect()
    }

    /// Subscribes to changes of `names`, resolved the same way as
    /// [`fields_value`](Self::fields_value).
    pub fn watch(
        &self,
        names: &[Path],
        options: &ScopeOptions,
        subscribe: SubscribeOptions,
        callback: Callback,
    ) -> Subscription<S> {
        let base = self.scope_prefix(options);
        let patterns = names.iter().map(|n| concat(&base, n)).collect();
        let id = self.store.subscribe(patterns, subscribe, callback);
        Subscription::new(self.store.clone(), id)
    }

    fn scope_prefix(&self, options: &ScopeOptions) -> Path {
        let base = match options.mode {
            ScopeMode::Global => Path::root(),
            ScopeMode::Local => look_upward(&self.prefix, options.upward),
        };
        match &options.base_path {
            Some(base_path) => concat(&base, base_path),
            None => base,
        }
    }
}
