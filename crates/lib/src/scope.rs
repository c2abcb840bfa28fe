//! Path-scoped views over a field store.
//!
//! A [`ScopedForm`] behaves like a whole form rooted at a fixed prefix. Every
//! local path handed to it is translated to `prefix ++ local` before the store
//! sees it, and every value coming back is re-rooted relative to the prefix.
//! This lets a nested object or a single list element be treated as an
//! independent form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    path::{Path, concat},
    store::{
        Cause, Dispatch, FieldFilter, FieldStore, ValidationFailure,
        value::{get_in, shallow_merge},
    },
};

/// Which part of a scoped view to read with [`ScopedForm::get_many`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Everything stored under the prefix.
    #[default]
    All,
    /// Only the given local paths.
    Paths(Vec<Path>),
}

/// Whether a scope is taken relative to the current context or from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    #[default]
    Local,
    Global,
}

/// How to derive a scoped view from a [`FieldContext`](crate::FieldContext).
///
/// The resulting prefix is `look_upward(context_prefix, upward) ++ base_path`
/// in local mode, and `base_path` alone in global mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeOptions {
    pub base_path: Option<Path>,
    pub upward: usize,
    pub mode: ScopeMode,
}

impl ScopeOptions {
    pub fn base_path(mut self, base_path: impl Into<Path>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn upward(mut self, upward: usize) -> Self {
        self.upward = upward;
        self
    }

    pub fn global(mut self) -> Self {
        self.mode = ScopeMode::Global;
        self
    }
}

/// A form view bound to a fixed path prefix.
///
/// Construction is cheap; the view holds a store handle and the prefix and
/// never changes either.
#[derive(Debug, Clone)]
pub struct ScopedForm<S> {
    store: S,
    prefix: Path,
}

impl<S: FieldStore + Clone> ScopedForm<S> {
    pub fn new(store: S, prefix: Path) -> Self {
        Self { store, prefix }
    }

    /// A view over the whole store.
    pub fn root(store: S) -> Self {
        Self::new(store, Path::root())
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Translates a local path into an absolute one.
    pub fn absolute(&self, local: &Path) -> Path {
        let absolute = concat(&self.prefix, local);
        tracing::trace!(prefix = %self.prefix, %local, %absolute, "translated path");
        absolute
    }

    /// Returns a view one or more levels deeper.
    pub fn child(&self, local: impl Into<Path>) -> ScopedForm<S> {
        ScopedForm::new(self.store.clone(), self.absolute(&local.into()))
    }

    /// Reads the value at `prefix ++ local`.
    pub fn get(&self, local: &Path) -> Value {
        self.store.get_value(&self.absolute(local))
    }

    /// Reads several values at once, re-rooted relative to the prefix.
    ///
    /// Returns `Value::Null` when nothing matched.
    pub fn get_many(&self, selection: Selection, filter: Option<&FieldFilter>) -> Value {
        let patterns = match selection {
            Selection::All => vec![self.prefix.clone()],
            Selection::Paths(locals) => self.absolute_all(&locals),
        };
        let values = self.store.get_values(&patterns, filter);
        get_in(&values, &self.prefix)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Writes `value` at the prefix.
    ///
    /// Arrays replace the current value wholesale. Objects are shallow-merged
    /// into the current object; anything else replaces it.
    pub fn set(&self, value: Value) {
        let next = if value.is_array() {
            value
        } else {
            shallow_merge(self.store.get_value(&self.prefix), value)
        };
        self.store.dispatch(Dispatch::new(self.prefix.clone(), next));
    }

    /// Resets the given local paths, or the whole scope when none are given.
    pub fn reset(&self, locals: Option<&[Path]>) {
        match non_empty(locals) {
            Some(locals) => self.store.reset(Some(&self.absolute_all(locals))),
            None => self.store.reset(Some(std::slice::from_ref(&self.prefix))),
        }
    }

    /// Validates fields within this scope.
    ///
    /// At the root the request goes straight to the store. Below the root,
    /// explicit local paths are translated; without them the registered
    /// fields under the prefix are enumerated and exactly those are validated.
    /// Failures are returned exactly as the store reported them.
    pub fn validate(&self, locals: Option<&[Path]>) -> Result<Value, ValidationFailure> {
        let locals = non_empty(locals);
        if self.prefix.is_root() {
            return self.store.validate(locals);
        }

        let targets = match locals {
            Some(locals) => self.absolute_all(locals),
            None => self.store.registered_paths(&self.prefix),
        };
        tracing::debug!(prefix = %self.prefix, fields = targets.len(), "validating scope");
        self.store.validate(Some(&targets))
    }

    /// Writes `value` at `prefix ++ local` without merging.
    pub fn dispatch(&self, local: &Path, value: Value) {
        self.store
            .dispatch(Dispatch::new(self.absolute(local), value));
    }

    /// Like [`dispatch`](Self::dispatch) but tags the write with `cause`.
    pub fn dispatch_caused(&self, local: &Path, value: Value, cause: Cause) {
        self.store
            .dispatch(Dispatch::new(self.absolute(local), value).caused_by(cause));
    }

    fn absolute_all(&self, locals: &[Path]) -> Vec<Path> {
        locals.iter().map(|l| self.absolute(l)).collect()
    }
}

fn non_empty(paths: Option<&[Path]>) -> Option<&[Path]> {
    paths.filter(|p| !p.is_empty())
}
