//! The field store capability consumed by every form layer.
//!
//! A [`FieldStore`] holds values keyed by absolute [`Path`], accepts writes
//! through a single [`dispatch`](FieldStore::dispatch) entry point and notifies
//! subscribers synchronously. Scoped views, list controllers and the renderer
//! only ever talk to a store through this trait, so any reactive store can be
//! plugged in. [`MemoryStore`] is the reference implementation.

use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use serde_json::Value;

use crate::path::Path;

mod errors;
pub use errors::{FieldErrors, ValidationFailure};

mod memory;
pub use memory::{MemoryStore, Rule};

mod subscription;
pub use subscription::Subscription;

pub mod value;

/// A token identifying the operation that caused a write.
///
/// Tokens are unique for the lifetime of the process. A writer attaches one to
/// a [`Dispatch`] and later recognises its own writes by comparing the token
/// carried on the resulting [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cause(u64);

static NEXT_CAUSE: AtomicU64 = AtomicU64::new(1);

impl Cause {
    /// Mints a fresh, never before issued token.
    pub fn mint() -> Self {
        Cause(NEXT_CAUSE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A single write request.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub path: Path,
    pub value: Value,
    pub cause: Option<Cause>,
}

impl Dispatch {
    pub fn new(path: Path, value: Value) -> Self {
        Self {
            path,
            value,
            cause: None,
        }
    }

    /// Attaches a causation token to this write.
    pub fn caused_by(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// How a changed path relates to the pattern a subscriber is watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Delivered once at subscription time for `immediate` subscriptions.
    Initial,
    /// The watched path itself was written.
    Exact,
    /// A path above the watched path was written, replacing it.
    Ancestor,
    /// A path strictly below the watched path was written.
    Descendant,
}

impl Relation {
    /// Classifies `changed` against `pattern`, or `None` if they are unrelated.
    pub fn between(pattern: &Path, changed: &Path) -> Option<Relation> {
        if pattern == changed {
            Some(Relation::Exact)
        } else if changed.is_prefix_of(pattern) {
            Some(Relation::Ancestor)
        } else if pattern.is_prefix_of(changed) {
            Some(Relation::Descendant)
        } else {
            None
        }
    }

    /// Returns `true` if the watched value may have been replaced as a whole.
    pub fn replaces_watched(&self) -> bool {
        matches!(
            self,
            Relation::Initial | Relation::Exact | Relation::Ancestor
        )
    }
}

/// A change delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The path that was written (or the pattern itself for `Initial`).
    pub path: Path,
    /// The subscriber's pattern that matched.
    pub pattern: Path,
    pub cause: Option<Cause>,
    pub relation: Relation,
}

/// Subscription behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// The watched patterns may later be replaced with [`FieldStore::retarget`].
    pub dynamic: bool,
    /// Fire the callback once with [`Relation::Initial`] when subscribing.
    pub immediate: bool,
}

/// Handle returned by [`FieldStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Callback invoked on every matching notification.
pub type Callback = Rc<dyn Fn(&Notification)>;

/// Metadata about a registered field, handed to query filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub path: Path,
    /// The field has been written since registration or the last reset.
    pub touched: bool,
}

/// Predicate used by [`FieldStore::get_values`] to select registered fields.
pub type FieldFilter = dyn Fn(&FieldMeta) -> bool;

/// The minimal capability surface a form store must offer.
///
/// Every method takes absolute paths. Implementations must deliver
/// notifications synchronously inside `dispatch`/`reset` and must not hold
/// internal borrows while invoking callbacks, since callbacks commonly read
/// the store again.
pub trait FieldStore {
    /// Returns the value at `path`, or `Value::Null` if nothing is stored there.
    fn get_value(&self, path: &Path) -> Value;

    /// Returns a tree containing only the values selected by `patterns`.
    ///
    /// Each pattern selects the value stored at it (and therefore everything
    /// below it). With a `filter`, only registered fields under a pattern for
    /// which the filter returns `true` are copied.
    fn get_values(&self, patterns: &[Path], filter: Option<&FieldFilter>) -> Value;

    /// Writes a value and notifies every related subscriber.
    fn dispatch(&self, dispatch: Dispatch);

    /// Validates the given fields, or every registered field for `None`.
    fn validate(&self, paths: Option<&[Path]>) -> Result<Value, ValidationFailure>;

    /// Restores initial values for the given paths, or the whole store for `None`.
    fn reset(&self, paths: Option<&[Path]>);

    /// Lists registered field paths that have `prefix` as a prefix.
    fn registered_paths(&self, prefix: &Path) -> Vec<Path>;

    /// Registers `callback` for changes related to any of `patterns`.
    fn subscribe(
        &self,
        patterns: Vec<Path>,
        options: SubscribeOptions,
        callback: Callback,
    ) -> SubscriptionId;

    /// Replaces the patterns of a dynamic subscription.
    ///
    /// Returns `false` if the subscription is unknown or was not created dynamic.
    fn retarget(&self, id: SubscriptionId, patterns: Vec<Path>) -> bool;

    fn unsubscribe(&self, id: SubscriptionId);
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}
