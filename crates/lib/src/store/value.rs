//! Path navigation over `serde_json::Value` trees.
//!
//! These helpers are what [`MemoryStore`](super::MemoryStore) is built on and
//! what scoped views use to re-root query results.

use serde_json::{Map, Value};

use crate::{
    constants::MAX_INDEX_GAP,
    path::{Path, Seg},
};

/// Returns the value at `path`, or `None` if any segment is missing.
pub fn get_in<'v>(root: &'v Value, path: &Path) -> Option<&'v Value> {
    path.segments()
        .iter()
        .try_fold(root, |current, seg| step(current, seg))
}

fn step<'v>(current: &'v Value, seg: &Seg) -> Option<&'v Value> {
    match (seg, current) {
        (Seg::Key(k), Value::Object(map)) => map.get(k),
        (Seg::Index(i), Value::Array(items)) => items.get(*i),
        _ => None,
    }
}

/// Writes `value` at `path`, creating intermediate containers as needed.
///
/// Missing intermediates become objects for key segments and arrays for index
/// segments. An intermediate of the wrong shape is overwritten. Writing past
/// the end of an array pads it with `null`, up to [`MAX_INDEX_GAP`] entries.
///
/// Returns `false` without touching `root` when an index would need more
/// padding than that.
pub fn set_in(root: &mut Value, path: &Path, value: Value) -> bool {
    if !within_gap(root, path) {
        tracing::warn!(%path, max_gap = MAX_INDEX_GAP, "index too far past end of array, write skipped");
        return false;
    }
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return true;
    };

    let mut current = root;
    for seg in parents {
        match slot_for(current, seg) {
            Some(next) => current = next,
            None => return false,
        }
    }
    match slot_for(current, last) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Checks every index segment of `path` against the array it would land in.
fn within_gap(root: &Value, path: &Path) -> bool {
    let mut current = Some(root);
    for seg in path.segments() {
        if let Seg::Index(i) = seg {
            let len = current.and_then(Value::as_array).map_or(0, Vec::len);
            if i.saturating_sub(len) >= MAX_INDEX_GAP {
                return false;
            }
        }
        current = current.and_then(|v| step(v, seg));
    }
    true
}

fn slot_for<'v>(current: &'v mut Value, seg: &Seg) -> Option<&'v mut Value> {
    match seg {
        Seg::Key(k) => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current
                .as_object_mut()
                .map(|map| map.entry(k.clone()).or_insert(Value::Null))
        }
        Seg::Index(i) => {
            if !current.is_array() {
                *current = Value::Array(Vec::new());
            }
            let items = current.as_array_mut()?;
            if items.len() <= *i {
                items.resize(i.checked_add(1)?, Value::Null);
            }
            items.get_mut(*i)
        }
    }
}

/// Shallow-merges `patch` into `base`.
///
/// Both must be objects for a merge to happen; top-level keys of `patch` win.
/// In every other case `patch` replaces `base` wholesale.
pub fn shallow_merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (k, v) in patch {
                base.insert(k, v);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

/// Copies the value at `path` in `source` (if any) into the same location in `target`.
pub fn copy_path(source: &Value, target: &mut Value, path: &Path) {
    if let Some(v) = get_in(source, path) {
        set_in(target, path, v.clone());
    }
}
