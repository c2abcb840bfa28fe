//! Identity bookkeeping for list elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The stable identity of one list element, independent of its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListKey(u64);

impl ListKey {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

/// Keeps one identity per element of an array-valued field.
///
/// `next_id` only ever grows, so an identity is never issued twice even after
/// [`reset`](KeyManager::reset). Every mutation mirrors the matching array
/// operation so identities stay attached to their elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyManager {
    next_id: u64,
    keys: Vec<ListKey>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[ListKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The identity the next minted key will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn mint(&mut self) -> ListKey {
        let key = ListKey(self.next_id);
        self.next_id += 1;
        key
    }

    /// Appends a fresh identity and returns it.
    pub fn push(&mut self) -> ListKey {
        let key = self.mint();
        self.keys.push(key);
        key
    }

    /// Prepends a fresh identity and returns it.
    pub fn unshift(&mut self) -> ListKey {
        let key = self.mint();
        self.keys.insert(0, key);
        key
    }

    /// Removes the identity at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<ListKey> {
        (index < self.keys.len()).then(|| self.keys.remove(index))
    }

    /// Moves the identity at `from` to `to`. Returns `false` for out-of-range indices.
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        if from >= self.keys.len() || to >= self.keys.len() {
            return false;
        }
        let key = self.keys.remove(from);
        self.keys.insert(to, key);
        true
    }

    /// Drops every identity. `next_id` is left untouched.
    pub fn reset(&mut self) {
        self.keys.clear();
    }

    /// Makes the key sequence exactly `len` long.
    ///
    /// Missing identities are minted in ascending index order; surplus ones
    /// (left over after the array shrank externally) are dropped.
    pub fn sync(&mut self, len: usize) {
        self.keys.truncate(len);
        while self.keys.len() < len {
            self.push();
        }
    }
}
