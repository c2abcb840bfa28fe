//! Hierarchical field paths.
//!
//! A [`Path`] is an ordered sequence of [`Seg`]ments addressing a location in a
//! field store. Segments are either object keys or array indices, so
//! `["users", 0, "name"]` addresses the name of the first user.
//!
//! All operations here are pure. Scoped views, list controllers and the
//! renderer build every absolute address out of [`concat`], [`look_upward`]
//! and [`is_prefix_of`].
//!
//! # Usage
//!
//! ```rust
//! use formweave::path::{Path, concat, look_upward};
//!
//! let prefix = Path::root().key("user").key("addresses");
//! let local = Path::root().index(2).key("city");
//! let absolute = concat(&prefix, &local);
//!
//! assert_eq!(absolute.to_string(), "user.addresses[2].city");
//! assert_eq!(look_upward(&absolute, local.len()), prefix);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for path arithmetic that was asked to do something impossible.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Tried to look further upward than the path is deep.
    #[error("cannot look {upward} level(s) upward from '{path}' (depth {depth})")]
    UpwardOutOfRange {
        path: Path,
        depth: usize,
        upward: usize,
    },
}

impl PathError {
    /// Check if this error was caused by an out-of-range argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, PathError::UpwardOutOfRange { .. })
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

/// A single segment of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Object key access
    Key(String),
    /// Array index access
    Index(usize),
}

impl Seg {
    /// Get the key if this is a key segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Seg::Key(k) => Some(k),
            Seg::Index(_) => None,
        }
    }

    /// Get the index if this is an index segment.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Key(_) => None,
            Seg::Index(i) => Some(*i),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, "{k}"),
            Seg::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// An owned path into the field store.
///
/// The empty path is the root. Paths are compared segment-wise, so a key
/// segment `"0"` and an index segment `0` are different locations.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Creates the root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Creates a path from a vector of segments.
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Appends a key segment (builder style).
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Appends an index segment (builder style).
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Appends a segment in place.
    pub fn push(&mut self, seg: impl Into<Seg>) {
        self.0.push(seg.into());
    }

    /// Returns a new path with `seg` appended.
    pub fn child(&self, seg: impl Into<Seg>) -> Path {
        let mut next = self.clone();
        next.push(seg);
        next
    }

    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the last segment, or `None` at the root.
    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// Returns the parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Joins `suffix` onto this path.
    pub fn join(&self, suffix: &Path) -> Path {
        concat(self, suffix)
    }

    /// Removes the last `upward` segments, failing if the path is not that deep.
    pub fn checked_upward(&self, upward: usize) -> Result<Path, PathError> {
        if upward > self.len() {
            return Err(PathError::UpwardOutOfRange {
                path: self.clone(),
                depth: self.len(),
                upward,
            });
        }
        Ok(Path(self.0[..self.0.len() - upward].to_vec()))
    }

    /// Returns `true` if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        is_prefix_of(self, other)
    }

    /// Returns the remainder of this path after `prefix`, or `None` if
    /// `prefix` does not match.
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if !prefix.is_prefix_of(self) {
            return None;
        }
        Some(Path(self.0[prefix.len()..].to_vec()))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Seg::Key(k) if i == 0 => write!(f, "{k}")?,
                Seg::Key(k) => write!(f, ".{k}")?,
                Seg::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl From<Seg> for Path {
    fn from(seg: Seg) -> Self {
        Path(vec![seg])
    }
}

impl From<&str> for Path {
    fn from(key: &str) -> Self {
        Path(vec![Seg::from(key)])
    }
}

impl From<String> for Path {
    fn from(key: String) -> Self {
        Path(vec![Seg::from(key)])
    }
}

impl From<usize> for Path {
    fn from(index: usize) -> Self {
        Path(vec![Seg::Index(index)])
    }
}

impl From<Vec<Seg>> for Path {
    fn from(segments: Vec<Seg>) -> Self {
        Path(segments)
    }
}

impl<S: Into<Seg>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl AsRef<[Seg]> for Path {
    fn as_ref(&self) -> &[Seg] {
        &self.0
    }
}

/// Builds a [`Path`] from a mix of keys and indices.
///
/// ```rust
/// use formweave::path;
///
/// let p = path!["items", 3, "label"];
/// assert_eq!(p.to_string(), "items[3].label");
/// ```
#[macro_export]
macro_rules! path {
    () => { $crate::path::Path::root() };
    ($($seg:expr),+ $(,)?) => {
        $crate::path::Path::from_segments(vec![$($crate::path::Seg::from($seg)),+])
    };
}

/// Concatenates `prefix` and `suffix`.
pub fn concat(prefix: &Path, suffix: &Path) -> Path {
    let mut segments = Vec::with_capacity(prefix.len() + suffix.len());
    segments.extend_from_slice(prefix.segments());
    segments.extend_from_slice(suffix.segments());
    Path(segments)
}

/// Removes the last `upward` segments of `path`.
///
/// Looking further up than the path is deep clamps to the root rather than
/// failing; use [`Path::checked_upward`] to reject that case instead.
pub fn look_upward(path: &Path, upward: usize) -> Path {
    match path.checked_upward(upward) {
        Ok(p) => p,
        Err(err) => {
            tracing::debug!(%err, "clamping upward lookup to root");
            Path::root()
        }
    }
}

/// Returns `true` if every segment of `a` matches `b` at the same position.
pub fn is_prefix_of(a: &Path, b: &Path) -> bool {
    a.len() <= b.len() && a.0.iter().zip(b.0.iter()).all(|(x, y)| x == y)
}
