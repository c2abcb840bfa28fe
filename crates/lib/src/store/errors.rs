//! Validation failures reported by a field store.
//!
//! The form layers never interpret these; they are handed back to the
//! caller exactly as the store produced them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::Path;

/// The messages produced for one field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub path: Path,
    pub errors: Vec<String>,
}

/// A store's validation result when at least one field failed.
///
/// `values` carries the values of the fields that were validated, in the same
/// nested shape the store would have returned on success.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", DisplayFields(.fields))]
pub struct ValidationFailure {
    pub fields: Vec<FieldErrors>,
    pub values: serde_json::Value,
}

impl ValidationFailure {
    pub fn new(fields: Vec<FieldErrors>, values: serde_json::Value) -> Self {
        Self { fields, values }
    }

    /// Returns the messages for `path`, if that field failed.
    pub fn errors_for(&self, path: &Path) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|f| &f.path == path)
            .map(|f| f.errors.as_slice())
    }

    /// Paths of every failed field.
    pub fn failed_paths(&self) -> impl Iterator<Item = &Path> {
        self.fields.iter().map(|f| &f.path)
    }
}

struct DisplayFields<'a>(&'a [FieldErrors]);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for {} field(s)", self.0.len())?;
        for field in self.0 {
            write!(f, "; {}: {}", field.path, field.errors.join(", "))?;
        }
        Ok(())
    }
}

// Conversion from ValidationFailure to the main Error type
impl From<ValidationFailure> for crate::Error {
    fn from(err: ValidationFailure) -> Self {
        crate::Error::Validation(err)
    }
}
