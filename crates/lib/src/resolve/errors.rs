//! Error types for schema resolution.

use thiserror::Error;

use super::NodeName;

/// Errors raised while resolving a form graph into views.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A named module depends on itself, directly or transitively.
    #[error("circular reference detected at '{name}' ({})", format_chain(.chain))]
    CycleDetected { name: NodeName, chain: Vec<NodeName> },

    /// A module name is referenced but not registered (strict mode only).
    #[error("no module registered under '{name}'")]
    UnresolvedReference { name: NodeName },

    /// Two modules were registered under the same name.
    #[error("module '{name}' is registered more than once")]
    DuplicateModule { name: NodeName },
}

impl ResolveError {
    /// Check if this error is a dependency cycle
    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolveError::CycleDetected { .. })
    }

    /// Check if this error indicates a missing module
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::UnresolvedReference { .. })
    }

    /// Check if this error comes from a malformed module table
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ResolveError::DuplicateModule { .. })
    }

    /// Get the module name the error is about
    pub fn name(&self) -> &NodeName {
        match self {
            ResolveError::CycleDetected { name, .. }
            | ResolveError::UnresolvedReference { name }
            | ResolveError::DuplicateModule { name } => name,
        }
    }
}

fn format_chain(chain: &[NodeName]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// Conversion from ResolveError to the main Error type
impl From<ResolveError> for crate::Error {
    fn from(err: ResolveError) -> Self {
        crate::Error::Resolve(err)
    }
}
