//!
//! formweave: schema-driven form composition over a path-addressed field store.
//!
//! ## Core Concepts
//!
//! * **Paths (`path::Path`)**: Sequences of key and index segments addressing a value
//!   inside a nested JSON-like document.
//! * **Field stores (`store::FieldStore`)**: The absolute, path-addressed source of
//!   truth. `store::MemoryStore` is the in-memory reference implementation.
//! * **Scoped forms (`scope::ScopedForm`)**: Views over a store that translate every
//!   local path by a prefix, so a nested section can be written as if it were the root.
//! * **Field contexts (`context::FieldContext`)**: The store and prefix at one point of
//!   the view tree, passed explicitly while rendering.
//! * **Lists (`list::ListController`)**: Array-valued fields with stable element
//!   identities that survive insert, remove and move.
//! * **Resolution (`resolve::create_form`)**: Turns a graph of named, shared and
//!   nested form levels into one materialized `view::View` tree, with memoization
//!   and cycle detection.
//! * **Schemas (`schema::Schema`)**: A declarative description of leaves, arrays and
//!   objects, compiled into a resolver configuration.
//! * **Rendering (`render::Renderer`)**: Binds a view tree to a store, expanding lists
//!   and reading field values.

pub mod constants;
pub mod context;
pub mod list;
pub mod path;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod scope;
pub mod settings;
pub mod store;
pub mod view;

pub use context::FieldContext;
pub use path::{Path, Seg};
pub use scope::{ScopeOptions, ScopedForm};
pub use settings::FormSettings;
pub use store::{FieldStore, MemoryStore};

/// Result type used throughout formweave.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for formweave.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured path errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Validation failures forwarded from the field store
    #[error(transparent)]
    Validation(store::ValidationFailure),

    /// Structured resolution errors from the resolve module
    #[error(transparent)]
    Resolve(resolve::ResolveError),

    /// Structured settings errors from the settings module
    #[error(transparent)]
    Settings(settings::SettingsError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Validation(_) => "store",
            Error::Resolve(_) => "resolve",
            Error::Settings(_) => "settings",
        }
    }

    /// Check if this error indicates a referenced module was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error was caused by an invalid argument.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::Path(path_err) => path_err.is_invalid_argument(),
            _ => false,
        }
    }

    /// Check if this error is a dependency cycle.
    pub fn is_cycle(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_cycle(),
            _ => false,
        }
    }

    /// Check if this error is a validation failure.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this error comes from malformed configuration.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_configuration_error(),
            Error::Settings(settings_err) => settings_err.is_invalid(),
            _ => false,
        }
    }
}
