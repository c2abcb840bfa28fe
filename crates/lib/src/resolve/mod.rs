//! Dependency-graph view composition.
//!
//! A form is described as a graph of [`FormLevel`]s. Each level names a
//! component, an optional list of dependencies (rendered as ordered slots
//! inside the component), and decorators that wrap the result. Levels can be
//! registered as named modules and referenced from anywhere by name.
//! [`create_form`] turns such a graph into a single [`ViewRef`].
//!
//! # Example
//!
//! ```rust
//! use formweave::resolve::{FormConfig, FormLevel, create_form};
//! use formweave::view::View;
//!
//! let config = FormConfig::new("page")
//!     .module("page", FormLevel::new(View::container()).dependency("header").dependency("header"))
//!     .module("header", FormLevel::new(View::widget("title")));
//!
//! let page = create_form(&config)?;
//! let slots = page.slots();
//! assert!(std::sync::Arc::ptr_eq(&slots[0], &slots[1]));
//! # Ok::<(), formweave::resolve::ResolveError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::view::{Decorator, ViewRef};

mod errors;
pub use errors::ResolveError;

mod resolver;
pub use resolver::{create_form, create_form_with};

/// The name a module is registered and referenced under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeName {
    Number(i64),
    Text(String),
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeName::Number(n) => write!(f, "{n}"),
            NodeName::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for NodeName {
    fn from(s: &str) -> Self {
        NodeName::Text(s.to_owned())
    }
}

impl From<String> for NodeName {
    fn from(s: String) -> Self {
        NodeName::Text(s)
    }
}

impl From<i64> for NodeName {
    fn from(n: i64) -> Self {
        NodeName::Number(n)
    }
}

/// The component at the heart of a level.
#[derive(Debug, Clone)]
pub enum ComponentRef {
    /// A concrete view.
    View(ViewRef),
    /// Another module, resolved (and memoized) like any named dependency.
    Module(NodeName),
}

impl From<ViewRef> for ComponentRef {
    fn from(view: ViewRef) -> Self {
        ComponentRef::View(view)
    }
}

impl From<NodeName> for ComponentRef {
    fn from(name: NodeName) -> Self {
        ComponentRef::Module(name)
    }
}

impl From<&str> for ComponentRef {
    fn from(name: &str) -> Self {
        ComponentRef::Module(name.into())
    }
}

/// One entry in a level's dependency list.
#[derive(Debug, Clone)]
pub enum Dependency {
    /// A named module.
    Module(NodeName),
    /// A ready-made view, used as-is.
    View(ViewRef),
    /// An anonymous level. Always freshly materialized, even if it carries a
    /// name, and never part of cycle tracking.
    Inline(Box<FormLevel>),
}

impl From<&str> for Dependency {
    fn from(name: &str) -> Self {
        Dependency::Module(name.into())
    }
}

impl From<NodeName> for Dependency {
    fn from(name: NodeName) -> Self {
        Dependency::Module(name)
    }
}

impl From<ViewRef> for Dependency {
    fn from(view: ViewRef) -> Self {
        Dependency::View(view)
    }
}

impl From<FormLevel> for Dependency {
    fn from(level: FormLevel) -> Self {
        Dependency::Inline(Box::new(level))
    }
}

/// A node of the form graph.
///
/// `dependencies: None` and `Some(vec![])` differ: the former leaves the
/// component as-is, the latter injects an empty slot list.
#[derive(Debug, Clone)]
pub struct FormLevel {
    pub name: Option<NodeName>,
    pub component: ComponentRef,
    pub slots_prop_name: Option<String>,
    pub dependencies: Option<Vec<Dependency>>,
    pub decorators: Vec<Decorator>,
}

impl FormLevel {
    pub fn new(component: impl Into<ComponentRef>) -> Self {
        Self {
            name: None,
            component: component.into(),
            slots_prop_name: None,
            dependencies: None,
            decorators: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<NodeName>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the prop name slots are injected under for this level.
    pub fn slots_prop(mut self, prop: impl Into<String>) -> Self {
        self.slots_prop_name = Some(prop.into());
        self
    }

    /// Appends one dependency.
    pub fn dependency(mut self, dependency: impl Into<Dependency>) -> Self {
        self.dependencies
            .get_or_insert_with(Vec::new)
            .push(dependency.into());
        self
    }

    /// Replaces the dependency list.
    pub fn dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Appends a decorator. Earlier decorators wrap later ones.
    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }
}

/// Where resolution starts.
#[derive(Debug, Clone)]
pub enum FormEntry {
    Module(NodeName),
    /// An inline level; its name, if any, is ignored.
    Inline(FormLevel),
}

impl From<&str> for FormEntry {
    fn from(name: &str) -> Self {
        FormEntry::Module(name.into())
    }
}

impl From<NodeName> for FormEntry {
    fn from(name: NodeName) -> Self {
        FormEntry::Module(name)
    }
}

impl From<FormLevel> for FormEntry {
    fn from(level: FormLevel) -> Self {
        FormEntry::Inline(level)
    }
}

/// A complete form graph: the entry plus the table of named modules.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub entry: FormEntry,
    pub slots_prop_name: Option<String>,
    pub modules: Vec<FormLevel>,
}

impl FormConfig {
    pub fn new(entry: impl Into<FormEntry>) -> Self {
        Self {
            entry: entry.into(),
            slots_prop_name: None,
            modules: Vec::new(),
        }
    }

    /// Registers `level` as a module under `name`.
    pub fn module(mut self, name: impl Into<NodeName>, level: FormLevel) -> Self {
        self.modules.push(level.named(name));
        self
    }

    /// Default slot prop name for every level that does not set its own.
    pub fn slots_prop(mut self, prop: impl Into<String>) -> Self {
        self.slots_prop_name = Some(prop.into());
        self
    }
}
