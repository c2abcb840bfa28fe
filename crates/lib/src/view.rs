//! Materialized view trees.
//!
//! Resolution turns a schema into a tree of [`View`] nodes shared through
//! [`ViewRef`]. Views are immutable; a memoized node is the same `Arc` at every
//! place it is used, so `Arc::ptr_eq` identifies shared subtrees.

use std::{fmt, sync::Arc};

use serde_json::{Map, Value};

use crate::path::Path;

pub type ViewRef = Arc<View>;

/// A leaf component supplied by the embedding UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub name: String,
    pub props: Map<String, Value>,
}

/// One node of a materialized view tree.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// A concrete leaf component.
    Widget(Widget),
    /// Renders all of its slots in order.
    Container,
    /// Renders its first slot, passing everything through.
    Tunnel,
    /// Renders nothing.
    Placeholder,
    /// A leaf whose type is not in the catalogue.
    Unknown { kind: String },
    /// `inner` with an ordered sequence of slot views injected under `prop`.
    Slotted {
        inner: ViewRef,
        prop: String,
        slots: Vec<ViewRef>,
    },
    /// Scopes `inner` one or more path segments deeper.
    Access { name: Path, inner: ViewRef },
    /// A form item: label chrome, and a field binding when `field` is set.
    Item {
        field: Option<Path>,
        label: Option<String>,
        props: Map<String, Value>,
        inner: ViewRef,
    },
    /// A dynamic list; `inner` is rendered once per element.
    List {
        layout: Option<String>,
        inner: ViewRef,
    },
    /// An opaque wrapper added by a user decorator.
    Wrapped { tag: String, inner: ViewRef },
}

impl View {
    pub fn widget(name: impl Into<String>) -> ViewRef {
        Arc::new(View::Widget(Widget {
            name: name.into(),
            props: Map::new(),
        }))
    }

    pub fn widget_with(name: impl Into<String>, props: Map<String, Value>) -> ViewRef {
        Arc::new(View::Widget(Widget {
            name: name.into(),
            props,
        }))
    }

    pub fn placeholder() -> ViewRef {
        Arc::new(View::Placeholder)
    }

    pub fn container() -> ViewRef {
        Arc::new(View::Container)
    }

    pub fn tunnel() -> ViewRef {
        Arc::new(View::Tunnel)
    }

    /// The wrapped view for wrapper nodes, `None` for leaves.
    pub fn inner(&self) -> Option<&ViewRef> {
        match self {
            View::Slotted { inner, .. }
            | View::Access { inner, .. }
            | View::Item { inner, .. }
            | View::List { inner, .. }
            | View::Wrapped { inner, .. } => Some(inner),
            View::Widget(_)
            | View::Container
            | View::Tunnel
            | View::Placeholder
            | View::Unknown { .. } => None,
        }
    }

    /// The injected slots if this is a slotted node.
    pub fn slots(&self) -> &[ViewRef] {
        match self {
            View::Slotted { slots, .. } => slots,
            _ => &[],
        }
    }
}

/// Compact one-line outline, e.g. `wrap(a)>access(x)>item(x)>widget(input)`.
impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Widget(w) => write!(f, "widget({})", w.name),
            View::Container => write!(f, "container"),
            View::Tunnel => write!(f, "tunnel"),
            View::Placeholder => write!(f, "placeholder"),
            View::Unknown { kind } => write!(f, "unknown({kind})"),
            View::Slotted { inner, slots, .. } => {
                write!(f, "{inner}[")?;
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{slot}")?;
                }
                write!(f, "]")
            }
            View::Access { name, inner } => write!(f, "access({name})>{inner}"),
            View::Item { field, inner, .. } => match field {
                Some(field) => write!(f, "item({field})>{inner}"),
                None => write!(f, "item>{inner}"),
            },
            View::List { inner, .. } => write!(f, "list>{inner}"),
            View::Wrapped { tag, inner } => write!(f, "wrap({tag})>{inner}"),
        }
    }
}

type DecorateFn = dyn Fn(ViewRef) -> ViewRef + Send + Sync;

/// A view-wrapping function.
#[derive(Clone)]
pub struct Decorator {
    label: String,
    apply: Arc<DecorateFn>,
}

impl Decorator {
    pub fn new(
        label: impl Into<String>,
        apply: impl Fn(ViewRef) -> ViewRef + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            apply: Arc::new(apply),
        }
    }

    /// Wraps the view in an opaque [`View::Wrapped`] node.
    pub fn wrap(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(format!("wrap({tag})"), move |inner| {
            Arc::new(View::Wrapped {
                tag: tag.clone(),
                inner,
            })
        })
    }

    /// Scopes the view under `name`.
    pub fn access(name: impl Into<Path>) -> Self {
        let name = name.into();
        Self::new(format!("access({name})"), move |inner| {
            Arc::new(View::Access {
                name: name.clone(),
                inner,
            })
        })
    }

    /// Wraps the view in a form item, binding it to `field` when given.
    pub fn item(field: Option<Path>, label: Option<String>, props: Map<String, Value>) -> Self {
        Self::new("item", move |inner| {
            Arc::new(View::Item {
                field: field.clone(),
                label: label.clone(),
                props: props.clone(),
                inner,
            })
        })
    }

    /// Turns the view into a per-element list template.
    pub fn list(layout: Option<String>) -> Self {
        Self::new("list", move |inner| {
            Arc::new(View::List {
                layout: layout.clone(),
                inner,
            })
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn apply(&self, view: ViewRef) -> ViewRef {
        (self.apply)(view)
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Decorator").field(&self.label).finish()
    }
}

/// Applies `decorators` so that the first one listed ends up outermost.
pub fn compose(decorators: &[Decorator], view: ViewRef) -> ViewRef {
    decorators
        .iter()
        .rev()
        .fold(view, |inner, decorator| decorator.apply(inner))
}
