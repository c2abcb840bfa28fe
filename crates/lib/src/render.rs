//! Binding a materialized view tree to a field store.
//!
//! The [`Renderer`] walks a [`View`] tree with an explicit [`FieldContext`]
//! and produces a [`Rendered`] tree: fields bound to absolute paths with their
//! current values, and lists expanded element by element.
//!
//! Every list in the tree is backed by a [`ListController`] owned by the
//! renderer. Controllers are keyed by an [`InstancePath`], the position of the
//! list view in the tree where each enclosing list element contributes its
//! identity rather than its index. A nested list therefore keeps its
//! controller when its parent element is moved. Controllers whose list was not
//! visited in a pass are dropped, which unsubscribes them.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde_json::{Map, Value};

use crate::{
    context::FieldContext,
    list::{ListController, ListKey},
    path::Path,
    scope::ScopedForm,
    store::FieldStore,
    view::{View, ViewRef},
};

/// One step of an [`InstancePath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstanceSeg {
    /// The n-th slot of a container or tunnel.
    Slot(usize),
    /// A list element, by identity.
    Item(ListKey),
}

/// Identifies a list view instance within a rendered tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstancePath(Vec<InstanceSeg>);

impl InstancePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, seg: InstanceSeg) -> Self {
        let mut segments = self.0.clone();
        segments.push(seg);
        Self(segments)
    }

    pub fn segments(&self) -> &[InstanceSeg] {
        &self.0
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for seg in &self.0 {
            match seg {
                InstanceSeg::Slot(i) => write!(f, "/{i}")?,
                InstanceSeg::Item(key) => write!(f, "/{key}")?,
            }
        }
        Ok(())
    }
}

/// One rendered list element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItem {
    pub key: ListKey,
    pub index: usize,
    pub child: Rendered,
}

/// The output of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Empty,
    Unknown {
        kind: String,
    },
    Widget {
        name: String,
        props: Map<String, Value>,
    },
    Group(Vec<Rendered>),
    Field {
        /// Absolute path for bound items, `None` for label-only chrome.
        path: Option<Path>,
        label: Option<String>,
        props: Map<String, Value>,
        value: Option<Value>,
        child: Box<Rendered>,
    },
    Wrapped {
        tag: String,
        child: Box<Rendered>,
    },
    List {
        instance: InstancePath,
        path: Path,
        layout: Option<String>,
        items: Vec<RenderedItem>,
    },
}

impl Rendered {
    /// Collects every bound field path in document order.
    pub fn field_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths(&self, out: &mut Vec<Path>) {
        match self {
            Rendered::Empty | Rendered::Unknown { .. } | Rendered::Widget { .. } => {}
            Rendered::Group(children) => children.iter().for_each(|c| c.collect_paths(out)),
            Rendered::Field { path, child, .. } => {
                if let Some(path) = path {
                    out.push(path.clone());
                }
                child.collect_paths(out);
            }
            Rendered::Wrapped { child, .. } => child.collect_paths(out),
            Rendered::List { items, .. } => items.iter().for_each(|i| i.child.collect_paths(out)),
        }
    }
}

/// Renders view trees against a store, keeping list identities between passes.
pub struct Renderer<S: FieldStore> {
    context: FieldContext<S>,
    lists: BTreeMap<InstancePath, ListController<S>>,
}

impl<S: FieldStore + Clone> Renderer<S> {
    pub fn new(context: FieldContext<S>) -> Self {
        Self {
            context,
            lists: BTreeMap::new(),
        }
    }

    pub fn context(&self) -> &FieldContext<S> {
        &self.context
    }

    /// The controller for the list rendered at `instance` in the last pass.
    pub fn list(&self, instance: &InstancePath) -> Option<&ListController<S>> {
        self.lists.get(instance)
    }

    /// Instance paths of every live list controller.
    pub fn list_instances(&self) -> Vec<InstancePath> {
        self.lists.keys().cloned().collect()
    }

    /// Renders `view` and drops controllers for lists that no longer appear.
    pub fn render(&mut self, view: &ViewRef) -> Rendered {
        let mut visited = BTreeSet::new();
        let context = self.context.clone();
        let rendered = self.walk(view, &context, &InstancePath::root(), &[], &mut visited);

        let before = self.lists.len();
        self.lists.retain(|instance, _| visited.contains(instance));
        let pruned = before - self.lists.len();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped list controllers not rendered this pass");
        }
        rendered
    }

    fn walk(
        &mut self,
        view: &ViewRef,
        context: &FieldContext<S>,
        instance: &InstancePath,
        slots: &[ViewRef],
        visited: &mut BTreeSet<InstancePath>,
    ) -> Rendered {
        match &**view {
            View::Widget(widget) => Rendered::Widget {
                name: widget.name.clone(),
                props: widget.props.clone(),
            },
            View::Placeholder => Rendered::Empty,
            View::Unknown { kind } => Rendered::Unknown { kind: kind.clone() },
            View::Container => Rendered::Group(
                slots
                    .iter()
                    .enumerate()
                    .map(|(i, slot)| {
                        self.walk(slot, context, &instance.child(InstanceSeg::Slot(i)), &[], visited)
                    })
                    .collect(),
            ),
            View::Tunnel => match slots.first() {
                Some(slot) => {
                    self.walk(slot, context, &instance.child(InstanceSeg::Slot(0)), &[], visited)
                }
                None => Rendered::Empty,
            },
            View::Slotted { inner, slots, .. } => self.walk(inner, context, instance, slots, visited),
            View::Access { name, inner } => {
                self.walk(inner, &context.access(name.clone()), instance, slots, visited)
            }
            View::Item {
                field,
                label,
                props,
                inner,
            } => {
                let (path, value) = match field {
                    Some(field) => {
                        let path = context.local_form().absolute(field);
                        let value = context.store().get_value(&path);
                        (Some(path), Some(value))
                    }
                    None => (None, None),
                };
                Rendered::Field {
                    path,
                    label: label.clone(),
                    props: props.clone(),
                    value,
                    child: Box::new(self.walk(inner, context, instance, slots, visited)),
                }
            }
            View::Wrapped { tag, inner } => Rendered::Wrapped {
                tag: tag.clone(),
                child: Box::new(self.walk(inner, context, instance, slots, visited)),
            },
            View::List { layout, inner } => {
                let path = context.prefix().clone();
                let fields = self.controller(instance, context, &path).fields();
                visited.insert(instance.clone());

                let items = fields
                    .into_iter()
                    .map(|field| RenderedItem {
                        key: field.key,
                        index: field.index,
                        child: self.walk(
                            inner,
                            &context.access(field.index),
                            &instance.child(InstanceSeg::Item(field.key)),
                            slots,
                            visited,
                        ),
                    })
                    .collect();

                Rendered::List {
                    instance: instance.clone(),
                    path,
                    layout: layout.clone(),
                    items,
                }
            }
        }
    }

    /// The controller for `instance`, created or re-pointed at `path` as needed.
    fn controller(
        &mut self,
        instance: &InstancePath,
        context: &FieldContext<S>,
        path: &Path,
    ) -> &ListController<S> {
        let controller = self.lists.entry(instance.clone()).or_insert_with(|| {
            tracing::debug!(%instance, %path, "creating list controller");
            ListController::new(ScopedForm::root(context.store().clone()), path.clone())
        });
        if controller.name() != path {
            tracing::debug!(%instance, from = %controller.name(), to = %path, "retargeting list controller");
            controller.retarget(path.clone());
        }
        controller
    }
}

impl<S: FieldStore> fmt::Debug for Renderer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("prefix", &self.context.prefix())
            .field("lists", &self.lists.keys().collect::<Vec<_>>())
            .finish()
    }
}
