//! Declarative form schemas.
//!
//! A [`Schema`] is a tree of [`SchemaNode`]s (leaves, arrays, objects and
//! references to named definitions). [`compile`] lowers it into a
//! [`FormConfig`] for the resolver, and [`build_form`] does both steps at once.
//!
//! Lowering rules:
//!
//! * the root is a container wrapped by the schema's decorators, with one slot
//!   per top-level node;
//! * an object is a container with one slot per property, decorated with the
//!   node's decorators, then `access(field)`, then an item when it has a label
//!   or item props;
//! * an array is a tunnel around its item schema, decorated with the node's
//!   decorators, then `access(field)`, then an item, then the list decorator;
//! * a leaf is its catalogue widget, decorated with the node's decorators and
//!   an item bound to `field` when it has a field, a label or item props;
//! * a reference points at a named definition, compiled as a module.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use serde_json::{Map, Value};

use crate::{
    path::Path,
    resolve::{
        ComponentRef, Dependency, FormConfig, FormEntry, FormLevel, NodeName, ResolveError,
        create_form_with,
    },
    settings::FormSettings,
    view::{Decorator, View, ViewRef},
};

/// Widget names the standard catalogue knows about.
pub const STANDARD_WIDGETS: &[&str] = &[
    "input",
    "select",
    "select.tree",
    "cascader",
    "checkbox",
    "picker.date",
    "picker.date.range",
    "picker.time",
    "picker.time.range",
    "radio",
    "rate",
    "slider",
    "switch",
    "transfer",
];

/// Lookup table from widget type name to view.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    widgets: HashMap<String, ViewRef>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalogue with a plain widget registered for every [`STANDARD_WIDGETS`] name.
    pub fn standard() -> Self {
        STANDARD_WIDGETS
            .iter()
            .fold(Self::new(), |catalogue, name| {
                catalogue.with(*name, View::widget(*name))
            })
    }

    pub fn with(mut self, kind: impl Into<String>, view: ViewRef) -> Self {
        self.register(kind, view);
        self
    }

    /// Registers `view` under `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: impl Into<String>, view: ViewRef) {
        self.widgets.insert(kind.into(), view);
    }

    pub fn get(&self, kind: &str) -> Option<&ViewRef> {
        self.widgets.get(kind)
    }
}

/// Properties shared by every non-reference node.
#[derive(Debug, Clone, Default)]
pub struct NodeProps {
    /// Path segment(s) the node is bound or scoped to.
    pub field: Option<Path>,
    pub label: Option<String>,
    pub item_props: Map<String, Value>,
    pub decorators: Vec<Decorator>,
}

impl NodeProps {
    fn has_item_chrome(&self) -> bool {
        self.label.is_some() || !self.item_props.is_empty()
    }

    fn item(&self, field: Option<Path>) -> Decorator {
        Decorator::item(field, self.label.clone(), self.item_props.clone())
    }
}

/// How a leaf names its widget.
#[derive(Debug, Clone)]
pub enum WidgetRef {
    /// Looked up in the [`Catalogue`].
    Type(String),
    /// Used directly.
    Component(ViewRef),
}

#[derive(Debug, Clone)]
pub struct LeafNode {
    pub props: NodeProps,
    pub widget: WidgetRef,
    /// Merged over the catalogue widget's own props.
    pub widget_props: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ArrayNode {
    pub props: NodeProps,
    pub item: Box<SchemaNode>,
    /// Layout name handed to the list view.
    pub renderer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObjectNode {
    pub props: NodeProps,
    pub properties: Vec<SchemaNode>,
}

/// One node of a form schema.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Leaf(LeafNode),
    Array(ArrayNode),
    Object(ObjectNode),
    Ref(NodeName),
}

impl SchemaNode {
    /// A leaf rendering the catalogue widget `kind`.
    pub fn leaf(kind: impl Into<String>) -> Self {
        SchemaNode::Leaf(LeafNode {
            props: NodeProps::default(),
            widget: WidgetRef::Type(kind.into()),
            widget_props: Map::new(),
        })
    }

    /// A leaf rendering `view` as-is.
    pub fn component(view: ViewRef) -> Self {
        SchemaNode::Leaf(LeafNode {
            props: NodeProps::default(),
            widget: WidgetRef::Component(view),
            widget_props: Map::new(),
        })
    }

    pub fn array(item: SchemaNode) -> Self {
        SchemaNode::Array(ArrayNode {
            props: NodeProps::default(),
            item: Box::new(item),
            renderer: None,
        })
    }

    pub fn object(properties: Vec<SchemaNode>) -> Self {
        SchemaNode::Object(ObjectNode {
            props: NodeProps::default(),
            properties,
        })
    }

    pub fn reference(name: impl Into<NodeName>) -> Self {
        SchemaNode::Ref(name.into())
    }

    /// Shared props, `None` for references.
    pub fn props(&self) -> Option<&NodeProps> {
        match self {
            SchemaNode::Leaf(node) => Some(&node.props),
            SchemaNode::Array(node) => Some(&node.props),
            SchemaNode::Object(node) => Some(&node.props),
            SchemaNode::Ref(_) => None,
        }
    }

    fn props_mut(&mut self) -> Option<&mut NodeProps> {
        match self {
            SchemaNode::Leaf(node) => Some(&mut node.props),
            SchemaNode::Array(node) => Some(&mut node.props),
            SchemaNode::Object(node) => Some(&mut node.props),
            SchemaNode::Ref(_) => None,
        }
    }

    fn with_props(mut self, update: impl FnOnce(&mut NodeProps)) -> Self {
        match self.props_mut() {
            Some(props) => update(props),
            None => tracing::debug!("ignoring props on a schema reference"),
        }
        self
    }

    pub fn field(self, field: impl Into<Path>) -> Self {
        let field = field.into();
        self.with_props(|props| props.field = Some(field))
    }

    pub fn label(self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.with_props(|props| props.label = Some(label))
    }

    pub fn item_prop(self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        self.with_props(|props| {
            props.item_props.insert(key, value);
        })
    }

    pub fn decorator(self, decorator: Decorator) -> Self {
        self.with_props(|props| props.decorators.push(decorator))
    }

    /// Sets a widget prop; only meaningful on leaves.
    pub fn widget_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        if let SchemaNode::Leaf(leaf) = &mut self {
            leaf.widget_props.insert(key.into(), value);
        }
        self
    }

    /// Sets the list layout; only meaningful on arrays.
    pub fn renderer(mut self, renderer: impl Into<String>) -> Self {
        if let SchemaNode::Array(array) = &mut self {
            array.renderer = Some(renderer.into());
        }
        self
    }
}

/// A complete form schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub properties: Vec<SchemaNode>,
    pub definitions: BTreeMap<NodeName, SchemaNode>,
    pub decorators: Vec<Decorator>,
}

impl Schema {
    pub fn new(properties: Vec<SchemaNode>) -> Self {
        Self {
            properties,
            ..Self::default()
        }
    }

    /// Adds a named definition that [`SchemaNode::Ref`] nodes can point at.
    pub fn define(mut self, name: impl Into<NodeName>, node: SchemaNode) -> Self {
        self.definitions.insert(name.into(), node);
        self
    }

    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }
}

/// Lowers `schema` into a resolver configuration.
pub fn compile(schema: &Schema, catalogue: &Catalogue) -> FormConfig {
    let compiler = Compiler { catalogue };

    let root = FormLevel {
        name: None,
        component: ComponentRef::View(View::container()),
        slots_prop_name: None,
        dependencies: Some(compiler.dependencies(&schema.properties)),
        decorators: schema.decorators.clone(),
    };

    let mut config = FormConfig::new(FormEntry::Inline(root));
    for (name, node) in &schema.definitions {
        config = config.module(name.clone(), compiler.level(node));
    }
    config
}

/// Compiles and resolves `schema` in one step.
pub fn build_form(
    schema: &Schema,
    catalogue: &Catalogue,
    settings: &FormSettings,
) -> Result<ViewRef, ResolveError> {
    create_form_with(&compile(schema, catalogue), settings)
}

struct Compiler<'a> {
    catalogue: &'a Catalogue,
}

impl Compiler<'_> {
    fn dependencies(&self, nodes: &[SchemaNode]) -> Vec<Dependency> {
        nodes.iter().map(|node| self.dependency(node)).collect()
    }

    fn dependency(&self, node: &SchemaNode) -> Dependency {
        match node {
            SchemaNode::Ref(name) => Dependency::Module(name.clone()),
            other => Dependency::Inline(Box::new(self.level(other))),
        }
    }

    fn level(&self, node: &SchemaNode) -> FormLevel {
        match node {
            SchemaNode::Ref(name) => FormLevel::new(ComponentRef::Module(name.clone())),
            SchemaNode::Leaf(leaf) => self.leaf(leaf),
            SchemaNode::Array(array) => {
                let mut decorators = scoped_decorators(&array.props);
                decorators.push(Decorator::list(array.renderer.clone()));
                FormLevel {
                    name: None,
                    component: ComponentRef::View(View::tunnel()),
                    slots_prop_name: None,
                    dependencies: Some(vec![self.dependency(&array.item)]),
                    decorators,
                }
            }
            SchemaNode::Object(object) => FormLevel {
                name: None,
                component: ComponentRef::View(View::container()),
                slots_prop_name: None,
                dependencies: Some(self.dependencies(&object.properties)),
                decorators: scoped_decorators(&object.props),
            },
        }
    }

    fn leaf(&self, leaf: &LeafNode) -> FormLevel {
        let props = &leaf.props;
        let mut decorators = props.decorators.clone();
        if props.field.is_some() || props.has_item_chrome() {
            decorators.push(props.item(props.field.clone()));
        }

        FormLevel {
            name: None,
            component: ComponentRef::View(self.widget(leaf)),
            slots_prop_name: None,
            dependencies: None,
            decorators,
        }
    }

    fn widget(&self, leaf: &LeafNode) -> ViewRef {
        let base = match &leaf.widget {
            WidgetRef::Component(view) => Arc::clone(view),
            WidgetRef::Type(kind) => match self.catalogue.get(kind) {
                Some(view) => Arc::clone(view),
                None => {
                    tracing::warn!(%kind, "unknown widget type");
                    return Arc::new(View::Unknown { kind: kind.clone() });
                }
            },
        };

        match &*base {
            View::Widget(widget) if !leaf.widget_props.is_empty() => {
                let mut props = widget.props.clone();
                props.extend(leaf.widget_props.clone());
                View::widget_with(widget.name.clone(), props)
            }
            _ => base,
        }
    }
}

/// User decorators, then `access(field)`, then the item chrome.
fn scoped_decorators(props: &NodeProps) -> Vec<Decorator> {
    let mut decorators = props.decorators.clone();
    if let Some(field) = &props.field {
        decorators.push(Decorator::access(field.clone()));
    }
    if props.has_item_chrome() {
        decorators.push(props.item(None));
    }
    decorators
}
