//! Renderer integration tests
//!
//! These compile small schemas, render them against a `MemoryStore` and
//! drive the resulting list controllers.

use formweave::{
    FieldContext, FormSettings, MemoryStore,
    path,
    path::Path,
    render::{InstancePath, InstanceSeg, Rendered, Renderer},
    schema::{Catalogue, Schema, SchemaNode, build_form},
    view::ViewRef,
};
use serde_json::json;

use crate::helpers::*;

/// rows: [{ name, tags: [string] }]
fn rows_form() -> ViewRef {
    let schema = Schema::new(vec![
        SchemaNode::array(SchemaNode::object(vec![
            SchemaNode::leaf("input").field("name").label("Name"),
            SchemaNode::array(SchemaNode::leaf("input").field(Path::root())).field("tags"),
        ]))
        .field("rows"),
    ]);
    build_form(&schema, &Catalogue::standard(), &FormSettings::default()).unwrap()
}

fn rows_store() -> MemoryStore {
    store_with(json!({
        "rows": [
            {"name": "a", "tags": ["x"]},
            {"name": "b", "tags": ["y", "z"]}
        ]
    }))
}

fn outer_instance() -> InstancePath {
    InstancePath::root().child(InstanceSeg::Slot(0))
}

fn tags_instance(row: &Rendered, index: usize) -> InstancePath {
    let Rendered::List { items, .. } = row else {
        panic!("expected list");
    };
    outer_instance()
        .child(InstanceSeg::Item(items[index].key))
        .child(InstanceSeg::Slot(0))
        .child(InstanceSeg::Slot(1))
}

fn outer_list(rendered: &Rendered) -> &Rendered {
    let Rendered::Group(children) = rendered else {
        panic!("expected root group");
    };
    &children[0]
}

#[test]
fn test_render_binds_every_field() {
    let store = rows_store();
    let mut renderer = Renderer::new(FieldContext::new(store.clone()));
    let rendered = renderer.render(&rows_form());

    assert_eq!(
        rendered.field_paths(),
        vec![
            path!["rows", 0, "name"],
            path!["rows", 0, "tags", 0],
            path!["rows", 1, "name"],
            path!["rows", 1, "tags", 0],
            path!["rows", 1, "tags", 1],
        ]
    );
    assert_eq!(renderer.list_instances().len(), 3);
    assert_eq!(store.subscriber_count(), 3);
}

#[test]
fn test_field_values_are_read_from_store() {
    let store = rows_store();
    let mut renderer = Renderer::new(FieldContext::new(store));
    let rendered = renderer.render(&rows_form());

    let Rendered::List { items, path, .. } = outer_list(&rendered) else {
        panic!("expected list");
    };
    assert_eq!(path, &path!["rows"]);
    let Rendered::Group(row) = &items[1].child else {
        panic!("expected row group");
    };
    let Rendered::Field { value, label, .. } = &row[0] else {
        panic!("expected field");
    };
    assert_eq!(value, &Some(json!("b")));
    assert_eq!(label.as_deref(), Some("Name"));
}

#[test]
fn test_move_keeps_outer_identities_and_nested_controllers() {
    let store = rows_store();
    let mut renderer = Renderer::new(FieldContext::new(store.clone()));
    let view = rows_form();

    let first = renderer.render(&view);
    let second_row_tags = tags_instance(outer_list(&first), 1);
    let Rendered::List { items, .. } = outer_list(&first) else {
        panic!("expected list");
    };
    let keys_before: Vec<_> = items.iter().map(|i| i.key).collect();

    assert!(renderer.list(&outer_instance()).unwrap().move_item(0, 1));
    let second = renderer.render(&view);

    let Rendered::List { items, .. } = outer_list(&second) else {
        panic!("expected list");
    };
    let keys_after: Vec<_> = items.iter().map(|i| i.key).collect();
    assert_eq!(keys_after, vec![keys_before[1], keys_before[0]]);

    // The nested list of the moved row follows it to index 0.
    let nested = renderer.list(&second_row_tags).unwrap();
    assert_eq!(nested.path(), path!["rows", 0, "tags"]);
    assert_eq!(nested.fields().len(), 2);
    assert_eq!(store.subscriber_count(), 3);
}

#[test]
fn test_removed_rows_drop_their_nested_controllers() {
    let store = rows_store();
    let mut renderer = Renderer::new(FieldContext::new(store.clone()));
    let view = rows_form();

    let first = renderer.render(&view);
    let removed = tags_instance(outer_list(&first), 0);

    assert!(renderer.list(&outer_instance()).unwrap().remove(0));
    let second = renderer.render(&view);

    assert!(renderer.list(&removed).is_none());
    assert_eq!(renderer.list_instances().len(), 2);
    assert_eq!(store.subscriber_count(), 2);
    assert_eq!(
        second.field_paths(),
        vec![
            path!["rows", 0, "name"],
            path!["rows", 0, "tags", 0],
            path!["rows", 0, "tags", 1],
        ]
    );
}

#[test]
fn test_added_rows_render_on_next_pass() {
    let store = store_with(json!({"rows": []}));
    let mut renderer = Renderer::new(FieldContext::new(store.clone()));
    let view = rows_form();

    assert!(renderer.render(&view).field_paths().is_empty());
    renderer
        .list(&outer_instance())
        .unwrap()
        .add(json!({"name": "new", "tags": []}));

    let rendered = renderer.render(&view);
    assert_eq!(rendered.field_paths(), vec![path!["rows", 0, "name"]]);
    assert_eq!(value_at(&store, &path!["rows", 0, "name"]), json!("new"));
}

#[test]
fn test_nested_context_prefix() {
    let store = store_with(json!({"order": {"rows": [{"name": "n", "tags": []}]}}));
    let mut renderer = Renderer::new(FieldContext::new(store).access("order"));

    let rendered = renderer.render(&rows_form());
    assert_eq!(rendered.field_paths(), vec![path!["order", "rows", 0, "name"]]);
}
