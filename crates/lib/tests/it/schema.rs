//! Schema compilation tests

use std::sync::Arc;

use formweave::{
    FormSettings,
    path,
    resolve::{FormEntry, create_form},
    schema::{Catalogue, STANDARD_WIDGETS, Schema, SchemaNode, build_form, compile},
    view::{Decorator, View},
};
use serde_json::json;

fn address() -> SchemaNode {
    SchemaNode::object(vec![
        SchemaNode::leaf("input").field("street").label("Street"),
        SchemaNode::leaf("input").field("city").label("City"),
    ])
}

#[test]
fn test_standard_catalogue_covers_builtin_widgets() {
    let catalogue = Catalogue::standard();
    for name in STANDARD_WIDGETS {
        assert_eq!(
            catalogue.get(name).map(|v| v.to_string()),
            Some(format!("widget({name})"))
        );
    }
    assert!(catalogue.get("colour").is_none());
}

#[test]
fn test_root_decorators_wrap_container() {
    let schema = Schema::new(vec![SchemaNode::leaf("switch").field("on")])
        .decorator(Decorator::wrap("form"));
    let view = build_form(&schema, &Catalogue::standard(), &FormSettings::default()).unwrap();
    assert_eq!(view.to_string(), "wrap(form)>container[item(on)>widget(switch)]");
}

#[test]
fn test_object_with_field_and_label() {
    let schema = Schema::new(vec![
        address()
            .field("address")
            .label("Address")
            .decorator(Decorator::wrap("fieldset")),
    ]);
    let view = build_form(&schema, &Catalogue::standard(), &FormSettings::default()).unwrap();
    assert_eq!(
        view.to_string(),
        "container[wrap(fieldset)>access(address)>item>container[item(street)>widget(input), item(city)>widget(input)]]"
    );
}

#[test]
fn test_item_props_alone_add_item_chrome() {
    let schema = Schema::new(vec![SchemaNode::leaf("rate").item_prop("colon", json!(false))]);
    let view = create_form(&compile(&schema, &Catalogue::standard())).unwrap();
    let View::Item { field, props, .. } = &*view.slots()[0] else {
        panic!("expected item");
    };
    assert!(field.is_none());
    assert_eq!(props.get("colon"), Some(&json!(false)));
}

#[test]
fn test_array_renderer_becomes_list_layout() {
    let schema = Schema::new(vec![
        SchemaNode::array(address()).field("addresses").renderer("table"),
    ]);
    let view = create_form(&compile(&schema, &Catalogue::standard())).unwrap();
    let View::Access { name, inner } = &*view.slots()[0] else {
        panic!("expected access");
    };
    assert_eq!(name, &path!["addresses"]);
    assert!(matches!(&**inner, View::List { layout: Some(layout), .. } if layout == "table"));
}

#[test]
fn test_direct_component_leaf() {
    let custom = View::widget("signature-pad");
    let schema = Schema::new(vec![SchemaNode::component(Arc::clone(&custom))]);
    let view = create_form(&compile(&schema, &Catalogue::new())).unwrap();
    assert!(Arc::ptr_eq(&view.slots()[0], &custom));
}

#[test]
fn test_definitions_become_shared_modules() {
    let schema = Schema::new(vec![
        SchemaNode::reference("address"),
        SchemaNode::reference("address"),
    ])
    .define("address", address());

    let config = compile(&schema, &Catalogue::standard());
    assert!(matches!(config.entry, FormEntry::Inline(_)));
    assert_eq!(config.modules.len(), 1);

    let view = create_form(&config).unwrap();
    assert!(Arc::ptr_eq(&view.slots()[0], &view.slots()[1]));
}

#[test]
fn test_recursive_definition_is_a_cycle() {
    let schema = Schema::new(vec![SchemaNode::reference("node")]).define(
        "node",
        SchemaNode::object(vec![
            SchemaNode::leaf("input").field("label"),
            SchemaNode::array(SchemaNode::reference("node")).field("children"),
        ]),
    );

    let err = build_form(&schema, &Catalogue::standard(), &FormSettings::default()).unwrap_err();
    assert!(err.is_cycle());
}

#[test]
fn test_undefined_reference() {
    let schema = Schema::new(vec![SchemaNode::reference("ghost")]);
    let lenient = build_form(&schema, &Catalogue::standard(), &FormSettings::default()).unwrap();
    assert_eq!(lenient.to_string(), "container[placeholder]");

    let strict = build_form(&schema, &Catalogue::standard(), &FormSettings::default().strict());
    assert!(strict.unwrap_err().is_not_found());
}
