//! ScopedForm and FieldContext integration tests
//!
//! Every test runs against a `MemoryStore`; scoped views are checked by the
//! absolute values they leave behind in the store.

use formweave::{
    Error, FieldContext, FieldStore, ScopeOptions, ScopedForm,
    path,
    path::Path,
    scope::Selection,
    store::{Dispatch, FieldFilter, FieldMeta, Relation, SubscribeOptions},
};
use serde_json::json;

use crate::helpers::*;

// ===== PATH TRANSLATION =====

#[test]
fn test_get_translates_local_paths() {
    let store = store_with(json!({"a": {"b": [10, 20]}}));
    let form = ScopedForm::new(store.clone(), path!["a"]);

    assert_eq!(form.get(&path!["b", 1]), json!(20));
    assert_eq!(form.get(&path!["missing"]), json!(null));
}

#[test]
fn test_child_scope_stacks_prefixes() {
    let store = store_with(json!({"a": {"b": {"c": 1}}}));
    let form = ScopedForm::root(store).child("a").child("b");

    assert_eq!(form.prefix(), &path!["a", "b"]);
    assert_eq!(form.get(&path!["c"]), json!(1));
}

#[test]
fn test_get_many_reroots_values() {
    let store = store_with(json!({"user": {"name": "ada", "age": 36, "tags": ["x"]}}));
    let form = ScopedForm::new(store, path!["user"]);

    assert_eq!(
        form.get_many(Selection::All, None),
        json!({"name": "ada", "age": 36, "tags": ["x"]})
    );
    assert_eq!(
        form.get_many(Selection::Paths(vec![path!["name"], path!["tags"]]), None),
        json!({"name": "ada", "tags": ["x"]})
    );
}

#[test]
fn test_get_many_with_filter_sees_registered_fields_only() {
    let store = store_with(json!({"user": {"name": "ada", "age": 36}}));
    store.register_field(path!["user", "name"]);
    store.register_field(path!["user", "age"]);
    let form = ScopedForm::new(store.clone(), path!["user"]);

    form.dispatch(&path!["age"], json!(37));
    let touched_only: &FieldFilter = &|meta: &FieldMeta| meta.touched;
    assert_eq!(
        form.get_many(Selection::All, Some(touched_only)),
        json!({"age": 37})
    );
}

#[test]
fn test_get_many_selected_paths_with_filter() {
    let store = store_with(json!({"user": {"name": "ada", "age": 36, "email": "a@b"}}));
    for field in ["name", "age", "email"] {
        store.register_field(path!["user", field]);
    }
    let form = ScopedForm::new(store.clone(), path!["user"]);

    form.dispatch(&path!["age"], json!(37));
    form.dispatch(&path!["email"], json!("ada@b"));
    let touched_only: &FieldFilter = &|meta: &FieldMeta| meta.touched;
    assert_eq!(
        form.get_many(
            Selection::Paths(vec![path!["name"], path!["age"]]),
            Some(touched_only)
        ),
        json!({"age": 37})
    );
}

// ===== SET SEMANTICS =====

#[test]
fn test_set_object_merges_shallowly() {
    let store = store_with(json!({"a": {"x": 1, "y": {"deep": true}}}));
    let form = ScopedForm::new(store.clone(), path!["a"]);

    form.set(json!({"y": 2, "z": 3}));
    assert_eq!(
        value_at(&store, &path!["a"]),
        json!({"x": 1, "y": 2, "z": 3})
    );
}

#[test]
fn test_set_array_replaces_wholesale() {
    let store = store_with(json!({"a": [1, 2, 3]}));
    let form = ScopedForm::new(store.clone(), path!["a"]);

    form.set(json!([9]));
    assert_eq!(value_at(&store, &path!["a"]), json!([9]));
}

#[test]
fn test_set_scalar_replaces() {
    let store = store_with(json!({"a": {"x": 1}}));
    ScopedForm::new(store.clone(), path!["a"]).set(json!("flat"));
    assert_eq!(value_at(&store, &path!["a"]), json!("flat"));
}

#[test]
fn test_far_out_of_range_index_is_ignored() {
    let store = store_with(json!({"rows": [1, 2]}));
    let recorder = Recorder::default();
    store.subscribe(vec![path!["rows"]], SubscribeOptions::default(), recorder.callback());
    let form = ScopedForm::root(store.clone());

    form.dispatch(&path![usize::MAX], json!(1));
    form.dispatch(&path!["rows", usize::MAX], json!(1));
    form.reset(Some(&[path!["rows", usize::MAX]][..]));

    assert_eq!(store.snapshot(), json!({"rows": [1, 2]}));
    assert_eq!(recorder.len(), 0);
}

// ===== RESET =====

#[test]
fn test_reset_restores_scope_only() {
    let store = store_with(json!({"a": {"x": 1}, "b": 2}));
    store.dispatch(Dispatch::new(path!["a", "x"], json!(5)));
    store.dispatch(Dispatch::new(path!["b"], json!(6)));

    ScopedForm::new(store.clone(), path!["a"]).reset(None);
    assert_eq!(store.snapshot(), json!({"a": {"x": 1}, "b": 6}));
}

#[test]
fn test_reset_named_locals() {
    let store = store_with(json!({"a": {"x": 1, "y": 2}}));
    let form = ScopedForm::new(store.clone(), path!["a"]);
    form.set(json!({"x": 10, "y": 20}));

    form.reset(Some(&[path!["y"]][..]));
    assert_eq!(value_at(&store, &path!["a"]), json!({"x": 10, "y": 2}));
}

// ===== VALIDATION =====

fn validated_store() -> formweave::MemoryStore {
    let store = store_with(json!({"a": {"x": "", "y": "ok"}, "b": ""}));
    store.register_field_with(path!["a", "x"], required("x is required"));
    store.register_field_with(path!["a", "y"], required("y is required"));
    store.register_field_with(path!["b"], required("b is required"));
    store
}

#[test]
fn test_root_validate_delegates_to_store() {
    let store = validated_store();
    let failure = ScopedForm::root(store).validate(None).unwrap_err();

    let failed: Vec<Path> = failure.failed_paths().cloned().collect();
    assert_eq!(failed, vec![path!["a", "x"], path!["b"]]);
}

#[test]
fn test_nested_validate_covers_registered_fields_under_prefix() {
    let store = validated_store();
    let failure = ScopedForm::new(store.clone(), path!["a"])
        .validate(None)
        .unwrap_err();

    let failed: Vec<Path> = failure.failed_paths().cloned().collect();
    assert_eq!(failed, vec![path!["a", "x"]]);
    assert_eq!(
        failure.errors_for(&path!["a", "x"]),
        Some(&["x is required".to_owned()][..])
    );
    assert_eq!(failure.values, json!({"a": {"x": "", "y": "ok"}}));

    let err: Error = failure.into();
    assert!(err.is_validation_error());
    assert_eq!(err.module(), "store");
}

#[test]
fn test_nested_validate_with_explicit_locals() {
    let store = validated_store();
    let values = ScopedForm::new(store, path!["a"])
        .validate(Some(&[path!["y"]][..]))
        .unwrap();
    assert_eq!(values, json!({"a": {"y": "ok"}}));
}

#[test]
fn test_empty_locals_behave_like_none() {
    let store = validated_store();
    let form = ScopedForm::new(store, path!["a"]);
    assert_eq!(
        form.validate(Some(&[] as &[Path])).unwrap_err().fields.len(),
        form.validate(None).unwrap_err().fields.len()
    );
}

// ===== FIELD CONTEXT =====

#[test]
fn test_access_and_local_form() {
    let store = store_with(json!({"order": {"lines": [{"qty": 2}]}}));
    let context = FieldContext::new(store).access("order").access(path!["lines", 0]);

    assert_eq!(context.prefix(), &path!["order", "lines", 0]);
    assert_eq!(context.local_form().get(&path!["qty"]), json!(2));
    // Memoized per context.
    assert!(std::ptr::eq(context.local_form(), context.local_form()));
}

#[test]
fn test_form_options() {
    let store = store_with(json!({"order": {"currency": "EUR", "lines": [{"qty": 2}]}}));
    let context = FieldContext::new(store).access(path!["order", "lines", 0]);

    let parent = context.form(&ScopeOptions::default().upward(2));
    assert_eq!(parent.prefix(), &path!["order"]);
    assert_eq!(parent.get(&path!["currency"]), json!("EUR"));

    let global = context.form(&ScopeOptions::default().global().base_path("order"));
    assert_eq!(global.prefix(), &path!["order"]);

    let clamped = context.form(&ScopeOptions::default().upward(10));
    assert!(clamped.prefix().is_root());
}

#[test]
fn test_scope_options_deserialize() {
    let options: ScopeOptions =
        serde_json::from_value(json!({"base_path": ["a", 1], "upward": 1, "mode": "global"}))
            .unwrap();
    assert_eq!(
        options,
        ScopeOptions::default().base_path(path!["a", 1]).upward(1).global()
    );
}

#[test]
fn test_fields_value_reads_relative_to_scope() {
    let store = store_with(json!({"a": 1, "group": {"b": 2, "row": {"c": 3}}}));
    let context = FieldContext::new(store).access(path!["group", "row"]);

    assert_eq!(
        context.fields_value(&[path!["c"]], &ScopeOptions::default()),
        vec![json!(3)]
    );
    assert_eq!(
        context.fields_value(&[path!["b"], path!["row", "c"]], &ScopeOptions::default().upward(1)),
        vec![json!(2), json!(3)]
    );
    assert_eq!(
        context.fields_value(&[path!["a"]], &ScopeOptions::default().global()),
        vec![json!(1)]
    );
}

#[test]
fn test_watch_unsubscribes_on_drop() {
    let store = store_with(json!({"group": {"b": 1}}));
    let context = FieldContext::new(store.clone()).access("group");
    let recorder = Recorder::default();

    let subscription = context.watch(
        &[path!["b"]],
        &ScopeOptions::default(),
        SubscribeOptions::default(),
        recorder.callback(),
    );
    context.local_form().dispatch(&path!["b"], json!(2));
    assert_eq!(recorder.len(), 1);
    assert_eq!(recorder.notifications()[0].relation, Relation::Exact);
    assert_eq!(recorder.notifications()[0].path, path!["group", "b"]);

    drop(subscription);
    context.local_form().dispatch(&path!["b"], json!(3));
    assert_eq!(recorder.len(), 1);
    assert_eq!(store.subscriber_count(), 0);
}
