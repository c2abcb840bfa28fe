//! Path arithmetic tests

use formweave::{
    Error,
    path::{Path, Seg, concat, is_prefix_of, look_upward},
    path,
};

#[test]
fn test_look_upward_inverts_concat() {
    let prefixes = [path![], path!["a"], path!["a", 0, "b"]];
    let suffixes = [path![], path![3], path!["x", "y", 7]];

    for p in &prefixes {
        for q in &suffixes {
            let joined = concat(p, q);
            assert_eq!(joined.len(), p.len() + q.len());
            assert_eq!(&look_upward(&joined, q.len()), p, "p={p} q={q}");
        }
    }
}

#[test]
fn test_look_upward_clamps_at_root() {
    assert_eq!(look_upward(&path!["a", "b"], 5), Path::root());
}

#[test]
fn test_checked_upward_reports_invalid_argument() {
    let err = path!["a"].checked_upward(2).unwrap_err();
    assert!(err.is_invalid_argument());

    let err: Error = err.into();
    assert_eq!(err.module(), "path");
    assert!(err.is_invalid_argument());
}

#[test]
fn test_prefix_relation() {
    assert!(is_prefix_of(&path![], &path!["a"]));
    assert!(is_prefix_of(&path!["a", 1], &path!["a", 1, "b"]));
    assert!(!is_prefix_of(&path!["a", 1], &path!["a", 2, "b"]));
    assert!(!is_prefix_of(&path!["a", "b"], &path!["a"]));
    // A key never matches an index, even with the same spelling.
    assert!(!is_prefix_of(&path!["0"], &path![0]));
}

#[test]
fn test_strip_prefix_reroots() {
    let full = path!["user", "tags", 2];
    assert_eq!(full.strip_prefix(&path!["user"]), Some(path!["tags", 2]));
    assert_eq!(full.strip_prefix(&path!["other"]), None);
}

#[test]
fn test_display_and_serde() {
    let path = path!["user", "addresses", 2, "city"];
    assert_eq!(path.to_string(), "user.addresses[2].city");

    let json = serde_json::to_value(&path).unwrap();
    assert_eq!(json, serde_json::json!(["user", "addresses", 2, "city"]));
    let back: Path = serde_json::from_value(json).unwrap();
    assert_eq!(back, path);
    assert_eq!(back.last(), Some(&Seg::Key("city".into())));
}
