//! Every issue's path must equal the exact access chain from the parse
//! root to the failing node, through arbitrary composition depth.

use scrutiny::schema::{array, number, object, string, tuple, union};
use scrutiny::{ParseError, ParseResult};
use serde_json::json;

fn unwrap_failure(v: ParseResult) -> ParseError {
    v.into_result().unwrap_err()
}

#[test]
fn array_of_objects_tracks_index_then_fields() {
    let schema = array(
        object().field("user", object().field("age", number().nonnegative())),
    );

    let error = unwrap_failure(schema.safe_parse(json!([
        {"user": {"age": 1}},
        {"user": {"age": 2}},
        {"user": {"age": -1}},
    ])));

    assert_eq!(error.len(), 1);
    assert_eq!(error.path().to_string(), "[2].user.age");
    assert_eq!(error.first().path.dotted(), "2.user.age");
}

#[test]
fn path_segments_match_in_order() {
    let schema = object().field("users", array(object().field("email", string().email())));

    let error = unwrap_failure(schema.safe_parse(json!({
        "users": [
            {"email": "ok@example.com"},
            {"email": "broken"},
        ]
    })));

    let segments: Vec<String> = error
        .first()
        .path
        .segments()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(segments, vec!["users", "1", "email"]);
}

#[test]
fn tuple_positions_are_indexed() {
    let schema = tuple(vec![string().into(), number().into()]);
    let error = unwrap_failure(schema.safe_parse(json!(["ok", "not a number"])));
    assert_eq!(error.path().to_string(), "[1]");
}

#[test]
fn union_failure_reports_at_the_union_position() {
    let schema = object().field("id", union(vec![string().into(), number().into()]));
    let error = unwrap_failure(schema.safe_parse(json!({"id": true})));
    assert_eq!(error.path().to_string(), "id");
}

#[test]
fn sibling_failures_have_distinct_exact_paths() {
    let schema = object()
        .field("a", object().field("x", number()))
        .field("b", object().field("x", number()));

    let error = unwrap_failure(schema.safe_parse(json!({
        "a": {"x": "bad"},
        "b": {"x": "bad"},
    })));

    let paths: Vec<String> = error.issues().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["a.x", "b.x"]);
}

#[test]
fn root_failures_have_the_empty_path() {
    let error = unwrap_failure(string().safe_parse(json!(42)));
    assert!(error.path().is_root());
}
