//! Arrays, tuples, records, maps and sets.

use scrutiny::schema::{array, boolean, map, number, object, record, set, string, tuple};
use scrutiny::{ParseError, ParseResult, Value};
use serde_json::json;

fn unwrap_failure(v: ParseResult) -> ParseError {
    v.into_result().unwrap_err()
}

#[test]
fn array_reports_every_bad_element() {
    let schema = array(number().positive());
    let error = unwrap_failure(schema.safe_parse(json!([1, -1, 2, -2, -3])));
    assert_eq!(error.len(), 3);
    let paths: Vec<String> = error.issues().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["[1]", "[3]", "[4]"]);
}

#[test]
fn array_length_and_element_issues_coexist() {
    let schema = array(string()).min(3);
    let error = unwrap_failure(schema.safe_parse(json!([1, "ok"])));
    assert_eq!(error.len(), 2);
}

#[test]
fn tuple_with_rest_round_trips() {
    let schema = tuple(vec![string().into(), number().into()]).rest(boolean());
    let out = schema.parse(json!(["x", 1, true, false])).unwrap();
    assert_eq!(
        out,
        Value::Array(vec![
            Value::String("x".to_string()),
            Value::Number(1.0),
            Value::Bool(true),
            Value::Bool(false),
        ])
    );
}

#[test]
fn tuple_arity_and_element_diagnostics_together() {
    let schema = tuple(vec![string().into(), number().into()]);
    let error = unwrap_failure(schema.safe_parse(json!([5])));
    // Too short, and position 0 is the wrong type.
    assert_eq!(error.with_code("too_small").len(), 1);
    assert_eq!(error.with_code("invalid_type").len(), 1);
}

#[test]
fn record_round_trips_and_preserves_key_order() {
    let schema = record(string(), number());
    let out = schema.parse(json!({"a": 1, "b": 2})).unwrap();

    let fields = out.as_object().unwrap();
    let keys: Vec<String> = fields.keys().cloned().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(fields["a"], Value::Number(1.0));
    assert_eq!(fields["b"], Value::Number(2.0));
}

#[test]
fn record_value_issues_reattach_under_the_key() {
    let schema = record(string(), object().field("n", number()));
    let error = unwrap_failure(schema.safe_parse(json!({
        "good": {"n": 1},
        "bad": {"n": "x"},
    })));
    assert_eq!(error.path().to_string(), "bad.n");
}

#[test]
fn record_key_constraint_failures_record_and_skip() {
    let schema = record(string().max(3), number());
    let error = unwrap_failure(schema.safe_parse(json!({
        "ok": 1,
        "toolong": 2,
    })));
    assert_eq!(error.len(), 1);
    assert_eq!(error.path().to_string(), "toolong");
}

#[test]
fn map_entries_validate_keys_and_values() {
    let schema = map(number(), string());
    let input = Value::Map(vec![
        (Value::Number(1.0), Value::String("one".to_string())),
        (Value::String("two".to_string()), Value::Number(2.0)),
    ]);

    let error = unwrap_failure(schema.safe_parse(input));
    assert_eq!(error.len(), 2);
    let paths: Vec<String> = error.issues().map(|i| i.path.to_string()).collect();
    assert!(paths.contains(&"[1].key".to_string()));
    assert!(paths.contains(&"[1].value".to_string()));
}

#[test]
fn map_preserves_entry_order() {
    let schema = map(string(), number());
    let input = Value::Map(vec![
        (Value::String("z".to_string()), Value::Number(1.0)),
        (Value::String("a".to_string()), Value::Number(2.0)),
    ]);
    assert_eq!(schema.parse(input.clone()).unwrap(), input);
}

#[test]
fn set_elements_and_size() {
    let schema = set(string()).min_size(1);
    assert!(schema.safe_parse(Value::Set(vec![])).is_failure());

    let input = Value::Set(vec![
        Value::String("a".to_string()),
        Value::Number(1.0),
    ]);
    let error = unwrap_failure(schema.safe_parse(input));
    assert_eq!(error.path().to_string(), "[1]");
}

#[test]
fn deeply_mixed_composition() {
    let schema = object().field(
        "teams",
        array(object().field("members", array(object().field("name", string())))),
    );

    let error = unwrap_failure(schema.safe_parse(json!({
        "teams": [
            {"members": [{"name": "a"}]},
            {"members": [{"name": "b"}, {"name": 3}]},
        ]
    })));
    assert_eq!(error.path().to_string(), "teams[1].members[1].name");
}
