//! Object validation: one pass surfaces every field's diagnostics, unknown
//! keys follow the configured policy, and shape derivations never mutate
//! their source.

use scrutiny::schema::{boolean, number, object, string};
use scrutiny::{IssueKind, ParseError, ParseResult, Value};
use serde_json::json;

fn unwrap_failure(v: ParseResult) -> ParseError {
    v.into_result().unwrap_err()
}

#[test]
fn two_invalid_fields_two_issues_two_paths() {
    let schema = object()
        .field("name", string())
        .field("age", number());

    let result = schema.safe_parse(json!({"name": 1, "age": "x"}));
    assert!(result.is_failure());

    let error = unwrap_failure(result);
    assert_eq!(error.len(), 2);
    let paths: Vec<String> = error.issues().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "age"]);
}

#[test]
fn k_invalid_fields_yield_k_distinct_paths() {
    let schema = object()
        .field("a", number())
        .field("b", number())
        .field("c", number())
        .field("d", number());

    let error = unwrap_failure(schema.safe_parse(json!({
        "a": "x", "b": "x", "c": "x", "d": "x"
    })));

    let mut paths: Vec<String> = error.issues().map(|i| i.path.to_string()).collect();
    paths.dedup();
    assert_eq!(paths.len(), 4);
}

#[test]
fn valid_and_invalid_fields_mix() {
    let schema = object()
        .field("ok", string())
        .field("bad", number())
        .field("missing", boolean());

    let error = unwrap_failure(schema.safe_parse(json!({"ok": "fine", "bad": "nope"})));
    assert_eq!(error.len(), 2);
    assert_eq!(error.with_code("invalid_type").len(), 1);
    assert_eq!(error.with_code("required").len(), 1);
}

#[test]
fn object_level_refinement_runs_after_fields() {
    let schema = object()
        .field("min", number())
        .field("max", number())
        .refine(
            |v| {
                let fields = v.as_object().unwrap();
                fields["min"].as_number() <= fields["max"].as_number()
            },
            "min must not exceed max",
        );

    assert!(schema.safe_parse(json!({"min": 1, "max": 2})).is_success());

    let error = unwrap_failure(schema.safe_parse(json!({"min": 3, "max": 2})));
    assert_eq!(error.first().message, "min must not exceed max");
}

#[test]
fn cross_field_super_refine_points_at_a_sibling() {
    let schema = object()
        .field("quantity", number().positive())
        .field("unit_price", number().nonnegative())
        .field("total", number().nonnegative())
        .super_refine(|v, ctx| {
            let fields = v.as_object().unwrap();
            let qty = fields["quantity"].as_number().unwrap_or(0.0);
            let price = fields["unit_price"].as_number().unwrap_or(0.0);
            let total = fields["total"].as_number().unwrap_or(0.0);
            if qty * price != total {
                ctx.add_issue(
                    scrutiny::IssueData::custom("total must equal quantity * unit_price")
                        .at(scrutiny::PathSegment::key("total")),
                );
            }
        });

    assert!(schema
        .safe_parse(json!({"quantity": 5, "unit_price": 10, "total": 50}))
        .is_success());

    let error = unwrap_failure(schema.safe_parse(json!({
        "quantity": 5, "unit_price": 10, "total": 30
    })));
    assert_eq!(error.path().to_string(), "total");
}

#[test]
fn strict_lists_every_unknown_key_once() {
    let schema = object().field("id", string()).strict();
    let error = unwrap_failure(schema.safe_parse(json!({
        "id": "a", "one": 1, "two": 2, "three": 3
    })));

    assert_eq!(error.len(), 1);
    match &error.first().kind {
        IssueKind::UnrecognizedKeys { keys } => assert_eq!(keys.len(), 3),
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn passthrough_and_strip_policies() {
    let input = json!({"id": "a", "extra": true});

    let stripped = object().field("id", string()).parse(input.clone()).unwrap();
    assert!(stripped.as_object().unwrap().get("extra").is_none());

    let passed = object()
        .field("id", string())
        .passthrough()
        .parse(input)
        .unwrap();
    assert_eq!(passed.as_object().unwrap()["extra"], Value::Bool(true));
}

#[test]
fn catchall_overrides_the_unknown_key_policy() {
    let schema = object().field("id", string()).strict().catchall(number());

    // Strict would reject, but the catchall validates instead.
    assert!(schema.safe_parse(json!({"id": "a", "n": 4})).is_success());
    assert!(schema.safe_parse(json!({"id": "a", "n": "x"})).is_failure());
}

#[test]
fn derivations_compose() {
    let base = object()
        .field("id", string())
        .field("name", string())
        .field("age", number());

    let patch = base.pick(&["name", "age"]).partial();
    assert!(patch.safe_parse(json!({})).is_success());
    assert!(patch.safe_parse(json!({"age": 30})).is_success());
    assert!(patch.safe_parse(json!({"id": "x"})).is_success()); // stripped

    // The base schema still requires everything.
    assert!(base.safe_parse(json!({"name": "a", "age": 1})).is_failure());
}

#[test]
fn default_fields_appear_in_output() {
    let schema = object()
        .field("name", string())
        .field("role", string().default_value("user"));

    let out = schema.parse(json!({"name": "Ada"})).unwrap();
    let fields = out.as_object().unwrap();
    assert_eq!(fields["role"], Value::String("user".to_string()));

    let out = schema.parse(json!({"name": "Ada", "role": "admin"})).unwrap();
    assert_eq!(out.as_object().unwrap()["role"], Value::String("admin".to_string()));
}

#[test]
fn unicode_field_names() {
    let schema = object()
        .field("名前", string())
        .field("年齢", number());

    assert!(schema.safe_parse(json!({"名前": "太郎", "年齢": 25})).is_success());

    let error = unwrap_failure(schema.safe_parse(json!({})));
    assert_eq!(error.len(), 2);
}
