//! Array and tuple validation.

use rayon::prelude::*;

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, SizeSubject};
use crate::path::PathSegment;
use crate::schema::{AnySchema, Schema, SchemaKind, SchemaNode};
use crate::value::Value;

#[derive(Clone)]
enum ArrayConstraint {
    Min {
        min: usize,
        message: Option<String>,
    },
    Max {
        max: usize,
        message: Option<String>,
    },
    Length {
        len: usize,
        message: Option<String>,
    },
}

/// The array kind: whole-collection length constraints checked first, then
/// every element validated through an index-keyed child context.
#[derive(Clone)]
pub struct ArrayKind {
    element: AnySchema,
    constraints: Vec<ArrayConstraint>,
    type_error_message: Option<String>,
}

impl ArrayKind {
    pub(crate) fn new(element: AnySchema) -> Self {
        Self {
            element,
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    fn check_length(&self, len: usize, ctx: &ParseContext) -> bool {
        let mut ok = true;
        for constraint in &self.constraints {
            match constraint {
                ArrayConstraint::Min { min, message } if len < *min => {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooSmall {
                            subject: SizeSubject::Array,
                            minimum: *min as f64,
                            inclusive: true,
                        })
                        .with_expected(format!("at least {} item(s)", min))
                        .with_received(format!("{} item(s)", len))
                        .with_message_opt(message.clone()),
                    );
                    ok = false;
                }
                ArrayConstraint::Max { max, message } if len > *max => {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooBig {
                            subject: SizeSubject::Array,
                            maximum: *max as f64,
                            inclusive: true,
                        })
                        .with_expected(format!("at most {} item(s)", max))
                        .with_received(format!("{} item(s)", len))
                        .with_message_opt(message.clone()),
                    );
                    ok = false;
                }
                ArrayConstraint::Length { len: want, message } if len != *want => {
                    let kind = if len < *want {
                        IssueKind::TooSmall {
                            subject: SizeSubject::Array,
                            minimum: *want as f64,
                            inclusive: true,
                        }
                    } else {
                        IssueKind::TooBig {
                            subject: SizeSubject::Array,
                            maximum: *want as f64,
                            inclusive: true,
                        }
                    };
                    ctx.add_issue(
                        IssueData::new(kind)
                            .with_expected(format!("exactly {} item(s)", want))
                            .with_received(format!("{} item(s)", len))
                            .with_message_opt(message.clone()),
                    );
                    ok = false;
                }
                _ => {}
            }
        }
        ok
    }
}

impl SchemaKind for ArrayKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                ctx.add_issue(
                    IssueData::invalid_type("array", other)
                        .with_message_opt(self.type_error_message.clone()),
                );
                return None;
            }
        };

        // Length constraints apply to the collection regardless of whether
        // the elements themselves are valid.
        let mut failed = !self.check_length(items.len(), ctx);

        let outcomes: Vec<Option<Value>> = if ctx.parallel() {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| {
                    self.element
                        .parse_value(item, &ctx.child(PathSegment::index(i)))
                })
                .collect()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.element
                        .parse_value(item, &ctx.child(PathSegment::index(i)))
                })
                .collect()
        };

        let mut out = Vec::with_capacity(items.len());
        for outcome in outcomes {
            match outcome {
                Some(item) => out.push(item),
                None => failed = true,
            }
        }

        if failed {
            None
        } else {
            Some(Value::Array(out))
        }
    }

    fn type_name(&self) -> &'static str {
        "array"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.element.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        let mut doc = serde_json::Map::new();
        doc.insert("type".to_string(), "array".into());
        doc.insert("items".to_string(), self.element.to_json_schema());
        for constraint in &self.constraints {
            match constraint {
                ArrayConstraint::Min { min, .. } => {
                    doc.insert("minItems".to_string(), (*min).into());
                }
                ArrayConstraint::Max { max, .. } => {
                    doc.insert("maxItems".to_string(), (*max).into());
                }
                ArrayConstraint::Length { len, .. } => {
                    doc.insert("minItems".to_string(), (*len).into());
                    doc.insert("maxItems".to_string(), (*len).into());
                }
            }
        }
        serde_json::Value::Object(doc)
    }
}

impl Schema<ArrayKind> {
    /// Requires at least `min` items.
    pub fn min(mut self, min: usize) -> Self {
        self.kind
            .constraints
            .push(ArrayConstraint::Min { min, message: None });
        self
    }

    /// Requires at most `max` items.
    pub fn max(mut self, max: usize) -> Self {
        self.kind
            .constraints
            .push(ArrayConstraint::Max { max, message: None });
        self
    }

    /// Requires exactly `len` items.
    pub fn length(mut self, len: usize) -> Self {
        self.kind
            .constraints
            .push(ArrayConstraint::Length { len, message: None });
        self
    }

    /// Requires at least one item.
    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    /// Sets a custom message for the most recent length constraint, or for
    /// the type mismatch when none exists.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.kind.constraints.last_mut() {
            Some(ArrayConstraint::Min { message: m, .. })
            | Some(ArrayConstraint::Max { message: m, .. })
            | Some(ArrayConstraint::Length { message: m, .. }) => *m = Some(message),
            None => self.kind.type_error_message = Some(message),
        }
        self
    }
}

/// The tuple kind: fixed positions validated against distinct schemas,
/// with an optional rest schema for the tail.
#[derive(Clone)]
pub struct TupleKind {
    items: Vec<AnySchema>,
    rest: Option<AnySchema>,
}

impl TupleKind {
    pub(crate) fn new(items: Vec<AnySchema>) -> Self {
        Self { items, rest: None }
    }

    fn schema_for(&self, index: usize) -> Option<&AnySchema> {
        self.items.get(index).or(self.rest.as_ref())
    }
}

impl SchemaKind for TupleKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                ctx.add_issue(IssueData::invalid_type("tuple", other));
                return None;
            }
        };

        let mut failed = false;
        if items.len() < self.items.len() {
            ctx.add_issue(
                IssueData::new(IssueKind::TooSmall {
                    subject: SizeSubject::Array,
                    minimum: self.items.len() as f64,
                    inclusive: true,
                })
                .with_expected(format!("at least {} element(s)", self.items.len()))
                .with_received(format!("{} element(s)", items.len())),
            );
            failed = true;
        }
        if items.len() > self.items.len() && self.rest.is_none() {
            ctx.add_issue(
                IssueData::new(IssueKind::TooBig {
                    subject: SizeSubject::Array,
                    maximum: self.items.len() as f64,
                    inclusive: true,
                })
                .with_expected(format!("at most {} element(s)", self.items.len()))
                .with_received(format!("{} element(s)", items.len())),
            );
            failed = true;
        }

        // Positions with a schema are validated even when the arity is
        // already known to be wrong, for diagnostic completeness.
        let outcomes: Vec<Option<Option<Value>>> = if ctx.parallel() {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| {
                    self.schema_for(i).map(|schema| {
                        schema.parse_value(item, &ctx.child(PathSegment::index(i)))
                    })
                })
                .collect()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.schema_for(i).map(|schema| {
                        schema.parse_value(item, &ctx.child(PathSegment::index(i)))
                    })
                })
                .collect()
        };

        let mut out = Vec::with_capacity(items.len());
        for outcome in outcomes {
            match outcome {
                Some(Some(item)) => out.push(item),
                Some(None) => failed = true,
                None => {}
            }
        }

        if failed {
            None
        } else {
            Some(Value::Array(out))
        }
    }

    fn type_name(&self) -> &'static str {
        "tuple"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for schema in &self.items {
            schema.collect_refs(refs);
        }
        if let Some(rest) = &self.rest {
            rest.collect_refs(refs);
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        let prefix: Vec<serde_json::Value> =
            self.items.iter().map(|s| s.to_json_schema()).collect();
        let mut doc = serde_json::Map::new();
        doc.insert("type".to_string(), "array".into());
        doc.insert(
            "prefixItems".to_string(),
            serde_json::Value::Array(prefix),
        );
        match &self.rest {
            Some(rest) => {
                doc.insert("items".to_string(), rest.to_json_schema());
            }
            None => {
                doc.insert("items".to_string(), false.into());
            }
        }
        serde_json::Value::Object(doc)
    }
}

impl Schema<TupleKind> {
    /// Validates elements beyond the fixed positions against `schema`.
    pub fn rest(mut self, schema: impl Into<AnySchema>) -> Self {
        self.kind.rest = Some(schema.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{array, boolean, number, object, string, tuple};
    use serde_json::json;

    fn failure(
        v: stillwater::Validation<Value, crate::ParseError>,
    ) -> crate::ParseError {
        v.into_result().unwrap_err()
    }

    #[test]
    fn validates_every_element() {
        let schema = array(number().positive());
        assert!(schema.safe_parse(json!([1, 2, 3])).is_success());

        let error = failure(schema.safe_parse(json!([1, -2, 3, -4])));
        assert_eq!(error.len(), 2);
        let paths: Vec<String> = error.issues().map(|i| i.path.to_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn rejects_non_arrays() {
        let error = failure(array(string()).safe_parse(json!("no")));
        assert_eq!(error.code(), "invalid_type");
        assert_eq!(error.received(), Some("string"));
    }

    #[test]
    fn length_constraints_are_independent_of_element_validity() {
        let schema = array(number().positive()).min(3);
        let error = failure(schema.safe_parse(json!([-1, -2])));
        // One too_small for the collection plus one per bad element.
        assert_eq!(error.len(), 3);
        assert_eq!(error.with_code("too_small").len(), 3);
        assert_eq!(error.at_path(&crate::Path::root()).len(), 1);
    }

    #[test]
    fn nonempty_and_exact_length() {
        assert!(array(string()).nonempty().safe_parse(json!([])).is_failure());
        assert!(array(string()).length(2).safe_parse(json!(["a", "b"])).is_success());
        assert!(array(string()).length(2).safe_parse(json!(["a"])).is_failure());
    }

    #[test]
    fn nested_array_paths() {
        let schema = array(object().field("n", number()));
        let error = failure(schema.safe_parse(json!([{"n": 1}, {"n": "x"}])));
        assert_eq!(error.path().to_string(), "[1].n");
    }

    #[test]
    fn empty_array_is_fine_without_constraints() {
        let out = array(string()).parse(json!([])).unwrap();
        assert_eq!(out, Value::Array(vec![]));
    }

    #[test]
    fn tuple_validates_by_position() {
        let schema = tuple(vec![string().into(), number().into()]);
        assert!(schema.safe_parse(json!(["x", 1])).is_success());

        let error = failure(schema.safe_parse(json!([1, "x"])));
        assert_eq!(error.len(), 2);
    }

    #[test]
    fn tuple_arity_too_small_still_checks_elements() {
        let schema = tuple(vec![string().into(), number().into(), boolean().into()]);
        let error = failure(schema.safe_parse(json!([42])));
        // Arity issue plus the element at position 0.
        assert_eq!(error.with_code("too_small").len(), 1);
        assert_eq!(error.with_code("invalid_type").len(), 1);
    }

    #[test]
    fn tuple_without_rest_rejects_extras() {
        let schema = tuple(vec![string().into()]);
        let error = failure(schema.safe_parse(json!(["a", "b"])));
        assert_eq!(error.with_code("too_big").len(), 1);
    }

    #[test]
    fn tuple_rest_validates_the_tail() {
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

        let error = failure(schema.safe_parse(json!(["x", 1, true, "no"])));
        assert_eq!(error.path().to_string(), "[3]");
    }
}
