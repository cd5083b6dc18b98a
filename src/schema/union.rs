//! Union, discriminated union and intersection validation.

use std::collections::HashMap;

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, ParseError};
use crate::schema::{AnySchema, ObjectKind, Schema, SchemaKind, SchemaNode};
use crate::value::Value;

/// Construction-time failures for composed schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaBuildError {
    /// A variant's shape does not declare the discriminator field.
    #[error("variant {index} does not declare discriminator field '{key}'")]
    MissingDiscriminator { key: String, index: usize },

    /// A variant declares the discriminator field, but not as a literal.
    #[error("variant {index} declares discriminator field '{key}' but not as a literal")]
    NonLiteralDiscriminator { key: String, index: usize },

    /// Two variants share the same discriminator value.
    #[error("duplicate discriminator value {value} shared by variants {first} and {second}")]
    DuplicateDiscriminator {
        value: String,
        first: usize,
        second: usize,
    },

    /// The discriminator literal cannot serve as an index key.
    #[error("variant {index}'s discriminator literal cannot be indexed")]
    UnsupportedDiscriminator { index: usize },
}

/// The union kind: options tried in declaration order, first success wins.
///
/// Declaration order matters for overlapping options: a permissive option
/// placed before a narrower one always wins.
#[derive(Clone)]
pub struct UnionKind {
    options: Vec<AnySchema>,
}

impl UnionKind {
    pub(crate) fn new(options: Vec<AnySchema>) -> Self {
        Self { options }
    }
}

impl SchemaKind for UnionKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let mut union_errors = Vec::with_capacity(self.options.len());
        for option in &self.options {
            // Trial parse against an isolated sink so a failed option
            // leaves no residue in the real diagnostics.
            let trial = ctx.speculative();
            if let Some(out) = option.parse_value(value, &trial) {
                return Some(out);
            }
            union_errors.push(ParseError::from_vec(trial.drain_issues()));
        }

        ctx.add_issue(
            IssueData::new(IssueKind::InvalidUnion { union_errors })
                .with_received(value.to_compact_string()),
        );
        None
    }

    fn type_name(&self) -> &'static str {
        "union"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for option in &self.options {
            option.collect_refs(refs);
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        let options: Vec<serde_json::Value> =
            self.options.iter().map(|o| o.to_json_schema()).collect();
        serde_json::json!({ "anyOf": options })
    }
}

fn canonical_key(literal: &Value) -> Option<String> {
    let json = literal.to_json()?;
    serde_json::to_string(&json).ok()
}

/// The discriminated-union kind.
///
/// The literal-value-to-variant index is built once at construction, so
/// dispatch at parse time is a single lookup rather than trial parsing.
#[derive(Clone)]
pub struct DiscriminatedUnionKind {
    key: String,
    variants: Vec<(Value, AnySchema)>,
    index: HashMap<String, usize>,
}

impl DiscriminatedUnionKind {
    pub(crate) fn new(
        key: String,
        variants: Vec<Schema<ObjectKind>>,
    ) -> Result<Self, SchemaBuildError> {
        let mut stored = Vec::with_capacity(variants.len());
        let mut index = HashMap::with_capacity(variants.len());

        for (i, variant) in variants.into_iter().enumerate() {
            let field = variant.kind.shape.get(&key).ok_or_else(|| {
                SchemaBuildError::MissingDiscriminator {
                    key: key.clone(),
                    index: i,
                }
            })?;
            let literal = field
                .literal_value()
                .ok_or_else(|| SchemaBuildError::NonLiteralDiscriminator {
                    key: key.clone(),
                    index: i,
                })?
                .clone();
            let canonical = canonical_key(&literal)
                .ok_or(SchemaBuildError::UnsupportedDiscriminator { index: i })?;

            if let Some(&first) = index.get(&canonical) {
                return Err(SchemaBuildError::DuplicateDiscriminator {
                    value: canonical,
                    first,
                    second: i,
                });
            }
            index.insert(canonical, i);
            stored.push((literal, AnySchema::from(variant)));
        }

        Ok(Self {
            key,
            variants: stored,
            index,
        })
    }

    fn option_names(&self) -> Vec<String> {
        self.variants
            .iter()
            .map(|(literal, _)| literal.to_compact_string())
            .collect()
    }
}

impl SchemaKind for DiscriminatedUnionKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                ctx.add_issue(IssueData::invalid_type("object", other));
                return None;
            }
        };

        let matched = fields
            .get(&self.key)
            .and_then(canonical_key)
            .and_then(|canonical| self.index.get(&canonical));

        match matched {
            Some(&i) => self.variants[i].1.parse_value(value, ctx),
            None => {
                ctx.add_issue(
                    IssueData::new(IssueKind::InvalidUnionDiscriminator {
                        options: self.option_names(),
                    })
                    .with_received(
                        fields
                            .get(&self.key)
                            .map(Value::to_compact_string)
                            .unwrap_or_else(|| "undefined".to_string()),
                    ),
                );
                None
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "discriminated_union"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for (_, variant) in &self.variants {
            variant.collect_refs(refs);
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        let options: Vec<serde_json::Value> = self
            .variants
            .iter()
            .map(|(_, v)| v.to_json_schema())
            .collect();
        serde_json::json!({ "oneOf": options })
    }
}

/// The intersection kind: both sides always run and both contribute
/// diagnostics; results merge only when neither side raised.
#[derive(Clone)]
pub struct IntersectionKind {
    left: AnySchema,
    right: AnySchema,
}

impl IntersectionKind {
    pub(crate) fn new(left: AnySchema, right: AnySchema) -> Self {
        Self { left, right }
    }
}

/// Shallow merge: object results combine key-by-key with the right side
/// winning on collision; any other pairing resolves to the right result.
fn merge(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut out = l;
            for (key, value) in r {
                out.insert(key, value);
            }
            Value::Object(out)
        }
        (_, right) => right,
    }
}

impl SchemaKind for IntersectionKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let (left_out, right_out) = if ctx.parallel() {
            rayon::join(
                || self.left.parse_value(value, ctx),
                || self.right.parse_value(value, ctx),
            )
        } else {
            (
                self.left.parse_value(value, ctx),
                self.right.parse_value(value, ctx),
            )
        };

        match (left_out, right_out) {
            (Some(l), Some(r)) => Some(merge(l, r)),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        "intersection"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.left.collect_refs(refs);
        self.right.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "allOf": [self.left.to_json_schema(), self.right.to_json_schema()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        boolean, discriminated_union, intersection, literal, number, object, string, union,
    };
    use serde_json::json;

    fn failure(
        v: stillwater::Validation<Value, crate::ParseError>,
    ) -> crate::ParseError {
        v.into_result().unwrap_err()
    }

    #[test]
    fn union_first_success_wins() {
        let schema = union(vec![string().into(), number().into()]);
        assert!(schema.safe_parse(json!("x")).is_success());
        assert!(schema.safe_parse(json!(3)).is_success());
    }

    #[test]
    fn union_order_matters_for_overlapping_options() {
        // The permissive string option shadows the literal.
        let schema = union(vec![string().into(), literal("x").into()]);
        assert_eq!(
            schema.parse(json!("anything")).unwrap(),
            Value::String("anything".to_string())
        );

        let flipped = union(vec![literal("x").into(), string().into()]);
        assert!(flipped.safe_parse(json!("anything")).is_success());
    }

    #[test]
    fn union_failure_carries_every_options_errors() {
        let schema = union(vec![string().into(), number().into()]);
        let error = failure(schema.safe_parse(json!(true)));

        assert_eq!(error.len(), 1);
        assert_eq!(error.code(), "invalid_union");
        match &error.first().kind {
            IssueKind::InvalidUnion { union_errors } => {
                assert_eq!(union_errors.len(), 2);
                assert_eq!(union_errors[0].code(), "invalid_type");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn failed_options_leave_no_residue_on_success() {
        // First option fails, second succeeds; the parse must be clean.
        let schema = union(vec![number().into(), string().into()]);
        let result = schema.safe_parse(json!("ok"));
        assert!(result.is_success());
    }

    fn shapes() -> (Schema<ObjectKind>, Schema<ObjectKind>) {
        let circle = object()
            .field("kind", literal("circle"))
            .field("radius", number().positive());
        let square = object()
            .field("kind", literal("square"))
            .field("side", number().positive());
        (circle, square)
    }

    #[test]
    fn discriminator_dispatches_to_the_matching_variant() {
        let (circle, square) = shapes();
        let schema = discriminated_union("kind", vec![circle.clone(), square]).unwrap();

        let input = json!({"kind": "circle", "radius": 2});
        assert_eq!(
            schema.parse(input.clone()).unwrap(),
            circle.parse(input).unwrap()
        );
    }

    #[test]
    fn unmatched_discriminator_reports_regardless_of_other_fields() {
        let (circle, square) = shapes();
        let schema = discriminated_union("kind", vec![circle, square]).unwrap();

        let error = failure(schema.safe_parse(json!({"kind": "triangle", "radius": 2})));
        assert_eq!(error.code(), "invalid_union_discriminator");

        let error = failure(schema.safe_parse(json!({"radius": 2})));
        assert_eq!(error.code(), "invalid_union_discriminator");
    }

    #[test]
    fn matched_variant_reports_its_own_field_errors() {
        let (circle, square) = shapes();
        let schema = discriminated_union("kind", vec![circle, square]).unwrap();

        let error = failure(schema.safe_parse(json!({"kind": "circle", "radius": -1})));
        assert_eq!(error.path().to_string(), "radius");
    }

    #[test]
    fn discriminated_union_requires_an_object() {
        let (circle, square) = shapes();
        let schema = discriminated_union("kind", vec![circle, square]).unwrap();
        let error = failure(schema.safe_parse(json!("circle")));
        assert_eq!(error.code(), "invalid_type");
    }

    #[test]
    fn missing_discriminator_is_a_build_error() {
        let bad = object().field("radius", number());
        let result = discriminated_union("kind", vec![bad]);
        assert!(matches!(
            result,
            Err(SchemaBuildError::MissingDiscriminator { .. })
        ));
    }

    #[test]
    fn non_literal_discriminator_is_a_build_error() {
        let bad = object().field("kind", string());
        let result = discriminated_union("kind", vec![bad]);
        assert!(matches!(
            result,
            Err(SchemaBuildError::NonLiteralDiscriminator { .. })
        ));
    }

    #[test]
    fn duplicate_discriminator_is_a_build_error() {
        let a = object().field("kind", literal("same"));
        let b = object().field("kind", literal("same"));
        let result = discriminated_union("kind", vec![a, b]);
        assert!(matches!(
            result,
            Err(SchemaBuildError::DuplicateDiscriminator { .. })
        ));
    }

    #[test]
    fn numeric_discriminators_dispatch() {
        let v1 = object().field("v", literal(1)).field("a", string());
        let v2 = object().field("v", literal(2)).field("b", string());
        let schema = discriminated_union("v", vec![v1, v2]).unwrap();

        assert!(schema.safe_parse(json!({"v": 2, "b": "x"})).is_success());
        assert!(schema.safe_parse(json!({"v": 3})).is_failure());
    }

    #[test]
    fn intersection_merges_objects_shallowly_right_wins() {
        let left = object().field("a", number()).passthrough();
        let right = object().field("b", string()).passthrough();
        let schema = intersection(left, right);

        let out = schema.parse(json!({"a": 1, "b": "x"})).unwrap();
        let fields = out.as_object().unwrap();
        assert_eq!(fields["a"], Value::Number(1.0));
        assert_eq!(fields["b"], Value::String("x".to_string()));
    }

    #[test]
    fn intersection_right_result_wins_for_non_objects() {
        let schema = intersection(number(), number().transform(|v| match v {
            Value::Number(n) => Value::Number(n * 2.0),
            other => other,
        }));
        assert_eq!(schema.parse(json!(4)).unwrap(), Value::Number(8.0));
    }

    #[test]
    fn intersection_reports_both_sides_failures() {
        let left = object().field("a", number());
        let right = object().field("b", string());
        let schema = intersection(left, right);

        let error = failure(schema.safe_parse(json!({})));
        assert_eq!(error.with_code("required").len(), 2);
    }

    #[test]
    fn intersection_with_boolean_sides() {
        let schema = intersection(boolean(), boolean());
        assert!(schema.safe_parse(json!(true)).is_success());
        let error = failure(schema.safe_parse(json!("x")));
        // Both sides ran and both reported.
        assert_eq!(error.len(), 2);
    }
}
