//! Object validation: shaped fields, unknown-key policies and the fluent
//! shape derivations.

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::context::{IssueData, ParseContext};
use crate::error::IssueKind;
use crate::path::PathSegment;
use crate::schema::{AnySchema, EnumKind, Schema, SchemaKind, SchemaNode};
use crate::value::Value;

/// How keys outside the declared shape are handled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UnknownKeys {
    /// Reject the object with one issue listing every unknown key.
    Strict,
    /// Drop unknown keys from the output.
    #[default]
    Strip,
    /// Copy unknown keys into the output verbatim.
    Passthrough,
}

/// Adapter kind that forwards to an erased schema.
///
/// Used by shape derivations to re-layer optionality onto fields whose
/// concrete kind is no longer visible.
#[derive(Clone)]
pub(crate) struct DelegateKind {
    inner: AnySchema,
}

impl SchemaKind for DelegateKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        self.inner.parse_value(value, ctx)
    }

    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }

    fn literal_value(&self) -> Option<&Value> {
        self.inner.literal_value()
    }

    fn json_schema(&self) -> serde_json::Value {
        self.inner.to_json_schema()
    }

    fn deep_partial(&self) -> Option<Self> {
        self.inner
            .deep_partial_node()
            .map(|inner| DelegateKind { inner })
    }
}

pub(crate) fn wrap_optional(inner: AnySchema) -> AnySchema {
    Schema::of(DelegateKind { inner }).optional().into()
}

fn wrap_required(inner: AnySchema) -> AnySchema {
    Schema::of(DelegateKind { inner }).into()
}

/// The outcome of validating a single declared field.
///
/// Outer `None` marks failure; inner `None` marks "leave out of the
/// output" (an absent optional field without a default).
type FieldOutcome = Option<Option<Value>>;

/// The object kind: an ordered shape plus an unknown-keys policy.
#[derive(Clone)]
pub struct ObjectKind {
    pub(crate) shape: IndexMap<String, AnySchema>,
    unknown_keys: UnknownKeys,
    catchall: Option<AnySchema>,
    type_error_message: Option<String>,
}

impl ObjectKind {
    pub(crate) fn new() -> Self {
        Self {
            shape: IndexMap::new(),
            unknown_keys: UnknownKeys::default(),
            catchall: None,
            type_error_message: None,
        }
    }

    fn validate_field(
        &self,
        name: &str,
        schema: &AnySchema,
        input: &IndexMap<String, Value>,
        ctx: &ParseContext,
    ) -> FieldOutcome {
        let field_ctx = ctx.child(PathSegment::key(name));
        match input.get(name) {
            Some(value) => schema.parse_value(value, &field_ctx).map(Some),
            None => {
                if schema.is_optional() {
                    match schema.parse_value(&Value::Undefined, &field_ctx)? {
                        Value::Undefined => Some(None),
                        resolved => Some(Some(resolved)),
                    }
                } else {
                    field_ctx.add_issue(
                        IssueData::new(IssueKind::Required)
                            .with_message(format!("required field '{}' is missing", name)),
                    );
                    None
                }
            }
        }
    }
}

impl SchemaKind for ObjectKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let input = match value {
            Value::Object(fields) => fields,
            other => {
                ctx.add_issue(
                    IssueData::invalid_type("object", other)
                        .with_message_opt(self.type_error_message.clone()),
                );
                return None;
            }
        };

        let entries: Vec<(&String, &AnySchema)> = self.shape.iter().collect();
        let outcomes: Vec<FieldOutcome> = if ctx.parallel() {
            entries
                .par_iter()
                .map(|(name, schema)| self.validate_field(name, schema, input, ctx))
                .collect()
        } else {
            entries
                .iter()
                .map(|(name, schema)| self.validate_field(name, schema, input, ctx))
                .collect()
        };

        let mut failed = false;
        let mut out: IndexMap<String, Value> = IndexMap::new();
        for ((name, _), outcome) in entries.iter().zip(outcomes) {
            match outcome {
                Some(Some(value)) => {
                    out.insert((*name).clone(), value);
                }
                Some(None) => {}
                None => failed = true,
            }
        }

        let unknown: Vec<(&String, &Value)> = input
            .iter()
            .filter(|(key, _)| !self.shape.contains_key(*key))
            .collect();

        if let Some(catchall) = &self.catchall {
            let validated: Vec<Option<Value>> = if ctx.parallel() {
                unknown
                    .par_iter()
                    .map(|(key, value)| {
                        catchall.parse_value(value, &ctx.child(PathSegment::key(*key)))
                    })
                    .collect()
            } else {
                unknown
                    .iter()
                    .map(|(key, value)| {
                        catchall.parse_value(value, &ctx.child(PathSegment::key(*key)))
                    })
                    .collect()
            };
            for ((key, _), outcome) in unknown.iter().zip(validated) {
                match outcome {
                    Some(value) => {
                        out.insert((*key).clone(), value);
                    }
                    None => failed = true,
                }
            }
        } else {
            match self.unknown_keys {
                UnknownKeys::Strict => {
                    if !unknown.is_empty() {
                        let keys: Vec<String> =
                            unknown.iter().map(|(key, _)| (*key).clone()).collect();
                        ctx.add_issue(IssueData::new(IssueKind::UnrecognizedKeys { keys }));
                        failed = true;
                    }
                }
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    for (key, value) in unknown {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        if failed {
            None
        } else {
            Some(Value::Object(out))
        }
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for schema in self.shape.values() {
            schema.collect_refs(refs);
        }
        if let Some(catchall) = &self.catchall {
            catchall.collect_refs(refs);
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for (name, schema) in &self.shape {
            properties.insert(name.clone(), schema.to_json_schema());
            if !schema.is_optional() {
                required.push(serde_json::Value::String(name.clone()));
            }
        }

        let mut doc = serde_json::Map::new();
        doc.insert("type".to_string(), "object".into());
        doc.insert(
            "properties".to_string(),
            serde_json::Value::Object(properties),
        );
        if !required.is_empty() {
            doc.insert("required".to_string(), serde_json::Value::Array(required));
        }
        if let Some(catchall) = &self.catchall {
            doc.insert(
                "additionalProperties".to_string(),
                catchall.to_json_schema(),
            );
        } else if self.unknown_keys == UnknownKeys::Strict {
            doc.insert("additionalProperties".to_string(), false.into());
        }
        serde_json::Value::Object(doc)
    }

    fn deep_partial(&self) -> Option<Self> {
        let shape = self
            .shape
            .iter()
            .map(|(name, field)| {
                let inner = field
                    .deep_partial_node()
                    .unwrap_or_else(|| std::sync::Arc::clone(field));
                (name.clone(), wrap_optional(inner))
            })
            .collect();
        Some(ObjectKind {
            shape,
            unknown_keys: self.unknown_keys,
            catchall: self.catchall.clone(),
            type_error_message: self.type_error_message.clone(),
        })
    }
}

impl Schema<ObjectKind> {
    /// Declares a required field.
    ///
    /// ```rust
    /// use scrutiny::schema::{object, string};
    /// use serde_json::json;
    ///
    /// let schema = object().field("name", string().min(1));
    /// assert!(schema.safe_parse(json!({})).is_failure());
    /// ```
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<AnySchema>) -> Self {
        self.kind.shape.insert(name.into(), schema.into());
        self
    }

    /// Declares a field that may be absent.
    pub fn optional_field(mut self, name: impl Into<String>, schema: impl Into<AnySchema>) -> Self {
        self.kind
            .shape
            .insert(name.into(), wrap_optional(schema.into()));
        self
    }

    /// Rejects objects carrying keys outside the shape, reporting all of
    /// them in one issue.
    pub fn strict(mut self) -> Self {
        self.kind.unknown_keys = UnknownKeys::Strict;
        self
    }

    /// Drops unknown keys from the output (the default).
    pub fn strip(mut self) -> Self {
        self.kind.unknown_keys = UnknownKeys::Strip;
        self
    }

    /// Copies unknown keys into the output verbatim.
    pub fn passthrough(mut self) -> Self {
        self.kind.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    /// Validates every unknown key's value against `schema` instead of
    /// applying the unknown-keys policy.
    pub fn catchall(mut self, schema: impl Into<AnySchema>) -> Self {
        self.kind.catchall = Some(schema.into());
        self
    }

    /// A new object schema keeping only the named fields.
    pub fn pick(&self, keys: &[&str]) -> Self {
        let mut kind = self.kind.clone();
        kind.shape.retain(|name, _| keys.contains(&name.as_str()));
        Schema {
            kind,
            meta: self.meta.clone(),
        }
    }

    /// A new object schema without the named fields.
    pub fn omit(&self, keys: &[&str]) -> Self {
        let mut kind = self.kind.clone();
        kind.shape.retain(|name, _| !keys.contains(&name.as_str()));
        Schema {
            kind,
            meta: self.meta.clone(),
        }
    }

    /// A new object schema where every field is optional.
    pub fn partial(&self) -> Self {
        let mut kind = self.kind.clone();
        kind.shape = kind
            .shape
            .into_iter()
            .map(|(name, field)| (name, wrap_optional(field)))
            .collect();
        Schema {
            kind,
            meta: self.meta.clone(),
        }
    }

    /// A new object schema where every field must be present.
    pub fn required(&self) -> Self {
        let mut kind = self.kind.clone();
        kind.shape = kind
            .shape
            .into_iter()
            .map(|(name, field)| (name, wrap_required(field)))
            .collect();
        Schema {
            kind,
            meta: self.meta.clone(),
        }
    }

    /// A new object schema where fields, and fields of nested object
    /// fields, are optional.
    pub fn deep_partial(&self) -> Self {
        let kind = self
            .kind
            .deep_partial()
            .unwrap_or_else(|| self.kind.clone());
        Schema {
            kind,
            meta: self.meta.clone(),
        }
    }

    /// Combines two shapes; `other`'s fields, unknown-keys policy and
    /// catchall win on overlap.
    pub fn merge(&self, other: &Schema<ObjectKind>) -> Self {
        let mut kind = self.kind.clone();
        for (name, field) in &other.kind.shape {
            kind.shape.insert(name.clone(), std::sync::Arc::clone(field));
        }
        kind.unknown_keys = other.kind.unknown_keys;
        if other.kind.catchall.is_some() {
            kind.catchall = other.kind.catchall.clone();
        }
        Schema {
            kind,
            meta: self.meta.clone(),
        }
    }

    /// Adds fields to the shape, replacing same-named ones.
    pub fn extend<N, I>(mut self, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, AnySchema)>,
    {
        for (name, field) in fields {
            self.kind.shape.insert(name.into(), field);
        }
        self
    }

    /// An enumeration schema over this shape's field names.
    pub fn keyof(&self) -> Schema<EnumKind> {
        let options = self
            .kind
            .shape
            .keys()
            .map(|name| Value::String(name.clone()))
            .collect();
        Schema::of(EnumKind::new(options))
    }

    /// Sets a custom message for the not-an-object mismatch.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.kind.type_error_message = Some(message.into());
        self
    }
}
