//! Record, map and set validation.

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, SizeSubject};
use crate::path::PathSegment;
use crate::schema::{AnySchema, Schema, SchemaKind, SchemaNode};
use crate::value::Value;

/// The record kind: every own key of an object validated against a key
/// schema, every value against a value schema.
#[derive(Clone)]
pub struct RecordKind {
    key: AnySchema,
    value: AnySchema,
}

impl RecordKind {
    pub(crate) fn new(key: AnySchema, value: AnySchema) -> Self {
        Self { key, value }
    }

    /// Validates one entry. Outer `None` marks failure; inner `None` marks
    /// a key that failed and is skipped from the result.
    fn validate_entry(
        &self,
        key: &str,
        value: &Value,
        ctx: &ParseContext,
    ) -> Option<Option<(String, Value)>> {
        let entry_ctx = ctx.child(PathSegment::key(key));

        let key_out = self
            .key
            .parse_value(&Value::String(key.to_string()), &entry_ctx);
        let value_out = self.value.parse_value(value, &entry_ctx);

        match (key_out, value_out) {
            (Some(Value::String(k)), Some(v)) => Some(Some((k, v))),
            (Some(_), Some(_)) => Some(Some((key.to_string(), value.clone()))),
            // A failed key is skipped while its issue stays recorded; a
            // failed value fails the entry outright.
            (None, Some(_)) => Some(None),
            _ => None,
        }
    }
}

impl SchemaKind for RecordKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let input = match value {
            Value::Object(fields) => fields,
            other => {
                ctx.add_issue(IssueData::invalid_type("record", other));
                return None;
            }
        };

        let entries: Vec<(&String, &Value)> = input.iter().collect();
        let outcomes: Vec<Option<Option<(String, Value)>>> = if ctx.parallel() {
            entries
                .par_iter()
                .map(|(key, val)| self.validate_entry(key, val, ctx))
                .collect()
        } else {
            entries
                .iter()
                .map(|(key, val)| self.validate_entry(key, val, ctx))
                .collect()
        };

        let mut failed = false;
        let mut out: IndexMap<String, Value> = IndexMap::new();
        for outcome in outcomes {
            match outcome {
                Some(Some((key, val))) => {
                    out.insert(key, val);
                }
                Some(None) => failed = true,
                None => failed = true,
            }
        }

        if failed {
            None
        } else {
            Some(Value::Object(out))
        }
    }

    fn type_name(&self) -> &'static str {
        "record"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.key.collect_refs(refs);
        self.value.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "additionalProperties": self.value.to_json_schema(),
        })
    }
}

/// The map kind: arbitrary keys, each entry's key and value validated
/// independently through their own child contexts.
#[derive(Clone)]
pub struct MapKind {
    key: AnySchema,
    value: AnySchema,
}

impl MapKind {
    pub(crate) fn new(key: AnySchema, value: AnySchema) -> Self {
        Self { key, value }
    }

    fn validate_entry(
        &self,
        index: usize,
        key: &Value,
        value: &Value,
        ctx: &ParseContext,
    ) -> Option<(Value, Value)> {
        let entry_ctx = ctx.child(PathSegment::index(index));
        let key_out = self
            .key
            .parse_value(key, &entry_ctx.child(PathSegment::key("key")));
        let value_out = self
            .value
            .parse_value(value, &entry_ctx.child(PathSegment::key("value")));
        match (key_out, value_out) {
            (Some(k), Some(v)) => Some((k, v)),
            _ => None,
        }
    }
}

impl SchemaKind for MapKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let entries = match value {
            Value::Map(entries) => entries,
            other => {
                ctx.add_issue(IssueData::invalid_type("map", other));
                return None;
            }
        };

        let outcomes: Vec<Option<(Value, Value)>> = if ctx.parallel() {
            entries
                .par_iter()
                .enumerate()
                .map(|(i, (k, v))| self.validate_entry(i, k, v, ctx))
                .collect()
        } else {
            entries
                .iter()
                .enumerate()
                .map(|(i, (k, v))| self.validate_entry(i, k, v, ctx))
                .collect()
        };

        let mut failed = false;
        let mut out = Vec::with_capacity(entries.len());
        for outcome in outcomes {
            match outcome {
                Some(entry) => out.push(entry),
                None => failed = true,
            }
        }

        if failed {
            None
        } else {
            Some(Value::Map(out))
        }
    }

    fn type_name(&self) -> &'static str {
        "map"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.key.collect_refs(refs);
        self.value.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "array",
            "items": {
                "type": "array",
                "prefixItems": [self.key.to_json_schema(), self.value.to_json_schema()],
            },
        })
    }
}

#[derive(Clone)]
enum SetConstraint {
    MinSize {
        min: usize,
        message: Option<String>,
    },
    MaxSize {
        max: usize,
        message: Option<String>,
    },
}

/// The set kind: every element validated in insertion order.
#[derive(Clone)]
pub struct SetKind {
    element: AnySchema,
    constraints: Vec<SetConstraint>,
}

impl SetKind {
    pub(crate) fn new(element: AnySchema) -> Self {
        Self {
            element,
            constraints: Vec::new(),
        }
    }
}

impl SchemaKind for SetKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let items = match value {
            Value::Set(items) => items,
            other => {
                ctx.add_issue(IssueData::invalid_type("set", other));
                return None;
            }
        };

        let mut failed = false;
        for constraint in &self.constraints {
            match constraint {
                SetConstraint::MinSize { min, message } if items.len() < *min => {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooSmall {
                            subject: SizeSubject::Set,
                            minimum: *min as f64,
                            inclusive: true,
                        })
                        .with_message_opt(message.clone()),
                    );
                    failed = true;
                }
                SetConstraint::MaxSize { max, message } if items.len() > *max => {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooBig {
                            subject: SizeSubject::Set,
                            maximum: *max as f64,
                            inclusive: true,
                        })
                        .with_message_opt(message.clone()),
                    );
                    failed = true;
                }
                _ => {}
            }
        }

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
            Some(Value::Set(out))
        }
    }

    fn type_name(&self) -> &'static str {
        "set"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.element.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "array",
            "uniqueItems": true,
            "items": self.element.to_json_schema(),
        })
    }
}

impl Schema<SetKind> {
    /// Requires at least `min` elements.
    pub fn min_size(mut self, min: usize) -> Self {
        self.kind
            .constraints
            .push(SetConstraint::MinSize { min, message: None });
        self
    }

    /// Requires at most `max` elements.
    pub fn max_size(mut self, max: usize) -> Self {
        self.kind
            .constraints
            .push(SetConstraint::MaxSize { max, message: None });
        self
    }

    /// Requires at least one element.
    pub fn nonempty(self) -> Self {
        self.min_size(1)
    }
}
