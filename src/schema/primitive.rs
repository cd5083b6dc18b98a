//! Leaf kinds without constraint chains: booleans, exact literals, literal
//! sets, the null/undefined family and the pass-through kinds.

use crate::context::{IssueData, ParseContext};
use crate::error::IssueKind;
use crate::schema::SchemaKind;
use crate::value::Value;

/// Accepts booleans.
#[derive(Clone, Copy)]
pub struct BooleanKind;

impl SchemaKind for BooleanKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            other => {
                ctx.add_issue(IssueData::invalid_type("boolean", other));
                None
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "boolean" })
    }
}

/// Accepts only `null`.
#[derive(Clone, Copy)]
pub struct NullKind;

impl SchemaKind for NullKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        if value.is_null() {
            Some(Value::Null)
        } else {
            ctx.add_issue(IssueData::invalid_type("null", value));
            None
        }
    }

    fn type_name(&self) -> &'static str {
        "null"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "null" })
    }
}

/// Accepts only `undefined`.
#[derive(Clone, Copy)]
pub struct UndefinedKind;

impl SchemaKind for UndefinedKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        if value.is_undefined() {
            Some(Value::Undefined)
        } else {
            ctx.add_issue(IssueData::invalid_type("undefined", value));
            None
        }
    }

    fn type_name(&self) -> &'static str {
        "undefined"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "not": {} })
    }
}

/// Accepts only `undefined`, for positions with no meaningful value.
#[derive(Clone, Copy)]
pub struct VoidKind;

impl SchemaKind for VoidKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        if value.is_undefined() {
            Some(Value::Undefined)
        } else {
            ctx.add_issue(IssueData::invalid_type("void", value));
            None
        }
    }

    fn type_name(&self) -> &'static str {
        "void"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "not": {} })
    }
}

/// Accepts nothing.
#[derive(Clone, Copy)]
pub struct NeverKind;

impl SchemaKind for NeverKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        ctx.add_issue(IssueData::invalid_type("never", value));
        None
    }

    fn type_name(&self) -> &'static str {
        "never"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "not": {} })
    }
}

/// Accepts anything, unchanged.
#[derive(Clone, Copy)]
pub struct AnyKind;

impl SchemaKind for AnyKind {
    fn check(&self, value: &Value, _ctx: &ParseContext) -> Option<Value> {
        Some(value.clone())
    }

    fn type_name(&self) -> &'static str {
        "any"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

/// Accepts anything, unchanged; the not-yet-inspected counterpart of
/// [`AnyKind`].
#[derive(Clone, Copy)]
pub struct UnknownKind;

impl SchemaKind for UnknownKind {
    fn check(&self, value: &Value, _ctx: &ParseContext) -> Option<Value> {
        Some(value.clone())
    }

    fn type_name(&self) -> &'static str {
        "unknown"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

/// Accepts symbol values.
#[derive(Clone, Copy)]
pub struct SymbolKind;

impl SchemaKind for SymbolKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        match value {
            Value::Symbol(_) => Some(value.clone()),
            other => {
                ctx.add_issue(IssueData::invalid_type("symbol", other));
                None
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "symbol"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

/// Accepts exactly one value.
#[derive(Clone)]
pub struct LiteralKind {
    expected: Value,
}

impl LiteralKind {
    pub(crate) fn new(expected: Value) -> Self {
        Self { expected }
    }

    /// The literal this kind matches.
    pub fn expected(&self) -> &Value {
        &self.expected
    }
}

impl SchemaKind for LiteralKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        if value == &self.expected {
            Some(value.clone())
        } else {
            ctx.add_issue(
                IssueData::new(IssueKind::InvalidLiteral {
                    expected: self.expected.clone(),
                })
                .with_expected(self.expected.to_compact_string())
                .with_received(value.to_compact_string()),
            );
            None
        }
    }

    fn type_name(&self) -> &'static str {
        "literal"
    }

    fn literal_value(&self) -> Option<&Value> {
        Some(&self.expected)
    }

    fn json_schema(&self) -> serde_json::Value {
        match self.expected.to_json() {
            Some(json) => serde_json::json!({ "const": json }),
            None => serde_json::json!({}),
        }
    }
}

/// Accepts one of a fixed set of literal values.
///
/// The options may be strings, numbers or a mix, which also covers enums
/// whose variants carry numeric values.
#[derive(Clone)]
pub struct EnumKind {
    options: Vec<Value>,
}

impl EnumKind {
    pub(crate) fn new(options: Vec<Value>) -> Self {
        Self { options }
    }

    /// The allowed literal set, in declaration order.
    pub fn options(&self) -> &[Value] {
        &self.options
    }
}

impl SchemaKind for EnumKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        if self.options.iter().any(|option| option == value) {
            Some(value.clone())
        } else {
            ctx.add_issue(
                IssueData::new(IssueKind::InvalidEnumValue {
                    options: self.options.clone(),
                })
                .with_received(value.to_compact_string()),
            );
            None
        }
    }

    fn type_name(&self) -> &'static str {
        "enum"
    }

    fn json_schema(&self) -> serde_json::Value {
        let options: Vec<serde_json::Value> = self
            .options
            .iter()
            .filter_map(Value::to_json)
            .collect();
        serde_json::json!({ "enum": options })
    }
}
