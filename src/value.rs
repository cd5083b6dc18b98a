//! The in-memory value model validated by schemas.
//!
//! Schemas validate already-deserialized values, not byte streams. JSON
//! covers only part of what the engine understands, so [`Value`] extends the
//! JSON shape with dates, big integers, symbols, maps, sets, callables and
//! deferred computations. Conversions from [`serde_json::Value`] are
//! provided so JSON input (and `json!` test fixtures) slot straight in.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::ParseError;

/// A dynamically-typed input value.
///
/// `Object` preserves key insertion order, and `Map`/`Set` preserve entry
/// insertion order, so validated output always mirrors input ordering.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// An explicit null.
    Null,
    /// An absent value (a missing field, an omitted argument).
    #[default]
    Undefined,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// An arbitrary-precision-ish integer (beyond safe `Number` range).
    BigInt(i128),
    /// A UTF-8 string.
    String(String),
    /// An interned name token; equality is by name.
    Symbol(String),
    /// A point in time.
    Date(DateTime<Utc>),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// An ordered string-keyed mapping.
    Object(IndexMap<String, Value>),
    /// An ordered mapping with arbitrary keys.
    Map(Vec<(Value, Value)>),
    /// An ordered collection of distinct values.
    Set(Vec<Value>),
    /// A callable.
    Function(NativeFn),
    /// A not-yet-settled computation (the promise analogue).
    Deferred(Deferred),
}

impl Value {
    /// The type name used in diagnostics ("string", "map", ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Function(_) => "function",
            Value::Deferred(_) => "promise",
        }
    }

    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// The string slice, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The element slice, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The field map, if this is an `Object`.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Converts JSON-representable values back to [`serde_json::Value`].
    ///
    /// Returns `None` for kinds JSON cannot express (dates, symbols, maps,
    /// sets, functions, deferreds, undefined, non-finite numbers).
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() <= (1u64 << 53) as f64 {
                    Some(serde_json::Value::Number((*n as i64).into()))
                } else {
                    serde_json::Number::from_f64(*n).map(serde_json::Value::Number)
                }
            }
            Value::BigInt(n) => i64::try_from(*n)
                .ok()
                .map(|i| serde_json::Value::Number(i.into())),
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Object(fields) => {
                let mut out = serde_json::Map::new();
                for (key, value) in fields {
                    out.insert(key.clone(), value.to_json()?);
                }
                Some(serde_json::Value::Object(out))
            }
            _ => None,
        }
    }

    /// A short single-line rendering for the `received` side of diagnostics.
    pub fn to_compact_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => format!("\"{}\"", s),
            Value::Symbol(s) => format!("Symbol({})", s),
            Value::Date(d) => d.to_rfc3339(),
            Value::Array(items) => format!("array of {} items", items.len()),
            Value::Object(fields) => format!("object with {} keys", fields.len()),
            Value::Map(entries) => format!("map of {} entries", entries.len()),
            Value::Set(items) => format!("set of {} items", items.len()),
            Value::Function(_) => "function".to_string(),
            Value::Deferred(_) => "promise".to_string(),
        }
    }
}

/// A cloneable host callable.
///
/// Equality is by pointer identity, matching the semantics of comparing two
/// function references rather than their behavior.
#[derive(Clone)]
pub struct NativeFn(Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>);

impl NativeFn {
    /// Wraps a closure as a callable value.
    pub fn new(f: impl Fn(Vec<Value>) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invokes the callable.
    pub fn call(&self, args: Vec<Value>) -> Value {
        (self.0)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeFn")
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

enum DeferredState {
    Pending(Box<dyn Fn() -> Result<Value, ParseError> + Send + Sync>),
    Settled(Result<Value, ParseError>),
}

/// A memoized deferred computation.
///
/// `Deferred` is the engine's promise analogue: an explicit thunk that
/// settles exactly once. Rejection is an `Err(ParseError)`. Forcing a
/// settled deferred returns the cached outcome; the thunk never runs twice.
#[derive(Clone)]
pub struct Deferred {
    state: Arc<Mutex<DeferredState>>,
}

impl Deferred {
    /// Wraps a computation to run on first [`resolve`](Self::resolve).
    pub fn new(f: impl Fn() -> Result<Value, ParseError> + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeferredState::Pending(Box::new(f)))),
        }
    }

    /// An already-settled deferred.
    pub fn resolved(value: Value) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeferredState::Settled(Ok(value)))),
        }
    }

    /// Forces the computation, settling it if still pending.
    pub fn resolve(&self) -> Result<Value, ParseError> {
        let mut state = self.state.lock();
        let outcome = match &*state {
            DeferredState::Settled(outcome) => return outcome.clone(),
            DeferredState::Pending(thunk) => thunk(),
        };
        *state = DeferredState::Settled(outcome.clone());
        outcome
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred")
    }
}

impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                // f64 is the working representation; integers beyond 2^53
                // are still representable losslessly as BigInt.
                if let Some(i) = n.as_i64() {
                    if i.unsigned_abs() <= (1u64 << 53) {
                        Value::Number(i as f64)
                    } else {
                        Value::BigInt(i as i128)
                    }
                } else if let Some(u) = n.as_u64() {
                    Value::BigInt(u as i128)
                } else {
                    Value::Number(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Value::from(value.clone())
    }
}
