//! Schema construction and the modifier pipeline shared by every kind.
//!
//! A schema is built from a constructor function ([`string`], [`object`],
//! [`union`], ...), refined with kind-specific builder methods, and wrapped
//! in modifiers (`optional`, `nullable`, `default_value`, `catch`,
//! `refine`, `transform`, ...) that behave identically for every kind.
//! Builders consume and return new nodes; clone a schema to share it
//! between parents.
//!
//! # Example
//!
//! ```rust
//! use scrutiny::schema::{object, string, number};
//! use serde_json::json;
//!
//! let user = object()
//!     .field("name", string().min(1))
//!     .field("age", number().int().nonnegative());
//!
//! assert!(user.safe_parse(json!({"name": "Ada", "age": 36})).is_success());
//!
//! let failure = user.safe_parse(json!({"name": "", "age": -1}));
//! assert_eq!(failure.into_result().unwrap_err().len(), 2);
//! ```

mod array;
mod collections;
mod date;
mod number;
mod object;
mod primitive;
mod string;
mod traits;
mod union;
mod wrappers;

use std::sync::Arc;

use stillwater::Validation;

use crate::context::{ErrorMap, IssueData, ParseContext, RefineContext, RegistryAccess};
use crate::error::ParseError;
use crate::value::Value;

pub use array::{ArrayKind, TupleKind};
pub use collections::{MapKind, RecordKind, SetKind};
pub use date::DateKind;
pub use number::{BigIntKind, NumberKind};
pub use object::{ObjectKind, UnknownKeys};
pub use primitive::{
    AnyKind, BooleanKind, EnumKind, LiteralKind, NeverKind, NullKind, SymbolKind, UndefinedKind,
    UnknownKind, VoidKind,
};
pub use string::StringKind;
pub use traits::{AnySchema, SchemaKind, SchemaNode};
pub use union::{DiscriminatedUnionKind, IntersectionKind, SchemaBuildError, UnionKind};
pub use wrappers::{
    CheckedFunction, FunctionKind, PipelineKind, PreprocessKind, PromiseKind, RefKind,
};

/// Default limit on reference-resolution depth for recursive schemas.
pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Clone)]
pub(crate) enum DefaultValue {
    Fixed(Value),
    Computed(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    fn resolve(&self) -> Value {
        match self {
            DefaultValue::Fixed(value) => value.clone(),
            DefaultValue::Computed(f) => f(),
        }
    }
}

#[derive(Clone)]
pub(crate) enum CatchValue {
    Fixed(Value),
    Computed(Arc<dyn Fn(&ParseError) -> Value + Send + Sync>),
}

impl CatchValue {
    fn resolve(&self, error: &ParseError) -> Value {
        match self {
            CatchValue::Fixed(value) => value.clone(),
            CatchValue::Computed(f) => f(error),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Check {
    Refine {
        test: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
        message: String,
    },
    SuperRefine {
        run: Arc<dyn Fn(&Value, &RefineContext) + Send + Sync>,
    },
}

/// The modifier state carried uniformly by every schema node.
#[derive(Clone, Default)]
pub(crate) struct Modifiers {
    optional: bool,
    nullable: bool,
    default: Option<DefaultValue>,
    catch: Option<CatchValue>,
    checks: Vec<Check>,
    transforms: Vec<Arc<dyn Fn(Value) -> Value + Send + Sync>>,
    error_map: Option<ErrorMap>,
    description: Option<String>,
    brand: Option<String>,
    readonly: bool,
}

/// An immutable schema node: a concrete kind plus the shared modifiers.
///
/// All composition happens through the erased [`AnySchema`] handle;
/// `Schema<K>` keeps the kind type visible so kind-specific builders
/// (`string().min(3)`, `object().field(...)`) remain available.
#[derive(Clone)]
pub struct Schema<K> {
    pub(crate) kind: K,
    pub(crate) meta: Modifiers,
}

impl<K: SchemaKind> Schema<K> {
    pub(crate) fn of(kind: K) -> Self {
        Self {
            kind,
            meta: Modifiers::default(),
        }
    }

    /// Accepts `undefined`, short-circuiting to `undefined`.
    pub fn optional(mut self) -> Self {
        self.meta.optional = true;
        self
    }

    /// Accepts `null`, short-circuiting to `null`.
    pub fn nullable(mut self) -> Self {
        self.meta.nullable = true;
        self
    }

    /// Accepts both `undefined` and `null`.
    pub fn nullish(self) -> Self {
        self.optional().nullable()
    }

    /// Substitutes `value` when the input is `undefined`.
    ///
    /// The substitution short-circuits: the default is returned as-is
    /// without running the validator. Implies optional.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.meta.default = Some(DefaultValue::Fixed(value.into()));
        self
    }

    /// Like [`default_value`](Self::default_value) with a lazily computed
    /// default.
    pub fn default_with(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.meta.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    /// Replaces any failure of this schema with `value`.
    ///
    /// The failed attempt's diagnostics are discarded.
    pub fn catch(mut self, value: impl Into<Value>) -> Self {
        self.meta.catch = Some(CatchValue::Fixed(value.into()));
        self
    }

    /// Like [`catch`](Self::catch), computing the fallback from the error.
    pub fn catch_with(mut self, f: impl Fn(&ParseError) -> Value + Send + Sync + 'static) -> Self {
        self.meta.catch = Some(CatchValue::Computed(Arc::new(f)));
        self
    }

    /// Adds a predicate refinement running after the concrete validator.
    ///
    /// All registered refinements run in order; a false return records a
    /// `custom` issue with `message` and fails the schema once every check
    /// has had its say.
    pub fn refine(
        mut self,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        self.meta.checks.push(Check::Refine {
            test: Arc::new(test),
            message: message.into(),
        });
        self
    }

    /// Adds a side-effecting refinement that may record any number of
    /// issues through a [`RefineContext`], including at sibling paths.
    pub fn super_refine(
        mut self,
        run: impl Fn(&Value, &RefineContext) + Send + Sync + 'static,
    ) -> Self {
        self.meta.checks.push(Check::SuperRefine { run: Arc::new(run) });
        self
    }

    /// Maps the successfully validated value to a new value.
    ///
    /// Transforms run after every check has passed, in registration order.
    /// They never see a context and cannot fail.
    pub fn transform(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.meta.transforms.push(Arc::new(f));
        self
    }

    /// Attaches a human description, surfaced by introspection and export.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.meta.description = Some(text.into());
        self
    }

    /// Tags this schema with a nominal brand label.
    pub fn brand(mut self, tag: impl Into<String>) -> Self {
        self.meta.brand = Some(tag.into());
        self
    }

    /// Marks the output as read-only.
    pub fn readonly(mut self) -> Self {
        self.meta.readonly = true;
        self
    }

    /// Attaches a per-schema message resolver consulted for issues this
    /// node records (after any per-call resolver).
    pub fn with_error_map(mut self, map: ErrorMap) -> Self {
        self.meta.error_map = Some(map);
        self
    }

    /// The description attached via [`describe`](Self::describe).
    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    /// The brand tag attached via [`brand`](Self::brand).
    pub fn brand_tag(&self) -> Option<&str> {
        self.meta.brand.as_deref()
    }

    /// True when marked read-only.
    pub fn is_readonly(&self) -> bool {
        self.meta.readonly
    }

    /// Feeds this schema's output into `next`.
    ///
    /// The pipeline fails fast at the first stage that raises.
    pub fn pipe<K2: SchemaKind>(self, next: Schema<K2>) -> Schema<PipelineKind> {
        pipeline(vec![self.into(), next.into()])
    }

    /// Validates `input`, returning the parsed value or the accumulated
    /// error.
    pub fn parse(&self, input: impl Into<Value>) -> Result<Value, ParseError> {
        self.safe_parse(input).into_result()
    }

    /// Validates `input` without panicking or returning `Result`-style
    /// early exits: the outcome is a tagged success or failure.
    pub fn safe_parse(&self, input: impl Into<Value>) -> Validation<Value, ParseError> {
        self.safe_parse_with(input, &ParseOptions::default())
    }

    /// Settle-all equivalent of [`parse`](Self::parse): sibling fields and
    /// elements of composite values are validated as parallel tasks, all
    /// of which run to completion before the outcome is decided.
    pub fn parse_parallel(&self, input: impl Into<Value>) -> Result<Value, ParseError> {
        self.safe_parse_parallel(input).into_result()
    }

    /// Settle-all equivalent of [`safe_parse`](Self::safe_parse).
    pub fn safe_parse_parallel(&self, input: impl Into<Value>) -> Validation<Value, ParseError> {
        let options = ParseOptions {
            parallel: true,
            ..ParseOptions::default()
        };
        self.safe_parse_with(input, &options)
    }

    /// Validates `input` with explicit per-call options (contextual message
    /// resolver, registry for named references, depth limit, parallelism).
    pub fn safe_parse_with(
        &self,
        input: impl Into<Value>,
        options: &ParseOptions,
    ) -> Validation<Value, ParseError> {
        let value = input.into();
        let ctx = ParseContext::new_root(
            options.parallel,
            options.error_map.clone(),
            options.registry.clone(),
            options.max_depth,
        );

        match self.parse_value(&value, &ctx) {
            Some(out) if !ctx.has_issues() => Validation::Success(out),
            _ => Validation::Failure(ParseError::from_vec(ctx.drain_issues())),
        }
    }

    fn run_core(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let out = self.kind.check(value, ctx)?;

        let mut failed = false;
        for check in &self.meta.checks {
            match check {
                Check::Refine { test, message } => {
                    if !test(&out) {
                        ctx.add_issue(IssueData::custom(message.clone()));
                        failed = true;
                    }
                }
                Check::SuperRefine { run } => {
                    let handle = RefineContext::new(ctx);
                    run(&out, &handle);
                    if handle.dirty() {
                        failed = true;
                    }
                }
            }
        }
        if failed {
            return None;
        }

        let mut current = out;
        for transform in &self.meta.transforms {
            current = transform(current);
        }
        Some(current)
    }
}

impl<K: SchemaKind> traits::sealed::Sealed for Schema<K> {}

impl<K: SchemaKind> SchemaNode for Schema<K> {
    fn parse_value(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        if value.is_undefined() {
            if let Some(default) = &self.meta.default {
                return Some(default.resolve());
            }
            if self.meta.optional {
                return Some(Value::Undefined);
            }
        }
        if value.is_null() && self.meta.nullable {
            return Some(Value::Null);
        }

        let ctx = match &self.meta.error_map {
            Some(map) => ctx.with_schema_error_map(Arc::clone(map)),
            None => ctx.clone(),
        };

        match &self.meta.catch {
            Some(fallback) => {
                let trial = ctx.speculative();
                match self.run_core(value, &trial) {
                    Some(out) => {
                        ctx.absorb(trial.drain_issues());
                        Some(out)
                    }
                    None => {
                        let error = ParseError::from_vec(trial.drain_issues());
                        Some(fallback.resolve(&error))
                    }
                }
            }
            None => self.run_core(value, &ctx),
        }
    }

    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn is_optional(&self) -> bool {
        self.meta.optional || self.meta.default.is_some()
    }

    fn is_nullable(&self) -> bool {
        self.meta.nullable
    }

    fn literal_value(&self) -> Option<&Value> {
        self.kind.literal_value()
    }

    fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.kind.collect_refs(refs);
    }

    fn to_json_schema(&self) -> serde_json::Value {
        let mut doc = self.kind.json_schema();
        if self.meta.nullable {
            doc = serde_json::json!({ "oneOf": [{ "type": "null" }, doc] });
        }
        if let Some(description) = &self.meta.description {
            if let Some(obj) = doc.as_object_mut() {
                obj.insert(
                    "description".to_string(),
                    serde_json::Value::String(description.clone()),
                );
            }
        }
        if let Some(DefaultValue::Fixed(value)) = &self.meta.default {
            if let (Some(json), Some(obj)) = (value.to_json(), doc.as_object_mut()) {
                obj.insert("default".to_string(), json);
            }
        }
        doc
    }

    fn deep_partial_node(&self) -> Option<AnySchema> {
        self.kind.deep_partial().map(|kind| {
            Arc::new(Schema {
                kind,
                meta: self.meta.clone(),
            }) as AnySchema
        })
    }
}

/// Per-call options for [`Schema::safe_parse_with`].
#[derive(Clone)]
pub struct ParseOptions {
    /// Message resolver consulted first for every issue of this call.
    pub error_map: Option<ErrorMap>,
    /// Registry used to resolve named references.
    pub registry: Option<Arc<dyn RegistryAccess>>,
    /// Limit on reference-resolution depth.
    pub max_depth: usize,
    /// Run composite children as settle-all parallel tasks.
    pub parallel: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_map: None,
            registry: None,
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: false,
        }
    }
}

/// A string schema.
pub fn string() -> Schema<StringKind> {
    Schema::of(StringKind::new())
}

/// A number schema (double-precision).
pub fn number() -> Schema<NumberKind> {
    Schema::of(NumberKind::new())
}

/// A big-integer schema.
pub fn bigint() -> Schema<BigIntKind> {
    Schema::of(BigIntKind::new())
}

/// A boolean schema.
pub fn boolean() -> Schema<BooleanKind> {
    Schema::of(BooleanKind)
}

/// A date schema. Accepts a date value or finite epoch milliseconds.
pub fn date() -> Schema<DateKind> {
    Schema::of(DateKind::new())
}

/// A schema matching exactly one value.
pub fn literal(value: impl Into<Value>) -> Schema<LiteralKind> {
    Schema::of(LiteralKind::new(value.into()))
}

/// A schema matching one of a fixed set of literal values.
///
/// Options may be strings, numbers or any mix of literals, which also
/// covers enums whose variants carry numeric values.
pub fn enumeration<I>(options: I) -> Schema<EnumKind>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Schema::of(EnumKind::new(
        options.into_iter().map(Into::into).collect(),
    ))
}

/// A schema accepting only `null`.
pub fn null() -> Schema<NullKind> {
    Schema::of(NullKind)
}

/// A schema accepting only `undefined`.
pub fn undefined() -> Schema<UndefinedKind> {
    Schema::of(UndefinedKind)
}

/// A schema accepting only `undefined`, for no-meaningful-value positions.
pub fn void() -> Schema<VoidKind> {
    Schema::of(VoidKind)
}

/// A schema accepting nothing.
pub fn never() -> Schema<NeverKind> {
    Schema::of(NeverKind)
}

/// A schema accepting anything, unchanged.
pub fn any() -> Schema<AnyKind> {
    Schema::of(AnyKind)
}

/// A schema accepting anything, unchanged. Distinct from [`any`] only in
/// name, mirroring the distinction callers draw between trusted and
/// not-yet-inspected input.
pub fn unknown() -> Schema<UnknownKind> {
    Schema::of(UnknownKind)
}

/// A schema accepting symbol values.
pub fn symbol() -> Schema<SymbolKind> {
    Schema::of(SymbolKind)
}

/// An object schema with an empty shape. Add fields with
/// [`field`](Schema::field) / [`optional_field`](Schema::optional_field).
pub fn object() -> Schema<ObjectKind> {
    Schema::of(ObjectKind::new())
}

/// An array schema validating every element against `element`.
pub fn array(element: impl Into<AnySchema>) -> Schema<ArrayKind> {
    Schema::of(ArrayKind::new(element.into()))
}

/// A tuple schema validating fixed positions against distinct schemas.
pub fn tuple(items: Vec<AnySchema>) -> Schema<TupleKind> {
    Schema::of(TupleKind::new(items))
}

/// A record schema validating every key and value of an object.
pub fn record(key: impl Into<AnySchema>, value: impl Into<AnySchema>) -> Schema<RecordKind> {
    Schema::of(RecordKind::new(key.into(), value.into()))
}

/// A map schema validating every entry's key and value.
pub fn map(key: impl Into<AnySchema>, value: impl Into<AnySchema>) -> Schema<MapKind> {
    Schema::of(MapKind::new(key.into(), value.into()))
}

/// A set schema validating every element.
pub fn set(element: impl Into<AnySchema>) -> Schema<SetKind> {
    Schema::of(SetKind::new(element.into()))
}

/// A union schema trying each option in declaration order.
pub fn union(options: Vec<AnySchema>) -> Schema<UnionKind> {
    Schema::of(UnionKind::new(options))
}

/// A discriminated union dispatching on the literal value of `key`.
///
/// Every variant must declare `key` in its shape as a literal; the
/// literal-to-variant index is built here, once.
pub fn discriminated_union(
    key: impl Into<String>,
    variants: Vec<Schema<ObjectKind>>,
) -> Result<Schema<DiscriminatedUnionKind>, SchemaBuildError> {
    Ok(Schema::of(DiscriminatedUnionKind::new(key.into(), variants)?))
}

/// An intersection schema requiring both sides to accept the value.
pub fn intersection(
    left: impl Into<AnySchema>,
    right: impl Into<AnySchema>,
) -> Schema<IntersectionKind> {
    Schema::of(IntersectionKind::new(left.into(), right.into()))
}

/// A function schema. Declare arguments and return type with
/// [`args`](Schema::args) / [`returns`](Schema::returns); attach an
/// implementation with [`implement`](Schema::implement).
pub fn function() -> Schema<FunctionKind> {
    Schema::of(FunctionKind::new())
}

/// A promise schema wrapping a deferred value whose resolution is
/// validated against `inner`.
pub fn promise(inner: impl Into<AnySchema>) -> Schema<PromiseKind> {
    Schema::of(PromiseKind::new(inner.into()))
}

/// Threads a value through `stages` in order, failing fast at the first
/// stage that raises.
pub fn pipeline(stages: Vec<AnySchema>) -> Schema<PipelineKind> {
    Schema::of(PipelineKind::new(stages))
}

/// Applies `apply` to the raw input before delegating to `inner`.
///
/// An `Err` from the preprocessor is reported as a `custom` issue rather
/// than propagating.
pub fn preprocess(
    apply: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    inner: impl Into<AnySchema>,
) -> Schema<PreprocessKind> {
    Schema::of(PreprocessKind::new(Arc::new(apply), inner.into()))
}

/// A named reference resolved through the registry at parse time.
///
/// This is how self-referential and mutually recursive schemas are built:
/// register the bodies under names, reference them by name, and the
/// registry resolves each hop with depth tracking.
pub fn reference(name: impl Into<String>) -> Schema<RefKind> {
    Schema::of(RefKind::new(name.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug>(v: Validation<T, ParseError>) -> ParseError {
        v.into_result().unwrap_err()
    }

    #[test]
    fn optional_short_circuits_undefined() {
        let schema = string().optional();
        assert_eq!(schema.parse(Value::Undefined).unwrap(), Value::Undefined);

        // Null is still rejected.
        assert!(schema.safe_parse(json!(null)).is_failure());
    }

    #[test]
    fn nullable_short_circuits_null() {
        let schema = string().nullable();
        assert_eq!(schema.parse(json!(null)).unwrap(), Value::Null);
        assert!(schema.safe_parse(Value::Undefined).is_failure());
    }

    #[test]
    fn nullish_accepts_both() {
        let schema = string().nullish();
        assert!(schema.safe_parse(json!(null)).is_success());
        assert!(schema.safe_parse(Value::Undefined).is_success());
    }

    #[test]
    fn default_replaces_undefined_without_validating() {
        // The default is shorter than the minimum; it is substituted, not
        // validated.
        let schema = string().min(10).default_value("tbd");
        assert_eq!(
            schema.parse(Value::Undefined).unwrap(),
            Value::String("tbd".to_string())
        );
    }

    #[test]
    fn computed_default() {
        let schema = number().default_with(|| Value::Number(41.0 + 1.0));
        assert_eq!(schema.parse(Value::Undefined).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn catch_substitutes_on_failure_and_discards_issues() {
        let schema = number().catch(0);
        assert_eq!(schema.parse(json!("oops")).unwrap(), Value::Number(0.0));
        assert_eq!(schema.parse(json!(7)).unwrap(), Value::Number(7.0));
    }

    #[test]
    fn catch_with_sees_the_error() {
        let schema = string().catch_with(|error| Value::Number(error.len() as f64));
        assert_eq!(schema.parse(json!(1)).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn all_refinements_run_and_all_report() {
        let schema = number()
            .refine(|v| v.as_number().is_some_and(|n| n > 0.0), "must be positive")
            .refine(|v| v.as_number().is_some_and(|n| n % 2.0 == 0.0), "must be even");

        let error = unwrap_failure(schema.safe_parse(json!(-3)));
        assert_eq!(error.len(), 2);
        let messages: Vec<&str> = error.issues().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["must be positive", "must be even"]);
    }

    #[test]
    fn refinements_do_not_run_on_type_failure() {
        let schema = number().refine(|_| false, "never reached");
        let error = unwrap_failure(schema.safe_parse(json!("nan")));
        assert_eq!(error.len(), 1);
        assert_eq!(error.code(), "invalid_type");
    }

    #[test]
    fn transforms_chain_in_order() {
        let schema = string()
            .transform(|v| match v {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })
            .transform(|v| match v {
                Value::String(s) => Value::String(format!("<{}>", s)),
                other => other,
            });

        assert_eq!(
            schema.parse(json!("hi")).unwrap(),
            Value::String("<HI>".to_string())
        );
    }

    #[test]
    fn transforms_skipped_when_checks_fail() {
        let schema = string()
            .refine(|_| false, "no")
            .transform(|_| Value::String("should not appear".to_string()));
        assert!(schema.safe_parse(json!("x")).is_failure());
    }

    #[test]
    fn describe_brand_readonly_annotations() {
        let schema = string().describe("a name").brand("UserName").readonly();
        assert_eq!(schema.description(), Some("a name"));
        assert_eq!(schema.brand_tag(), Some("UserName"));
        assert!(schema.is_readonly());
    }

    #[test]
    fn schema_error_map_applies_to_own_issues() {
        let schema = number().with_error_map(Arc::new(|issue| {
            (issue.code() == "invalid_type").then(|| "need a number here".to_string())
        }));

        let error = unwrap_failure(schema.safe_parse(json!("x")));
        assert_eq!(error.first().message, "need a number here");
    }

    #[test]
    fn contextual_error_map_wins_over_schema_map() {
        let schema = number().with_error_map(Arc::new(|_| Some("schema-level".to_string())));
        let options = ParseOptions {
            error_map: Some(Arc::new(|_| Some("call-level".to_string()))),
            ..ParseOptions::default()
        };

        let error = unwrap_failure(schema.safe_parse_with(json!("x"), &options));
        assert_eq!(error.first().message, "call-level");
    }

    #[test]
    fn parse_rethrows_and_safe_parse_tags() {
        let schema = boolean();
        assert!(schema.parse(json!("not a bool")).is_err());
        assert!(schema.safe_parse(json!("not a bool")).is_failure());
        assert!(schema.safe_parse(json!(true)).is_success());
    }

    #[test]
    fn sharing_a_schema_requires_only_clone() {
        let base = string().min(1);
        let a = base.clone().max(5);
        let b = base.clone().max(10);

        let long = json!("123456789");
        assert!(a.safe_parse(long.clone()).is_failure());
        assert!(b.safe_parse(long).is_success());
        // The original is untouched by either derivation.
        assert!(base.safe_parse(json!("123456789012")).is_success());
    }
}
