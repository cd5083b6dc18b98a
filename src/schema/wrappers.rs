//! Wrapper kinds: checked functions, deferred values, staged pipelines,
//! input preprocessing and named references.

use std::sync::Arc;

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, ParseError};
use crate::path::PathSegment;
use crate::schema::{AnySchema, Schema, SchemaKind, SchemaNode};
use crate::value::{Deferred, Value};

/// The function kind: declared argument and return schemas.
///
/// Parsing a callable against this kind passes it through unchanged; the
/// declarations take effect through [`Schema::implement`], which wraps an
/// implementation in per-call validation.
#[derive(Clone)]
pub struct FunctionKind {
    args: Vec<AnySchema>,
    returns: Option<AnySchema>,
}

impl FunctionKind {
    pub(crate) fn new() -> Self {
        Self {
            args: Vec::new(),
            returns: None,
        }
    }
}

impl SchemaKind for FunctionKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        match value {
            Value::Function(_) => Some(value.clone()),
            other => {
                ctx.add_issue(IssueData::invalid_type("function", other));
                None
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "function"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for arg in &self.args {
            arg.collect_refs(refs);
        }
        if let Some(returns) = &self.returns {
            returns.collect_refs(refs);
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

impl Schema<FunctionKind> {
    /// Declares the positional argument schemas.
    pub fn args(mut self, schemas: Vec<AnySchema>) -> Self {
        self.kind.args = schemas;
        self
    }

    /// Declares the return-value schema.
    pub fn returns(mut self, schema: impl Into<AnySchema>) -> Self {
        self.kind.returns = Some(schema.into());
        self
    }

    /// Wraps `f` so every call validates its arguments and return value
    /// against the declared schemas.
    pub fn implement(
        &self,
        f: impl Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    ) -> CheckedFunction {
        CheckedFunction {
            args: self.kind.args.clone(),
            returns: self.kind.returns.clone(),
            inner: Arc::new(f),
        }
    }
}

/// A function whose calls are validated against declared schemas.
///
/// Missing arguments validate as `undefined`; surplus arguments beyond the
/// declared positions pass through untouched. Validation failures surface
/// as `invalid_arguments` / `invalid_return_type` errors carrying the full
/// sub-error, each call raising through its own context.
#[derive(Clone)]
pub struct CheckedFunction {
    args: Vec<AnySchema>,
    returns: Option<AnySchema>,
    inner: Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>,
}

impl CheckedFunction {
    /// Invokes the implementation with validated arguments.
    pub fn call(&self, provided: Vec<Value>) -> Result<Value, ParseError> {
        let ctx = ParseContext::new_root(false, None, None, crate::schema::DEFAULT_MAX_DEPTH);

        let mut validated = Vec::with_capacity(provided.len().max(self.args.len()));
        let mut failed = false;
        for (i, schema) in self.args.iter().enumerate() {
            let arg = provided.get(i).cloned().unwrap_or(Value::Undefined);
            match schema.parse_value(&arg, &ctx.child(PathSegment::index(i))) {
                Some(out) => validated.push(out),
                None => failed = true,
            }
        }
        if failed {
            let inner = ParseError::from_vec(ctx.drain_issues());
            return Err(ParseError::single(crate::error::Issue {
                kind: IssueKind::InvalidArguments {
                    error: Box::new(inner),
                },
                path: crate::Path::root(),
                message: "invalid function arguments".to_string(),
                expected: None,
                received: None,
            }));
        }
        for extra in provided.into_iter().skip(self.args.len()) {
            validated.push(extra);
        }

        let result = (self.inner)(validated);

        match &self.returns {
            Some(schema) => {
                let ret_ctx =
                    ParseContext::new_root(false, None, None, crate::schema::DEFAULT_MAX_DEPTH);
                match schema.parse_value(&result, &ret_ctx) {
                    Some(out) if !ret_ctx.has_issues() => Ok(out),
                    _ => {
                        let inner = ParseError::from_vec(ret_ctx.drain_issues());
                        Err(ParseError::single(crate::error::Issue {
                            kind: IssueKind::InvalidReturnType {
                                error: Box::new(inner),
                            },
                            path: crate::Path::root(),
                            message: "invalid function return type".to_string(),
                            expected: None,
                            received: None,
                        }))
                    }
                }
            }
            None => Ok(result),
        }
    }
}

/// The promise kind: wraps a deferred value so its eventual resolution is
/// validated against the inner schema.
#[derive(Clone)]
pub struct PromiseKind {
    inner: AnySchema,
}

impl PromiseKind {
    pub(crate) fn new(inner: AnySchema) -> Self {
        Self { inner }
    }
}

impl SchemaKind for PromiseKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let deferred = match value {
            Value::Deferred(d) => d.clone(),
            other => {
                ctx.add_issue(IssueData::invalid_type("promise", other));
                return None;
            }
        };

        // The inner schema runs when the deferred settles, long after this
        // parse call returned, so it gets a sink of its own; rejection of
        // the original passes through unchanged.
        let inner = Arc::clone(&self.inner);
        let settle_ctx = ctx.speculative();
        Some(Value::Deferred(Deferred::new(move || {
            let resolved = deferred.resolve()?;
            let trial = settle_ctx.speculative();
            match inner.parse_value(&resolved, &trial) {
                Some(out) if !trial.has_issues() => Ok(out),
                _ => Err(ParseError::from_vec(trial.drain_issues())),
            }
        })))
    }

    fn type_name(&self) -> &'static str {
        "promise"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        self.inner.to_json_schema()
    }
}

/// The pipeline kind: value threads through the stages in order.
#[derive(Clone)]
pub struct PipelineKind {
    stages: Vec<AnySchema>,
}

impl PipelineKind {
    pub(crate) fn new(stages: Vec<AnySchema>) -> Self {
        Self { stages }
    }
}

impl SchemaKind for PipelineKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let mut current = value.clone();
        for stage in &self.stages {
            // Fail fast: later stages never see a value the earlier
            // stages rejected.
            current = stage.parse_value(&current, ctx)?;
        }
        Some(current)
    }

    fn type_name(&self) -> &'static str {
        "pipeline"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        for stage in &self.stages {
            stage.collect_refs(refs);
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        match self.stages.last() {
            Some(stage) => stage.to_json_schema(),
            None => serde_json::json!({}),
        }
    }
}

/// The preprocess kind: a fallible transform applied to the raw input
/// before the inner schema runs.
#[derive(Clone)]
pub struct PreprocessKind {
    apply: Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>,
    inner: AnySchema,
}

impl PreprocessKind {
    pub(crate) fn new(
        apply: Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>,
        inner: AnySchema,
    ) -> Self {
        Self { apply, inner }
    }
}

impl SchemaKind for PreprocessKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        match (self.apply)(value) {
            Ok(pre) => self.inner.parse_value(&pre, ctx),
            Err(message) => {
                ctx.add_issue(IssueData::custom(format!(
                    "Preprocessing failed: {}",
                    message
                )));
                None
            }
        }
    }

    fn type_name(&self) -> &'static str {
        "preprocess"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        self.inner.collect_refs(refs);
    }

    fn json_schema(&self) -> serde_json::Value {
        self.inner.to_json_schema()
    }
}

/// The reference kind: a named node resolved through the registry on
/// dereference, with depth tracking against runaway recursion.
///
/// This is the indirection that makes self-referential schema graphs safe
/// to build: the referenced body is looked up at parse time, so neither
/// construction nor registration recurses.
#[derive(Clone)]
pub struct RefKind {
    name: String,
}

impl RefKind {
    pub(crate) fn new(name: String) -> Self {
        Self { name }
    }

    /// The referenced schema's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SchemaKind for RefKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let registry = match ctx.registry() {
            Some(registry) => Arc::clone(registry),
            None => {
                ctx.add_issue(IssueData::custom(format!(
                    "reference to '{}' cannot be resolved without a registry; \
                     validate through SchemaRegistry or pass one in ParseOptions",
                    self.name
                )));
                return None;
            }
        };

        if ctx.depth() >= ctx.max_depth() {
            ctx.add_issue(IssueData::custom(format!(
                "maximum reference depth {} exceeded while resolving '{}'",
                ctx.max_depth(),
                self.name
            )));
            return None;
        }

        let schema = match registry.resolve(&self.name) {
            Some(schema) => schema,
            None => {
                ctx.add_issue(IssueData::custom(format!(
                    "schema '{}' not found in registry",
                    self.name
                )));
                return None;
            }
        };

        schema.parse_value(value, &ctx.descend())
    }

    fn type_name(&self) -> &'static str {
        "reference"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        refs.push(self.name.clone());
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "$ref": format!("#/$defs/{}", self.name) })
    }
}
