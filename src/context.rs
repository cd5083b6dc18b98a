//! The mutable, path-aware context threaded through a single parse call.
//!
//! One [`ParseContext`] is created per top-level parse. Deriving a child
//! context extends the path by one segment while sharing the same issue
//! sink, which is how diagnostics recorded deep inside a composite schema
//! surface at the root. The sink is mutex-guarded because parallel parsing
//! appends from rayon workers in overlapping turns.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Issue, IssueKind, ParseError};
use crate::path::{Path, PathSegment};
use crate::value::Value;

/// Resolves a custom message for an issue, or `None` to fall through.
///
/// The issue handed to the resolver already carries its default message,
/// so a resolver can wrap or replace it selectively by code or path.
pub type ErrorMap = Arc<dyn Fn(&Issue) -> Option<String> + Send + Sync>;

/// Registry lookup used to resolve named schema references at parse time.
///
/// Defined here rather than next to the registry so the context does not
/// depend on registry storage details.
pub trait RegistryAccess: Send + Sync {
    /// Returns the schema registered under `name`, if any.
    fn resolve(&self, name: &str) -> Option<crate::schema::AnySchema>;
}

/// State shared by every context derived from one root parse call.
pub(crate) struct CommonState {
    issues: Mutex<Vec<Issue>>,
    parallel: bool,
    error_map: Option<ErrorMap>,
    registry: Option<Arc<dyn RegistryAccess>>,
    max_depth: usize,
}

/// A partially-built issue, before the owning context stamps the path and
/// resolves the message.
///
/// Validators describe *what* failed; *where* is always the context's job.
#[derive(Clone)]
pub struct IssueData {
    kind: IssueKind,
    message: Option<String>,
    expected: Option<String>,
    received: Option<String>,
    path_suffix: Vec<PathSegment>,
}

impl IssueData {
    /// Starts an issue of the given kind.
    pub fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            message: None,
            expected: None,
            received: None,
            path_suffix: Vec::new(),
        }
    }

    /// A type-mismatch issue with expected/received renderings filled in.
    pub fn invalid_type(expected: &str, received: &Value) -> Self {
        Self::new(IssueKind::InvalidType)
            .with_expected(expected)
            .with_received(received.type_name())
    }

    /// A custom-check failure with the given message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueKind::Custom).with_message(message)
    }

    /// Sets an explicit message, overriding every resolver.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Keeps `message` as the explicit message when present.
    pub fn with_message_opt(mut self, message: Option<String>) -> Self {
        if message.is_some() {
            self.message = message;
        }
        self
    }

    /// Sets the expected rendering.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the received rendering.
    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }

    /// Records the issue under a sub-path of the reporting context, for
    /// cross-field checks that point at a sibling field.
    pub fn at(mut self, segment: PathSegment) -> Self {
        self.path_suffix.push(segment);
        self
    }
}

/// The context for one node of one parse call.
///
/// Cloning or deriving a child is cheap: the path is small and the shared
/// state sits behind an `Arc`.
#[derive(Clone)]
pub struct ParseContext {
    path: Path,
    depth: usize,
    schema_error_map: Option<ErrorMap>,
    common: Arc<CommonState>,
}

impl ParseContext {
    pub(crate) fn new_root(
        parallel: bool,
        error_map: Option<ErrorMap>,
        registry: Option<Arc<dyn RegistryAccess>>,
        max_depth: usize,
    ) -> Self {
        Self {
            path: Path::root(),
            depth: 0,
            schema_error_map: None,
            common: Arc::new(CommonState {
                issues: Mutex::new(Vec::new()),
                parallel,
                error_map,
                registry,
                max_depth,
            }),
        }
    }

    /// Derives a context for a nested value one segment deeper.
    ///
    /// The child shares the same issue sink; its schema-level resolver is
    /// cleared because resolvers attach per schema node, not per subtree.
    pub fn child(&self, segment: PathSegment) -> Self {
        Self {
            path: self.path.push(segment),
            depth: self.depth,
            schema_error_map: None,
            common: Arc::clone(&self.common),
        }
    }

    /// Forks a context with a fresh, empty sink at the same path.
    ///
    /// Used for trial parsing (union options, `catch`) where the issues of
    /// a failed attempt must be inspectable and discardable.
    pub fn speculative(&self) -> Self {
        Self {
            path: self.path.clone(),
            depth: self.depth,
            schema_error_map: self.schema_error_map.clone(),
            common: Arc::new(CommonState {
                issues: Mutex::new(Vec::new()),
                parallel: self.common.parallel,
                error_map: self.common.error_map.clone(),
                registry: self.common.registry.clone(),
                max_depth: self.common.max_depth,
            }),
        }
    }

    /// A copy carrying `map` as the per-schema message resolver.
    pub(crate) fn with_schema_error_map(&self, map: ErrorMap) -> Self {
        let mut ctx = self.clone();
        ctx.schema_error_map = Some(map);
        ctx
    }

    /// A copy one reference hop deeper.
    pub(crate) fn descend(&self) -> Self {
        let mut ctx = self.clone();
        ctx.depth += 1;
        ctx
    }

    /// Current reference-resolution depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Maximum allowed reference-resolution depth.
    pub fn max_depth(&self) -> usize {
        self.common.max_depth
    }

    /// True when this parse runs composite children as parallel tasks.
    pub fn parallel(&self) -> bool {
        self.common.parallel
    }

    /// The registry for resolving named references, if one was supplied.
    pub fn registry(&self) -> Option<&Arc<dyn RegistryAccess>> {
        self.common.registry.as_ref()
    }

    /// The path from the parse root to the value this context addresses.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamps the context path onto `data`, resolves its message and
    /// appends it to the shared sink.
    ///
    /// Message precedence: explicit message on the data, then the per-call
    /// resolver, then the per-schema resolver, then the built-in default.
    pub fn add_issue(&self, data: IssueData) {
        let mut path = self.path.clone();
        for segment in data.path_suffix {
            path = path.push(segment);
        }

        let default = data
            .kind
            .default_message(data.expected.as_deref(), data.received.as_deref());
        let mut issue = Issue {
            kind: data.kind,
            path,
            message: default,
            expected: data.expected,
            received: data.received,
        };

        if let Some(message) = data.message {
            issue.message = message;
        } else if let Some(message) = self
            .common
            .error_map
            .as_ref()
            .and_then(|map| map(&issue))
        {
            issue.message = message;
        } else if let Some(message) = self
            .schema_error_map
            .as_ref()
            .and_then(|map| map(&issue))
        {
            issue.message = message;
        }

        self.common.issues.lock().push(issue);
    }

    /// True once any context sharing this sink has recorded an issue.
    pub fn has_issues(&self) -> bool {
        !self.common.issues.lock().is_empty()
    }

    /// Drains the sink, returning the raw issues in recorded order.
    pub(crate) fn drain_issues(&self) -> Vec<Issue> {
        std::mem::take(&mut *self.common.issues.lock())
    }

    /// Appends previously captured issues, preserving their paths.
    pub(crate) fn absorb(&self, issues: Vec<Issue>) {
        if !issues.is_empty() {
            self.common.issues.lock().extend(issues);
        }
    }

    /// Snapshots the sink into a [`ParseError`], or `None` if clean.
    pub fn take_error(&self) -> Option<ParseError> {
        let issues = self.drain_issues();
        if issues.is_empty() {
            None
        } else {
            Some(ParseError::from_vec(issues))
        }
    }
}

/// The handle handed to `super_refine` callbacks.
///
/// Issues added through the handle fail the surrounding schema; the handle
/// tracks that locally so failure detection never depends on inspecting
/// the shared sink, which parallel siblings are appending to concurrently.
pub struct RefineContext<'a> {
    ctx: &'a ParseContext,
    dirty: Cell<bool>,
}

impl<'a> RefineContext<'a> {
    pub(crate) fn new(ctx: &'a ParseContext) -> Self {
        Self {
            ctx,
            dirty: Cell::new(false),
        }
    }

    /// Records an issue against the value under refinement.
    pub fn add_issue(&self, data: IssueData) {
        self.dirty.set(true);
        self.ctx.add_issue(data);
    }

    /// Shorthand for a `custom` issue with the given message.
    pub fn add_custom(&self, message: impl Into<String>) {
        self.add_issue(IssueData::custom(message));
    }

    /// The path of the value under refinement.
    pub fn path(&self) -> &Path {
        self.ctx.path()
    }

    pub(crate) fn dirty(&self) -> bool {
        self.dirty.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ParseContext {
        ParseContext::new_root(false, None, None, 100)
    }

    #[test]
    fn child_contexts_share_one_sink() {
        let ctx = root();
        let child = ctx.child(PathSegment::key("user"));
        let grandchild = child.child(PathSegment::index(0));

        grandchild.add_issue(IssueData::new(IssueKind::Required));

        assert!(ctx.has_issues());
        let error = ctx.take_error().unwrap();
        assert_eq!(error.path().to_string(), "user[0]");
    }

    #[test]
    fn speculative_contexts_do_not_leak_issues() {
        let ctx = root();
        let trial = ctx.speculative();

        trial.add_issue(IssueData::new(IssueKind::Custom));

        assert!(trial.has_issues());
        assert!(!ctx.has_issues());
    }

    #[test]
    fn explicit_message_beats_resolvers() {
        let map: ErrorMap = Arc::new(|_| Some("from resolver".to_string()));
        let ctx = ParseContext::new_root(false, Some(map), None, 100);

        ctx.add_issue(IssueData::new(IssueKind::Required).with_message("explicit"));
        ctx.add_issue(IssueData::new(IssueKind::Required));

        let error = ctx.take_error().unwrap();
        let messages: Vec<&str> = error.issues().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["explicit", "from resolver"]);
    }

    #[test]
    fn contextual_resolver_beats_schema_resolver() {
        let contextual: ErrorMap = Arc::new(|_| Some("contextual".to_string()));
        let schema: ErrorMap = Arc::new(|_| Some("schema".to_string()));

        let ctx = ParseContext::new_root(false, Some(contextual), None, 100)
            .with_schema_error_map(schema);
        ctx.add_issue(IssueData::new(IssueKind::Required));

        let error = ctx.take_error().unwrap();
        assert_eq!(error.first().message, "contextual");
    }

    #[test]
    fn schema_resolver_falls_back_from_none() {
        let schema: ErrorMap = Arc::new(|issue| {
            if issue.code() == "required" {
                Some("field is mandatory".to_string())
            } else {
                None
            }
        });

        let ctx = root().with_schema_error_map(schema);
        ctx.add_issue(IssueData::new(IssueKind::Required));
        ctx.add_issue(IssueData::new(IssueKind::NotFinite));

        let error = ctx.take_error().unwrap();
        let messages: Vec<&str> = error.issues().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["field is mandatory", "number must be finite"]);
    }

    #[test]
    fn issue_suffix_extends_the_context_path() {
        let ctx = root().child(PathSegment::key("order"));
        ctx.add_issue(IssueData::new(IssueKind::Custom).at(PathSegment::key("total")));

        let error = ctx.take_error().unwrap();
        assert_eq!(error.path().to_string(), "order.total");
    }

    #[test]
    fn refine_context_tracks_dirtiness_locally() {
        let ctx = root();
        // Pre-existing unrelated issue from elsewhere in the tree.
        ctx.add_issue(IssueData::new(IssueKind::Required));

        let handle = RefineContext::new(&ctx);
        assert!(!handle.dirty());
        handle.add_custom("totals disagree");
        assert!(handle.dirty());
    }
}
