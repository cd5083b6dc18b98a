//! The accumulated-failure type returned by every parse entry point.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::error::Issue;
use crate::path::Path;

/// A non-empty, ordered collection of [`Issue`]s.
///
/// Wrapping a `NonEmptyVec` guarantees a failed parse always explains
/// itself with at least one diagnostic, which is what lets
/// `Validation<T, ParseError>` model the safe-parse result.
///
/// For the common single-failure case the first issue's code, path and
/// expected/received renderings are exposed directly.
///
/// # Combining
///
/// `ParseError` implements `Semigroup`, so failures from independent
/// validations can be merged while preserving order:
///
/// ```rust
/// use scrutiny::{ParseError, Path};
/// use stillwater::prelude::*;
///
/// let a = ParseError::single(scrutiny::Issue {
///     kind: scrutiny::IssueKind::Required,
///     path: Path::root().push_key("name"),
///     message: "required".to_string(),
///     expected: None,
///     received: None,
/// });
/// let b = ParseError::single(scrutiny::Issue {
///     kind: scrutiny::IssueKind::NotFinite,
///     path: Path::root().push_key("score"),
///     message: "number must be finite".to_string(),
///     expected: None,
///     received: None,
/// });
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(NonEmptyVec<Issue>);

impl ParseError {
    /// A failure carrying exactly one issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Builds a failure from collected issues.
    ///
    /// # Panics
    ///
    /// Panics if `issues` is empty. Every failing validator appends at
    /// least one issue before reporting failure, so an empty collection
    /// here is a bug in the engine, not in the caller's data.
    pub fn from_vec(issues: Vec<Issue>) -> Self {
        Self(NonEmptyVec::from_vec(issues).expect("a failed parse carries at least one issue"))
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collection types.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the issues in the order they were recorded.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// The first recorded issue.
    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// The first issue's code string.
    pub fn code(&self) -> &'static str {
        self.first().code()
    }

    /// The first issue's path.
    pub fn path(&self) -> &Path {
        &self.first().path
    }

    /// The first issue's expected rendering, if any.
    pub fn expected(&self) -> Option<&str> {
        self.first().expected.as_deref()
    }

    /// The first issue's received rendering, if any.
    pub fn received(&self) -> Option<&str> {
        self.first().received.as_deref()
    }

    /// All issues recorded at exactly `path`.
    pub fn at_path(&self, path: &Path) -> Vec<&Issue> {
        self.0.iter().filter(|i| &i.path == path).collect()
    }

    /// All issues whose kind renders to `code`.
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.code() == code).collect()
    }

    /// Consumes the error into a plain vector.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    /// Deterministic one-line-per-issue rendering.
    ///
    /// Each line reads `[a.b.c] message` with the path segments joined by
    /// dots; the bracket prefix is omitted for issues at the root path.
    pub fn format(&self) -> String {
        let lines: Vec<String> = self
            .0
            .iter()
            .map(|issue| {
                if issue.path.is_root() {
                    issue.message.clone()
                } else {
                    format!("[{}] {}", issue.path.dotted(), issue.message)
                }
            })
            .collect();
        lines.join("\n")
    }
}

impl Semigroup for ParseError {
    fn combine(self, other: Self) -> Self {
        ParseError(self.0.combine(other.0))
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl std::error::Error for ParseError {}

impl IntoIterator for ParseError {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseError {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ParseError>();
    assert_sync::<ParseError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;

    fn issue(path: Path, kind: IssueKind) -> Issue {
        let message = kind.default_message(None, None);
        Issue {
            kind,
            path,
            message,
            expected: None,
            received: None,
        }
    }

    #[test]
    fn first_issue_accessors() {
        let error = ParseError::from_vec(vec![
            issue(Path::root().push_key("name"), IssueKind::Required),
            issue(Path::root().push_key("age"), IssueKind::NotFinite),
        ]);

        assert_eq!(error.len(), 2);
        assert_eq!(error.code(), "required");
        assert_eq!(error.path().to_string(), "name");
    }

    #[test]
    fn format_brackets_non_root_paths() {
        let error = ParseError::from_vec(vec![
            issue(Path::root(), IssueKind::Custom),
            issue(
                Path::root().push_key("users").push_index(2).push_key("age"),
                IssueKind::Required,
            ),
        ]);

        let rendered = error.format();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "invalid input");
        assert_eq!(lines[1], "[users.2.age] required");
    }

    #[test]
    fn filters_by_path_and_code() {
        let name = Path::root().push_key("name");
        let age = Path::root().push_key("age");

        let error = ParseError::from_vec(vec![
            issue(name.clone(), IssueKind::Required),
            issue(age.clone(), IssueKind::Required),
            issue(age.clone(), IssueKind::NotFinite),
        ]);

        assert_eq!(error.at_path(&age).len(), 2);
        assert_eq!(error.with_code("required").len(), 2);
        assert_eq!(error.with_code("not_finite").len(), 1);
    }

    #[test]
    fn combine_preserves_order() {
        let a = ParseError::single(issue(Path::root().push_key("a"), IssueKind::Required));
        let b = ParseError::single(issue(Path::root().push_key("b"), IssueKind::Required));

        let combined = a.combine(b);
        let paths: Vec<String> = combined.issues().map(|i| i.path.to_string()).collect();
        assert_eq!(paths, vec!["a", "b"]);
    }
}
