//! Diagnostics: the issue taxonomy and the accumulated parse error.

mod issue;
mod parse_error;

pub use issue::{Issue, IssueKind, SizeSubject, StringFormat};
pub use parse_error::ParseError;
