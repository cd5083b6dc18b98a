//! Single-diagnostic types: [`Issue`] and its code taxonomy [`IssueKind`].

use std::fmt::{self, Display};

use crate::error::ParseError;
use crate::path::Path;
use crate::value::Value;

/// What a size bound was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSubject {
    /// String length in characters.
    String,
    /// Array or tuple length in items.
    Array,
    /// Numeric magnitude.
    Number,
    /// Date ordering (bounds are epoch milliseconds).
    Date,
    /// Set size in items.
    Set,
}

/// The string sub-format a value failed to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    Cuid,
    Datetime,
    Ip,
    Base64,
    Pattern,
    StartsWith,
    EndsWith,
    Contains,
}

impl StringFormat {
    /// Lowercase name used in messages and JSON-Schema `format` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Cuid => "cuid",
            StringFormat::Datetime => "datetime",
            StringFormat::Ip => "ip",
            StringFormat::Base64 => "base64",
            StringFormat::Pattern => "pattern",
            StringFormat::StartsWith => "starts_with",
            StringFormat::EndsWith => "ends_with",
            StringFormat::Contains => "contains",
        }
    }
}

/// The flat, parameterized error-code taxonomy.
///
/// Structured detail rides in the variant payloads (sub-errors for unions
/// and function calls, offending keys, bounds with inclusivity). The
/// snake_case code string for each variant is available via
/// [`code`](Self::code) for programmatic filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// The value's type does not match the schema's.
    InvalidType,
    /// The value does not equal the expected literal.
    InvalidLiteral { expected: Value },
    /// A refinement or user-supplied check failed.
    Custom,
    /// No union option accepted the value; one full sub-error per option.
    InvalidUnion { union_errors: Vec<ParseError> },
    /// The discriminator field matched no variant.
    InvalidUnionDiscriminator { options: Vec<String> },
    /// The value is not one of the allowed literal set.
    InvalidEnumValue { options: Vec<Value> },
    /// Keys present in the input but absent from the shape (strict objects).
    UnrecognizedKeys { keys: Vec<String> },
    /// A checked function call received invalid arguments.
    InvalidArguments { error: Box<ParseError> },
    /// A checked function call produced an invalid return value.
    InvalidReturnType { error: Box<ParseError> },
    /// Not a representable point in time.
    InvalidDate,
    /// A string sub-format check failed.
    InvalidString { format: StringFormat },
    /// Below a minimum bound.
    TooSmall {
        subject: SizeSubject,
        minimum: f64,
        inclusive: bool,
    },
    /// Above a maximum bound.
    TooBig {
        subject: SizeSubject,
        maximum: f64,
        inclusive: bool,
    },
    /// Not divisible by the required step.
    NotMultipleOf { multiple_of: f64 },
    /// Not a finite number.
    NotFinite,
    /// A required field is missing.
    Required,
}

impl IssueKind {
    /// The snake_case code string for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::InvalidType => "invalid_type",
            IssueKind::InvalidLiteral { .. } => "invalid_literal",
            IssueKind::Custom => "custom",
            IssueKind::InvalidUnion { .. } => "invalid_union",
            IssueKind::InvalidUnionDiscriminator { .. } => "invalid_union_discriminator",
            IssueKind::InvalidEnumValue { .. } => "invalid_enum_value",
            IssueKind::UnrecognizedKeys { .. } => "unrecognized_keys",
            IssueKind::InvalidArguments { .. } => "invalid_arguments",
            IssueKind::InvalidReturnType { .. } => "invalid_return_type",
            IssueKind::InvalidDate => "invalid_date",
            IssueKind::InvalidString { .. } => "invalid_string",
            IssueKind::TooSmall { .. } => "too_small",
            IssueKind::TooBig { .. } => "too_big",
            IssueKind::NotMultipleOf { .. } => "not_multiple_of",
            IssueKind::NotFinite => "not_finite",
            IssueKind::Required => "required",
        }
    }

    /// The built-in message for this kind, used when no resolver overrides.
    pub(crate) fn default_message(
        &self,
        expected: Option<&str>,
        received: Option<&str>,
    ) -> String {
        match self {
            IssueKind::InvalidType => format!(
                "expected {}, received {}",
                expected.unwrap_or("a different type"),
                received.unwrap_or("something else"),
            ),
            IssueKind::InvalidLiteral { expected } => {
                format!("invalid literal value, expected {}", expected.to_compact_string())
            }
            IssueKind::Custom => "invalid input".to_string(),
            IssueKind::InvalidUnion { union_errors } => {
                format!("invalid input: no match among {} union options", union_errors.len())
            }
            IssueKind::InvalidUnionDiscriminator { options } => {
                format!("invalid discriminator value, expected one of: {}", options.join(", "))
            }
            IssueKind::InvalidEnumValue { options } => {
                let names: Vec<String> =
                    options.iter().map(Value::to_compact_string).collect();
                format!("invalid enum value, expected one of: {}", names.join(", "))
            }
            IssueKind::UnrecognizedKeys { keys } => {
                let quoted: Vec<String> = keys.iter().map(|k| format!("'{}'", k)).collect();
                format!("unrecognized key(s) in object: {}", quoted.join(", "))
            }
            IssueKind::InvalidArguments { .. } => "invalid function arguments".to_string(),
            IssueKind::InvalidReturnType { .. } => "invalid function return type".to_string(),
            IssueKind::InvalidDate => "invalid date".to_string(),
            IssueKind::InvalidString { format } => format!("invalid {}", format.as_str()),
            IssueKind::TooSmall {
                subject,
                minimum,
                inclusive,
            } => bound_message(*subject, *minimum, *inclusive, true),
            IssueKind::TooBig {
                subject,
                maximum,
                inclusive,
            } => bound_message(*subject, *maximum, *inclusive, false),
            IssueKind::NotMultipleOf { multiple_of } => {
                format!("number must be a multiple of {}", multiple_of)
            }
            IssueKind::NotFinite => "number must be finite".to_string(),
            IssueKind::Required => "required".to_string(),
        }
    }
}

fn bound_message(subject: SizeSubject, bound: f64, inclusive: bool, lower: bool) -> String {
    match subject {
        SizeSubject::String => {
            let verb = if lower { "at least" } else { "at most" };
            format!("string must contain {} {} character(s)", verb, bound)
        }
        SizeSubject::Array => {
            let verb = if lower { "at least" } else { "at most" };
            format!("array must contain {} {} item(s)", verb, bound)
        }
        SizeSubject::Set => {
            let verb = if lower { "at least" } else { "at most" };
            format!("set must contain {} {} item(s)", verb, bound)
        }
        SizeSubject::Number => {
            let cmp = match (lower, inclusive) {
                (true, true) => "greater than or equal to",
                (true, false) => "greater than",
                (false, true) => "less than or equal to",
                (false, false) => "less than",
            };
            format!("number must be {} {}", cmp, bound)
        }
        SizeSubject::Date => {
            let cmp = match (lower, inclusive) {
                (true, true) => "on or after",
                (true, false) => "after",
                (false, true) => "on or before",
                (false, false) => "before",
            };
            let instant = chrono::DateTime::from_timestamp_millis(bound as i64)
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| bound.to_string());
            format!("date must be {} {}", cmp, instant)
        }
    }
}

/// One diagnostic: what failed, where, and why.
///
/// The path is stamped by the owning [`ParseContext`](crate::ParseContext),
/// never by the validator that raised the issue, so it always equals the
/// exact access chain from the parse root.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// The code and its structured detail.
    pub kind: IssueKind,
    /// Where in the input the failure occurred.
    pub path: Path,
    /// Resolved human-readable message.
    pub message: String,
    /// What was expected, when a useful rendering exists.
    pub expected: Option<String>,
    /// What was actually received, when a useful rendering exists.
    pub received: Option<String>,
}

impl Issue {
    /// The snake_case code string of this issue's kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{}: {}", path, self.message)?;
        if let Some(expected) = &self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(received) = &self.received {
            write!(f, " (received: {})", received)?;
        }
        Ok(())
    }
}

impl std::error::Error for Issue {}

// Issue must stay shareable across rayon workers appending to one sink.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueKind) -> Issue {
        let message = kind.default_message(None, None);
        Issue {
            kind,
            path: Path::root().push_key("field"),
            message,
            expected: None,
            received: None,
        }
    }

    #[test]
    fn codes_are_snake_case() {
        assert_eq!(IssueKind::InvalidType.code(), "invalid_type");
        assert_eq!(
            IssueKind::UnrecognizedKeys { keys: vec![] }.code(),
            "unrecognized_keys"
        );
        assert_eq!(
            IssueKind::TooSmall {
                subject: SizeSubject::String,
                minimum: 3.0,
                inclusive: true,
            }
            .code(),
            "too_small"
        );
    }

    #[test]
    fn default_messages_mention_bounds() {
        let msg = IssueKind::TooSmall {
            subject: SizeSubject::String,
            minimum: 3.0,
            inclusive: true,
        }
        .default_message(None, None);
        assert!(msg.contains("at least 3"));

        let msg = IssueKind::TooBig {
            subject: SizeSubject::Number,
            maximum: 10.0,
            inclusive: false,
        }
        .default_message(None, None);
        assert!(msg.contains("less than 10"));
    }

    #[test]
    fn unrecognized_keys_message_lists_keys() {
        let msg = IssueKind::UnrecognizedKeys {
            keys: vec!["a".to_string(), "b".to_string()],
        }
        .default_message(None, None);
        assert!(msg.contains("'a', 'b'"));
    }

    #[test]
    fn display_includes_path_and_context() {
        let mut i = issue(IssueKind::Custom);
        i.expected = Some("even number".to_string());
        i.received = Some("7".to_string());

        let rendered = i.to_string();
        assert!(rendered.contains("field: invalid input"));
        assert!(rendered.contains("expected: even number"));
        assert!(rendered.contains("received: 7"));
    }
}
