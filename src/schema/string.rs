//! String validation: length bounds, sub-format checks and in-chain
//! transforms.

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, SizeSubject, StringFormat};
use crate::schema::{Schema, SchemaKind};
use crate::value::Value;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s]+$").expect("url pattern compiles")
});
static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern compiles")
});
static CUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[cC][^\s-]{8,}$").expect("cuid pattern compiles"));
static BASE64: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 pattern compiles")
});

#[derive(Clone)]
enum StringConstraint {
    Min {
        min: usize,
        message: Option<String>,
    },
    Max {
        max: usize,
        message: Option<String>,
    },
    Length {
        len: usize,
        message: Option<String>,
    },
    Format {
        format: StringFormat,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        pattern_str: String,
        message: Option<String>,
    },
    StartsWith {
        prefix: String,
        message: Option<String>,
    },
    EndsWith {
        suffix: String,
        message: Option<String>,
    },
    Contains {
        needle: String,
        message: Option<String>,
    },
    // Working-value transforms; they run in chain position, so constraints
    // registered after them see the transformed string.
    Trim,
    Lowercase,
    Uppercase,
}

/// The string kind: a fail-fast type check followed by an ordered
/// constraint chain that accumulates every violation.
#[derive(Clone)]
pub struct StringKind {
    constraints: Vec<StringConstraint>,
    type_error_message: Option<String>,
}

impl StringKind {
    pub(crate) fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    fn push(&mut self, constraint: StringConstraint) {
        self.constraints.push(constraint);
    }

    fn apply(
        &self,
        constraint: &StringConstraint,
        working: &mut String,
        ctx: &ParseContext,
    ) -> bool {
        match constraint {
            StringConstraint::Min { min, message } => {
                let len = working.chars().count();
                if len < *min {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooSmall {
                            subject: SizeSubject::String,
                            minimum: *min as f64,
                            inclusive: true,
                        })
                        .with_expected(format!("at least {} character(s)", min))
                        .with_received(format!("{} character(s)", len))
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::Max { max, message } => {
                let len = working.chars().count();
                if len > *max {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooBig {
                            subject: SizeSubject::String,
                            maximum: *max as f64,
                            inclusive: true,
                        })
                        .with_expected(format!("at most {} character(s)", max))
                        .with_received(format!("{} character(s)", len))
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::Length { len, message } => {
                let actual = working.chars().count();
                if actual != *len {
                    let kind = if actual < *len {
                        IssueKind::TooSmall {
                            subject: SizeSubject::String,
                            minimum: *len as f64,
                            inclusive: true,
                        }
                    } else {
                        IssueKind::TooBig {
                            subject: SizeSubject::String,
                            maximum: *len as f64,
                            inclusive: true,
                        }
                    };
                    ctx.add_issue(
                        IssueData::new(kind)
                            .with_expected(format!("exactly {} character(s)", len))
                            .with_received(format!("{} character(s)", actual))
                            .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::Format { format, message } => {
                let ok = match format {
                    StringFormat::Email => EMAIL.is_match(working),
                    StringFormat::Url => URL.is_match(working),
                    StringFormat::Uuid => UUID.is_match(working),
                    StringFormat::Cuid => CUID.is_match(working),
                    StringFormat::Base64 => {
                        working.len() % 4 == 0 && BASE64.is_match(working)
                    }
                    StringFormat::Datetime => {
                        chrono::DateTime::parse_from_rfc3339(working).is_ok()
                    }
                    StringFormat::Ip => IpAddr::from_str(working).is_ok(),
                    _ => true,
                };
                if !ok {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidString { format: *format })
                            .with_received(working.clone())
                            .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::Pattern {
                regex,
                pattern_str,
                message,
            } => {
                if !regex.is_match(working) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidString {
                            format: StringFormat::Pattern,
                        })
                        .with_expected(format!("string matching '{}'", pattern_str))
                        .with_received(working.clone())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::StartsWith { prefix, message } => {
                if !working.starts_with(prefix.as_str()) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidString {
                            format: StringFormat::StartsWith,
                        })
                        .with_expected(format!("string starting with '{}'", prefix))
                        .with_received(working.clone())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::EndsWith { suffix, message } => {
                if !working.ends_with(suffix.as_str()) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidString {
                            format: StringFormat::EndsWith,
                        })
                        .with_expected(format!("string ending with '{}'", suffix))
                        .with_received(working.clone())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::Contains { needle, message } => {
                if !working.contains(needle.as_str()) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidString {
                            format: StringFormat::Contains,
                        })
                        .with_expected(format!("string containing '{}'", needle))
                        .with_received(working.clone())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            StringConstraint::Trim => {
                *working = working.trim().to_string();
            }
            StringConstraint::Lowercase => {
                *working = working.to_lowercase();
            }
            StringConstraint::Uppercase => {
                *working = working.to_uppercase();
            }
        }
        true
    }
}

impl SchemaKind for StringKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let s = match value {
            Value::String(s) => s,
            other => {
                ctx.add_issue(
                    IssueData::invalid_type("string", other)
                        .with_message_opt(self.type_error_message.clone()),
                );
                return None;
            }
        };

        let mut working = s.clone();
        let mut violated = false;
        for constraint in &self.constraints {
            if !self.apply(constraint, &mut working, ctx) {
                violated = true;
            }
        }

        if violated {
            None
        } else {
            Some(Value::String(working))
        }
    }

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn json_schema(&self) -> serde_json::Value {
        let mut doc = serde_json::Map::new();
        doc.insert("type".to_string(), "string".into());
        for constraint in &self.constraints {
            match constraint {
                StringConstraint::Min { min, .. } => {
                    doc.insert("minLength".to_string(), (*min).into());
                }
                StringConstraint::Max { max, .. } => {
                    doc.insert("maxLength".to_string(), (*max).into());
                }
                StringConstraint::Length { len, .. } => {
                    doc.insert("minLength".to_string(), (*len).into());
                    doc.insert("maxLength".to_string(), (*len).into());
                }
                StringConstraint::Format { format, .. } => {
                    let name = match format {
                        StringFormat::Email => "email",
                        StringFormat::Url => "uri",
                        StringFormat::Uuid => "uuid",
                        StringFormat::Datetime => "date-time",
                        StringFormat::Ip => "ipv4",
                        _ => continue,
                    };
                    doc.insert("format".to_string(), name.into());
                }
                StringConstraint::Pattern { pattern_str, .. } => {
                    doc.insert("pattern".to_string(), pattern_str.clone().into());
                }
                _ => {}
            }
        }
        serde_json::Value::Object(doc)
    }
}

impl Schema<StringKind> {
    /// Requires at least `min` characters (Unicode scalar values).
    ///
    /// ```rust
    /// use scrutiny::schema::string;
    /// use serde_json::json;
    ///
    /// let schema = string().min(5);
    /// assert!(schema.safe_parse(json!("hello")).is_success());
    /// assert!(schema.safe_parse(json!("hi")).is_failure());
    /// ```
    pub fn min(mut self, min: usize) -> Self {
        self.kind.push(StringConstraint::Min { min, message: None });
        self
    }

    /// Requires at most `max` characters.
    pub fn max(mut self, max: usize) -> Self {
        self.kind.push(StringConstraint::Max { max, message: None });
        self
    }

    /// Requires exactly `len` characters.
    pub fn length(mut self, len: usize) -> Self {
        self.kind
            .push(StringConstraint::Length { len, message: None });
        self
    }

    /// Requires an email-shaped string.
    pub fn email(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Email,
            message: None,
        });
        self
    }

    /// Requires a URL with an explicit scheme.
    pub fn url(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Url,
            message: None,
        });
        self
    }

    /// Requires a hyphenated UUID.
    pub fn uuid(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Uuid,
            message: None,
        });
        self
    }

    /// Requires a cuid identifier.
    pub fn cuid(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Cuid,
            message: None,
        });
        self
    }

    /// Requires an RFC 3339 datetime string.
    pub fn datetime(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Datetime,
            message: None,
        });
        self
    }

    /// Requires an IPv4 or IPv6 address.
    pub fn ip(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Ip,
            message: None,
        });
        self
    }

    /// Requires standard base64 with padding.
    pub fn base64(mut self) -> Self {
        self.kind.push(StringConstraint::Format {
            format: StringFormat::Base64,
            message: None,
        });
        self
    }

    /// Requires the string to match `pattern`.
    ///
    /// Returns an error if the pattern itself does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.kind.push(StringConstraint::Pattern {
            regex,
            pattern_str: pattern.to_string(),
            message: None,
        });
        Ok(self)
    }

    /// Requires the string to start with `prefix`.
    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.kind.push(StringConstraint::StartsWith {
            prefix: prefix.into(),
            message: None,
        });
        self
    }

    /// Requires the string to end with `suffix`.
    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self {
        self.kind.push(StringConstraint::EndsWith {
            suffix: suffix.into(),
            message: None,
        });
        self
    }

    /// Requires the string to contain `needle`.
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.kind.push(StringConstraint::Contains {
            needle: needle.into(),
            message: None,
        });
        self
    }

    /// Trims surrounding whitespace from the working value.
    ///
    /// Runs in chain position: constraints registered after `trim` see the
    /// trimmed string.
    pub fn trim(mut self) -> Self {
        self.kind.push(StringConstraint::Trim);
        self
    }

    /// Lowercases the working value in chain position.
    pub fn lowercase(mut self) -> Self {
        self.kind.push(StringConstraint::Lowercase);
        self
    }

    /// Uppercases the working value in chain position.
    pub fn uppercase(mut self) -> Self {
        self.kind.push(StringConstraint::Uppercase);
        self
    }

    /// Sets a custom message for the most recent constraint, or for the
    /// type mismatch when no constraint has a message slot.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.kind.constraints.last_mut() {
            Some(StringConstraint::Min { message: m, .. })
            | Some(StringConstraint::Max { message: m, .. })
            | Some(StringConstraint::Length { message: m, .. })
            | Some(StringConstraint::Format { message: m, .. })
            | Some(StringConstraint::Pattern { message: m, .. })
            | Some(StringConstraint::StartsWith { message: m, .. })
            | Some(StringConstraint::EndsWith { message: m, .. })
            | Some(StringConstraint::Contains { message: m, .. }) => *m = Some(message),
            _ => self.kind.type_error_message = Some(message),
        }
        self
    }
}
