//! Numeric validation for double-precision numbers and big integers.

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, SizeSubject};
use crate::schema::{Schema, SchemaKind};
use crate::value::Value;

/// Largest integer a double represents exactly.
const MAX_SAFE: f64 = 9007199254740991.0;

#[derive(Clone)]
enum NumberConstraint {
    Gt { value: f64, message: Option<String> },
    Gte { value: f64, message: Option<String> },
    Lt { value: f64, message: Option<String> },
    Lte { value: f64, message: Option<String> },
    Int { message: Option<String> },
    MultipleOf { value: f64, message: Option<String> },
    Finite { message: Option<String> },
    Safe { message: Option<String> },
}

/// The number kind: a fail-fast type check, then every bound and shape
/// constraint reported together.
#[derive(Clone)]
pub struct NumberKind {
    constraints: Vec<NumberConstraint>,
    type_error_message: Option<String>,
}

/// Remainder computed after shifting both operands to integers, so that
/// `0.3 % 0.1` style float artifacts do not produce spurious violations.
fn float_safe_remainder(a: f64, b: f64) -> f64 {
    fn decimals(x: f64) -> u32 {
        let rendered = x.to_string();
        rendered
            .split('.')
            .nth(1)
            .map(|frac| frac.len() as u32)
            .unwrap_or(0)
    }
    let step = 10f64.powi(decimals(a).max(decimals(b)) as i32);
    ((a * step).round() % (b * step).round()) / step
}

impl NumberKind {
    pub(crate) fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    fn apply(&self, constraint: &NumberConstraint, n: f64, ctx: &ParseContext) -> bool {
        match constraint {
            NumberConstraint::Gt { value, message } => {
                if !(n > *value) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooSmall {
                            subject: SizeSubject::Number,
                            minimum: *value,
                            inclusive: false,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::Gte { value, message } => {
                if !(n >= *value) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooSmall {
                            subject: SizeSubject::Number,
                            minimum: *value,
                            inclusive: true,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::Lt { value, message } => {
                if !(n < *value) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooBig {
                            subject: SizeSubject::Number,
                            maximum: *value,
                            inclusive: false,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::Lte { value, message } => {
                if !(n <= *value) {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooBig {
                            subject: SizeSubject::Number,
                            maximum: *value,
                            inclusive: true,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::Int { message } => {
                if n.fract() != 0.0 || !n.is_finite() {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidType)
                            .with_expected("integer")
                            .with_received("float")
                            .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::MultipleOf { value, message } => {
                if float_safe_remainder(n, *value) != 0.0 {
                    ctx.add_issue(
                        IssueData::new(IssueKind::NotMultipleOf {
                            multiple_of: *value,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::Finite { message } => {
                if !n.is_finite() {
                    ctx.add_issue(
                        IssueData::new(IssueKind::NotFinite)
                            .with_received(n.to_string())
                            .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
            NumberConstraint::Safe { message } => {
                if n < -MAX_SAFE {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooSmall {
                            subject: SizeSubject::Number,
                            minimum: -MAX_SAFE,
                            inclusive: true,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
                if n > MAX_SAFE {
                    ctx.add_issue(
                        IssueData::new(IssueKind::TooBig {
                            subject: SizeSubject::Number,
                            maximum: MAX_SAFE,
                            inclusive: true,
                        })
                        .with_received(n.to_string())
                        .with_message_opt(message.clone()),
                    );
                    return false;
                }
            }
        }
        true
    }
}

impl SchemaKind for NumberKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let n = match value {
            Value::Number(n) => *n,
            other => {
                ctx.add_issue(
                    IssueData::invalid_type("number", other)
                        .with_message_opt(self.type_error_message.clone()),
                );
                return None;
            }
        };

        let mut violated = false;
        for constraint in &self.constraints {
            if !self.apply(constraint, n, ctx) {
                violated = true;
            }
        }

        if violated {
            None
        } else {
            Some(Value::Number(n))
        }
    }

    fn type_name(&self) -> &'static str {
        "number"
    }

    fn json_schema(&self) -> serde_json::Value {
        let is_int = self
            .constraints
            .iter()
            .any(|c| matches!(c, NumberConstraint::Int { .. }));
        let mut doc = serde_json::Map::new();
        doc.insert(
            "type".to_string(),
            if is_int { "integer" } else { "number" }.into(),
        );
        for constraint in &self.constraints {
            match constraint {
                NumberConstraint::Gt { value, .. } => {
                    doc.insert("exclusiveMinimum".to_string(), (*value).into());
                }
                NumberConstraint::Gte { value, .. } => {
                    doc.insert("minimum".to_string(), (*value).into());
                }
                NumberConstraint::Lt { value, .. } => {
                    doc.insert("exclusiveMaximum".to_string(), (*value).into());
                }
                NumberConstraint::Lte { value, .. } => {
                    doc.insert("maximum".to_string(), (*value).into());
                }
                NumberConstraint::MultipleOf { value, .. } => {
                    doc.insert("multipleOf".to_string(), (*value).into());
                }
                _ => {}
            }
        }
        serde_json::Value::Object(doc)
    }
}

impl Schema<NumberKind> {
    /// Requires `n > value`.
    pub fn gt(mut self, value: f64) -> Self {
        self.kind.constraints.push(NumberConstraint::Gt {
            value,
            message: None,
        });
        self
    }

    /// Requires `n >= value`.
    pub fn gte(mut self, value: f64) -> Self {
        self.kind.constraints.push(NumberConstraint::Gte {
            value,
            message: None,
        });
        self
    }

    /// Alias for [`gte`](Self::gte).
    pub fn min(self, value: f64) -> Self {
        self.gte(value)
    }

    /// Requires `n < value`.
    pub fn lt(mut self, value: f64) -> Self {
        self.kind.constraints.push(NumberConstraint::Lt {
            value,
            message: None,
        });
        self
    }

    /// Requires `n <= value`.
    pub fn lte(mut self, value: f64) -> Self {
        self.kind.constraints.push(NumberConstraint::Lte {
            value,
            message: None,
        });
        self
    }

    /// Alias for [`lte`](Self::lte).
    pub fn max(self, value: f64) -> Self {
        self.lte(value)
    }

    /// Requires a whole number.
    pub fn int(mut self) -> Self {
        self.kind
            .constraints
            .push(NumberConstraint::Int { message: None });
        self
    }

    /// Requires `n > 0`.
    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    /// Requires `n < 0`.
    pub fn negative(self) -> Self {
        self.lt(0.0)
    }

    /// Requires `n >= 0`.
    pub fn nonnegative(self) -> Self {
        self.gte(0.0)
    }

    /// Requires `n <= 0`.
    pub fn nonpositive(self) -> Self {
        self.lte(0.0)
    }

    /// Requires `n` to be divisible by `value`.
    pub fn multiple_of(mut self, value: f64) -> Self {
        self.kind.constraints.push(NumberConstraint::MultipleOf {
            value,
            message: None,
        });
        self
    }

    /// Rejects infinities and NaN.
    pub fn finite(mut self) -> Self {
        self.kind
            .constraints
            .push(NumberConstraint::Finite { message: None });
        self
    }

    /// Requires magnitude within exact double-integer range.
    pub fn safe(mut self) -> Self {
        self.kind
            .constraints
            .push(NumberConstraint::Safe { message: None });
        self
    }

    /// Sets a custom message for the most recent constraint, or for the
    /// type mismatch when none exists.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.kind.constraints.last_mut() {
            Some(NumberConstraint::Gt { message: m, .. })
            | Some(NumberConstraint::Gte { message: m, .. })
            | Some(NumberConstraint::Lt { message: m, .. })
            | Some(NumberConstraint::Lte { message: m, .. })
            | Some(NumberConstraint::Int { message: m })
            | Some(NumberConstraint::MultipleOf { message: m, .. })
            | Some(NumberConstraint::Finite { message: m })
            | Some(NumberConstraint::Safe { message: m }) => *m = Some(message),
            None => self.kind.type_error_message = Some(message),
        }
        self
    }
}

#[derive(Clone)]
enum BigIntConstraint {
    Gt { value: i128, message: Option<String> },
    Gte { value: i128, message: Option<String> },
    Lt { value: i128, message: Option<String> },
    Lte { value: i128, message: Option<String> },
    MultipleOf { value: i128, message: Option<String> },
}

/// The big-integer kind.
#[derive(Clone)]
pub struct BigIntKind {
    constraints: Vec<BigIntConstraint>,
    type_error_message: Option<String>,
}

impl BigIntKind {
    pub(crate) fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    fn apply(&self, constraint: &BigIntConstraint, n: i128, ctx: &ParseContext) -> bool {
        let (ok, kind, message) = match constraint {
            BigIntConstraint::Gt { value, message } => (
                n > *value,
                IssueKind::TooSmall {
                    subject: SizeSubject::Number,
                    minimum: *value as f64,
                    inclusive: false,
                },
                message,
            ),
            BigIntConstraint::Gte { value, message } => (
                n >= *value,
                IssueKind::TooSmall {
                    subject: SizeSubject::Number,
                    minimum: *value as f64,
                    inclusive: true,
                },
                message,
            ),
            BigIntConstraint::Lt { value, message } => (
                n < *value,
                IssueKind::TooBig {
                    subject: SizeSubject::Number,
                    maximum: *value as f64,
                    inclusive: false,
                },
                message,
            ),
            BigIntConstraint::Lte { value, message } => (
                n <= *value,
                IssueKind::TooBig {
                    subject: SizeSubject::Number,
                    maximum: *value as f64,
                    inclusive: true,
                },
                message,
            ),
            BigIntConstraint::MultipleOf { value, message } => (
                *value != 0 && n % *value == 0,
                IssueKind::NotMultipleOf {
                    multiple_of: *value as f64,
                },
                message,
            ),
        };

        if !ok {
            ctx.add_issue(
                IssueData::new(kind)
                    .with_received(n.to_string())
                    .with_message_opt(message.clone()),
            );
        }
        ok
    }
}

impl SchemaKind for BigIntKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let n = match value {
            Value::BigInt(n) => *n,
            other => {
                ctx.add_issue(
                    IssueData::invalid_type("bigint", other)
                        .with_message_opt(self.type_error_message.clone()),
                );
                return None;
            }
        };

        let mut violated = false;
        for constraint in &self.constraints {
            if !self.apply(constraint, n, ctx) {
                violated = true;
            }
        }

        if violated {
            None
        } else {
            Some(Value::BigInt(n))
        }
    }

    fn type_name(&self) -> &'static str {
        "bigint"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "integer" })
    }
}

impl Schema<BigIntKind> {
    /// Requires `n > value`.
    pub fn gt(mut self, value: i128) -> Self {
        self.kind.constraints.push(BigIntConstraint::Gt {
            value,
            message: None,
        });
        self
    }

    /// Requires `n >= value`.
    pub fn gte(mut self, value: i128) -> Self {
        self.kind.constraints.push(BigIntConstraint::Gte {
            value,
            message: None,
        });
        self
    }

    /// Requires `n < value`.
    pub fn lt(mut self, value: i128) -> Self {
        self.kind.constraints.push(BigIntConstraint::Lt {
            value,
            message: None,
        });
        self
    }

    /// Requires `n <= value`.
    pub fn lte(mut self, value: i128) -> Self {
        self.kind.constraints.push(BigIntConstraint::Lte {
            value,
            message: None,
        });
        self
    }

    /// Requires `n > 0`.
    pub fn positive(self) -> Self {
        self.gt(0)
    }

    /// Requires `n < 0`.
    pub fn negative(self) -> Self {
        self.lt(0)
    }

    /// Requires `n >= 0`.
    pub fn nonnegative(self) -> Self {
        self.gte(0)
    }

    /// Requires `n <= 0`.
    pub fn nonpositive(self) -> Self {
        self.lte(0)
    }

    /// Requires `n` to be divisible by `value`.
    pub fn multiple_of(mut self, value: i128) -> Self {
        self.kind.constraints.push(BigIntConstraint::MultipleOf {
            value,
            message: None,
        });
        self
    }

    /// Sets a custom message for the most recent constraint, or for the
    /// type mismatch when none exists.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.kind.constraints.last_mut() {
            Some(BigIntConstraint::Gt { message: m, .. })
            | Some(BigIntConstraint::Gte { message: m, .. })
            | Some(BigIntConstraint::Lt { message: m, .. })
            | Some(BigIntConstraint::Lte { message: m, .. })
            | Some(BigIntConstraint::MultipleOf { message: m, .. }) => *m = Some(message),
            None => self.kind.type_error_message = Some(message),
        }
        self
    }
}
