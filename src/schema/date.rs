//! Date validation with ordering bounds.

use chrono::{DateTime, Utc};

use crate::context::{IssueData, ParseContext};
use crate::error::{IssueKind, SizeSubject};
use crate::schema::{Schema, SchemaKind};
use crate::value::Value;

#[derive(Clone)]
enum DateConstraint {
    Min {
        value: DateTime<Utc>,
        message: Option<String>,
    },
    Max {
        value: DateTime<Utc>,
        message: Option<String>,
    },
}

/// The date kind.
///
/// Accepts a date value directly, or a finite number interpreted as epoch
/// milliseconds; anything else number-shaped that cannot name an instant
/// reports `invalid_date`.
#[derive(Clone)]
pub struct DateKind {
    constraints: Vec<DateConstraint>,
    type_error_message: Option<String>,
}

impl DateKind {
    pub(crate) fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
        }
    }
}

impl SchemaKind for DateKind {
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value> {
        let instant = match value {
            Value::Date(d) => *d,
            Value::Number(n) => {
                if !n.is_finite() {
                    ctx.add_issue(
                        IssueData::new(IssueKind::InvalidDate).with_received(n.to_string()),
                    );
                    return None;
                }
                match DateTime::from_timestamp_millis(*n as i64) {
                    Some(d) => d,
                    None => {
                        ctx.add_issue(
                            IssueData::new(IssueKind::InvalidDate).with_received(n.to_string()),
                        );
                        return None;
                    }
                }
            }
            other => {
                ctx.add_issue(
                    IssueData::invalid_type("date", other)
                        .with_message_opt(self.type_error_message.clone()),
                );
                return None;
            }
        };

        let mut violated = false;
        for constraint in &self.constraints {
            match constraint {
                DateConstraint::Min { value, message } => {
                    if instant < *value {
                        ctx.add_issue(
                            IssueData::new(IssueKind::TooSmall {
                                subject: SizeSubject::Date,
                                minimum: value.timestamp_millis() as f64,
                                inclusive: true,
                            })
                            .with_received(instant.to_rfc3339())
                            .with_message_opt(message.clone()),
                        );
                        violated = true;
                    }
                }
                DateConstraint::Max { value, message } => {
                    if instant > *value {
                        ctx.add_issue(
                            IssueData::new(IssueKind::TooBig {
                                subject: SizeSubject::Date,
                                maximum: value.timestamp_millis() as f64,
                                inclusive: true,
                            })
                            .with_received(instant.to_rfc3339())
                            .with_message_opt(message.clone()),
                        );
                        violated = true;
                    }
                }
            }
        }

        if violated {
            None
        } else {
            Some(Value::Date(instant))
        }
    }

    fn type_name(&self) -> &'static str {
        "date"
    }

    fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "string", "format": "date-time" })
    }
}

impl Schema<DateKind> {
    /// Requires the date to be on or after `value`.
    pub fn min(mut self, value: DateTime<Utc>) -> Self {
        self.kind.constraints.push(DateConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Requires the date to be on or before `value`.
    pub fn max(mut self, value: DateTime<Utc>) -> Self {
        self.kind.constraints.push(DateConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Sets a custom message for the most recent bound, or for the type
    /// mismatch when none exists.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.kind.constraints.last_mut() {
            Some(DateConstraint::Min { message: m, .. })
            | Some(DateConstraint::Max { message: m, .. }) => *m = Some(message),
            None => self.kind.type_error_message = Some(message),
        }
        self
    }
}
