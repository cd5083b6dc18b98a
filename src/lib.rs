//! # Scrutiny
//!
//! A schema validation engine for untyped in-memory values. Schemas are
//! composed declaratively, and a parse either produces a typed value or an
//! error carrying *every* diagnostic with its exact data path, not just
//! the first failure.
//!
//! ## Overview
//!
//! - Build schemas from the constructor functions in [`schema`]
//!   ([`schema::string`], [`schema::object`], [`schema::union`], ...),
//!   refine them with kind-specific builders, and layer modifiers
//!   (`optional`, `nullable`, `default_value`, `catch`, `refine`,
//!   `transform`) that behave the same for every kind.
//! - `parse` returns `Result<Value, ParseError>`; `safe_parse` returns a
//!   tagged `Validation<Value, ParseError>`. The `*_parallel` variants run
//!   sibling fields and elements as settle-all tasks, so every element's
//!   failure is collected even in wide containers.
//! - Recursive structures register their bodies in a [`SchemaRegistry`]
//!   and link by name with [`schema::reference`].
//!
//! ## Example
//!
//! ```rust
//! use scrutiny::schema::{number, object, string};
//! use serde_json::json;
//!
//! let user = object()
//!     .field("name", string().min(1))
//!     .field("age", number().int().nonnegative());
//!
//! let result = user.safe_parse(json!({"name": "", "age": -3}));
//! let error = result.into_result().unwrap_err();
//!
//! // Both failures are reported, each at its own path.
//! assert_eq!(error.len(), 2);
//! assert_eq!(error.format(), "[name] string must contain at least 1 character(s)\n\
//!                             [age] number must be greater than or equal to 0");
//! ```

pub mod context;
pub mod error;
pub mod interop;
pub mod path;
pub mod registry;
pub mod schema;
pub mod value;

pub use context::{ErrorMap, IssueData, ParseContext, RefineContext, RegistryAccess};
pub use error::{Issue, IssueKind, ParseError, SizeSubject, StringFormat};
pub use path::{Path, PathSegment};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{AnySchema, ParseOptions, Schema, SchemaBuildError, SchemaNode};
pub use value::{Deferred, NativeFn, Value};

/// Type alias for the tagged result of `safe_parse`.
pub type ParseResult = stillwater::Validation<Value, ParseError>;
