//! The two-layer schema contract.
//!
//! [`SchemaKind`] is the hook a concrete validator implements: a type check
//! plus kind-specific constraints. [`SchemaNode`] is the erased, uniform
//! surface the engine composes against; it is implemented exactly once, for
//! [`Schema<K>`], which wraps every kind in the shared modifier pipeline.
//! The trait is sealed so modifier handling never depends on probing for
//! optionally-present methods.

use std::sync::Arc;

use crate::context::ParseContext;
use crate::schema::Schema;
use crate::value::Value;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A concrete validator for one schema kind.
///
/// `check` appends issues through the context and returns the validated
/// (possibly rebuilt) value, or `None` when this subtree failed. Success
/// implies the kind appended no issues; failure implies it appended at
/// least one.
pub trait SchemaKind: Clone + Send + Sync + 'static {
    /// Validates `value`, reporting failures through `ctx`.
    fn check(&self, value: &Value, ctx: &ParseContext) -> Option<Value>;

    /// The kind name used in type-mismatch diagnostics.
    fn type_name(&self) -> &'static str;

    /// Accumulates the names of registry references reachable from here.
    fn collect_refs(&self, _refs: &mut Vec<String>) {}

    /// The expected literal, for kinds that match exactly one value.
    fn literal_value(&self) -> Option<&Value> {
        None
    }

    /// The JSON-Schema fragment for this kind, ignoring modifiers.
    fn json_schema(&self) -> serde_json::Value;

    /// A copy of this kind with nested object fields made optional, for
    /// kinds that contain shapes.
    fn deep_partial(&self) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// The type-erased schema surface used wherever schemas nest.
///
/// Implemented only by [`Schema<K>`]; object shapes, array elements, union
/// options and registry entries all store `AnySchema` and interact with
/// children exclusively through these methods.
pub trait SchemaNode: sealed::Sealed + Send + Sync {
    /// Runs the full pipeline: modifier short-circuits, the concrete
    /// validator, refinement checks, transforms and `catch` substitution.
    fn parse_value(&self, value: &Value, ctx: &ParseContext) -> Option<Value>;

    /// The kind name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// True when a missing value is acceptable (optional or defaulted).
    fn is_optional(&self) -> bool;

    /// True when `null` short-circuits to success.
    fn is_nullable(&self) -> bool;

    /// The expected literal, for discriminator indexing.
    fn literal_value(&self) -> Option<&Value>;

    /// The human description attached via `describe`, if any.
    fn description(&self) -> Option<&str>;

    /// Accumulates the names of registry references reachable from here.
    fn collect_refs(&self, refs: &mut Vec<String>);

    /// Exports this schema (modifiers included) as a JSON-Schema fragment.
    fn to_json_schema(&self) -> serde_json::Value;

    /// A deep-partial copy, for kinds that contain shapes.
    fn deep_partial_node(&self) -> Option<AnySchema>;
}

/// A shared, type-erased schema handle.
pub type AnySchema = Arc<dyn SchemaNode>;

impl<K: SchemaKind> From<Schema<K>> for AnySchema {
    fn from(schema: Schema<K>) -> Self {
        Arc::new(schema)
    }
}
