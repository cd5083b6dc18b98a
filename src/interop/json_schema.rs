//! JSON-Schema export.
//!
//! Schemas export themselves as draft 2020-12 documents through the
//! read-only accessors of [`SchemaNode`](crate::schema::SchemaNode); the
//! export never participates in validation. Registry-wide export with a
//! `$defs` section lives on
//! [`SchemaRegistry::to_json_schema`](crate::SchemaRegistry::to_json_schema).

use serde_json::{json, Value};

use crate::schema::{AnySchema, SchemaNode};

/// Exports `schema` as a standalone JSON-Schema document.
///
/// # Example
///
/// ```rust
/// use scrutiny::interop::to_json_schema;
/// use scrutiny::schema::{object, string};
///
/// let doc = to_json_schema(&object().field("name", string().min(1)).into());
/// assert_eq!(doc["type"], "object");
/// assert_eq!(doc["properties"]["name"]["minLength"], 1);
/// ```
pub fn to_json_schema(schema: &AnySchema) -> Value {
    let mut doc = schema.to_json_schema();
    if let Some(obj) = doc.as_object_mut() {
        obj.insert(
            "$schema".to_string(),
            json!("https://json-schema.org/draft/2020-12/schema"),
        );
    }
    doc
}
