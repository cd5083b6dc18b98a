//! Named-schema registry: the resolution target for [`reference`] nodes
//! and the explicit extension point external code composes against.
//!
//! [`reference`]: crate::schema::reference

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::json;
use stillwater::Validation;

use crate::context::{ParseContext, RegistryAccess};
use crate::error::ParseError;
use crate::schema::{AnySchema, SchemaNode, DEFAULT_MAX_DEPTH};
use crate::value::Value;

type SchemaMap = Arc<RwLock<HashMap<String, AnySchema>>>;

/// A thread-safe store of named schemas.
///
/// Registration serializes behind a write lock; any number of parses can
/// resolve references concurrently through read access. Cloning a
/// registry shares the same underlying store.
///
/// # Example
///
/// ```rust
/// use scrutiny::SchemaRegistry;
/// use scrutiny::schema::{array, object, reference, string};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry.register("Comment", object()
///     .field("text", string())
///     .optional_field("replies", array(reference("Comment")))
/// ).unwrap();
///
/// let result = registry.validate("Comment", json!({
///     "text": "top",
///     "replies": [{"text": "nested"}]
/// })).unwrap();
/// assert!(result.is_success());
/// ```
pub struct SchemaRegistry {
    schemas: SchemaMap,
    max_depth: usize,
}

impl SchemaRegistry {
    /// An empty registry with the default depth limit.
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the reference-resolution depth limit used by
    /// [`validate`](Self::validate).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Registers `schema` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] when the name is taken.
    pub fn register(
        &self,
        name: impl Into<String>,
        schema: impl Into<AnySchema>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        schemas.insert(name, schema.into());
        Ok(())
    }

    /// The schema registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<AnySchema> {
        self.schemas.read().get(name).cloned()
    }

    /// Names referenced somewhere in the registered schemas but not
    /// themselves registered, sorted and deduplicated.
    ///
    /// Call after registration to check reference integrity.
    pub fn validate_refs(&self) -> Vec<String> {
        let schemas = self.schemas.read();
        let mut all_refs = Vec::new();
        for schema in schemas.values() {
            schema.collect_refs(&mut all_refs);
        }

        let mut unresolved: Vec<String> = all_refs
            .into_iter()
            .filter(|name| !schemas.contains_key(name))
            .collect();
        unresolved.sort();
        unresolved.dedup();
        unresolved
    }

    /// Validates `value` against the schema registered under `name`, with
    /// reference resolution backed by this registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SchemaNotFound`] when the name is unknown;
    /// validation failures come back inside the `Validation`.
    pub fn validate(
        &self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Validation<Value, ParseError>, RegistryError> {
        self.run(name, value.into(), false)
    }

    /// Settle-all equivalent of [`validate`](Self::validate): composite
    /// children run as parallel tasks.
    pub fn validate_parallel(
        &self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Validation<Value, ParseError>, RegistryError> {
        self.run(name, value.into(), true)
    }

    fn run(
        &self,
        name: &str,
        value: Value,
        parallel: bool,
    ) -> Result<Validation<Value, ParseError>, RegistryError> {
        let schema = self
            .get(name)
            .ok_or_else(|| RegistryError::SchemaNotFound(name.to_string()))?;

        let ctx = ParseContext::new_root(
            parallel,
            None,
            Some(Arc::new(self.clone()) as Arc<dyn RegistryAccess>),
            self.max_depth,
        );

        Ok(match schema.parse_value(&value, &ctx) {
            Some(out) if !ctx.has_issues() => Validation::Success(out),
            _ => Validation::Failure(ParseError::from_vec(ctx.drain_issues())),
        })
    }

    /// Exports every registered schema as one JSON-Schema document with a
    /// `$defs` section, following draft 2020-12.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let schemas = self.schemas.read();
        let mut defs = serde_json::Map::new();
        for (name, schema) in schemas.iter() {
            defs.insert(name.clone(), schema.to_json_schema());
        }

        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$defs": defs,
        })
    }

    /// Exports the named schema as a standalone JSON-Schema document, with
    /// everything else available under `$defs` for references. Returns
    /// `None` when the name is unknown.
    pub fn export_schema(&self, name: &str) -> Option<serde_json::Value> {
        let schema = self.get(name)?;
        let base = self.to_json_schema();

        let mut doc = schema.to_json_schema();
        doc["$schema"] = json!("https://json-schema.org/draft/2020-12/schema");
        doc["$defs"] = base["$defs"].clone();
        Some(doc)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            max_depth: self.max_depth,
        }
    }
}

impl RegistryAccess for SchemaRegistry {
    fn resolve(&self, name: &str) -> Option<AnySchema> {
        self.get(name)
    }
}

/// Registry operation failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A schema is already registered under this name.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// No schema is registered under this name.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{number, object, reference, string};
    use serde_json::json;

    #[test]
    fn register_and_validate() {
        let registry = SchemaRegistry::new();
        registry
            .register("User", object().field("name", string().min(1)))
            .unwrap();

        let result = registry.validate("User", json!({"name": "Ada"})).unwrap();
        assert!(result.is_success());

        let result = registry.validate("User", json!({"name": ""})).unwrap();
        assert!(result.is_failure());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = SchemaRegistry::new();
        registry.register("Email", string().email()).unwrap();
        assert!(matches!(
            registry.register("Email", string()),
            Err(RegistryError::DuplicateName(_))
        ));
    }

    #[test]
    fn unknown_schema_name() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.validate("Ghost", json!({})),
            Err(RegistryError::SchemaNotFound(_))
        ));
    }

    #[test]
    fn validate_refs_reports_unresolved_names() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                "User",
                object()
                    .field("id", reference("UserId"))
                    .field("score", number()),
            )
            .unwrap();

        assert_eq!(registry.validate_refs(), vec!["UserId".to_string()]);

        registry.register("UserId", number().int()).unwrap();
        assert!(registry.validate_refs().is_empty());
    }

    #[test]
    fn references_resolve_through_the_registry() {
        let registry = SchemaRegistry::new();
        registry.register("Port", number().int().gte(1.0).lte(65535.0)).unwrap();
        registry
            .register("Endpoint", object().field("port", reference("Port")))
            .unwrap();

        let result = registry
            .validate("Endpoint", json!({"port": 8080}))
            .unwrap();
        assert!(result.is_success());

        let result = registry
            .validate("Endpoint", json!({"port": 0}))
            .unwrap();
        let error = result.into_result().unwrap_err();
        assert_eq!(error.path().to_string(), "port");
    }

    #[test]
    fn cloned_registries_share_the_store() {
        let registry = SchemaRegistry::new();
        let clone = registry.clone();
        clone.register("Name", string()).unwrap();
        assert!(registry.get("Name").is_some());
    }
}
