//! Explicit type model for registrable components.
//!
//! Components declare what they are through their ancestry: a component is a
//! `TypeInfo` with an ordered list of immediate parents. Framework category
//! classes are marked with [`TypeKind::Base`], and the designated
//! configurable-object marker with [`TypeKind::ConfigurableMarker`]. Parents
//! are shared `Arc` handles that must exist before their children, so a
//! hierarchy can never contain a cycle.

use crate::error::{RegistryError, RegistryResult};
use schemars::JsonSchema;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Capability of producing the parameter schema of a configurable component
pub trait SchemaProvider: Send + Sync {
    /// Produce the schema document. Must be a JSON object.
    fn schema(&self) -> Result<JsonValue, serde_json::Error>;
}

/// Schema provider returning a fixed document
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSchema(JsonValue);

impl StaticSchema {
    pub fn new(schema: JsonValue) -> Self {
        Self(schema)
    }
}

impl SchemaProvider for StaticSchema {
    fn schema(&self) -> Result<JsonValue, serde_json::Error> {
        Ok(self.0.clone())
    }
}

/// Schema provider deriving the document from a Rust parameter struct
pub struct JsonSchemaProvider<T> {
    _params: PhantomData<fn() -> T>,
}

impl<T> JsonSchemaProvider<T> {
    pub fn new() -> Self {
        Self {
            _params: PhantomData,
        }
    }
}

impl<T> Default for JsonSchemaProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: JsonSchema> SchemaProvider for JsonSchemaProvider<T> {
    fn schema(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(schemars::schema_for!(T))
    }
}

/// Role a type plays in the framework taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Ordinary class
    Plain,
    /// Framework base/category class, optionally carrying a classification tag
    Base { classification: Option<String> },
    /// The designated "configurable object" marker
    ConfigurableMarker,
}

/// One declared component type
pub struct TypeInfo {
    name: String,
    kind: TypeKind,
    parents: Vec<Arc<TypeInfo>>,
    description: Option<String>,
    compatible_components: Vec<String>,
    schema_provider: Option<Arc<dyn SchemaProvider>>,
}

impl TypeInfo {
    /// Start declaring a type with the given name
    pub fn builder(name: impl Into<String>) -> TypeInfoBuilder {
        TypeInfoBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, TypeKind::Base { .. })
    }

    pub fn is_configurable_marker(&self) -> bool {
        self.kind == TypeKind::ConfigurableMarker
    }

    /// Classification tag carried by this type itself, if it is a tagged base
    pub fn classification(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Base { classification } => classification.as_deref(),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Identifiers of components this type declares itself compatible with
    pub fn compatible_components(&self) -> &[String] {
        &self.compatible_components
    }

    pub fn schema_provider(&self) -> Option<&Arc<dyn SchemaProvider>> {
        self.schema_provider.as_ref()
    }

    /// Immediate parents, in declaration order
    pub fn parents(&self) -> &[Arc<TypeInfo>] {
        &self.parents
    }

    pub fn parent_names(&self) -> Vec<&str> {
        self.parents.iter().map(|p| p.name()).collect()
    }

    /// Full ancestor chain, most-derived first, excluding the type itself.
    ///
    /// Depth-first over the declared parents; a type reachable along several
    /// paths is listed once, at its first occurrence.
    pub fn ancestors(&self) -> Vec<Arc<TypeInfo>> {
        fn walk(ty: &TypeInfo, seen: &mut HashSet<String>, acc: &mut Vec<Arc<TypeInfo>>) {
            for parent in &ty.parents {
                if seen.insert(parent.name.clone()) {
                    acc.push(Arc::clone(parent));
                    walk(parent, seen, acc);
                }
            }
        }

        let mut seen = HashSet::new();
        seen.insert(self.name.clone());
        let mut acc = Vec::new();
        walk(self, &mut seen, &mut acc);
        acc
    }

    pub fn ancestor_names(&self) -> Vec<String> {
        self.ancestors()
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }

    /// The type itself followed by its ancestors; the chain classification is resolved from
    pub fn lineage(ty: &Arc<TypeInfo>) -> Vec<Arc<TypeInfo>> {
        let mut chain = vec![Arc::clone(ty)];
        chain.extend(ty.ancestors());
        chain
    }

    /// True if the configurable-object marker appears anywhere in the ancestry
    pub fn is_configurable(&self) -> bool {
        self.ancestors().iter().any(|a| a.is_configurable_marker())
    }

    /// True if `name` is an immediate parent (or any ancestor when `recursive`)
    pub fn inherits_from(&self, name: &str, recursive: bool) -> bool {
        if recursive {
            self.ancestors().iter().any(|a| a.name == name)
        } else {
            self.parents.iter().any(|p| p.name == name)
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parents", &self.parent_names())
            .field("description", &self.description)
            .field("compatible_components", &self.compatible_components)
            .field("has_schema_provider", &self.schema_provider.is_some())
            .finish()
    }
}

/// Fluent builder for [`TypeInfo`]
pub struct TypeInfoBuilder {
    name: String,
    kind: TypeKind,
    parents: Vec<Arc<TypeInfo>>,
    description: Option<String>,
    compatible_components: Vec<String>,
    schema_provider: Option<Arc<dyn SchemaProvider>>,
}

impl TypeInfoBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Plain,
            parents: Vec::new(),
            description: None,
            compatible_components: Vec::new(),
            schema_provider: None,
        }
    }

    /// Mark this type as a framework base class filed under `classification`
    pub fn base(mut self, classification: impl Into<String>) -> Self {
        self.kind = TypeKind::Base {
            classification: Some(classification.into()),
        };
        self
    }

    /// Mark this type as a framework base class that carries no tag
    pub fn base_without_tag(mut self) -> Self {
        self.kind = TypeKind::Base {
            classification: None,
        };
        self
    }

    /// Mark this type as the configurable-object marker
    pub fn configurable_marker(mut self) -> Self {
        self.kind = TypeKind::ConfigurableMarker;
        self
    }

    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn parent(mut self, parent: &Arc<TypeInfo>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    pub fn parents<'a>(mut self, parents: impl IntoIterator<Item = &'a Arc<TypeInfo>>) -> Self {
        self.parents.extend(parents.into_iter().map(Arc::clone));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn compatible_with(mut self, component: impl Into<String>) -> Self {
        self.compatible_components.push(component.into());
        self
    }

    pub fn schema_provider(mut self, provider: impl SchemaProvider + 'static) -> Self {
        self.schema_provider = Some(Arc::new(provider));
        self
    }

    /// Shorthand for a [`StaticSchema`] provider
    pub fn schema(self, schema: JsonValue) -> Self {
        self.schema_provider(StaticSchema::new(schema))
    }

    /// Validate the declaration and produce a shareable handle
    pub fn build(self) -> RegistryResult<Arc<TypeInfo>> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidComponent(
                "type name cannot be empty".to_string(),
            ));
        }
        if let TypeKind::Base {
            classification: Some(tag),
        } = &self.kind
        {
            if tag.trim().is_empty() {
                return Err(RegistryError::InvalidComponent(format!(
                    "base type '{}' declares an empty classification tag",
                    self.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for parent in &self.parents {
            if parent.name == self.name {
                return Err(RegistryError::InvalidComponent(format!(
                    "type '{}' cannot inherit from itself",
                    self.name
                )));
            }
            if !seen.insert(parent.name.as_str()) {
                return Err(RegistryError::InvalidComponent(format!(
                    "type '{}' lists parent '{}' more than once",
                    self.name, parent.name
                )));
            }
        }

        Ok(Arc::new(TypeInfo {
            name: self.name,
            kind: self.kind,
            parents: self.parents,
            description: self.description,
            compatible_components: self.compatible_components,
            schema_provider: self.schema_provider,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diamond() -> Arc<TypeInfo> {
        let root = TypeInfo::builder("Root").build().unwrap();
        let left = TypeInfo::builder("Left").parent(&root).build().unwrap();
        let right = TypeInfo::builder("Right").parent(&root).build().unwrap();
        TypeInfo::builder("Leaf")
            .parent(&left)
            .parent(&right)
            .build()
            .unwrap()
    }

    #[test]
    fn test_ancestors_visit_shared_parent_once() {
        let leaf = diamond();
        assert_eq!(leaf.ancestor_names(), vec!["Left", "Root", "Right"]);
        assert_eq!(leaf.parent_names(), vec!["Left", "Right"]);
    }

    #[test]
    fn test_lineage_starts_with_self() {
        let leaf = diamond();
        let names: Vec<_> = TypeInfo::lineage(&leaf)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names[0], "Leaf");
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_inherits_from_immediate_and_recursive() {
        let leaf = diamond();
        assert!(leaf.inherits_from("Left", false));
        assert!(!leaf.inherits_from("Root", false));
        assert!(leaf.inherits_from("Root", true));
        assert!(!leaf.inherits_from("Leaf", true));
    }

    #[test]
    fn test_configurable_marker_detected_through_ancestry() {
        let marker = TypeInfo::builder("ConfigObject")
            .configurable_marker()
            .build()
            .unwrap();
        let base = TypeInfo::builder("BaseModel")
            .base("Model")
            .parent(&marker)
            .build()
            .unwrap();
        let svc = TypeInfo::builder("SVC").parent(&base).build().unwrap();
        assert!(svc.is_configurable());
        assert!(!marker.is_configurable());
        assert_eq!(base.classification(), Some("Model"));
    }

    #[test]
    fn test_builder_rejects_malformed_declarations() {
        assert!(TypeInfo::builder("  ").build().is_err());
        assert!(TypeInfo::builder("BaseX").base("").build().is_err());

        let parent = TypeInfo::builder("P").build().unwrap();
        let err = TypeInfo::builder("C")
            .parent(&parent)
            .parent(&parent)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidComponent(_)));
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct KnnParams {
        n_neighbors: u32,
        weights: String,
    }

    #[test]
    fn test_json_schema_provider_derives_object_schema() {
        let schema = JsonSchemaProvider::<KnnParams>::new().schema().unwrap();
        assert!(schema.is_object());
        assert!(schema["properties"]["n_neighbors"].is_object());

        let fixed = StaticSchema::new(json!({"properties": {}}));
        assert_eq!(fixed.schema().unwrap(), json!({"properties": {}}));
    }
}
