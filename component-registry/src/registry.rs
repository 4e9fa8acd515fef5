//! Component registry: classification index plus relationship graph.
//!
//! The registry is constructed once and shared (typically behind an `Arc`)
//! between the discovery pass that feeds it and the request handlers that
//! read it. Writes take an exclusive lock; reads share it. Every read hands
//! out owned copies of descriptors, never references into the index.

use crate::descriptor::ComponentDescriptor;
use crate::error::{RegistryError, RegistryResult};
use crate::query::{ComponentQuery, QueryPlan};
use crate::relationships::RelationshipManager;
use crate::resolver::classify;
use crate::types::TypeInfo;
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Classification tag -> component name -> descriptor, both levels in insertion order
type ComponentIndex = IndexMap<String, IndexMap<String, ComponentDescriptor>>;

#[derive(Debug, Default)]
struct RegistryState {
    components: ComponentIndex,
    relationships: RelationshipManager,
}

impl RegistryState {
    fn find(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.components
            .values()
            .find_map(|bucket| bucket.get(name))
    }

    fn lookup(&self, name: &str) -> RegistryResult<ComponentDescriptor> {
        self.find(name)
            .cloned()
            .ok_or_else(|| RegistryError::ComponentNotFound(name.to_string()))
    }

    fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.values().flat_map(|bucket| bucket.values())
    }
}

/// Registry of pluggable components (models, tasks, dataloaders, ...)
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    state: RwLock<RegistryState>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry pre-populated with `components`, failing on the first invalid one
    pub fn with_components<I>(components: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = Arc<TypeInfo>>,
    {
        let registry = Self::new();
        for component in components {
            registry.register_component(&component)?;
        }
        Ok(registry)
    }

    /// Register a component type.
    ///
    /// All checks (classification, configurability, schema) run before the
    /// index is touched, and the descriptor plus its declared relationships
    /// are applied under one write lock: a failed call leaves no trace. A
    /// component already filed under the same tag is replaced.
    pub fn register_component(&self, component: &Arc<TypeInfo>) -> RegistryResult<()> {
        let classification = classify(component)?;
        let descriptor = build_descriptor(component, classification)?;

        let name = descriptor.name().to_string();
        let tag = descriptor.classification().to_string();

        let mut state = self.write();
        let replaced = state
            .components
            .entry(tag.clone())
            .or_default()
            .insert(name.clone(), descriptor)
            .is_some();
        for other in component.compatible_components() {
            state.relationships.add_relationship(&name, other);
        }

        if replaced {
            log::debug!("Replaced component '{}' under '{}'", name, tag);
        } else {
            log::debug!("Registered component '{}' under '{}'", name, tag);
        }
        Ok(())
    }

    /// Remove a component from the index and return its descriptor.
    ///
    /// Relationship edges are left in place; they are only removed through
    /// [`remove_relationship`](Self::remove_relationship).
    pub fn unregister_component(&self, name: &str) -> RegistryResult<ComponentDescriptor> {
        let mut state = self.write();

        let tag = state
            .components
            .iter()
            .find(|(_, bucket)| bucket.contains_key(name))
            .map(|(tag, _)| tag.clone())
            .ok_or_else(|| RegistryError::ComponentNotFound(name.to_string()))?;

        let mut removed = None;
        let mut bucket_emptied = false;
        if let Some(bucket) = state.components.get_mut(&tag) {
            removed = bucket.shift_remove(name);
            bucket_emptied = bucket.is_empty();
        }
        if bucket_emptied {
            state.components.shift_remove(&tag);
        }

        let orphaned = state.relationships.get(name).len();
        if orphaned > 0 {
            log::warn!(
                "Component '{}' unregistered with {} relationship(s) still recorded",
                name,
                orphaned
            );
        }

        removed.ok_or_else(|| RegistryError::ComponentNotFound(name.to_string()))
    }

    /// True if `name` is registered under any classification tag
    pub fn contains(&self, name: &str) -> bool {
        self.read().find(name).is_some()
    }

    /// Descriptor registered under `name`
    pub fn get(&self, name: &str) -> RegistryResult<ComponentDescriptor> {
        self.read().lookup(name)
    }

    /// List descriptors, optionally restricted by classification tag.
    ///
    /// Without options every descriptor is returned in tag order, then name
    /// order (both insertion order). With `select`, tags are concatenated in
    /// the order given. With `ignore`, the overall order is preserved.
    pub fn get_components_by_type(
        &self,
        query: &ComponentQuery,
    ) -> RegistryResult<Vec<ComponentDescriptor>> {
        let state = self.read();
        let plan = query.plan(|tag| state.components.contains_key(tag))?;

        let descriptors = match plan {
            QueryPlan::All => state.descriptors().cloned().collect(),
            QueryPlan::Select(tags) => tags
                .iter()
                .filter_map(|tag| state.components.get(tag))
                .flat_map(|bucket| bucket.values().cloned())
                .collect(),
            QueryPlan::Ignore(ignored) => state
                .components
                .iter()
                .filter(|(tag, _)| !ignored.contains(tag.as_str()))
                .flat_map(|(_, bucket)| bucket.values().cloned())
                .collect(),
        };
        Ok(descriptors)
    }

    /// Components whose type inherits from `parent_name`.
    ///
    /// Only immediate parents are checked unless `recursive` is set. The
    /// parent does not need to be a registered component itself.
    pub fn get_child_components(
        &self,
        parent_name: &str,
        recursive: bool,
    ) -> Vec<ComponentDescriptor> {
        self.read()
            .descriptors()
            .filter(|d| d.component().inherits_from(parent_name, recursive))
            .cloned()
            .collect()
    }

    /// Descriptors of every component related to `component_id`.
    ///
    /// Fails if `component_id` is not registered, or if any related
    /// identifier was never registered itself.
    pub fn get_related_components(
        &self,
        component_id: &str,
    ) -> RegistryResult<Vec<ComponentDescriptor>> {
        let state = self.read();
        if state.find(component_id).is_none() {
            return Err(RegistryError::ComponentNotFound(component_id.to_string()));
        }
        state
            .relationships
            .get(component_id)
            .iter()
            .map(|related| state.lookup(related))
            .collect()
    }

    pub fn add_relationship(&self, a: &str, b: &str) {
        self.write().relationships.add_relationship(a, b);
    }

    /// Best-effort removal of one `a` <-> `b` edge; misses are logged, not raised
    pub fn remove_relationship(&self, a: &str, b: &str) -> bool {
        self.write().relationships.remove_relationship(a, b)
    }

    /// Raw related identifiers of `id` (registered or not)
    pub fn related_ids(&self, id: &str) -> Vec<String> {
        self.read().relationships.get(id).to_vec()
    }

    /// Classification tags currently in use, in insertion order
    pub fn classifications(&self) -> Vec<String> {
        self.read().components.keys().cloned().collect()
    }

    /// Registered component names, in listing order
    pub fn names(&self) -> Vec<String> {
        self.read()
            .descriptors()
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Number of registered descriptors across all tags
    pub fn len(&self) -> usize {
        self.read().components.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic can only happen before a write mutates the index, so a poisoned
    // lock still guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_descriptor(
    component: &Arc<TypeInfo>,
    classification: String,
) -> RegistryResult<ComponentDescriptor> {
    if !component.is_configurable() {
        return Ok(ComponentDescriptor::fixed(
            Arc::clone(component),
            classification,
        ));
    }

    let provider =
        component
            .schema_provider()
            .ok_or_else(|| RegistryError::MissingSchemaProvider {
                component: component.name().to_string(),
            })?;
    let schema = provider
        .schema()
        .map_err(|e| RegistryError::InvalidSchema {
            component: component.name().to_string(),
            reason: format!("schema generation failed: {}", e),
        })?;
    if !schema.is_object() {
        return Err(RegistryError::InvalidSchema {
            component: component.name().to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&schema)),
        });
    }
    Ok(ComponentDescriptor::configurable(
        Arc::clone(component),
        classification,
        schema,
    ))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> (Arc<TypeInfo>, Arc<TypeInfo>) {
        let marker = TypeInfo::builder("ConfigObject")
            .configurable_marker()
            .build()
            .unwrap();
        let base = TypeInfo::builder("BaseModel")
            .base("Model")
            .parent(&marker)
            .build()
            .unwrap();
        (marker, base)
    }

    #[test]
    fn test_configurable_without_provider_is_rejected_without_side_effects() {
        let (_, base) = fixture();
        let broken = TypeInfo::builder("Broken")
            .parent(&base)
            .compatible_with("SomeTask")
            .build()
            .unwrap();

        let registry = ComponentRegistry::new();
        assert_eq!(
            registry.register_component(&broken),
            Err(RegistryError::MissingSchemaProvider {
                component: "Broken".to_string()
            })
        );
        assert!(registry.is_empty());
        assert!(registry.related_ids("SomeTask").is_empty());
    }

    #[test]
    fn test_non_object_schema_is_rejected() {
        let (_, base) = fixture();
        let odd = TypeInfo::builder("Odd")
            .parent(&base)
            .schema(json!(["not", "a", "mapping"]))
            .build()
            .unwrap();

        let err = ComponentRegistry::new().register_component(&odd).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_schema_generation_error_is_reported() {
        struct Broken;
        impl crate::types::SchemaProvider for Broken {
            fn schema(&self) -> Result<serde_json::Value, serde_json::Error> {
                serde_json::from_str("{\"properties\":")
            }
        }

        let (_, base) = fixture();
        let ty = TypeInfo::builder("Broken")
            .parent(&base)
            .schema_provider(Broken)
            .build()
            .unwrap();

        let registry = ComponentRegistry::new();
        let err = registry.register_component(&ty).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
        assert!(err.to_string().contains("schema generation failed: EOF"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_schema_captured_once_at_registration() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting(Arc<AtomicUsize>);
        impl crate::types::SchemaProvider for Counting {
            fn schema(&self) -> Result<serde_json::Value, serde_json::Error> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"properties": {}}))
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let (_, base) = fixture();
        let ty = TypeInfo::builder("Counted")
            .parent(&base)
            .schema_provider(Counting(Arc::clone(&calls)))
            .build()
            .unwrap();

        let registry = ComponentRegistry::new();
        registry.register_component(&ty).unwrap();
        registry.get("Counted").unwrap();
        registry.get("Counted").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_drops_empty_bucket_and_keeps_edges() {
        let task_base = TypeInfo::builder("BaseTask").base("Task").build().unwrap();
        let task = TypeInfo::builder("TabularClassificationTask")
            .parent(&task_base)
            .compatible_with("SVM")
            .build()
            .unwrap();

        let registry = ComponentRegistry::with_components([task]).unwrap();
        let removed = registry
            .unregister_component("TabularClassificationTask")
            .unwrap();
        assert_eq!(removed.classification(), "Task");
        assert!(registry.classifications().is_empty());
        assert_eq!(registry.related_ids("SVM"), vec!["TabularClassificationTask"]);

        assert!(matches!(
            registry.unregister_component("TabularClassificationTask"),
            Err(RegistryError::ComponentNotFound(name)) if name == "TabularClassificationTask"
        ));
    }
}
