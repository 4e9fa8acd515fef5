use crate::types::TypeInfo;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Registry record for one registered component.
///
/// Descriptors are never mutated after construction; re-registering a
/// component replaces the whole record. `schema` is present iff the
/// component is configurable.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDescriptor {
    name: String,
    classification: String,
    configurable: bool,
    schema: Option<JsonValue>,
    description: Option<String>,
    #[serde(skip)]
    component: Arc<TypeInfo>,
}

impl ComponentDescriptor {
    pub(crate) fn configurable(
        component: Arc<TypeInfo>,
        classification: String,
        schema: JsonValue,
    ) -> Self {
        Self {
            name: component.name().to_string(),
            classification,
            configurable: true,
            schema: Some(schema),
            description: component.description().map(str::to_string),
            component,
        }
    }

    pub(crate) fn fixed(component: Arc<TypeInfo>, classification: String) -> Self {
        Self {
            name: component.name().to_string(),
            classification,
            configurable: false,
            schema: None,
            description: component.description().map(str::to_string),
            component,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classification(&self) -> &str {
        &self.classification
    }

    pub fn is_configurable(&self) -> bool {
        self.configurable
    }

    pub fn schema(&self) -> Option<&JsonValue> {
        self.schema.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Handle to the underlying component type
    pub fn component(&self) -> &Arc<TypeInfo> {
        &self.component
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_skips_component_handle() {
        let ty = TypeInfo::builder("Component1")
            .description("first component")
            .build()
            .unwrap();
        let descriptor = ComponentDescriptor::configurable(
            ty,
            "ConfigComponent1".to_string(),
            json!({"properties": {"parameter_1": {"type": "number"}}}),
        );

        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["name"], "Component1");
        assert_eq!(value["classification"], "ConfigComponent1");
        assert_eq!(value["configurable"], true);
        assert_eq!(value["description"], "first component");
        assert!(value.get("component").is_none());
    }

    #[test]
    fn test_fixed_descriptor_has_no_schema() {
        let ty = TypeInfo::builder("Component3").build().unwrap();
        let descriptor = ComponentDescriptor::fixed(ty, "StaticComponent".to_string());
        assert!(!descriptor.is_configurable());
        assert!(descriptor.schema().is_none());
        assert!(descriptor.description().is_none());
    }
}
