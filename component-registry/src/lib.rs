// Component Registry
// Classification index and compatibility graph for pluggable platform components
// (models, tasks, dataloaders, preprocessors).

// Type model and classification
pub mod error;
pub mod resolver;
pub mod types;

// Registry core
pub mod descriptor;
pub mod query;
pub mod registry;
pub mod relationships;

// Discovery feed and configuration
pub mod config;
pub mod discovery;
pub mod manifest;

pub use crate::config::{FailurePolicy, RegistryConfig};
pub use crate::descriptor::ComponentDescriptor;
pub use crate::discovery::{
    run_discovery_pass, ComponentDiscovery, DiscoveryError, DiscoveryReport, ManifestDiscovery,
    StaticDiscovery,
};
pub use crate::error::{RegistryError, RegistryResult};
pub use crate::query::ComponentQuery;
pub use crate::registry::ComponentRegistry;
pub use crate::relationships::RelationshipManager;
pub use crate::types::{JsonSchemaProvider, SchemaProvider, StaticSchema, TypeInfo, TypeKind};
