//! Declarative component manifests.
//!
//! A manifest lists type declarations in dependency order:
//!
//! ```toml
//! [[types]]
//! name = "ConfigObject"
//! configurable_marker = true
//!
//! [[types]]
//! name = "BaseModel"
//! base = "Model"
//!
//! [[types]]
//! name = "SVC"
//! parents = ["BaseModel", "ConfigObject"]
//! compatible_with = ["TabularClassificationTask"]
//! schema = { properties = { C = { type = "number" } } }
//! ```
//!
//! Parents must be declared earlier, in the same manifest or in one loaded
//! before it into the same [`TypeScope`].

use crate::discovery::DiscoveryError;
use crate::error::RegistryError;
use crate::types::{TypeInfo, TypeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// On-disk encoding of a manifest, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(ManifestFormat::Toml),
            "json" => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

/// One declared type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Classification tag; makes this type a framework base class
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub base_without_tag: bool,
    #[serde(default)]
    pub configurable_marker: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub compatible_with: Vec<String>,
    /// Inline parameter schema (must be a mapping)
    #[serde(default)]
    pub schema: Option<JsonValue>,
    /// Whether to submit the type for registration; defaults to true for
    /// types that are neither base classes nor the configurable marker
    #[serde(default)]
    pub register: Option<bool>,
}

impl TypeDeclaration {
    fn is_abstract(&self) -> bool {
        self.kind() != TypeKind::Plain
    }

    pub fn kind(&self) -> TypeKind {
        if let Some(tag) = &self.base {
            TypeKind::Base {
                classification: Some(tag.clone()),
            }
        } else if self.base_without_tag {
            TypeKind::Base {
                classification: None,
            }
        } else if self.configurable_marker {
            TypeKind::ConfigurableMarker
        } else {
            TypeKind::Plain
        }
    }

    pub fn should_register(&self) -> bool {
        self.register.unwrap_or(!self.is_abstract())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentManifest {
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

impl ComponentManifest {
    pub fn from_toml_str(content: &str) -> Result<Self, DiscoveryError> {
        toml::from_str(content).map_err(|e| DiscoveryError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, DiscoveryError> {
        serde_json::from_str(content).map_err(|e| DiscoveryError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Read a manifest file; the format follows the extension
    pub fn from_path(path: &Path) -> Result<Self, DiscoveryError> {
        let format = ManifestFormat::from_path(path)
            .ok_or_else(|| DiscoveryError::UnsupportedFormat(path.to_path_buf()))?;
        let content = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = match format {
            ManifestFormat::Toml => Self::from_toml_str(&content),
            ManifestFormat::Json => Self::from_json_str(&content),
        };
        parsed.map_err(|e| match e {
            DiscoveryError::Parse { message, .. } => DiscoveryError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Declare every type into `scope` and return those to be registered, in order
    pub fn resolve(&self, scope: &mut TypeScope) -> Result<Vec<Arc<TypeInfo>>, DiscoveryError> {
        let mut to_register = Vec::new();
        for declaration in &self.types {
            let ty = scope.declare(declaration)?;
            if declaration.should_register() {
                to_register.push(ty);
            }
        }
        Ok(to_register)
    }
}

/// Names visible to manifest declarations
#[derive(Debug, Default)]
pub struct TypeScope {
    types: IndexMap<String, Arc<TypeInfo>>,
}

impl TypeScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an already-built type visible as a parent
    pub fn insert(&mut self, ty: Arc<TypeInfo>) {
        self.types.insert(ty.name().to_string(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeInfo>> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn declare(&mut self, declaration: &TypeDeclaration) -> Result<Arc<TypeInfo>, DiscoveryError> {
        let name = &declaration.name;
        if self.types.contains_key(name) {
            return Err(invalid(format!("type '{}' is declared more than once", name)));
        }

        let roles = [
            declaration.base.is_some(),
            declaration.base_without_tag,
            declaration.configurable_marker,
        ];
        if roles.iter().filter(|set| **set).count() > 1 {
            return Err(invalid(format!(
                "type '{}' combines 'base', 'base_without_tag' and 'configurable_marker'",
                name
            )));
        }

        let mut builder = TypeInfo::builder(name.clone()).kind(declaration.kind());

        for parent_name in &declaration.parents {
            let parent = self.types.get(parent_name).ok_or_else(|| {
                invalid(format!(
                    "type '{}' names unknown parent '{}'",
                    name, parent_name
                ))
            })?;
            builder = builder.parent(parent);
        }
        if let Some(description) = &declaration.description {
            builder = builder.description(description.clone());
        }
        for component in &declaration.compatible_with {
            builder = builder.compatible_with(component.clone());
        }
        if let Some(schema) = &declaration.schema {
            builder = builder.schema(schema.clone());
        }

        let ty = builder.build()?;
        self.types.insert(name.clone(), Arc::clone(&ty));
        Ok(ty)
    }
}

fn invalid(message: String) -> DiscoveryError {
    DiscoveryError::Registry(RegistryError::InvalidComponent(message))
}
