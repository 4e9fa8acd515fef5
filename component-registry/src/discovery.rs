//! Discovery feed: sources of component types and the pass that registers them.
//!
//! A discovery pass is a sequence of independent `register_component` calls;
//! it is not atomic, and readers may observe the registry mid-pass. Failures
//! are never retried here.

use crate::config::FailurePolicy;
use crate::error::RegistryError;
use crate::manifest::{ComponentManifest, TypeScope};
use crate::registry::ComponentRegistry;
use crate::types::TypeInfo;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse manifest '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Unsupported manifest format: '{}' (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A source of component types to register
pub trait ComponentDiscovery: Send + Sync {
    fn name(&self) -> &str;

    fn discover(&self) -> Result<Vec<Arc<TypeInfo>>, DiscoveryError>;
}

/// Fixed list of built-in component types
pub struct StaticDiscovery {
    name: String,
    components: Vec<Arc<TypeInfo>>,
}

impl StaticDiscovery {
    pub fn new(name: impl Into<String>, components: Vec<Arc<TypeInfo>>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }
}

impl ComponentDiscovery for StaticDiscovery {
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(&self) -> Result<Vec<Arc<TypeInfo>>, DiscoveryError> {
        Ok(self.components.clone())
    }
}

/// Reads component manifests from disk. Manifests share one type scope, so
/// later files may inherit from types declared in earlier ones.
pub struct ManifestDiscovery {
    paths: Vec<PathBuf>,
    prelude: Vec<Arc<TypeInfo>>,
}

impl ManifestDiscovery {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            prelude: Vec::new(),
        }
    }

    /// Make programmatically declared types (e.g. framework base classes)
    /// available as parents to every manifest
    pub fn with_prelude(mut self, types: Vec<Arc<TypeInfo>>) -> Self {
        self.prelude = types;
        self
    }
}

impl ComponentDiscovery for ManifestDiscovery {
    fn name(&self) -> &str {
        "ManifestDiscovery"
    }

    fn discover(&self) -> Result<Vec<Arc<TypeInfo>>, DiscoveryError> {
        let mut scope = TypeScope::new();
        for ty in &self.prelude {
            scope.insert(Arc::clone(ty));
        }

        let mut discovered = Vec::new();
        for path in &self.paths {
            let manifest = ComponentManifest::from_path(path)?;
            let types = manifest.resolve(&mut scope)?;
            tracing::debug!(
                "Manifest '{}' declared {} registrable type(s)",
                path.display(),
                types.len()
            );
            discovered.extend(types);
        }
        Ok(discovered)
    }
}

/// One component (or whole provider) that failed during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    pub provider: String,
    /// None when the provider itself failed to enumerate its components
    pub component: Option<String>,
    pub error: String,
}

/// Outcome of a discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Names registered (or re-registered), in registration order
    pub registered: Vec<String>,
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Feed every component found by `providers` into `registry`.
///
/// With [`FailurePolicy::Abort`] the first failure is returned as an error and
/// the remaining components are not submitted; components registered before
/// it stay registered.
pub fn run_discovery_pass(
    registry: &ComponentRegistry,
    providers: &[Box<dyn ComponentDiscovery>],
    policy: FailurePolicy,
) -> Result<DiscoveryReport, DiscoveryError> {
    let span = tracing::info_span!("discovery_pass", providers = providers.len());
    let _guard = span.enter();

    let mut report = DiscoveryReport::default();
    for provider in providers {
        let components = match provider.discover() {
            Ok(components) => components,
            Err(e) if policy == FailurePolicy::Skip => {
                tracing::warn!("Discovery provider '{}' failed: {}", provider.name(), e);
                report.failures.push(DiscoveryFailure {
                    provider: provider.name().to_string(),
                    component: None,
                    error: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        for component in components {
            match registry.register_component(&component) {
                Ok(()) => report.registered.push(component.name().to_string()),
                Err(e) if policy == FailurePolicy::Skip => {
                    tracing::warn!(
                        "Skipping component '{}' from '{}': {}",
                        component.name(),
                        provider.name(),
                        e
                    );
                    report.failures.push(DiscoveryFailure {
                        provider: provider.name().to_string(),
                        component: Some(component.name().to_string()),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    tracing::info!(
        "Discovery pass registered {} component(s), {} failure(s)",
        report.registered.len(),
        report.failures.len()
    );
    Ok(report)
}
