//! Registry configuration.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! [discovery]
//! manifests = ["plugins/models.toml", "plugins/tasks.json"]
//! on_error = "skip"
//! ```
//!
//! or from `COMPONENT_REGISTRY_MANIFESTS` / `COMPONENT_REGISTRY_ON_ERROR`.

use crate::discovery::ManifestDiscovery;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const MANIFESTS_ENV: &str = "COMPONENT_REGISTRY_MANIFESTS";
pub const ON_ERROR_ENV: &str = "COMPONENT_REGISTRY_ON_ERROR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// What a discovery pass does when one component fails to register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and continue with the next component
    #[default]
    Skip,
    /// Stop the pass at the first failure
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(ConfigError::InvalidValue {
                key: ON_ERROR_ENV.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Manifest files fed to the registry, in load order
    pub manifests: Vec<PathBuf>,
    pub on_error: FailurePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub discovery: DiscoveryConfig,
}

impl RegistryConfig {
    /// Load a TOML config file. Relative manifest paths are resolved against
    /// the directory containing the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(dir) = path.parent() {
            for manifest in &mut config.discovery.manifests {
                if manifest.is_relative() {
                    *manifest = dir.join(&*manifest);
                }
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build a configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RegistryConfig::default();

        if let Some(manifests) = lookup(MANIFESTS_ENV) {
            config.discovery.manifests = std::env::split_paths(&manifests)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(policy) = lookup(ON_ERROR_ENV) {
            config.discovery.on_error = policy.parse()?;
        }
        Ok(config)
    }

    /// Discovery provider reading every configured manifest
    pub fn manifest_discovery(&self) -> ManifestDiscovery {
        ManifestDiscovery::new(self.discovery.manifests.clone())
    }
}
