//! Configuration types for Preflight
//!
//! A project is described by a `preflight.toml` at the project root. Each
//! `[targets.<name>]` table seeds one [`crate::env::BuildEnvironment`] with
//! flags and names the hooks to run over it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level project configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectMeta,

    /// Build targets, keyed by name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Human-readable project name
    #[serde(default = "default_project_name")]
    pub name: String,
}

fn default_project_name() -> String {
    "untitled".to_string()
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

/// Per-target build configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    /// Directories scanned for source files, relative to the project root
    #[serde(default)]
    pub src_dirs: Vec<PathBuf>,

    /// Seed flags for `CCFLAGS`
    #[serde(default)]
    pub cc_flags: Vec<String>,

    /// Seed flags for `CXXFLAGS`
    #[serde(default)]
    pub cxx_flags: Vec<String>,

    /// Preprocessor defines (`CPPDEFINES`)
    #[serde(default)]
    pub defines: Vec<String>,

    /// Include search paths (`CPPPATH`)
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Seed flags for `LINKFLAGS`
    #[serde(default)]
    pub link_flags: Vec<String>,

    /// Libraries to link (`LIBS`)
    #[serde(default)]
    pub libs: Vec<String>,

    /// Customization hooks to run, in order
    #[serde(default)]
    pub hooks: Vec<String>,
}

impl ProjectConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (preflight.toml or path from PREFLIGHT_CONFIG_PATH)
    /// 3. Environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new()
            .merge(Toml::file("preflight.toml"))
            .merge(Env::prefixed("PREFLIGHT_").split("_"));

        // Check for custom config path
        if let Ok(path) = std::env::var("PREFLIGHT_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: ProjectConfig = figment.extract().map_err(|e| {
            crate::error::PreflightError::Configuration(format!(
                "Failed to load configuration: {}",
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let config: ProjectConfig =
            Figment::new()
                .merge(Toml::file(path))
                .extract()
                .map_err(|e| {
                    crate::error::PreflightError::Configuration(format!(
                        "Failed to load configuration file: {}",
                        e
                    ))
                })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn validate(&self) -> crate::error::Result<()> {
        if self.targets.is_empty() {
            return Err(crate::error::PreflightError::Configuration(
                "No targets defined".to_string(),
            ));
        }
        for (name, target) in &self.targets {
            if target.src_dirs.is_empty() {
                return Err(crate::error::PreflightError::Configuration(format!(
                    "Target '{}' has no source directories",
                    name
                )));
            }
        }
        Ok(())
    }
}
