//! Target configuration orchestration
//!
//! The [`Orchestrator`] owns the loaded project configuration and drives the
//! configuration phase for each target: build an environment, seed it from
//! the target's configuration, run the hooks, collect sources, apply the
//! middleware chain. Everything runs synchronously on the caller's thread;
//! hooks observe every prior mutation and a step's error aborts the run.

use crate::config::{ProjectConfig, TargetConfig};
use crate::env::{BuildEnvironment, BuildVariable, FlagList};
use crate::error::{PreflightError, Result};
use crate::hooks::{self, HookRegistry};
use crate::middleware::{FilteredSources, SourceNode};
use crate::sources;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of configuring one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureReport {
    /// Unique identifier for this run
    pub run_id: Uuid,

    /// Target that was configured
    pub target: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,

    /// Final flag lists, after all hooks ran
    pub flags: BTreeMap<BuildVariable, FlagList>,

    /// Sources kept for compilation
    pub sources: Vec<PathBuf>,

    /// Sources excluded by middleware
    pub excluded: Vec<PathBuf>,
}

/// Drives the configuration phase for a project
pub struct Orchestrator {
    config: ProjectConfig,
    project_root: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator for a loaded configuration
    ///
    /// Relative `src_dirs` entries resolve against `project_root`.
    pub fn new(config: ProjectConfig, project_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_root: project_root.into(),
        }
    }

    /// The loaded project configuration
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Configure a single target by name
    pub fn configure_target(&self, name: &str) -> Result<ConfigureReport> {
        let target = self
            .config
            .targets
            .get(name)
            .ok_or_else(|| PreflightError::UnknownTarget(name.to_string()))?;

        let started_at = Utc::now();
        let start = Instant::now();
        info!("Configuring target: {}", name);

        let mut env = self.seed_environment(name, target);
        let registry = self.registry_for(target)?;
        registry.run_all(&mut env)?;

        let mut candidates = Vec::new();
        for dir in &target.src_dirs {
            let dir = self.resolve_src_dir(dir);
            debug!(build_target = name, dir = %dir.display(), "Collecting sources");
            candidates.extend(sources::collect(&dir)?);
        }

        let FilteredSources { kept, excluded } = env.apply_middleware(candidates);
        let source_paths: Vec<PathBuf> = kept.iter().map(|node| node.path().to_path_buf()).collect();
        let excluded_paths: Vec<PathBuf> = excluded.into_iter().map(SourceNode::into_path).collect();
        env.set_sources(kept);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Configured target '{}': {} sources, {} excluded ({}ms)",
            name,
            source_paths.len(),
            excluded_paths.len(),
            duration_ms
        );

        Ok(ConfigureReport {
            run_id: Uuid::new_v4(),
            target: name.to_string(),
            started_at,
            duration_ms,
            flags: env.flag_lists().clone(),
            sources: source_paths,
            excluded: excluded_paths,
        })
    }

    /// Configure every target, in name order
    pub fn configure_all(&self) -> Result<Vec<ConfigureReport>> {
        let mut reports = Vec::with_capacity(self.config.targets.len());
        for name in self.config.targets.keys() {
            reports.push(self.configure_target(name)?);
        }
        Ok(reports)
    }

    fn seed_environment(&self, name: &str, target: &TargetConfig) -> BuildEnvironment {
        let mut env = BuildEnvironment::new(name);
        env.append(BuildVariable::CcFlags, target.cc_flags.iter().cloned());
        env.append(BuildVariable::CxxFlags, target.cxx_flags.iter().cloned());
        env.append(BuildVariable::CppDefines, target.defines.iter().cloned());
        env.append(
            BuildVariable::CppPath,
            target.include_dirs.iter().map(|p| p.display().to_string()),
        );
        env.append(BuildVariable::LinkFlags, target.link_flags.iter().cloned());
        env.append(BuildVariable::Libs, target.libs.iter().cloned());
        env
    }

    fn registry_for(&self, target: &TargetConfig) -> Result<HookRegistry> {
        let mut registry = HookRegistry::new();
        for name in &target.hooks {
            let hook =
                hooks::builtin(name).ok_or_else(|| PreflightError::UnknownHook(name.clone()))?;
            registry.register(hook);
        }
        Ok(registry)
    }

    fn resolve_src_dir(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.project_root.join(dir)
        }
    }
}
