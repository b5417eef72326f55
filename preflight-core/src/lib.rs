//! # Preflight - Build Configuration for Embedded C/C++ Projects
//!
//! Preflight runs the configuration phase that precedes compilation:
//! - Per-target build environments with SCons-style flag variables
//! - Customization hooks that adapt an environment before the build
//! - Source middleware for excluding or replacing files, scoped by glob
//! - Source collection from the project tree
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use preflight_core::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ProjectConfig::from_file("preflight.toml")?;
//!     let orchestrator = Orchestrator::new(config, ".");
//!
//!     for report in orchestrator.configure_all()? {
//!         println!("{}: {} sources", report.target, report.sources.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The [`orchestrator::Orchestrator`] owns the loaded configuration and, per
//! target, seeds a [`env::BuildEnvironment`], runs the configured
//! [`hooks::CustomizationHook`]s against it, then collects sources and passes
//! them through the environment's [`middleware::MiddlewareChain`]. The whole
//! phase is synchronous and single-threaded; hooks see every mutation made
//! before them and the first error aborts the run.

pub mod config;
pub mod env;
pub mod error;
pub mod hooks;
pub mod middleware;
pub mod orchestrator;
pub mod sources;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ProjectConfig, ProjectMeta, TargetConfig};
    pub use crate::env::{BuildEnvironment, BuildVariable, FlagList};
    pub use crate::error::{PreflightError, Result};
    pub use crate::hooks::{
        CustomizationHook, DiagnosticsHook, ExcludeFromBuild, HookRegistry, ToolchainCompatHook,
    };
    pub use crate::middleware::{
        FilteredSources, MiddlewareChain, SourceMiddleware, SourceNode, Verdict,
    };
    pub use crate::orchestrator::{ConfigureReport, Orchestrator};
}
