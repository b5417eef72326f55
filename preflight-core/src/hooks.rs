//! Customization hooks for the configuration phase
//!
//! A hook receives the mutable [`BuildEnvironment`] once, before compilation
//! begins, and adapts it: appending compiler flags, registering build
//! middleware. Hooks never construct or destroy the environment; the
//! orchestrator owns it and lends it out for the duration of one call.
//!
//! # Example
//!
//! ```rust
//! use preflight_core::env::{BuildEnvironment, BuildVariable};
//! use preflight_core::hooks::{CustomizationHook, ToolchainCompatHook};
//!
//! let mut env = BuildEnvironment::new("esp32");
//! ToolchainCompatHook.run(&mut env).unwrap();
//! assert_eq!(
//!     env.flags(BuildVariable::CxxFlags),
//!     ["-Wno-register", "-Wno-reorder", "-Wno-deprecated-declarations"]
//! );
//! ```

use crate::env::{BuildEnvironment, BuildVariable};
use crate::error::Result;
use crate::middleware::{SourceMiddleware, SourceNode, Verdict};
use std::sync::Arc;
use tracing::debug;

/// Trait for configuration-phase customization hooks
pub trait CustomizationHook: Send + Sync {
    /// Stable name used to reference the hook from target configuration
    fn name(&self) -> &str;

    /// Adapt the environment in place
    fn run(&self, env: &mut BuildEnvironment) -> Result<()>;
}

/// Registry for managing hooks
///
/// Hooks run in registration order; the first error aborts the run.
pub struct HookRegistry {
    hooks: Vec<Arc<dyn CustomizationHook>>,
}

impl HookRegistry {
    /// Create a new hook registry
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a hook
    pub fn register(&mut self, hook: Arc<dyn CustomizationHook>) {
        self.hooks.push(hook);
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook against the environment, in order
    pub fn run_all(&self, env: &mut BuildEnvironment) -> Result<()> {
        for hook in &self.hooks {
            debug!(hook = hook.name(), build_target = env.target(), "Running hook");
            hook.run(env)?;
        }
        Ok(())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a builtin hook by name
pub fn builtin(name: &str) -> Option<Arc<dyn CustomizationHook>> {
    match name {
        ToolchainCompatHook::NAME => Some(Arc::new(ToolchainCompatHook)),
        DiagnosticsHook::NAME => Some(Arc::new(DiagnosticsHook)),
        _ => None,
    }
}

/// Compatibility shims for building legacy C++ under a newer toolchain
///
/// Two adjustments, applied in one pass:
/// - suppresses the warnings a current compiler emits for pre-C++17 idioms
///   in the vendored tree (`register`, member-initializer order, deprecated
///   declarations);
/// - excludes the bundled `{fmt}` implementation file from the build, since
///   `fmt/src/fmt.cc` wants a newer language standard than the rest of the
///   project targets.
pub struct ToolchainCompatHook;

impl ToolchainCompatHook {
    /// Name under which the hook is configured
    pub const NAME: &'static str = "toolchain-compat";

    /// Warning-suppression flags, appended in this order
    pub const SUPPRESSED_WARNINGS: [&'static str; 3] = [
        "-Wno-register",
        "-Wno-reorder",
        "-Wno-deprecated-declarations",
    ];

    /// Scope pattern for the exclusion middleware
    pub const FMT_SOURCE_PATTERN: &'static str = "*fmt/src/fmt.cc";

    /// Append the warning-suppression flags to `CXXFLAGS`
    ///
    /// Appends exactly [`Self::SUPPRESSED_WARNINGS`], in order, at the end of
    /// the list. Repeated calls append duplicates; the toolchain tolerates
    /// them, so no deduplication happens here.
    pub fn apply_flags(&self, env: &mut BuildEnvironment) {
        env.append(BuildVariable::CxxFlags, Self::SUPPRESSED_WARNINGS);
    }

    /// Register the `{fmt}` exclusion middleware
    ///
    /// The registration is scoped by [`Self::FMT_SOURCE_PATTERN`]; the
    /// callback itself is [`ExcludeFromBuild`] and excludes every node it is
    /// consulted about.
    pub fn register_source_filter(&self, env: &mut BuildEnvironment) -> Result<()> {
        env.add_build_middleware_matching(Self::FMT_SOURCE_PATTERN, Arc::new(ExcludeFromBuild))
    }
}

impl CustomizationHook for ToolchainCompatHook {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, env: &mut BuildEnvironment) -> Result<()> {
        println!("Script running now!");
        self.apply_flags(env);
        self.register_source_filter(env)?;
        Ok(())
    }
}

/// Middleware that drops every node it is consulted about
///
/// Scoping comes from the chain's pattern gate, not from the callback: a
/// registration pairs this with a pattern, and the chain only consults it for
/// matching paths. Asked directly, it excludes unconditionally.
pub struct ExcludeFromBuild;

impl SourceMiddleware for ExcludeFromBuild {
    fn process(&self, _env: &BuildEnvironment, _node: &SourceNode) -> Verdict {
        Verdict::Exclude
    }
}

/// Hook that logs the environment's state without changing it
///
/// Useful at the end of a hook list to see what earlier hooks produced.
pub struct DiagnosticsHook;

impl DiagnosticsHook {
    /// Name under which the hook is configured
    pub const NAME: &'static str = "diagnostics";
}

impl CustomizationHook for DiagnosticsHook {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, env: &mut BuildEnvironment) -> Result<()> {
        for var in BuildVariable::ALL {
            let flags = env.flags(var);
            if !flags.is_empty() {
                debug!(
                    build_target = env.target(),
                    variable = %var,
                    flags = flags.len(),
                    "Environment flags"
                );
            }
        }
        debug!(
            build_target = env.target(),
            middleware = env.middleware().len(),
            "Environment middleware"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_apply_flags_appends_exactly_three() {
        let mut env = BuildEnvironment::new("esp32");
        env.append(BuildVariable::CxxFlags, ["-std=gnu++17"]);

        ToolchainCompatHook.apply_flags(&mut env);

        assert_eq!(
            env.flags(BuildVariable::CxxFlags),
            [
                "-std=gnu++17",
                "-Wno-register",
                "-Wno-reorder",
                "-Wno-deprecated-declarations"
            ]
        );
    }

    #[test]
    fn test_apply_flags_twice_duplicates() {
        let mut env = BuildEnvironment::new("esp32");
        let hook = ToolchainCompatHook;
        hook.apply_flags(&mut env);
        hook.apply_flags(&mut env);

        let flags = env.flags(BuildVariable::CxxFlags);
        assert_eq!(flags.len(), 6);
        assert_eq!(flags[..3], flags[3..]);
    }

    #[test]
    fn test_callback_excludes_unconditionally() {
        // The registered callback ignores the node entirely; pattern scoping
        // is the chain's job.
        let env = BuildEnvironment::new("esp32");
        let fmt_node = SourceNode::new("/x/y/fmt/src/fmt.cc");
        let other_node = SourceNode::new("/x/y/other.cc");

        assert_eq!(ExcludeFromBuild.process(&env, &fmt_node), Verdict::Exclude);
        assert_eq!(ExcludeFromBuild.process(&env, &other_node), Verdict::Exclude);
    }

    #[test]
    fn test_registered_filter_only_drops_matching_paths() {
        let mut env = BuildEnvironment::new("esp32");
        ToolchainCompatHook
            .register_source_filter(&mut env)
            .unwrap();

        let filtered = env.apply_middleware(vec![
            SourceNode::new("lib/fmt/src/fmt.cc"),
            SourceNode::new("src/main.cpp"),
            SourceNode::new("src/fmt.cc"),
        ]);

        assert_eq!(filtered.excluded.len(), 1);
        assert_eq!(
            filtered.excluded[0].path(),
            Path::new("lib/fmt/src/fmt.cc")
        );
        assert_eq!(filtered.kept.len(), 2);
    }

    #[test]
    fn test_run_registers_exactly_one_middleware() {
        let mut env = BuildEnvironment::new("esp32");
        let hook = ToolchainCompatHook;

        hook.run(&mut env).unwrap();
        assert_eq!(env.middleware().len(), 1);

        // A second run appends duplicate flags and a duplicate registration;
        // the exclusion outcome is unchanged.
        hook.run(&mut env).unwrap();
        assert_eq!(env.middleware().len(), 2);
        assert_eq!(env.flags(BuildVariable::CxxFlags).len(), 6);
    }

    #[test]
    fn test_registry_runs_hooks_in_order() {
        struct PushFlag(&'static str);

        impl CustomizationHook for PushFlag {
            fn name(&self) -> &str {
                self.0
            }

            fn run(&self, env: &mut BuildEnvironment) -> Result<()> {
                env.append(BuildVariable::CcFlags, [self.0]);
                Ok(())
            }
        }

        let mut registry = HookRegistry::new();
        registry.register(Arc::new(PushFlag("-first")));
        registry.register(Arc::new(PushFlag("-second")));

        let mut env = BuildEnvironment::new("esp32");
        registry.run_all(&mut env).unwrap();

        assert_eq!(env.flags(BuildVariable::CcFlags), ["-first", "-second"]);
    }

    #[test]
    fn test_registry_stops_at_first_error() {
        struct Failing;

        impl CustomizationHook for Failing {
            fn name(&self) -> &str {
                "failing"
            }

            fn run(&self, _env: &mut BuildEnvironment) -> Result<()> {
                Err(crate::error::PreflightError::Hook("boom".to_string()))
            }
        }

        struct MustNotRun;

        impl CustomizationHook for MustNotRun {
            fn name(&self) -> &str {
                "must-not-run"
            }

            fn run(&self, env: &mut BuildEnvironment) -> Result<()> {
                env.append(BuildVariable::CcFlags, ["-never"]);
                Ok(())
            }
        }

        let mut registry = HookRegistry::new();
        registry.register(Arc::new(Failing));
        registry.register(Arc::new(MustNotRun));

        let mut env = BuildEnvironment::new("esp32");
        assert!(registry.run_all(&mut env).is_err());
        assert!(env.flags(BuildVariable::CcFlags).is_empty());
    }

    #[test]
    fn test_builtin_resolution() {
        assert!(builtin("toolchain-compat").is_some());
        assert!(builtin("diagnostics").is_some());
        assert!(builtin("no-such-hook").is_none());
    }

    #[test]
    fn test_diagnostics_hook_changes_nothing() {
        let mut env = BuildEnvironment::new("esp32");
        env.append(BuildVariable::CxxFlags, ["-std=gnu++17"]);

        DiagnosticsHook.run(&mut env).unwrap();

        assert_eq!(env.flags(BuildVariable::CxxFlags), ["-std=gnu++17"]);
        assert!(env.middleware().is_empty());
    }
}
