//! Build environment: one compilation target's mutable configuration
//!
//! A [`BuildEnvironment`] is owned by the orchestrator and lent to
//! customization hooks, which mutate it in place: appending compiler flags,
//! registering build middleware. It holds one ordered flag list per
//! construction variable, the middleware chain, and (once the orchestrator
//! has collected and filtered candidates) the final source list.
//!
//! Flag lists follow the underlying toolchain's rules: appends preserve the
//! order of existing flags and land new flags at the end, and nothing is
//! deduplicated unless [`BuildEnvironment::append_unique`] is asked for.
//! Duplicate flags are accepted downstream, so repeated hook runs simply
//! accumulate.

use crate::error::{PreflightError, Result};
use crate::middleware::{FilteredSources, MiddlewareChain, SourceMiddleware, SourceNode};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Well-known construction variables
///
/// `Display` renders the toolchain's spelling (`CXXFLAGS`, `CPPDEFINES`, ...),
/// which is what target configuration and log lines use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BuildVariable {
    /// C compiler flags
    CcFlags,
    /// C++ compiler flags
    CxxFlags,
    /// Preprocessor defines
    CppDefines,
    /// Preprocessor include paths
    CppPath,
    /// Linker flags
    LinkFlags,
    /// Libraries to link
    Libs,
}

impl BuildVariable {
    /// Every variable, in a stable order
    pub const ALL: [BuildVariable; 6] = [
        BuildVariable::CcFlags,
        BuildVariable::CxxFlags,
        BuildVariable::CppDefines,
        BuildVariable::CppPath,
        BuildVariable::LinkFlags,
        BuildVariable::Libs,
    ];

    /// The toolchain's name for this variable
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariable::CcFlags => "CCFLAGS",
            BuildVariable::CxxFlags => "CXXFLAGS",
            BuildVariable::CppDefines => "CPPDEFINES",
            BuildVariable::CppPath => "CPPPATH",
            BuildVariable::LinkFlags => "LINKFLAGS",
            BuildVariable::Libs => "LIBS",
        }
    }
}

impl fmt::Display for BuildVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of string flags
///
/// Append-only from a hook's point of view: existing flags are never removed
/// or reordered, and appends are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagList(Vec<String>);

impl FlagList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append flags at the end, keeping duplicates
    pub fn append<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(flags.into_iter().map(Into::into));
    }

    /// Insert flags at the front, preserving their relative order
    pub fn prepend<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut front: Vec<String> = flags.into_iter().map(Into::into).collect();
        front.extend(self.0.drain(..));
        self.0 = front;
    }

    /// Append only flags not already present
    pub fn append_unique<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for flag in flags {
            let flag = flag.into();
            if !self.0.contains(&flag) {
                self.0.push(flag);
            }
        }
    }

    /// The flags as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of flags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the flags in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for FlagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FlagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Mutable per-target build configuration
#[derive(Debug, Default)]
pub struct BuildEnvironment {
    target: String,
    vars: BTreeMap<BuildVariable, FlagList>,
    middleware: MiddlewareChain,
    sources: Vec<SourceNode>,
}

impl BuildEnvironment {
    /// Create an empty environment for a named target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            vars: BTreeMap::new(),
            middleware: MiddlewareChain::new(),
            sources: Vec::new(),
        }
    }

    /// The target this environment configures
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Append flags to a variable, order-preserving, duplicates kept
    pub fn append<I, S>(&mut self, var: BuildVariable, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.vars.entry(var).or_default();
        let before = list.len();
        list.append(flags);
        debug!(
            build_target = %self.target,
            variable = %var,
            appended = list.len() - before,
            "Appended build flags"
        );
    }

    /// Insert flags at the front of a variable
    pub fn prepend<I, S>(&mut self, var: BuildVariable, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vars.entry(var).or_default().prepend(flags);
    }

    /// Append flags to a variable, skipping flags already present
    pub fn append_unique<I, S>(&mut self, var: BuildVariable, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vars.entry(var).or_default().append_unique(flags);
    }

    /// The flags currently held by a variable
    pub fn flags(&self, var: BuildVariable) -> &[String] {
        self.vars.get(&var).map(FlagList::as_slice).unwrap_or(&[])
    }

    /// Every populated flag list, keyed by variable
    pub fn flag_lists(&self) -> &BTreeMap<BuildVariable, FlagList> {
        &self.vars
    }

    /// Register middleware consulted for every candidate node
    pub fn add_build_middleware(&mut self, middleware: Arc<dyn SourceMiddleware>) {
        debug!(build_target = %self.target, "Registered build middleware");
        self.middleware.add(middleware);
    }

    /// Register middleware consulted only for nodes matching a glob pattern
    ///
    /// `*` may span path separators, so `*fmt/src/fmt.cc` scopes the
    /// middleware to any path ending in `fmt/src/fmt.cc`.
    pub fn add_build_middleware_matching(
        &mut self,
        pattern: &str,
        middleware: Arc<dyn SourceMiddleware>,
    ) -> Result<()> {
        let compiled = Pattern::new(pattern).map_err(|e| PreflightError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        debug!(
            build_target = %self.target,
            pattern = %pattern,
            "Registered scoped build middleware"
        );
        self.middleware.add_scoped(compiled, middleware);
        Ok(())
    }

    /// The environment's middleware chain
    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    /// Run candidates through the middleware chain
    pub fn apply_middleware(&self, candidates: Vec<SourceNode>) -> FilteredSources {
        self.middleware.filter(self, candidates)
    }

    /// Install the final source list, normally after middleware filtering
    pub fn set_sources(&mut self, sources: Vec<SourceNode>) {
        self.sources = sources;
    }

    /// The final source list
    pub fn sources(&self) -> &[SourceNode] {
        &self.sources
    }
}
