//! Build middleware: per-source callbacks that decide inclusion before compilation
//!
//! A middleware is consulted once per candidate source file while the
//! orchestrator collects the source list. Each registration may carry a glob
//! pattern; the chain only consults a scoped middleware for nodes whose path
//! matches its pattern. An unscoped middleware sees every node.
//!
//! # Example
//!
//! ```rust
//! use preflight_core::env::BuildEnvironment;
//! use preflight_core::middleware::{SourceNode, Verdict};
//! use std::sync::Arc;
//!
//! let mut env = BuildEnvironment::new("esp32");
//! env.add_build_middleware_matching(
//!     "*generated/*.cpp",
//!     Arc::new(|_env: &BuildEnvironment, _node: &SourceNode| Verdict::Exclude),
//! )
//! .unwrap();
//!
//! let filtered = env.apply_middleware(vec![
//!     SourceNode::new("src/main.cpp"),
//!     SourceNode::new("src/generated/tables.cpp"),
//! ]);
//! assert_eq!(filtered.kept.len(), 1);
//! assert_eq!(filtered.excluded.len(), 1);
//! ```

use crate::env::BuildEnvironment;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One candidate source file, identified by its path.
///
/// Middleware inspects a node but never mutates it; substitution is expressed
/// by returning [`Verdict::Replace`] with a new node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceNode {
    path: PathBuf,
}

impl SourceNode {
    /// Create a node for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The node's path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the node, yielding its path
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for SourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A middleware's decision for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No opinion: pass the node through unchanged
    Keep,
    /// Substitute a different node for the rest of the chain and the build
    Replace(SourceNode),
    /// Drop the node from the build
    Exclude,
}

/// Trait for build middleware
///
/// Implementations must not mutate the environment or the node; they see a
/// snapshot of the environment as configured by the hooks that ran before
/// source collection.
pub trait SourceMiddleware: Send + Sync {
    /// Decide what happens to one candidate node
    fn process(&self, env: &BuildEnvironment, node: &SourceNode) -> Verdict;
}

impl<F> SourceMiddleware for F
where
    F: Fn(&BuildEnvironment, &SourceNode) -> Verdict + Send + Sync,
{
    fn process(&self, env: &BuildEnvironment, node: &SourceNode) -> Verdict {
        self(env, node)
    }
}

struct MiddlewareEntry {
    /// Scope pattern; `None` means the middleware sees every node
    pattern: Option<Pattern>,
    middleware: Arc<dyn SourceMiddleware>,
}

/// Ordered middleware registrations for one build environment
///
/// Registration order is evaluation order. A scoped entry is skipped for
/// nodes whose path does not match its pattern; `*` may span path separators
/// so `*fmt/src/fmt.cc` matches any path ending in `fmt/src/fmt.cc`.
#[derive(Default)]
pub struct MiddlewareChain {
    entries: Vec<MiddlewareEntry>,
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl MiddlewareChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register middleware consulted for every node
    pub fn add(&mut self, middleware: Arc<dyn SourceMiddleware>) {
        self.entries.push(MiddlewareEntry {
            pattern: None,
            middleware,
        });
    }

    /// Register middleware consulted only for nodes matching `pattern`
    pub fn add_scoped(&mut self, pattern: Pattern, middleware: Arc<dyn SourceMiddleware>) {
        self.entries.push(MiddlewareEntry {
            pattern: Some(pattern),
            middleware,
        });
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every candidate through the chain, partitioning kept from excluded
    pub fn filter(&self, env: &BuildEnvironment, candidates: Vec<SourceNode>) -> FilteredSources {
        let mut kept = Vec::new();
        let mut excluded = Vec::new();

        for node in candidates {
            match self.dispose(env, node) {
                Disposition::Kept(node) => kept.push(node),
                Disposition::Excluded(node) => {
                    debug!(path = %node, "Source excluded by middleware");
                    excluded.push(node);
                }
            }
        }

        FilteredSources { kept, excluded }
    }

    fn dispose(&self, env: &BuildEnvironment, mut node: SourceNode) -> Disposition {
        for entry in &self.entries {
            if let Some(pattern) = &entry.pattern {
                if !pattern.matches_path(node.path()) {
                    continue;
                }
            }

            match entry.middleware.process(env, &node) {
                Verdict::Keep => {}
                Verdict::Replace(replacement) => node = replacement,
                Verdict::Exclude => return Disposition::Excluded(node),
            }
        }

        Disposition::Kept(node)
    }
}

enum Disposition {
    Kept(SourceNode),
    Excluded(SourceNode),
}

/// Outcome of running candidates through a middleware chain
#[derive(Debug, Clone, Default)]
pub struct FilteredSources {
    /// Nodes that remain in the build, in candidate order
    pub kept: Vec<SourceNode>,
    /// Nodes dropped by a middleware, in candidate order
    pub excluded: Vec<SourceNode>,
}
