//! Error types for configuration-phase operations

use thiserror::Error;

/// Result type for configuration-phase operations
pub type Result<T> = std::result::Result<T, PreflightError>;

/// Error types for the Preflight framework
#[derive(Debug, Error)]
pub enum PreflightError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Target not found in the project manifest
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// Hook name does not resolve to a registered hook
    #[error("Unknown hook: {0}")]
    UnknownHook(String),

    /// Glob pattern failed to compile
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Source enumeration failed
    #[error("Source error: {0}")]
    Sources(String),

    /// A customization hook failed
    #[error("Hook error: {0}")]
    Hook(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
