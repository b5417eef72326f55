//! Candidate source enumeration
//!
//! Walks a target's source directories and yields one [`SourceNode`] per
//! C/C++ translation unit, in sorted path order so repeated runs over the
//! same tree produce the same candidate list.

use crate::error::{PreflightError, Result};
use crate::middleware::SourceNode;
use glob::glob;
use std::path::Path;

/// File extensions treated as translation units
pub const SOURCE_EXTENSIONS: [&str; 4] = ["c", "cc", "cpp", "cxx"];

/// Collect every candidate source under `root`, recursively
///
/// Headers and other non-source files are ignored. A missing or non-directory
/// `root` is an error; an empty result is not.
pub fn collect(root: &Path) -> Result<Vec<SourceNode>> {
    if !root.is_dir() {
        return Err(PreflightError::Sources(format!(
            "source directory '{}' does not exist",
            root.display()
        )));
    }

    let pattern = format!("{}/**/*", root.display());
    let entries = glob(&pattern).map_err(|e| PreflightError::InvalidPattern {
        pattern: pattern.clone(),
        message: e.msg.to_string(),
    })?;

    let mut nodes = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() && has_source_extension(&path) {
                    nodes.push(SourceNode::new(path));
                }
            }
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(PreflightError::Sources(format!(
                    "error reading '{}': {}",
                    path.display(),
                    e.into_error()
                )));
            }
        }
    }

    nodes.sort();
    Ok(nodes)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}
