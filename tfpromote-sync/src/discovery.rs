//! Environment directories and `.tf` file discovery.
//!
//! ## Naming convention
//!
//! ```text
//! infra/
//!   stage/
//!     main.tf            plain   -> "main.tf"
//!     stage-backend.tf   scoped  -> "backend.tf"
//!   prod-us-east-1/
//!     main.tf                     plain   -> "main.tf"
//!     prod-us-east-1-backend.tf   scoped  -> "backend.tf"
//! ```
//!
//! The scope prefix is the directory's full final segment plus `-`. The
//! environment identity only uses the part before the first `-`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tfpromote_core::{registry::final_segment, EnvName, Registry};

use crate::error::{io_err, SyncError};

/// Extension of the files tfpromote manages.
pub const TF_EXTENSION: &str = ".tf";

/// A directory bound to the environment its name resolves to.
///
/// Built once per directory and threaded through discovery, diffing and
/// promotion so the prefix is never re-derived from the path string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvDir {
    path: PathBuf,
    env: EnvName,
    segment: String,
}

impl EnvDir {
    /// Bind `path` to its environment.
    ///
    /// Returns `SyncError::PathNotFound` if `path` is not an existing
    /// directory, `SyncError::Registry` if its final segment is unknown.
    pub fn resolve(path: impl Into<PathBuf>, registry: &Registry) -> Result<Self, SyncError> {
        let path = path.into();
        let segment = final_segment(&path).ok_or_else(|| SyncError::PathNotFound {
            path: path.clone(),
        })?;
        let env = registry.environment_for_segment(&segment)?.clone();
        if !path.is_dir() {
            return Err(SyncError::PathNotFound { path });
        }
        Ok(Self { path, env, segment })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn env(&self) -> &EnvName {
        &self.env
    }

    /// Final path segment, e.g. `prod-us-east-1`.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// `"{segment}-"`, the on-disk prefix of scoped files in this directory.
    pub fn scope_prefix(&self) -> String {
        format!("{}-", self.segment)
    }

    /// On-disk name of the scoped file `name`.
    pub fn scoped_name(&self, name: &str) -> String {
        format!("{}{}", self.scope_prefix(), name)
    }

    /// Full path of `name` inside this directory, optionally as a scoped file.
    pub fn file_path(&self, name: &str, scoped: bool) -> PathBuf {
        if scoped {
            self.path.join(self.scoped_name(name))
        } else {
            self.path.join(name)
        }
    }
}

/// Environment-agnostic `.tf` files in `dir`, sorted by name.
pub fn list_plain_files(dir: &EnvDir) -> Result<Vec<String>, SyncError> {
    let prefix = dir.scope_prefix();
    let names = list_tf_files(dir.path())?
        .into_iter()
        .filter(|name| !name.starts_with(&prefix))
        .collect::<Vec<_>>();
    tracing::info!(
        "found {} plain {TF_EXTENSION} files in {}",
        names.len(),
        dir.path().display()
    );
    Ok(names)
}

/// Environment-scoped `.tf` files in `dir` with the scope prefix stripped.
pub fn list_scoped_files(dir: &EnvDir) -> Result<Vec<String>, SyncError> {
    let prefix = dir.scope_prefix();
    let names = list_tf_files(dir.path())?
        .into_iter()
        .filter_map(|name| name.strip_prefix(&prefix).map(str::to_owned))
        .collect::<Vec<_>>();
    tracing::info!(
        "found {} scoped {TF_EXTENSION} files in {}",
        names.len(),
        dir.path().display()
    );
    Ok(names)
}

/// Every regular file in `dir` whose name ends in [`TF_EXTENSION`].
///
/// Any read failure aborts the listing; partial results are never returned.
fn list_tf_files(dir: &Path) -> Result<Vec<String>, SyncError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
        let is_file = if file_type.is_symlink() {
            entry.path().is_file()
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(TF_EXTENSION) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
