//! File promotion from a lower environment directory to a higher one.
//!
//! ## `copy_replace` protocol
//!
//! 1. Copy the source to `<dest>.tfpromote.tmp` in the destination directory.
//! 2. Rename the temp file over the destination (atomic on POSIX).
//! 3. On any failure remove the temp file; the destination is untouched.
//!
//! A destination that is a symlink is written through: the temp file is
//! placed next to the link target and renamed over it, so the link survives.
//!
//! Promotion of a file set is not atomic: files promoted before a failure
//! stay promoted.

use std::path::{Path, PathBuf};

use crate::discovery::EnvDir;
use crate::error::{io_err, SyncError};

/// Result of promoting one file.
#[derive(Debug)]
pub enum PromoteOutcome {
    /// Destination fully replaced with the source content.
    Promoted { name: String, bytes: u64 },
    /// Copy failed; destination left as it was.
    Failed { name: String, error: SyncError },
}

impl PromoteOutcome {
    pub fn name(&self) -> &str {
        match self {
            PromoteOutcome::Promoted { name, .. } | PromoteOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PromoteOutcome::Failed { .. })
    }
}

/// Copy `filenames` from `from` to `to`, in order, overwriting destinations.
///
/// With `continue_on_error == false` the first failure is returned and the
/// remaining files are left unpromoted. With `true` each failure is recorded
/// as [`PromoteOutcome::Failed`] and the loop moves on.
pub fn promote<S: AsRef<str>>(
    filenames: &[S],
    from: &EnvDir,
    to: &EnvDir,
    continue_on_error: bool,
) -> Result<Vec<PromoteOutcome>, SyncError> {
    let mut outcomes = Vec::with_capacity(filenames.len());
    for name in filenames {
        let name = name.as_ref();
        let source = from.path().join(name);
        let dest = to.path().join(name);
        tracing::info!("promoting {name}: {} -> {}", source.display(), dest.display());

        match copy_replace(&source, &dest) {
            Ok(bytes) => outcomes.push(PromoteOutcome::Promoted {
                name: name.to_string(),
                bytes,
            }),
            Err(error) => {
                tracing::warn!("error promoting {name}: {error}");
                if !continue_on_error {
                    return Err(error);
                }
                outcomes.push(PromoteOutcome::Failed {
                    name: name.to_string(),
                    error,
                });
            }
        }
    }
    Ok(outcomes)
}

fn copy_replace(source: &Path, dest: &Path) -> Result<u64, SyncError> {
    let target = write_target(dest)?;
    let tmp = PathBuf::from(format!("{}.tfpromote.tmp", target.display()));
    copy_replace_with_tmp(source, &target, &tmp)
}

/// The file a write to `dest` should replace: the link target when `dest` is
/// a symlink, `dest` itself otherwise.
fn write_target(dest: &Path) -> Result<PathBuf, SyncError> {
    match std::fs::symlink_metadata(dest) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let target = std::fs::canonicalize(dest).map_err(|e| io_err(dest, e))?;
            tracing::debug!("{} is a symlink, writing through to {}", dest.display(), target.display());
            Ok(target)
        }
        _ => Ok(dest.to_path_buf()),
    }
}

fn copy_replace_with_tmp(source: &Path, dest: &Path, tmp: &Path) -> Result<u64, SyncError> {
    let bytes = match std::fs::copy(source, tmp) {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = std::fs::remove_file(tmp);
            let path = if source.exists() { tmp } else { source };
            return Err(io_err(path, e));
        }
    };

    if let Err(e) = std::fs::rename(tmp, dest) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(dest, e));
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
