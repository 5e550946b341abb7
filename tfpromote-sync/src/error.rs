//! Error types for tfpromote-sync.

use std::path::PathBuf;

use thiserror::Error;

use tfpromote_core::error::RegistryError;

/// All errors that can arise from reconciliation and promotion.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the environment registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An environment directory that does not exist (or is not a directory).
    #[error("path does not exist: {}", .path.display())]
    PathNotFound { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured diff viewer could not be found on `PATH`.
    #[error("could not find an executable for '{name}'")]
    ExecutableNotFound { name: String },

    /// File-set asymmetries that must be fixed by hand before promoting.
    #[error("{message}; resolve diffs before tfpromote will proceed")]
    Unresolved { message: String },

    /// The operator answered anything but `y` at a confirmation prompt.
    #[error("{action} declined")]
    Declined { action: String },

    /// One or more files failed to promote under `continue_on_error`.
    #[error("{count} file(s) failed to promote")]
    PartialPromotion { count: usize },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
