//! # tfpromote-sync
//!
//! Reconciliation and promotion of `.tf` file sets between two environment
//! directories.
//!
//! Build an [`EnvDir`] for each side, then call [`reconcile`],
//! [`compare_directory_contents`] and [`promote`] directly, or drive the
//! whole gated sequence with [`pipeline::Session`].

pub mod confirm;
pub mod diff;
pub mod difftool;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod promote;
pub mod reconcile;

pub use confirm::{AutoApprove, Confirm, ScriptedConfirm, StdinConfirm};
pub use diff::{compare_directory_contents, diff_pair, FileDiff, PairDiff};
pub use difftool::{find_executable, DiffTool};
pub use discovery::{list_plain_files, list_scoped_files, EnvDir, TF_EXTENSION};
pub use error::SyncError;
pub use pipeline::{PromoteOptions, RunReport, RunStatus, Session};
pub use promote::{promote, PromoteOutcome};
pub use reconcile::{diff_filenames, reconcile, Asymmetry, FileSetDiff, Policy, Reconciliation};
