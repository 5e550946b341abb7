//! External diff viewer lookup and launch.
//!
//! The viewer is opaque: tfpromote hands it two paths and only observes the
//! exit status.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::{io_err, SyncError};

/// Locate `executable` the way a shell `which` would, using the process
/// environment.
pub fn find_executable(executable: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH");
    let pathext = std::env::var_os("PATHEXT");
    find_executable_in(executable, path_var.as_deref(), pathext.as_deref())
}

/// Pure form of [`find_executable`].
///
/// The name is tried as given first, then in every `path_var` entry. On
/// Windows, when the name has no extension listed in `pathext`, each of
/// those extensions is tried as well.
pub fn find_executable_in(
    executable: &str,
    path_var: Option<&OsStr>,
    pathext: Option<&OsStr>,
) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = path_var
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();

    for ext in candidate_extensions(executable, pathext) {
        let name = format!("{executable}{ext}");
        let direct = PathBuf::from(&name);
        if direct.is_file() {
            return Some(direct);
        }
        if let Some(found) = dirs.iter().map(|d| d.join(&name)).find(|p| p.is_file()) {
            return Some(found);
        }
    }
    None
}

#[cfg(windows)]
fn candidate_extensions(executable: &str, pathext: Option<&OsStr>) -> Vec<String> {
    let exts: Vec<String> = pathext
        .map(|p| p.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| ".com;.exe;.bat;.cmd".to_string())
        .split(';')
        .filter(|e| !e.is_empty())
        .map(str::to_owned)
        .collect();
    let current = Path::new(executable)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()));
    match current {
        Some(ext) if exts.contains(&ext) => vec![String::new()],
        _ => exts,
    }
}

#[cfg(not(windows))]
fn candidate_extensions(_executable: &str, _pathext: Option<&OsStr>) -> Vec<String> {
    vec![String::new()]
}

/// A resolved diff viewer command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTool {
    command: String,
    program: PathBuf,
    args: Vec<String>,
}

impl DiffTool {
    /// Resolve `command` (e.g. `meld` or `code --diff --wait`) against `PATH`.
    pub fn resolve(command: &str) -> Result<Self, SyncError> {
        let not_found = || SyncError::ExecutableNotFound {
            name: command.to_string(),
        };
        let mut words = shell_words::split(command)
            .map_err(|_| not_found())?
            .into_iter();
        let name = words.next().ok_or_else(not_found)?;
        let program = find_executable(&name).ok_or_else(not_found)?;
        Ok(Self {
            command: command.to_string(),
            program,
            args: words.collect(),
        })
    }

    /// The command as configured.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the viewer on `from` and `to` and wait for it to exit.
    pub fn launch(&self, from: &Path, to: &Path) -> Result<ExitStatus, SyncError> {
        tracing::debug!(
            "launching {} {:?} {} {}",
            self.program.display(),
            self.args,
            from.display(),
            to.display()
        );
        Command::new(&self.program)
            .args(&self.args)
            .arg(from)
            .arg(to)
            .status()
            .map_err(|e| io_err(&self.program, e))
    }
}
