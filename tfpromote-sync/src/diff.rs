//! Unified line diffs between corresponding files of two environments.

use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;

use crate::discovery::EnvDir;
use crate::error::{io_err, SyncError};

/// Both sides of a file pair, decoded and ready to diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairDiff {
    from_path: PathBuf,
    to_path: PathBuf,
    from_text: String,
    to_text: String,
}

impl PairDiff {
    /// Non-blank unified diff lines, headers first.
    ///
    /// Every call starts a fresh sequence. Hunk headers and `+`/`-` lines are
    /// kept even when their content is empty; only lines that are entirely
    /// whitespace (blank context lines) are dropped.
    pub fn lines(&self) -> impl Iterator<Item = String> {
        let old_header = self.from_path.display().to_string();
        let new_header = self.to_path.display().to_string();
        let rendered = TextDiff::from_lines(&self.from_text, &self.to_text)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        rendered
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>()
            .into_iter()
    }

    pub fn is_identical(&self) -> bool {
        self.lines().next().is_none()
    }
}

/// Read both files for diffing.
///
/// Bytes that are not valid UTF-8 become U+FFFD instead of failing the diff.
/// CRLF line endings are normalised to LF.
pub fn diff_pair(from: &Path, to: &Path) -> Result<PairDiff, SyncError> {
    Ok(PairDiff {
        from_path: from.to_path_buf(),
        to_path: to.to_path_buf(),
        from_text: read_lossy(from)?,
        to_text: read_lossy(to)?,
    })
}

/// A file whose content differs between the two environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    /// Logical name; scoped files without their prefix.
    pub name: String,
    pub from_path: PathBuf,
    pub to_path: PathBuf,
    pub lines: Vec<String>,
}

impl FileDiff {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Diff every file in `filenames` between `from` and `to`.
///
/// With `use_env_prefix`, each directory applies its own scope prefix to the
/// name. Pairs with a missing side are skipped when `ignore_missing` is set;
/// otherwise reading them fails. Only pairs with at least one diff line are
/// returned, in input order.
pub fn compare_directory_contents<S: AsRef<str>>(
    filenames: &[S],
    from: &EnvDir,
    to: &EnvDir,
    use_env_prefix: bool,
    ignore_missing: bool,
) -> Result<Vec<FileDiff>, SyncError> {
    let mut diffs = Vec::new();
    for name in filenames {
        let name = name.as_ref();
        let from_path = from.file_path(name, use_env_prefix);
        let to_path = to.file_path(name, use_env_prefix);
        tracing::debug!("diff on from file: {}", from_path.display());
        tracing::debug!("diff on to file: {}", to_path.display());

        if ignore_missing {
            if let Some(missing) = [&from_path, &to_path].into_iter().find(|p| !p.exists()) {
                tracing::info!("ignoring missing file: {}", missing.display());
                continue;
            }
        }

        let lines: Vec<String> = diff_pair(&from_path, &to_path)?.lines().collect();
        tracing::debug!("{} lines different in {name}", lines.len());
        if lines.is_empty() {
            continue;
        }
        diffs.push(FileDiff {
            name: name.to_string(),
            from_path,
            to_path,
            lines,
        });
    }
    Ok(diffs)
}

fn read_lossy(path: &Path) -> Result<String, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(normalize_line_endings(&String::from_utf8_lossy(&bytes)))
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tfpromote_core::Registry;

    use super::*;

    fn env_dir(root: &TempDir, segment: &str) -> EnvDir {
        let path = root.path().join(segment);
        fs::create_dir_all(&path).unwrap();
        EnvDir::resolve(path, &Registry::default()).unwrap()
    }

    fn write(dir: &EnvDir, name: &str, content: impl AsRef<[u8]>) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn identical_files_have_no_lines() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a.tf");
        let b = root.path().join("b.tf");
        fs::write(&a, "resource \"x\" {}\n").unwrap();
        fs::write(&b, "resource \"x\" {}\n").unwrap();
        let diff = diff_pair(&a, &b).unwrap();
        assert!(diff.is_identical());
    }

    #[test]
    fn changed_file_has_headers_and_hunks() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a.tf");
        let b = root.path().join("b.tf");
        fs::write(&a, "X\n").unwrap();
        fs::write(&b, "Y\n").unwrap();

        let lines: Vec<String> = diff_pair(&a, &b).unwrap().lines().collect();
        assert_eq!(lines[0], format!("--- {}", a.display()));
        assert_eq!(lines[1], format!("+++ {}", b.display()));
        assert!(lines[2].starts_with("@@"));
        assert!(lines.contains(&"-X".to_string()));
        assert!(lines.contains(&"+Y".to_string()));
    }

    #[test]
    fn lines_are_restartable() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a.tf");
        let b = root.path().join("b.tf");
        fs::write(&a, "one\ntwo\n").unwrap();
        fs::write(&b, "one\nthree\n").unwrap();

        let diff = diff_pair(&a, &b).unwrap();
        let first: Vec<String> = diff.lines().collect();
        let second: Vec<String> = diff.lines().collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn blank_context_lines_are_dropped_but_added_blank_lines_kept() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a.tf");
        let b = root.path().join("b.tf");
        fs::write(&a, "a\n\nb\n").unwrap();
        fs::write(&b, "a\n\nb\n\n").unwrap();

        let lines: Vec<String> = diff_pair(&a, &b).unwrap().lines().collect();
        assert!(lines.iter().all(|l| !l.trim().is_empty()));
        assert!(lines.contains(&"+".to_string()), "added blank line is a change: {lines:?}");
    }

    #[test]
    fn crlf_and_lf_content_compare_equal() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a.tf");
        let b = root.path().join("b.tf");
        fs::write(&a, "line1\r\nline2\r\n").unwrap();
        fs::write(&b, "line1\nline2\n").unwrap();
        assert!(diff_pair(&a, &b).unwrap().is_identical());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a.tf");
        let b = root.path().join("b.tf");
        fs::write(&a, b"name = \"caf\xe9\"\n").unwrap();
        fs::write(&b, "name = \"cafe\"\n").unwrap();

        let lines: Vec<String> = diff_pair(&a, &b).unwrap().lines().collect();
        assert!(lines.iter().any(|l| l.starts_with('-') && l.contains('\u{FFFD}')));
    }

    #[test]
    fn compare_reports_only_changed_files() {
        let root = TempDir::new().unwrap();
        let from = env_dir(&root, "dev");
        let to = env_dir(&root, "stage");
        write(&from, "a.tf", "X\n");
        write(&to, "a.tf", "Y\n");
        write(&from, "b.tf", "same\n");
        write(&to, "b.tf", "same\n");

        let diffs = compare_directory_contents(&["a.tf", "b.tf"], &from, &to, false, false).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].name, "a.tf");
        assert!(diffs[0].line_count() > 0);
    }

    #[test]
    fn compare_with_prefix_uses_each_directory_prefix() {
        let root = TempDir::new().unwrap();
        let from = env_dir(&root, "dev");
        let to = env_dir(&root, "stage-eu");
        write(&from, "dev-backend.tf", "bucket = \"dev\"\n");
        write(&to, "stage-eu-backend.tf", "bucket = \"stage\"\n");

        let diffs = compare_directory_contents(&["backend.tf"], &from, &to, true, false).unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].from_path.ends_with("dev-backend.tf"));
        assert!(diffs[0].to_path.ends_with("stage-eu-backend.tf"));
    }

    #[test]
    fn missing_side_is_skipped_only_when_ignoring() {
        let root = TempDir::new().unwrap();
        let from = env_dir(&root, "dev");
        let to = env_dir(&root, "stage");
        write(&from, "a.tf", "X\n");

        let diffs = compare_directory_contents(&["a.tf"], &from, &to, false, true).unwrap();
        assert!(diffs.is_empty());

        let err = compare_directory_contents(&["a.tf"], &from, &to, false, false).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
