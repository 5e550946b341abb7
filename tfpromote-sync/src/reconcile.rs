//! File-set reconciliation between a "from" and a "to" environment directory.
//!
//! Asymmetry policy, one rule for every direction:
//!
//! | category | direction     | default   | `--ignore-missing` |
//! |----------|---------------|-----------|--------------------|
//! | plain    | only in to    | blocking  | ignored            |
//! | scoped   | only in to    | blocking  | ignored            |
//! | scoped   | only in from  | blocking  | ignored            |
//! | plain    | only in from  | new files | new files          |
//!
//! New plain files are promotion candidates. Declining them is fatal unless
//! ignore-missing is active.

use serde::Serialize;
use tfpromote_core::{EnvName, FileCategory};

use crate::discovery::{list_plain_files, list_scoped_files, EnvDir};
use crate::error::SyncError;

/// Set difference in both directions, preserving input order.
///
/// `diff_filenames(a, b) == swap(diff_filenames(b, a))`.
pub fn diff_filenames<S: AsRef<str>>(from: &[S], to: &[S]) -> (Vec<String>, Vec<String>) {
    let only_in = |xs: &[S], ys: &[S]| -> Vec<String> {
        xs.iter()
            .filter(|x| !ys.iter().any(|y| y.as_ref() == x.as_ref()))
            .map(|x| x.as_ref().to_string())
            .collect()
    };
    (only_in(from, to), only_in(to, from))
}

/// Both directions of a file-set difference for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSetDiff {
    pub only_in_from: Vec<String>,
    pub only_in_to: Vec<String>,
}

impl FileSetDiff {
    pub fn new<S: AsRef<str>>(from: &[S], to: &[S]) -> Self {
        let (only_in_from, only_in_to) = diff_filenames(from, to);
        Self {
            only_in_from,
            only_in_to,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.only_in_from.is_empty() && self.only_in_to.is_empty()
    }
}

/// How the driver must treat an asymmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Stop the run; the operator resolves it out of band.
    Blocking,
    /// Report and carry on; the files take no further part in the run.
    Ignorable,
    /// Offer the files for promotion.
    NewFiles,
}

/// Files present in one environment directory but not the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asymmetry {
    pub category: FileCategory,
    /// Environment that has the files.
    pub present_in: EnvName,
    /// Environment that lacks them.
    pub missing_from: EnvName,
    /// Logical names; scoped files without their prefix.
    pub files: Vec<String>,
    /// On-disk names, scoped files carrying the owning directory's prefix.
    pub disk_names: Vec<String>,
    pub policy: Policy,
}

impl Asymmetry {
    pub fn is_blocking(&self) -> bool {
        self.policy == Policy::Blocking
    }
}

/// Discovery results and differences for a directory pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub from_plain: Vec<String>,
    pub to_plain: Vec<String>,
    pub from_scoped: Vec<String>,
    pub to_scoped: Vec<String>,
    pub plain: FileSetDiff,
    pub scoped: FileSetDiff,
}

/// Discover both directories and compute the differences for each category.
///
/// Runs plain discovery before scoped discovery, from before to.
pub fn reconcile(from: &EnvDir, to: &EnvDir) -> Result<Reconciliation, SyncError> {
    let from_plain = list_plain_files(from)?;
    let to_plain = list_plain_files(to)?;
    let from_scoped = list_scoped_files(from)?;
    let to_scoped = list_scoped_files(to)?;

    let plain = FileSetDiff::new(from_plain.as_slice(), to_plain.as_slice());
    let scoped = FileSetDiff::new(from_scoped.as_slice(), to_scoped.as_slice());
    tracing::debug!(
        "reconciled {} -> {}: plain {:?}, scoped {:?}",
        from.env(),
        to.env(),
        plain,
        scoped
    );

    Ok(Reconciliation {
        from_plain,
        to_plain,
        from_scoped,
        to_scoped,
        plain,
        scoped,
    })
}

impl Reconciliation {
    /// True when both directories hold exactly the same file names.
    pub fn is_balanced(&self) -> bool {
        self.plain.is_empty() && self.scoped.is_empty()
    }

    /// Plain files present on both sides, in "from" order.
    pub fn common_plain(&self) -> Vec<String> {
        common(&self.from_plain, &self.to_plain)
    }

    /// Scoped files present on both sides, in "from" order.
    pub fn common_scoped(&self) -> Vec<String> {
        common(&self.from_scoped, &self.to_scoped)
    }

    /// Every non-empty asymmetry with its policy, in the order the driver
    /// handles them: orphans in "to", then scoped files only "from" has,
    /// then new plain files. Everything that can block comes before the
    /// only direction that copies.
    pub fn asymmetries(&self, from: &EnvDir, to: &EnvDir, ignore_missing: bool) -> Vec<Asymmetry> {
        let missing_policy = if ignore_missing {
            Policy::Ignorable
        } else {
            Policy::Blocking
        };

        let candidates = [
            (FileCategory::Plain, &self.plain.only_in_to, to, from, missing_policy),
            (FileCategory::Scoped, &self.scoped.only_in_to, to, from, missing_policy),
            (FileCategory::Scoped, &self.scoped.only_in_from, from, to, missing_policy),
            (FileCategory::Plain, &self.plain.only_in_from, from, to, Policy::NewFiles),
        ];

        candidates
            .into_iter()
            .filter(|(_, files, ..)| !files.is_empty())
            .map(|(category, files, owner, other, policy)| Asymmetry {
                category,
                present_in: owner.env().clone(),
                missing_from: other.env().clone(),
                files: files.clone(),
                disk_names: files
                    .iter()
                    .map(|name| match category {
                        FileCategory::Plain => name.clone(),
                        FileCategory::Scoped => owner.scoped_name(name),
                    })
                    .collect(),
                policy,
            })
            .collect()
    }
}

fn common(from: &[String], to: &[String]) -> Vec<String> {
    from.iter().filter(|f| to.contains(f)).cloned().collect()
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

    fn env_dir(root: &TempDir, segment: &str, files: &[&str]) -> EnvDir {
        let path = root.path().join(segment);
        fs::create_dir_all(&path).unwrap();
        for f in files {
            fs::write(path.join(f), "").unwrap();
        }
        EnvDir::resolve(path, &Registry::default()).unwrap()
    }

    #[test]
    fn diff_filenames_preserves_input_order() {
        let (from, to) = diff_filenames(&["c.tf", "a.tf", "b.tf"], &["b.tf", "z.tf", "y.tf"]);
        assert_eq!(from, vec!["c.tf", "a.tf"]);
        assert_eq!(to, vec!["z.tf", "y.tf"]);
    }

    #[test]
    fn diff_filenames_is_symmetric() {
        let a = ["main.tf", "vpc.tf", "iam.tf"];
        let b = ["vpc.tf", "dns.tf"];
        let (ab_from, ab_to) = diff_filenames(&a, &b);
        let (ba_from, ba_to) = diff_filenames(&b, &a);
        assert_eq!((ab_from, ab_to), (ba_to, ba_from));
    }

    #[test]
    fn identical_sets_have_no_differences() {
        let set = ["a.tf", "b.tf"];
        let diff = FileSetDiff::new(&set, &set);
        assert!(diff.is_empty());
    }

    #[test]
    fn scoped_asymmetries_report_on_disk_names() {
        let root = TempDir::new().unwrap();
        let from = env_dir(&root, "dev", &["dev-backend.tf", "dev-extra.tf"]);
        let to = env_dir(&root, "stage", &["stage-backend.tf", "stage-orphan.tf"]);

        let rec = reconcile(&from, &to).unwrap();
        let asym = rec.asymmetries(&from, &to, false);
        assert_eq!(asym.len(), 2);

        assert_eq!(asym[0].category, FileCategory::Scoped);
        assert_eq!(asym[0].present_in.as_str(), "stage");
        assert_eq!(asym[0].files, vec!["orphan.tf"]);
        assert_eq!(asym[0].disk_names, vec!["stage-orphan.tf"]);
        assert!(asym[0].is_blocking());

        assert_eq!(asym[1].present_in.as_str(), "dev");
        assert_eq!(asym[1].disk_names, vec!["dev-extra.tf"]);
        assert!(asym[1].is_blocking());
    }

    #[test]
    fn ignore_missing_governs_every_missing_direction() {
        let root = TempDir::new().unwrap();
        let from = env_dir(&root, "dev", &["new.tf", "dev-only.tf"]);
        let to = env_dir(&root, "stage", &["orphan.tf", "stage-orphan.tf"]);

        let rec = reconcile(&from, &to).unwrap();
        let policies: Vec<_> = rec
            .asymmetries(&from, &to, true)
            .into_iter()
            .map(|a| (a.category, a.policy))
            .collect();
        assert_eq!(
            policies,
            vec![
                (FileCategory::Plain, Policy::Ignorable),
                (FileCategory::Scoped, Policy::Ignorable),
                (FileCategory::Scoped, Policy::Ignorable),
                (FileCategory::Plain, Policy::NewFiles),
            ]
        );
    }

    #[test]
    fn common_lists_exclude_one_sided_files() {
        let root = TempDir::new().unwrap();
        let from = env_dir(&root, "dev", &["a.tf", "b.tf", "dev-x.tf"]);
        let to = env_dir(&root, "stage", &["b.tf", "c.tf", "stage-x.tf"]);

        let rec = reconcile(&from, &to).unwrap();
        assert_eq!(rec.common_plain(), vec!["b.tf"]);
        assert_eq!(rec.common_scoped(), vec!["x.tf"]);
        assert!(!rec.is_balanced());
    }
}
