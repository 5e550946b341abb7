//! Promotion pipeline: the sequence behind `tfpromote`.
//!
//! Order is fixed: resolve paths → validate → resolve viewer → reconcile file
//! sets → compare scoped files → compare plain files → promote. Every gated
//! step goes through [`Confirm`]; every operator-facing line goes to the
//! session's output sink.

use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tfpromote_core::{registry::final_segment, Registry};

use crate::confirm::Confirm;
use crate::diff::{compare_directory_contents, FileDiff};
use crate::difftool::DiffTool;
use crate::discovery::EnvDir;
use crate::error::{io_err, SyncError};
use crate::promote::{promote, PromoteOutcome};
use crate::reconcile::{reconcile, Asymmetry, Policy};

/// Everything the operator can choose for a run.
#[derive(Debug, Clone, Default)]
pub struct PromoteOptions {
    /// Source directory; derived from `cwd` when absent.
    pub from: Option<PathBuf>,
    /// Destination directory; derived from `cwd` when absent.
    pub to: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    pub cwd: PathBuf,
    pub ignore_missing: bool,
    pub continue_on_error: bool,
    /// Viewer command, e.g. `meld` or `code --diff --wait`.
    pub difftool: Option<String>,
    /// Print diff lines instead of launching a viewer.
    pub printdiff: bool,
    /// Report only: no prompts, no copies.
    pub dry_run: bool,
}

/// The from/to pair before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub from: PathBuf,
    pub to: PathBuf,
    /// At least one side came from the working directory rather than a flag.
    pub derived: bool,
}

/// Work out the from/to directories from the options.
///
/// - neither given: `to` is `cwd`, `from` is its sibling named after the
///   lower environment, keeping any `-{suffix}` (`prod-eu` → `stage-eu`)
/// - one given: the other is `cwd`
/// - both given: used as is
pub fn resolve_paths(options: &PromoteOptions, registry: &Registry) -> Result<ResolvedPaths, SyncError> {
    let absolute = |p: &Path| normalize(&options.cwd.join(p));

    match (&options.from, &options.to) {
        (None, None) => {
            let to = normalize(&options.cwd);
            let segment = final_segment(&to).ok_or_else(|| SyncError::PathNotFound { path: to.clone() })?;
            let to_env = registry.environment_for_segment(&segment)?;
            let lower = registry.lower_environment(to_env.as_str())?;
            let suffix = segment.strip_prefix(to_env.as_str()).unwrap_or_default();
            let parent = to.parent().ok_or_else(|| SyncError::PathNotFound { path: to.clone() })?;
            Ok(ResolvedPaths {
                from: parent.join(format!("{lower}{suffix}")),
                to,
                derived: true,
            })
        }
        (Some(from), None) => Ok(ResolvedPaths {
            from: absolute(from),
            to: normalize(&options.cwd),
            derived: true,
        }),
        (None, Some(to)) => Ok(ResolvedPaths {
            from: normalize(&options.cwd),
            to: absolute(to),
            derived: true,
        }),
        (Some(from), Some(to)) => Ok(ResolvedPaths {
            from: absolute(from),
            to: absolute(to),
            derived: false,
        }),
    }
}

/// Lexically remove `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// How a run that did not abort ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No plain file differs; nothing was left to promote.
    NothingToPromote,
    /// Modified files were promoted (some may have failed).
    Promoted,
    /// `dry_run`: reported only.
    DryRun,
}

/// What a run found and did.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub from: EnvDir,
    pub to: EnvDir,
    pub asymmetries: Vec<Asymmetry>,
    pub scoped_diffs: Vec<FileDiff>,
    pub plain_diffs: Vec<FileDiff>,
    /// Files copied, new and modified, in promotion order.
    pub promoted: Vec<String>,
    /// Files whose copy failed under `continue_on_error`.
    pub failed: Vec<String>,
}

impl RunReport {
    /// True when a dry run found asymmetries a real run would stop on.
    pub fn has_blocking(&self) -> bool {
        self.asymmetries.iter().any(Asymmetry::is_blocking)
    }
}

/// One promotion run between two environment directories.
pub struct Session<'a, C: Confirm + ?Sized, W: Write + ?Sized> {
    registry: &'a Registry,
    options: PromoteOptions,
    confirm: &'a mut C,
    out: &'a mut W,
}

impl<'a, C: Confirm + ?Sized, W: Write + ?Sized> Session<'a, C, W> {
    pub fn new(
        registry: &'a Registry,
        options: PromoteOptions,
        confirm: &'a mut C,
        out: &'a mut W,
    ) -> Self {
        Self {
            registry,
            options,
            confirm,
            out,
        }
    }

    /// Run every step in order.
    ///
    /// Aborts with `Unresolved` on blocking asymmetries and `Declined` when
    /// the operator says no at a gate. Copy failures abort unless
    /// `continue_on_error` is set, in which case they land in
    /// [`RunReport::failed`].
    pub fn run(&mut self) -> Result<RunReport, SyncError> {
        let paths = resolve_paths(&self.options, self.registry)?;
        let from = EnvDir::resolve(&paths.from, self.registry)?;
        let to = EnvDir::resolve(&paths.to, self.registry)?;

        self.say(format_args!("From env {:<5}, path: {}", from.env(), from.path().display()))?;
        self.say(format_args!("To   env {:<5}, path: {}", to.env(), to.path().display()))?;

        if paths.derived && !self.options.dry_run && !self.ask("Continue (N/y)?")? {
            return Err(declined("continue with derived paths"));
        }

        let tool = match &self.options.difftool {
            Some(command) if !self.options.printdiff => Some(DiffTool::resolve(command)?),
            _ => None,
        };

        let reconciliation = reconcile(&from, &to)?;
        let asymmetries = reconciliation.asymmetries(&from, &to, self.options.ignore_missing);
        let mut report = RunReport {
            status: RunStatus::DryRun,
            from,
            to,
            asymmetries,
            scoped_diffs: Vec::new(),
            plain_diffs: Vec::new(),
            promoted: Vec::new(),
            failed: Vec::new(),
        };

        self.handle_asymmetries(&mut report)?;

        self.say("Comparing environment specific files...")?;
        report.scoped_diffs = compare_directory_contents(
            reconciliation.common_scoped().as_slice(),
            &report.from,
            &report.to,
            true,
            self.options.ignore_missing,
        )?;
        for diff in &report.scoped_diffs {
            self.say(format_args!(
                "Diff: \n{}\n{} - {} lines different",
                diff.from_path.display(),
                diff.to_path.display(),
                diff.line_count()
            ))?;
            if self.options.printdiff {
                self.print_lines(diff)?;
            } else if let Some(tool) = tool.as_ref().filter(|_| !self.options.dry_run) {
                let status = tool.launch(&diff.from_path, &diff.to_path)?;
                if !status.success() {
                    tracing::warn!("{} exited with {status}", tool.command());
                }
            }
        }

        self.say("\nComparing non-environment specific files...")?;
        report.plain_diffs = compare_directory_contents(
            reconciliation.common_plain().as_slice(),
            &report.from,
            &report.to,
            false,
            self.options.ignore_missing,
        )?;
        if report.plain_diffs.is_empty() {
            self.say("No non-environment specific differences, nothing to promote!")?;
            if !self.options.dry_run {
                report.status = RunStatus::NothingToPromote;
            }
            return Ok(report);
        }

        for diff in &report.plain_diffs {
            if self.options.printdiff {
                self.print_lines(diff)?;
                continue;
            }
            self.say(format_args!("Diff: {} - {} lines different", diff.name, diff.line_count()))?;
            match &tool {
                Some(tool) if !self.options.dry_run => self.review_with(tool, diff)?,
                Some(_) => {}
                None => self.say(format_args!(
                    "WARNING: No difftool specified for {}. Provide environment variable \
                     TFPROMOTE_DIFFTOOL or argument --difftool or --printdiff.",
                    diff.name
                ))?,
            }
        }

        if self.options.dry_run {
            return Ok(report);
        }

        if !self.ask("Promote modified files (N/y)?")? {
            return Err(declined("promotion of modified files"));
        }
        let names: Vec<&str> = report.plain_diffs.iter().map(|d| d.name.as_str()).collect();
        let outcomes = promote(names.as_slice(), &report.from, &report.to, self.options.continue_on_error)?;
        self.record(&mut report, outcomes)?;
        report.status = RunStatus::Promoted;
        Ok(report)
    }

    /// Report every asymmetry, stop on blocking ones, then offer new files.
    fn handle_asymmetries(&mut self, report: &mut RunReport) -> Result<(), SyncError> {
        let mut blocking = Vec::new();
        for asym in &report.asymmetries {
            self.say(format_args!(
                "Files present in {} not found in {}: {}",
                asym.present_in,
                asym.missing_from,
                ListDisplay(&asym.disk_names)
            ))?;
            match asym.policy {
                Policy::Blocking => blocking.push(format!(
                    "{} {} file(s) only in {}: {}",
                    asym.disk_names.len(),
                    asym.category,
                    asym.present_in,
                    asym.disk_names.join(", ")
                )),
                Policy::Ignorable => self.say("Ignoring missing files...")?,
                Policy::NewFiles => {}
            }
        }

        if !blocking.is_empty() {
            if self.options.dry_run {
                self.say("A real run would stop here: resolve diffs before tfpromote will proceed.")?;
            } else {
                self.say("Resolve diffs before tfpromote will proceed.")?;
                return Err(SyncError::Unresolved {
                    message: blocking.join("; "),
                });
            }
        }

        let new_files: Vec<String> = report
            .asymmetries
            .iter()
            .filter(|a| a.policy == Policy::NewFiles)
            .flat_map(|a| a.files.iter().cloned())
            .collect();
        if new_files.is_empty() || self.options.dry_run {
            return Ok(());
        }

        if self.ask("Promote new files (N/y)?")? {
            let outcomes = promote(new_files.as_slice(), &report.from, &report.to, self.options.continue_on_error)?;
            self.record(report, outcomes)?;
        } else if self.options.ignore_missing {
            self.say("Skipping new files...")?;
        } else {
            return Err(declined("promotion of new files"));
        }
        Ok(())
    }

    /// Launch the viewer on a plain-file diff; a failing viewer needs an
    /// explicit go-ahead to continue.
    fn review_with(&mut self, tool: &DiffTool, diff: &FileDiff) -> Result<(), SyncError> {
        for (label, path) in [("From", &diff.from_path), ("To", &diff.to_path)] {
            if !path.is_file() {
                self.say(format_args!("{label} filename does not exist: {}", path.display()))?;
            }
        }
        let status = tool.launch(&diff.from_path, &diff.to_path)?;
        if status.success() {
            return Ok(());
        }
        self.say(format_args!(
            "Error executing diff command: {} {} {}",
            tool.command(),
            diff.from_path.display(),
            diff.to_path.display()
        ))?;
        if self.ask("Continue (N/y)?")? {
            Ok(())
        } else {
            Err(declined("review after diff tool failure"))
        }
    }

    fn record(&mut self, report: &mut RunReport, outcomes: Vec<PromoteOutcome>) -> Result<(), SyncError> {
        for outcome in outcomes {
            match outcome {
                PromoteOutcome::Promoted { name, .. } => {
                    self.say(format_args!("Promoted {name}"))?;
                    report.promoted.push(name);
                }
                PromoteOutcome::Failed { name, error } => {
                    self.say(format_args!("Error promoting {name}: {error}"))?;
                    report.failed.push(name);
                }
            }
        }
        Ok(())
    }

    fn print_lines(&mut self, diff: &FileDiff) -> Result<(), SyncError> {
        for line in &diff.lines {
            self.say(line)?;
        }
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<bool, SyncError> {
        self.out.flush().map_err(|e| io_err("<output>", e))?;
        self.confirm
            .confirm(prompt)
            .map_err(|e| io_err("<stdin>", e))
    }

    fn say(&mut self, line: impl fmt::Display) -> Result<(), SyncError> {
        writeln!(self.out, "{line}").map_err(|e| io_err("<output>", e))
    }
}

fn declined(action: &str) -> SyncError {
    SyncError::Declined {
        action: action.to_string(),
    }
}

/// `['a.tf', 'b.tf']`
struct ListDisplay<'a>(&'a [String]);

impl fmt::Display for ListDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.0.iter().map(|s| format!("'{s}'")).collect();
        write!(f, "[{}]", quoted.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
