//! Workspace maintenance operations.
//!
//! Each operation checks that it runs from a repository root, then performs a
//! fixed sequence of steps through the [`Tools`] seams. Failures listed as
//! fatal in [`Error`] abort the operation; every other failure is recorded as
//! a warning and the sequence carries on to its commit.

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::Task;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::CommitStatus;
use crate::ledger::Ledger;
use crate::report::Report;
use crate::scan::{NestedRepoScan, METADATA};
use crate::tools::Tools;

/// File under `PATCH_DIR` holding local edits to the primary vendored package.
pub const LOCAL_PATCH: &str = "champ-local.patch";

/// Ledger label of the primary vendored package.
pub const PRIMARY_LABEL: &str = "champ";

/// File extensions put under LFS by `lfs-setup`.
pub const LFS_PATTERNS: [&str; 3] = ["*.bag", "*.dae", "*.stl"];

const VENDOR_INIT_MESSAGE: &str = "Vendor third-party packages and drop nested .git metadata";
const LFS_MESSAGE: &str = "Track robot binary assets with Git LFS";

/// What happened to a vendored directory's own metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataRemoval {
    /// A `.git` directory was deleted.
    Directory,
    /// A `gitdir:` link file was deleted along with the directory it named.
    Linked(PathBuf),
    /// A `.git` file without a `gitdir:` line was deleted.
    File,
}

/// Delete the `.git` entry of `dir`, if there is one.
///
/// A `.git` file holding `gitdir: <path>` has its target removed first; a
/// relative target is resolved against `dir`.
pub fn remove_metadata(dir: &Path) -> io::Result<Option<MetadataRemoval>> {
    let metadata = dir.join(METADATA);
    let Ok(kind) = fs::symlink_metadata(&metadata) else {
        return Ok(None);
    };

    if kind.is_dir() {
        fs::remove_dir_all(&metadata)?;
        return Ok(Some(MetadataRemoval::Directory));
    }

    let content = fs::read_to_string(&metadata)?;
    let Some(target) = content
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))
        .map(str::trim)
    else {
        fs::remove_file(&metadata)?;
        return Ok(Some(MetadataRemoval::File));
    };

    let target = dir.join(target);
    if target.is_dir() {
        fs::remove_dir_all(&target)?;
    }
    fs::remove_file(&metadata)?;
    Ok(Some(MetadataRemoval::Linked(target)))
}

/// Runs maintenance operations against one workspace.
pub struct Maintainer {
    root: PathBuf,
    config: Config,
    tools: Tools,
    today: NaiveDate,
    echo: bool,
}

impl Maintainer {
    /// Create a maintainer for the workspace at `root`.
    pub fn new(root: impl AsRef<Path>, config: Config, tools: Tools) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
            tools,
            today: chrono::Local::now().date_naive(),
            echo: false,
        }
    }

    /// Date used for placeholder ledger identifiers.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Print outcomes as they happen.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn run(&self, task: Task) -> Result<Report> {
        debug!(task = task.as_str(), root = %self.root.display(), "running task");
        match task {
            Task::Check => self.check(),
            Task::VendorInit => self.vendor_init(),
            Task::VendorUpdate => self.vendor_update(),
            Task::SubmoduleAdd => self.submodule_add(),
            Task::SubmoduleUpdate => self.submodule_update(),
            Task::SyncUpstream => self.sync_upstream(),
            Task::LfsSetup => self.lfs_setup(),
        }
    }

    /// Report nested `.git` entries. Findings are a warning, never an error.
    pub fn check(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        let mut report = self.new_report();
        self.report_nested(&mut report);
        Ok(report)
    }

    /// Record vendored commits, strip their metadata and commit the result.
    pub fn vendor_init(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        let mut report = self.new_report();
        let ledger = Ledger::new(self.resolve(&self.config.vendored_hashes));
        ledger.reset()?;

        let mut present = 0;
        for (label, dir) in self.config.vendored_dirs() {
            let path = self.resolve(dir);
            if !path.is_dir() {
                report.warn(format!("{} not found, skipping", dir.display()));
                continue;
            }

            present += 1;
            let commit = self.tools.vcs.short_commit(&path);
            let value = ledger.record(label, commit, self.today)?;
            report.success(format!("Recorded {label}: {value}"));
        }

        for (_, dir) in self.config.vendored_dirs() {
            match remove_metadata(&self.resolve(dir)) {
                Ok(Some(MetadataRemoval::Linked(target))) => {
                    debug!(target = %target.display(), "removed linked metadata");
                    report.success(format!("Removed linked {}", dir.join(METADATA).display()));
                }
                Ok(Some(MetadataRemoval::Directory | MetadataRemoval::File)) => {
                    report.success(format!("Removed {}", dir.join(METADATA).display()));
                }
                Ok(None) => {}
                Err(e) => report.warn(format!(
                    "Could not remove {}: {e}",
                    dir.join(METADATA).display()
                )),
            }
        }

        if present == 0 {
            report.info("Nothing to vendor; no commit created");
        } else {
            self.commit_changes(&mut report, &[], VENDOR_INIT_MESSAGE);
        }

        self.report_nested(&mut report);
        Ok(report)
    }

    /// Mirror the primary vendored package from its remote, keeping local edits.
    pub fn vendor_update(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        let target = self.resolve(&self.config.champ_dir);
        if !target.is_dir() {
            return Err(Error::MissingDirectory(self.config.champ_dir.clone()));
        }

        let mut report = self.new_report();

        let patch_dir = self.resolve(&self.config.patch_dir);
        fs::create_dir_all(&patch_dir)?;
        let patch_file = patch_dir.join(LOCAL_PATCH);

        let diff = self.tools.vcs.diff(&target).unwrap_or_else(|e| {
            debug!(error = %e, "no diff available, treating as unmodified");
            String::new()
        });
        fs::write(&patch_file, &diff)?;
        if diff.is_empty() {
            report.info("No local changes to preserve");
        } else {
            report.success(format!("Saved local changes to {}", self.relative(&patch_file)));
        }

        {
            // Dropped on every exit from this block, including `?`.
            let staging = tempfile::Builder::new()
                .prefix("robo-workspace-")
                .tempdir()?;
            let checkout = staging.path().join(PRIMARY_LABEL);

            self.tools.vcs.clone_shallow(
                &self.config.champ_remote,
                &self.config.champ_branch,
                &checkout,
            )?;
            self.tools.mirror.mirror(&checkout, &target, METADATA)?;
        }
        report.success(format!(
            "Synced {} from {} ({})",
            self.config.champ_dir.display(),
            self.config.champ_remote,
            self.config.champ_branch
        ));

        if !diff.is_empty() {
            match self.tools.patcher.apply(&target, &patch_file) {
                Ok(()) => report.success("Reapplied local changes"),
                Err(e) => report.warn(format!(
                    "Local changes did not apply cleanly, review {} manually: {e}",
                    self.relative(&patch_file)
                )),
            }
        }

        // The upstream commit is not resolved here; the entry is always a placeholder.
        let ledger = Ledger::new(self.resolve(&self.config.vendored_hashes));
        let value = ledger.record(PRIMARY_LABEL, None, self.today)?;
        report.info(format!("Ledger: {PRIMARY_LABEL}: {value}"));

        let message = format!(
            "Update vendored {} from {} ({})",
            PRIMARY_LABEL, self.config.champ_remote, self.config.champ_branch
        );
        self.commit_changes(&mut report, &[], &message);
        Ok(report)
    }

    /// Register the primary package as a submodule instead of vendoring it.
    pub fn submodule_add(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        let dir = &self.config.champ_dir;
        let target = self.resolve(dir);
        if target.join(METADATA).exists() {
            return Err(Error::AlreadyVersioned(dir.clone()));
        }

        let mut report = self.new_report();
        self.tools
            .vcs
            .submodule_add(&self.root, &self.config.champ_remote, dir)?;
        report.success(format!(
            "Added submodule {} -> {}",
            dir.display(),
            self.config.champ_remote
        ));

        if let Err(e) = self.tools.vcs.fetch(&target, "origin") {
            report.warn(format!("Fetch in {} failed: {e}", dir.display()));
        }
        self.switch_branch(&mut report, &target);

        let message = format!(
            "Add {} submodule ({})",
            PRIMARY_LABEL, self.config.champ_branch
        );
        self.commit_changes(&mut report, &[PathBuf::from(".gitmodules"), dir.clone()], &message);
        Ok(report)
    }

    /// Move the primary submodule to the tip of the configured branch.
    pub fn submodule_update(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        let dir = &self.config.champ_dir;
        let target = self.resolve(dir);
        if !target.is_dir() {
            return Err(Error::MissingDirectory(dir.clone()));
        }

        let mut report = self.new_report();
        let branch = &self.config.champ_branch;

        if let Err(e) = self.tools.vcs.fetch(&target, "origin") {
            report.warn(format!("Fetch in {} failed: {e}", dir.display()));
        }
        self.switch_branch(&mut report, &target);

        let tracking = format!("origin/{branch}");
        match self.tools.vcs.merge_ff_only(&target, &tracking) {
            Ok(()) => report.success(format!("Fast-forwarded to {tracking}")),
            Err(e) => {
                debug!(error = %e, "fast-forward failed, falling back to pull --rebase");
                match self.tools.vcs.pull_rebase(&target, "origin", branch) {
                    Ok(()) => report.success(format!("Rebased onto {tracking}")),
                    Err(e) => report.warn(format!("Could not update to {tracking}: {e}")),
                }
            }
        }

        let message = format!("Update {PRIMARY_LABEL} submodule to latest {branch}");
        self.commit_changes(&mut report, &[dir.clone()], &message);
        Ok(report)
    }

    /// Rebase the current branch onto its counterpart on the upstream remote.
    pub fn sync_upstream(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        let mut report = self.new_report();
        let remote = &self.config.upstream_remote;

        if !self.tools.vcs.has_remote(&self.root, remote) {
            report.warn(format!(
                "Remote '{remote}' is not configured; add it with: git remote add {remote} <url>"
            ));
            return Ok(report);
        }

        match self.tools.vcs.fetch(&self.root, remote) {
            Ok(()) => report.success(format!("Fetched {remote}")),
            Err(e) => report.warn(format!("Fetch from {remote} failed: {e}")),
        }

        let branch = match self.tools.vcs.current_branch(&self.root) {
            Ok(branch) => branch,
            Err(e) => {
                report.warn(format!("Could not determine current branch: {e}"));
                return Ok(report);
            }
        };

        let onto = format!("{remote}/{branch}");
        match self.tools.vcs.rebase(&self.root, &onto) {
            Ok(()) => report.success(format!("Rebased {branch} onto {onto}")),
            Err(e) => report.warn(format!(
                "Rebase onto {onto} stopped: {e}. Resolve and run `git rebase --continue`, \
                 or `git rebase --abort` and `git merge {onto}` instead"
            )),
        }

        Ok(report)
    }

    /// Enable Git LFS for robot binary assets.
    pub fn lfs_setup(&self) -> Result<Report> {
        self.ensure_repository_root()?;

        if !self.tools.vcs.lfs_available(&self.root) {
            return Err(Error::MissingTool("git-lfs".to_string()));
        }

        let mut report = self.new_report();
        match self.tools.vcs.lfs_install(&self.root) {
            Ok(()) => report.success("Git LFS hooks installed"),
            Err(e) => report.warn(format!("git lfs install failed: {e}")),
        }

        let patterns: Vec<String> = LFS_PATTERNS.iter().map(|p| p.to_string()).collect();
        match self.tools.vcs.lfs_track(&self.root, &patterns) {
            Ok(()) => report.success(format!("Tracking {}", LFS_PATTERNS.join(", "))),
            Err(e) => report.warn(format!("git lfs track failed: {e}")),
        }

        self.commit_changes(&mut report, &[PathBuf::from(".gitattributes")], LFS_MESSAGE);
        Ok(report)
    }

    fn ensure_repository_root(&self) -> Result<()> {
        if self.root.join(METADATA).exists() {
            Ok(())
        } else {
            Err(Error::NotRepositoryRoot(self.root.clone()))
        }
    }

    fn report_nested(&self, report: &mut Report) {
        let src = self.resolve(&self.config.src_dir);
        let found: Vec<PathBuf> = NestedRepoScan::new(&self.root, &src).collect();

        if found.is_empty() {
            report.success(format!(
                "Workspace is clean: no nested .git under {}",
                self.config.src_dir.display()
            ));
            return;
        }

        for path in &found {
            report.info(self.relative(path));
        }
        report.warn(format!(
            "{} nested .git found under {}; run vendor-init to flatten",
            found.len(),
            self.config.src_dir.display()
        ));
    }

    fn switch_branch(&self, report: &mut Report, repo: &Path) {
        let branch = &self.config.champ_branch;
        match self.tools.vcs.checkout(repo, branch) {
            Ok(()) => report.success(format!("Switched to {branch}")),
            Err(e) => report.warn(format!("Could not switch to {branch}: {e}")),
        }
    }

    fn commit_changes(&self, report: &mut Report, paths: &[PathBuf], message: &str) {
        if let Err(e) = self.tools.vcs.stage(&self.root, paths) {
            report.warn(format!("Staging failed: {e}"));
            return;
        }

        match self.tools.vcs.commit(&self.root, message) {
            Ok(CommitStatus::Committed) => report.success(format!("Committed: {message}")),
            Ok(CommitStatus::NothingToCommit) => report.warn("Nothing to commit"),
            Err(e) => report.warn(format!("Commit failed: {e}")),
        }
    }

    fn new_report(&self) -> Report {
        Report::new().echo(self.echo)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
