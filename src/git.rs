//! Version-control seam.
//!
//! [`Vcs`] is the only way the maintenance commands talk to git. Read-only
//! queries go through libgit2; anything that changes a repository runs the
//! `git` binary so hooks, credentials and LFS filters behave as they do for
//! the user.

use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::tools::{run, run_checked, run_verbatim};

/// Whether a commit was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Committed,
    NothingToCommit,
}

/// Version-control operations used by the maintenance commands.
#[cfg_attr(test, mockall::automock)]
pub trait Vcs {
    /// Abbreviated HEAD commit of `dir`, only if `dir` is itself a
    /// repository root. Parent repositories are never consulted.
    fn short_commit(&self, dir: &Path) -> Option<String>;

    /// Whether `repo` has a remote called `name`.
    fn has_remote(&self, repo: &Path, name: &str) -> bool;

    /// Name of the checked-out branch.
    fn current_branch(&self, repo: &Path) -> Result<String>;

    /// Stage `paths`, or every change in the working tree when empty.
    fn stage(&self, repo: &Path, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index.
    fn commit(&self, repo: &Path, message: &str) -> Result<CommitStatus>;

    /// Uncommitted changes under `dir` as a unified diff with paths relative
    /// to `dir`.
    fn diff(&self, dir: &Path) -> Result<String>;

    /// Single-branch, depth-one clone.
    fn clone_shallow(&self, url: &str, branch: &str, dest: &Path) -> Result<()>;

    fn submodule_add(&self, repo: &Path, url: &str, path: &Path) -> Result<()>;

    fn fetch(&self, repo: &Path, remote: &str) -> Result<()>;

    fn checkout(&self, repo: &Path, branch: &str) -> Result<()>;

    fn merge_ff_only(&self, repo: &Path, target: &str) -> Result<()>;

    fn pull_rebase(&self, repo: &Path, remote: &str, branch: &str) -> Result<()>;

    fn rebase(&self, repo: &Path, onto: &str) -> Result<()>;

    /// Whether the `git lfs` extension is installed.
    fn lfs_available(&self, repo: &Path) -> bool;

    fn lfs_install(&self, repo: &Path) -> Result<()>;

    fn lfs_track(&self, repo: &Path, patterns: &[String]) -> Result<()>;
}

/// [`Vcs`] implementation over libgit2 and the `git` command.
#[derive(Debug, Default)]
pub struct GitCli;

impl GitCli {
    fn git(repo: &Path) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo);
        cmd
    }
}

impl Vcs for GitCli {
    fn short_commit(&self, dir: &Path) -> Option<String> {
        let repo = Repository::open(dir).ok()?;
        let commit = repo.head().ok()?.peel_to_commit().ok()?;
        let short = commit.as_object().short_id().ok()?;
        String::from_utf8(short.to_vec()).ok()
    }

    fn has_remote(&self, repo: &Path, name: &str) -> bool {
        Repository::open(repo)
            .map(|r| r.find_remote(name).is_ok())
            .unwrap_or(false)
    }

    fn current_branch(&self, repo: &Path) -> Result<String> {
        let repo = Repository::open(repo)?;
        let head = repo.head()?;
        String::from_utf8(head.shorthand_bytes().to_vec())
            .map_err(|_| Error::Git(git2::Error::from_str("HEAD is not valid UTF-8")))
    }

    fn stage(&self, repo: &Path, paths: &[PathBuf]) -> Result<()> {
        let mut cmd = Self::git(repo);
        cmd.arg("add");
        if paths.is_empty() {
            cmd.arg("-A");
        } else {
            cmd.arg("--").args(paths);
        }
        run_checked(&mut cmd)?;
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<CommitStatus> {
        // `diff --cached --quiet` exits 0 when the index matches HEAD.
        let staged = run(Self::git(repo).args(["diff", "--cached", "--quiet"]))?;
        if staged.status.success() {
            return Ok(CommitStatus::NothingToCommit);
        }

        run_checked(Self::git(repo).args(["commit", "-m", message]))?;
        Ok(CommitStatus::Committed)
    }

    fn diff(&self, dir: &Path) -> Result<String> {
        // Trailing whitespace and newlines are patch content.
        run_verbatim(Self::git(dir).args(["diff", "--relative", "HEAD", "--", "."]))
    }

    fn clone_shallow(&self, url: &str, branch: &str, dest: &Path) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1", "--single-branch", "--branch", branch, url])
            .arg(dest);

        run_checked(&mut cmd).map_err(|e| Error::CloneFailed {
            url: url.to_string(),
            branch: branch.to_string(),
            stderr: e.to_string(),
        })?;
        Ok(())
    }

    fn submodule_add(&self, repo: &Path, url: &str, path: &Path) -> Result<()> {
        run_checked(
            Self::git(repo)
                .args(["submodule", "add", url])
                .arg(path),
        )?;
        Ok(())
    }

    fn fetch(&self, repo: &Path, remote: &str) -> Result<()> {
        run_checked(Self::git(repo).args(["fetch", remote]))?;
        Ok(())
    }

    fn checkout(&self, repo: &Path, branch: &str) -> Result<()> {
        run_checked(Self::git(repo).args(["checkout", branch]))?;
        Ok(())
    }

    fn merge_ff_only(&self, repo: &Path, target: &str) -> Result<()> {
        run_checked(Self::git(repo).args(["merge", "--ff-only", target]))?;
        Ok(())
    }

    fn pull_rebase(&self, repo: &Path, remote: &str, branch: &str) -> Result<()> {
        run_checked(Self::git(repo).args(["pull", "--rebase", remote, branch]))?;
        Ok(())
    }

    fn rebase(&self, repo: &Path, onto: &str) -> Result<()> {
        run_checked(Self::git(repo).args(["rebase", onto]))?;
        Ok(())
    }

    fn lfs_available(&self, repo: &Path) -> bool {
        run(Self::git(repo).args(["lfs", "version"]))
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn lfs_install(&self, repo: &Path) -> Result<()> {
        run_checked(Self::git(repo).args(["lfs", "install"]))?;
        Ok(())
    }

    fn lfs_track(&self, repo: &Path, patterns: &[String]) -> Result<()> {
        run_checked(Self::git(repo).args(["lfs", "track"]).args(patterns))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
