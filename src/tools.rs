//! External command plumbing.
//!
//! Every child process this crate starts goes through [`run`] or
//! [`run_checked`], so each invocation is logged the same way and a failure
//! always carries the command line and its stderr.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

use crate::error::{Error, Result};
use crate::git::{GitCli, Vcs};

/// Render a command line for logs and error messages.
pub(crate) fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a command to completion and hand back its raw output.
pub(crate) fn run(cmd: &mut Command) -> Result<Output> {
    let line = describe(cmd);
    debug!(command = %line, "running");

    let output = cmd.output()?;
    debug!(command = %line, status = ?output.status.code(), "finished");
    Ok(output)
}

/// Run a command and fail unless it exits successfully. Returns trimmed stdout.
pub(crate) fn run_checked(cmd: &mut Command) -> Result<String> {
    let mut out = run_verbatim(cmd)?;
    out.truncate(out.trim_end().len());
    Ok(out)
}

/// Like [`run_checked`], but stdout is returned untouched.
pub(crate) fn run_verbatim(cmd: &mut Command) -> Result<String> {
    let output = run(cmd)?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: describe(cmd),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Mirrors one directory tree onto another.
#[cfg_attr(test, mockall::automock)]
pub trait Mirror {
    /// Make `dest` a copy of `src`, deleting destination files absent from
    /// `src`. Entries named `exclude` are neither copied nor deleted.
    fn mirror(&self, src: &Path, dest: &Path, exclude: &str) -> Result<()>;
}

/// [`Mirror`] backed by `rsync`.
#[derive(Debug, Default)]
pub struct Rsync;

impl Mirror for Rsync {
    fn mirror(&self, src: &Path, dest: &Path, exclude: &str) -> Result<()> {
        // Trailing slashes make rsync copy directory contents, not the directory.
        let with_slash = |p: &Path| {
            let mut s = OsString::from(p.as_os_str());
            s.push("/");
            s
        };

        run_checked(
            Command::new("rsync")
                .arg("-a")
                .arg("--delete")
                .arg("--exclude")
                .arg(exclude)
                .arg(with_slash(src))
                .arg(with_slash(dest)),
        )?;
        Ok(())
    }
}

/// Reapplies a saved unified diff.
#[cfg_attr(test, mockall::automock)]
pub trait Patcher {
    /// Apply `patch_file` inside `dir`. A conflicting hunk is an error.
    fn apply(&self, dir: &Path, patch_file: &Path) -> Result<()>;
}

/// [`Patcher`] backed by `patch(1)`.
#[derive(Debug, Default)]
pub struct PatchCli;

impl Patcher for PatchCli {
    fn apply(&self, dir: &Path, patch_file: &Path) -> Result<()> {
        run_checked(
            Command::new("patch")
                .args(["-p1", "--forward", "--batch", "-d"])
                .arg(dir)
                .arg("-i")
                .arg(patch_file),
        )?;
        Ok(())
    }
}

/// The external collaborators a maintenance command needs.
pub struct Tools {
    pub vcs: Box<dyn Vcs>,
    pub mirror: Box<dyn Mirror>,
    pub patcher: Box<dyn Patcher>,
}

impl Tools {
    /// Real tools: `git`, `rsync` and `patch` from `PATH`.
    pub fn system() -> Self {
        Self {
            vcs: Box::new(GitCli),
            mirror: Box::new(Rsync),
            patcher: Box::new(PatchCli),
        }
    }
}
