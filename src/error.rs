//! Error types for workspace maintenance.
//!
//! Every variant except the transparent ones is a fatal condition: the
//! command stops, nothing further is attempted, and the binary exits 1.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal maintenance errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The working directory has no `.git` entry.
    #[error("{} is not a repository root (no .git found). Run from the workspace root.", .0.display())]
    NotRepositoryRoot(PathBuf),

    /// A directory the command cannot run without is absent.
    #[error("required directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// The target already carries its own version-control metadata.
    #[error("{} already contains .git; run vendor-init first or remove it manually", .0.display())]
    AlreadyVersioned(PathBuf),

    /// A required external tool is not installed.
    #[error("required tool `{0}` is not available")]
    MissingTool(String),

    /// The invocation named a command that does not exist.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Shallow clone of the upstream remote failed.
    #[error("failed to clone {url} (branch {branch}): {stderr}")]
    CloneFailed {
        url: String,
        branch: String,
        stderr: String,
    },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Git(#[from] git2::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
