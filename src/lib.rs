//! Repository hygiene utilities for the CHAMP robotics workspace.
//!
//! This crate finds nested repositories, vendors third-party packages while
//! recording where they came from, converts the primary package to a
//! submodule and back, keeps the workspace in step with its upstream, and
//! enables Git LFS for robot assets. All version-control work is delegated to
//! `git`, `rsync` and `patch` through the seams in [`git`] and [`tools`].

pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod ledger;
pub mod ops;
pub mod report;
pub mod scan;
pub mod tools;

pub use command::{usage, Invocation, Task};
pub use config::Config;
pub use error::{Error, Result};
pub use git::{CommitStatus, GitCli, Vcs};
pub use ledger::Ledger;
pub use ops::Maintainer;
pub use report::{Outcome, Report};
pub use scan::NestedRepoScan;
pub use tools::{Mirror, PatchCli, Patcher, Rsync, Tools};
