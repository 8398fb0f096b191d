//! Command names, dispatch and usage text.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::config::Config;
use crate::error::Error;

/// Maintenance operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Check,
    VendorInit,
    VendorUpdate,
    SubmoduleAdd,
    SubmoduleUpdate,
    SyncUpstream,
    LfsSetup,
}

impl Task {
    pub const ALL: [Task; 7] = [
        Self::Check,
        Self::VendorInit,
        Self::VendorUpdate,
        Self::SubmoduleAdd,
        Self::SubmoduleUpdate,
        Self::SyncUpstream,
        Self::LfsSetup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::VendorInit => "vendor-init",
            Self::VendorUpdate => "vendor-update",
            Self::SubmoduleAdd => "submodule-add",
            Self::SubmoduleUpdate => "submodule-update",
            Self::SyncUpstream => "sync-upstream",
            Self::LfsSetup => "lfs-setup",
        }
    }

    pub fn about(&self) -> &'static str {
        match self {
            Self::Check => "List nested .git directories under SRC_DIR",
            Self::VendorInit => "Flatten vendored packages, record their commits, commit",
            Self::VendorUpdate => "Resync CHAMP_DIR from CHAMP_REMOTE, keep local edits, commit",
            Self::SubmoduleAdd => "Register CHAMP_DIR as a submodule of CHAMP_REMOTE",
            Self::SubmoduleUpdate => "Fast-forward the CHAMP_DIR submodule to CHAMP_BRANCH",
            Self::SyncUpstream => "Rebase the current branch onto MAIN_UPSTREAM_REMOTE",
            Self::LfsSetup => "Track *.bag, *.dae and *.stl with Git LFS",
        }
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

/// What a single positional argument asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(Task),
}

impl Invocation {
    /// Map the (optional) command argument to an invocation.
    pub fn parse(arg: Option<&str>) -> Result<Self, Error> {
        match arg {
            None | Some("help" | "-h" | "--help") => Ok(Self::Help),
            Some(name) => name.parse().map(Self::Run),
        }
    }
}

/// Usage summary listing every command and the current configuration.
pub fn usage(program: &str, config: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{program} - repository hygiene for the CHAMP workspace\n");
    let _ = writeln!(out, "Usage: {program} <command>\n");
    let _ = writeln!(out, "Commands:");
    for task in Task::ALL {
        let _ = writeln!(out, "  {:<18}{}", task.as_str(), task.about());
    }
    let _ = writeln!(out, "  {:<18}{}", "help", "Show this message");

    let _ = writeln!(out, "\nConfiguration (override via environment):");
    for (name, value) in config.entries() {
        let _ = writeln!(out, "  {name}={value}");
    }

    out
}
