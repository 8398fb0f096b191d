//! Workspace configuration.
//!
//! Every setting can be overridden from the environment. Values are read once
//! at startup and passed explicitly to the operations.

use std::path::{Path, PathBuf};

pub const DEFAULT_SRC_DIR: &str = "src";
pub const DEFAULT_CHAMP_REMOTE: &str = "https://github.com/chvmp/champ.git";
pub const DEFAULT_CHAMP_BRANCH: &str = "ros2";
pub const DEFAULT_UPSTREAM_REMOTE: &str = "upstream";

/// Resolved configuration. Paths are relative to the workspace root unless
/// given as absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub src_dir: PathBuf,
    pub champ_dir: PathBuf,
    pub teleop_dir: PathBuf,
    pub vision_dir: PathBuf,
    pub vendored_hashes: PathBuf,
    pub patch_dir: PathBuf,
    pub champ_remote: String,
    pub champ_branch: String,
    pub upstream_remote: String,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables both fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let path_or = |key: &str, default: PathBuf| get(key).map(PathBuf::from).unwrap_or(default);

        let src_dir = path_or("SRC_DIR", PathBuf::from(DEFAULT_SRC_DIR));

        Self {
            champ_dir: path_or("CHAMP_DIR", src_dir.join("champ")),
            teleop_dir: path_or("TELEOP_DIR", src_dir.join("champ_teleop")),
            vision_dir: path_or("VISION_DIR", src_dir.join("vision_opencv")),
            vendored_hashes: path_or("VENDORED_HASHES", src_dir.join(".vendored-hashes.txt")),
            patch_dir: path_or("PATCH_DIR", src_dir.join(".patches")),
            champ_remote: get("CHAMP_REMOTE").unwrap_or_else(|| DEFAULT_CHAMP_REMOTE.to_string()),
            champ_branch: get("CHAMP_BRANCH").unwrap_or_else(|| DEFAULT_CHAMP_BRANCH.to_string()),
            upstream_remote: get("MAIN_UPSTREAM_REMOTE")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_REMOTE.to_string()),
            src_dir,
        }
    }

    /// The vendored directories handled by `vendor-init`, with their ledger labels.
    pub fn vendored_dirs(&self) -> [(&'static str, &Path); 3] {
        [
            ("champ", self.champ_dir.as_path()),
            ("champ_teleop", self.teleop_dir.as_path()),
            ("vision_opencv", self.vision_dir.as_path()),
        ]
    }

    /// Variable names and current values, in documentation order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let show = |p: &Path| p.display().to_string();
        vec![
            ("SRC_DIR", show(&self.src_dir)),
            ("CHAMP_DIR", show(&self.champ_dir)),
            ("TELEOP_DIR", show(&self.teleop_dir)),
            ("VISION_DIR", show(&self.vision_dir)),
            ("VENDORED_HASHES", show(&self.vendored_hashes)),
            ("PATCH_DIR", show(&self.patch_dir)),
            ("CHAMP_REMOTE", self.champ_remote.clone()),
            ("CHAMP_BRANCH", self.champ_branch.clone()),
            ("MAIN_UPSTREAM_REMOTE", self.upstream_remote.clone()),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
