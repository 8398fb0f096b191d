//! Nested repository discovery.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the version-control metadata entry.
pub const METADATA: &str = ".git";

/// Lazily yields every `.git` entry below a directory, except the workspace's
/// own top-level one.
///
/// Traversal errors (unreadable or missing directories) are skipped, so a
/// missing source directory simply yields nothing.
pub struct NestedRepoScan {
    inner: walkdir::IntoIter,
    excluded: PathBuf,
}

impl NestedRepoScan {
    /// Scan `dir` for embedded metadata, ignoring `workspace_root/.git`.
    pub fn new(workspace_root: impl AsRef<Path>, dir: impl AsRef<Path>) -> Self {
        let inner = WalkDir::new(dir.as_ref())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Self {
            inner,
            excluded: workspace_root.as_ref().join(METADATA),
        }
    }
}

impl Iterator for NestedRepoScan {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            if entry.file_name() != METADATA {
                continue;
            }

            // Nothing nested inside a metadata directory is interesting.
            if entry.file_type().is_dir() {
                self.inner.skip_current_dir();
            }

            if entry.path() == self.excluded {
                continue;
            }

            return Some(entry.into_path());
        }
    }
}
