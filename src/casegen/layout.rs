//! On-disk case tree.
//!
//! ```text
//! <root>/<geometry id>/                 design mode case files
//! <root>/<geometry id>/<case label>/    analysis mode, one folder per sweep point
//! <root>/<geometry id>/cases.nam        analysis mode case list
//! <root>/cases.nam                      design mode case list
//! <root>/MainDict.json                  result snapshot
//! ```
//!
//! Directories below the root are destroyed and recreated before anything
//! is written into them, so a rerun never leaves stale files behind. The
//! root itself is created when missing and never removed.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;
use tracing::warn;

/// File name of the result snapshot.
pub const SNAPSHOT_FILE_NAME: &str = "MainDict.json";

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to remove {path:?}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create {path:?}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only directories strictly inside the root may be recreated.
    #[error("{path:?} is not inside the case tree")]
    OutsideTree { path: PathBuf },
}

/// Paths and directory lifecycle under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseTree {
    root: PathBuf,
}

impl CaseTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn geometry_dir(&self, geometry_id: &str) -> PathBuf {
        self.root.join(geometry_id)
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE_NAME)
    }

    /// Creates the root (and its parents) if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Create`] if the directory cannot be created.
    pub fn ensure_root(&self) -> Result<(), DirectoryError> {
        fs::create_dir_all(&self.root).map_err(|source| DirectoryError::Create {
            path: self.root.clone(),
            source,
        })
    }

    /// Removes `dir` with everything in it and creates it again, empty.
    ///
    /// The parent of `dir` must already exist.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError`] if `dir` is not strictly inside the root,
    /// or if removal or creation fails.
    pub fn recreate(&self, dir: &Path) -> Result<(), DirectoryError> {
        self.check_inside(dir)?;

        let removed = if dir.is_dir() {
            fs::remove_dir_all(dir)
        } else if dir.exists() {
            fs::remove_file(dir)
        } else {
            Ok(())
        };
        removed.map_err(|source| DirectoryError::Remove {
            path: dir.to_path_buf(),
            source,
        })?;

        fs::create_dir(dir).map_err(|source| DirectoryError::Create {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Removes a failed case or geometry directory.
    ///
    /// Failures are logged rather than returned; the caller is already
    /// handling a more relevant error.
    pub fn discard(&self, dir: &Path) {
        if self.check_inside(dir).is_err() || !dir.exists() {
            return;
        }
        if let Err(err) = fs::remove_dir_all(dir) {
            warn!(path = %dir.display(), error = %err, "failed to remove partial output");
        }
    }

    /// Every component below the root must be a plain name, so `..` or `.`
    /// can never lead back to the root or above it.
    fn check_inside(&self, dir: &Path) -> Result<(), DirectoryError> {
        let inside = dir.strip_prefix(&self.root).is_ok_and(|rest| {
            rest.components().next().is_some()
                && rest
                    .components()
                    .all(|component| matches!(component, Component::Normal(_)))
        });
        if inside {
            Ok(())
        } else {
            Err(DirectoryError::OutsideTree {
                path: dir.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recreate_empties_an_existing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let tree = CaseTree::new(temp.path().join("cases"));
        tree.ensure_root().unwrap();

        let dir = tree.geometry_dir("blade");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("stale.txt"), "old").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();

        tree.recreate(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn recreate_replaces_a_file_with_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let tree = CaseTree::new(temp.path());

        let dir = tree.geometry_dir("blade");
        fs::write(&dir, "not a directory").unwrap();

        tree.recreate(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn root_and_outside_paths_are_protected() {
        let temp = tempfile::tempdir().unwrap();
        let tree = CaseTree::new(temp.path().join("cases"));
        tree.ensure_root().unwrap();

        assert!(matches!(
            tree.recreate(tree.root()),
            Err(DirectoryError::OutsideTree { .. })
        ));
        assert!(matches!(
            tree.recreate(temp.path()),
            Err(DirectoryError::OutsideTree { .. })
        ));

        tree.discard(tree.root());
        assert!(tree.root().is_dir());
    }

    #[test]
    fn parent_components_cannot_escape_the_root() {
        let temp = tempfile::tempdir().unwrap();
        let tree = CaseTree::new(temp.path().join("cases"));
        tree.ensure_root().unwrap();
        let outside = temp.path().join("precious.txt");
        fs::write(&outside, "keep").unwrap();

        for id in ["..", "."] {
            assert!(matches!(
                tree.recreate(&tree.geometry_dir(id)),
                Err(DirectoryError::OutsideTree { .. })
            ));
            tree.discard(&tree.geometry_dir(id));
        }
        assert!(matches!(
            tree.recreate(&tree.geometry_dir("blade").join("..").join("..")),
            Err(DirectoryError::OutsideTree { .. })
        ));

        assert!(outside.exists());
        assert!(tree.root().is_dir());
    }

    #[test]
    fn ensure_root_keeps_existing_contents() {
        let temp = tempfile::tempdir().unwrap();
        let tree = CaseTree::new(temp.path().join("a").join("b"));

        tree.ensure_root().unwrap();
        fs::write(tree.root().join("keep.txt"), "x").unwrap();
        tree.ensure_root().unwrap();

        assert!(tree.root().join("keep.txt").exists());
    }

    #[test]
    fn discard_removes_a_case_directory() {
        let temp = tempfile::tempdir().unwrap();
        let tree = CaseTree::new(temp.path());
        let dir = tree.geometry_dir("blade");
        tree.recreate(&dir).unwrap();
        fs::write(dir.join("Load"), "partial").unwrap();

        tree.discard(&dir);
        assert!(!dir.exists());
    }
}
