#![deny(missing_docs)]

//! Shared helpers for building throwaway directory trees in tests across
//! the workspace, the same `tempfile::tempdir()` pattern already used
//! ad hoc in `flist`'s and `engine`'s own test modules.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A directory tree rooted at a [`tempfile::TempDir`], with builder
/// methods for populating it before handing the path to whatever is
/// under test.
pub struct FixtureTree {
    root: TempDir,
}

impl FixtureTree {
    /// Creates a new, empty temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the underlying temporary directory cannot be created;
    /// acceptable in test code, where there is no sensible way to
    /// continue without it.
    #[must_use]
    pub fn new() -> Self {
        Self { root: TempDir::new().expect("failed to create temporary directory") }
    }

    /// The tree's root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Resolves `relative` against the tree's root.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Writes `contents` to `relative`, creating any parent directories.
    pub fn write_file(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Creates `relative` as a directory, including any parents.
    pub fn make_dir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Creates a symlink at `relative` pointing at `target`.
    #[cfg(unix)]
    pub fn make_symlink(&self, relative: impl AsRef<Path>, target: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_file_creates_parent_directories() {
        let tree = FixtureTree::new();
        let path = tree.write_file("a/b/c.txt", b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(tree.join("a/b").is_dir());
    }

    #[test]
    fn make_dir_is_idempotent_for_nested_paths() {
        let tree = FixtureTree::new();
        tree.make_dir("x/y/z").unwrap();
        tree.make_dir("x/y/z").unwrap();
        assert!(tree.join("x/y/z").is_dir());
    }

    #[test]
    fn make_symlink_points_at_target() {
        let tree = FixtureTree::new();
        tree.write_file("real.txt", b"data").unwrap();
        let link = tree.make_symlink("link.txt", "real.txt").unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("real.txt"));
    }
}
