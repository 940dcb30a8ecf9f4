//! A convenience recursive walker over a real directory tree.
//!
//! This sits above [`crate::Filelist`]: it produces a fully flattened,
//! depth-first, custom-ordered view of a tree in one pass, which is useful
//! for a non-recursive transfer or for tests that just want "the sorted
//! entries". Incremental, lazy stub-directory expansion (recursive mode) is
//! driven directly through [`crate::Filelist`] by the generator instead of
//! through this type.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use metadata::{FileAttributeBackend, posix::PosixBackend};

use crate::compare::compare_entries;
use crate::entry::{FileEntryData, FileInfo};
use crate::error::FileListError;

/// One entry produced by a [`FileListWalker`].
#[derive(Debug, Clone)]
pub struct FileListEntry {
    relative_path: PathBuf,
    info: FileInfo,
    is_root: bool,
}

impl FileListEntry {
    /// Path relative to the scan root (empty for the root entry itself).
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// The underlying tagged entry.
    #[must_use]
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Preserved attributes.
    #[must_use]
    pub fn metadata(&self) -> &metadata::RsyncFileAttributes {
        self.info.attributes()
    }

    /// True iff this is the synthetic entry for the scan root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

/// Builds a [`FileListWalker`] over a directory tree.
pub struct FileListBuilder {
    root: PathBuf,
    backend: Box<dyn FileAttributeBackend>,
}

impl FileListBuilder {
    /// Starts a builder rooted at `root`, using the default POSIX backend.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backend: Box::new(PosixBackend::new()),
        }
    }

    /// Overrides the [`FileAttributeBackend`] used to stat and list entries.
    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn FileAttributeBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Walks the tree eagerly and returns an iterator over the flattened,
    /// sorted result.
    pub fn build(self) -> Result<FileListWalker, FileListError> {
        let mut entries = VecDeque::new();
        let root_attrs = self.backend.stat(&self.root)?;
        entries.push_back(FileListEntry {
            relative_path: PathBuf::new(),
            info: FileInfo::Plain(FileEntryData::new(Vec::new(), root_attrs, Some(self.root.clone()))),
            is_root: true,
        });

        if entries[0].metadata().file_type() == metadata::FileType::Directory {
            walk_dir(self.backend.as_ref(), &self.root, &PathBuf::new(), &mut entries)?;
        }

        Ok(FileListWalker { entries })
    }
}

fn walk_dir(
    backend: &dyn FileAttributeBackend,
    local_dir: &Path,
    relative_dir: &Path,
    out: &mut VecDeque<FileListEntry>,
) -> Result<(), FileListError> {
    let mut children: Vec<(Vec<u8>, FileInfo, PathBuf)> = Vec::new();

    for entry in backend.read_dir(local_dir)? {
        let entry = entry?;
        let name = entry.file_name;
        let name_bytes = os_str_bytes(&name);
        let local_path = local_dir.join(&name);
        let relative_path = relative_dir.join(&name);

        let info = match entry.attributes.file_type() {
            metadata::FileType::Symlink => {
                let target = backend.read_symlink_target(&local_path)?;
                FileInfo::Symlink {
                    data: FileEntryData::new(name_bytes.clone(), entry.attributes, Some(local_path.clone())),
                    target,
                }
            }
            _ => FileInfo::Plain(FileEntryData::new(
                name_bytes.clone(),
                entry.attributes,
                Some(local_path.clone()),
            )),
        };

        children.push((name_bytes, info, relative_path));
    }

    children.sort_by(|a, b| compare_entries(&a.1, &b.1));

    for (_, info, relative_path) in children {
        let is_dir = info.is_directory();
        let local_path = info.local_path().map(Path::to_path_buf);
        out.push_back(FileListEntry {
            relative_path: relative_path.clone(),
            info,
            is_root: false,
        });
        if is_dir {
            if let Some(local_path) = local_path {
                walk_dir(backend, &local_path, &relative_path, out)?;
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn os_str_bytes(s: &std::ffi::OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_str_bytes(s: &std::ffi::OsStr) -> Vec<u8> {
    s.to_string_lossy().into_owned().into_bytes()
}

/// Iterator over a tree's flattened, custom-ordered entries.
pub struct FileListWalker {
    entries: VecDeque<FileListEntry>,
}

impl Iterator for FileListWalker {
    type Item = Result<FileListEntry, FileListError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn paths(walker: FileListWalker) -> Vec<PathBuf> {
        walker
            .map(|e| e.unwrap())
            .filter(|e| !e.is_root())
            .map(|e| e.relative_path().to_path_buf())
            .collect()
    }

    #[test]
    fn empty_directory_yields_root_only() {
        let dir = tempfile::tempdir().unwrap();
        let walker = FileListBuilder::new(dir.path()).build().unwrap();
        let all: Vec<_> = walker.map(|e| e.unwrap()).collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_root());
    }

    #[test]
    fn files_sorted_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zebra.txt", "apple.txt", "Banana.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let walker = FileListBuilder::new(dir.path()).build().unwrap();
        assert_eq!(
            paths(walker),
            vec![PathBuf::from("Banana.txt"), PathBuf::from("apple.txt"), PathBuf::from("zebra.txt")]
        );
    }

    #[test]
    fn non_directories_sort_before_directories_at_same_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("alice_dir")).unwrap();
        fs::write(dir.path().join("alice.txt"), b"").unwrap();
        let walker = FileListBuilder::new(dir.path()).build().unwrap();
        assert_eq!(
            paths(walker),
            vec![PathBuf::from("alice.txt"), PathBuf::from("alice_dir")]
        );
    }

    #[test]
    fn nested_directories_are_walked_depth_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), b"").unwrap();
        fs::write(dir.path().join("top.txt"), b"").unwrap();
        let walker = FileListBuilder::new(dir.path()).build().unwrap();
        assert_eq!(
            paths(walker),
            vec![
                PathBuf::from("sub"),
                PathBuf::from("sub/inner.txt"),
                PathBuf::from("top.txt"),
            ]
        );
    }
}
