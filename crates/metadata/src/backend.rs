//! Pluggable file-attribute back-end (spec §6).

use std::path::{Path, PathBuf};

use crate::principal::{Group, RsyncFileAttributes, User};

/// Errors raised by a [`FileAttributeBackend`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The underlying OS call failed.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// Short name of the failing operation, for diagnostics.
        operation: &'static str,
        /// Path the operation was attempted against.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A principal's id or name failed validation.
    #[error(transparent)]
    Principal(#[from] crate::principal::PrincipalError),
}

impl MetadataError {
    pub(crate) fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One entry yielded while streaming a directory's children.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Entry's file name (not a full path).
    pub file_name: std::ffi::OsString,
    /// Attributes of the entry itself (symlinks are not followed).
    pub attributes: RsyncFileAttributes,
}

/// Whether a mode/time/ownership update should follow a symlink or act on it
/// directly (symlink operations must not follow, per spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOption {
    /// Operate on the target the path resolves to.
    Follow,
    /// Operate on the symlink itself.
    NoFollow,
}

/// The filesystem surface the transfer core depends on, chosen per
/// filesystem for best performance (spec §6).
///
/// All methods that can target a symlink take a [`LinkOption`] so callers
/// never accidentally dereference one.
pub trait FileAttributeBackend: Send + Sync {
    /// Returns `path`'s attributes, failing if it does not exist.
    fn stat(&self, path: &Path) -> Result<RsyncFileAttributes, MetadataError>;

    /// Returns `path`'s attributes, or `None` if it does not exist.
    fn stat_if_exists(&self, path: &Path) -> Result<Option<RsyncFileAttributes>, MetadataError>;

    /// Sets `path`'s permission bits.
    fn set_file_mode(
        &self,
        path: &Path,
        mode: u32,
        link: LinkOption,
    ) -> Result<(), MetadataError>;

    /// Sets `path`'s modification time (seconds since the epoch).
    fn set_last_modified_time(
        &self,
        path: &Path,
        mtime: i64,
        link: LinkOption,
    ) -> Result<(), MetadataError>;

    /// Sets `path`'s owning user.
    fn set_owner(&self, path: &Path, user: &User, link: LinkOption) -> Result<(), MetadataError>;

    /// Sets `path`'s owning group.
    fn set_group(&self, path: &Path, group: &Group, link: LinkOption) -> Result<(), MetadataError>;

    /// Sets `path`'s numeric uid directly.
    fn set_user_id(&self, path: &Path, uid: u32, link: LinkOption) -> Result<(), MetadataError>;

    /// Sets `path`'s numeric gid directly.
    fn set_group_id(&self, path: &Path, gid: u32, link: LinkOption) -> Result<(), MetadataError>;

    /// Removes a file or symlink.
    fn unlink(&self, path: &Path) -> Result<(), MetadataError>;

    /// Reads the raw target bytes of a symlink.
    fn read_symlink_target(&self, path: &Path) -> Result<Vec<u8>, MetadataError>;

    /// Creates a symlink at `link` pointing at `target`.
    fn create_symbolic_link(&self, link: &Path, target: &[u8]) -> Result<(), MetadataError>;

    /// Creates `path` and any missing parent directories.
    fn create_directories(&self, path: &Path) -> Result<(), MetadataError>;

    /// Atomically moves `src` to `dst`, returning whether the move
    /// succeeded as a true rename (`false` if a copy-then-delete fallback
    /// was required, e.g. across filesystems).
    fn atomic_move(&self, src: &Path, dst: &Path) -> Result<bool, MetadataError>;

    /// Streams `path`'s direct children.
    fn read_dir(
        &self,
        path: &Path,
    ) -> Result<Box<dyn Iterator<Item = Result<DirEntry, MetadataError>>>, MetadataError>;
}
