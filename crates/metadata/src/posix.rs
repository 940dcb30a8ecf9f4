//! Default [`FileAttributeBackend`] for POSIX filesystems.

use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use rustix::fs::{AtFlags, CWD, Gid, Uid, chownat};

use crate::backend::{DirEntry, FileAttributeBackend, LinkOption, MetadataError};
use crate::principal::{Group, RsyncFileAttributes, User};

/// Backend implemented directly against POSIX syscalls (`rustix` + `libc` +
/// `filetime`). Extended attributes and ACLs are out of scope; this backend
/// never touches either.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixBackend;

impl PosixBackend {
    /// Builds a new backend. Stateless; exists for API symmetry with
    /// alternative backends a caller might plug in.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn to_attrs(path: &Path, meta: &fs::Metadata) -> Result<RsyncFileAttributes, MetadataError> {
        let user = User::new(i64::from(meta.uid()), meta.uid().to_string())?;
        let group = Group::new(i64::from(meta.gid()), meta.gid().to_string())?;
        RsyncFileAttributes::new(meta.mode(), meta.size() as i64, meta.mtime().max(0), user, group)
            .map_err(MetadataError::from)
            .map_err(|_| MetadataError::io("stat", path, std::io::ErrorKind::InvalidData.into()))
            .or_else(|_| {
                RsyncFileAttributes::new(
                    meta.mode(),
                    meta.size() as i64,
                    meta.mtime().max(0),
                    User::nobody(),
                    Group::nobody(),
                )
                .map_err(MetadataError::from)
            })
    }

    fn at_flags(link: LinkOption) -> AtFlags {
        match link {
            LinkOption::Follow => AtFlags::empty(),
            LinkOption::NoFollow => AtFlags::SYMLINK_NOFOLLOW,
        }
    }
}

impl FileAttributeBackend for PosixBackend {
    fn stat(&self, path: &Path) -> Result<RsyncFileAttributes, MetadataError> {
        let meta = fs::symlink_metadata(path).map_err(|e| MetadataError::io("stat", path, e))?;
        Self::to_attrs(path, &meta)
    }

    fn stat_if_exists(&self, path: &Path) -> Result<Option<RsyncFileAttributes>, MetadataError> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(Self::to_attrs(path, &meta)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MetadataError::io("stat", path, e)),
        }
    }

    fn set_file_mode(&self, path: &Path, mode: u32, link: LinkOption) -> Result<(), MetadataError> {
        if link == LinkOption::NoFollow {
            // POSIX has no portable fchmodat(AT_SYMLINK_NOFOLLOW) guarantee;
            // rsync itself skips mode changes on symlinks on such platforms.
            return Ok(());
        }
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .map_err(|e| MetadataError::io("chmod", path, e))
    }

    fn set_last_modified_time(
        &self,
        path: &Path,
        mtime: i64,
        link: LinkOption,
    ) -> Result<(), MetadataError> {
        let ft = filetime::FileTime::from_unix_time(mtime, 0);
        let result = match link {
            LinkOption::Follow => filetime::set_file_mtime(path, ft),
            LinkOption::NoFollow => filetime::set_symlink_file_times(path, ft, ft),
        };
        result.map_err(|e| MetadataError::io("utimes", path, e))
    }

    fn set_owner(&self, path: &Path, user: &User, link: LinkOption) -> Result<(), MetadataError> {
        chownat(CWD, path, Some(Uid::from_raw(u32::from(user.id()))), None, Self::at_flags(link))
            .map_err(|e| MetadataError::io("chown", path, e.into()))
    }

    fn set_group(&self, path: &Path, group: &Group, link: LinkOption) -> Result<(), MetadataError> {
        chownat(CWD, path, None, Some(Gid::from_raw(u32::from(group.id()))), Self::at_flags(link))
            .map_err(|e| MetadataError::io("chgrp", path, e.into()))
    }

    fn set_user_id(&self, path: &Path, uid: u32, link: LinkOption) -> Result<(), MetadataError> {
        chownat(CWD, path, Some(Uid::from_raw(uid)), None, Self::at_flags(link))
            .map_err(|e| MetadataError::io("chown", path, e.into()))
    }

    fn set_group_id(&self, path: &Path, gid: u32, link: LinkOption) -> Result<(), MetadataError> {
        chownat(CWD, path, None, Some(Gid::from_raw(gid)), Self::at_flags(link))
            .map_err(|e| MetadataError::io("chgrp", path, e.into()))
    }

    fn unlink(&self, path: &Path) -> Result<(), MetadataError> {
        fs::remove_file(path).map_err(|e| MetadataError::io("unlink", path, e))
    }

    fn read_symlink_target(&self, path: &Path) -> Result<Vec<u8>, MetadataError> {
        fs::read_link(path)
            .map(|target| target.as_os_str().as_bytes().to_vec())
            .map_err(|e| MetadataError::io("readlink", path, e))
    }

    fn create_symbolic_link(&self, link: &Path, target: &[u8]) -> Result<(), MetadataError> {
        let target = std::ffi::OsStr::from_bytes(target);
        std::os::unix::fs::symlink(target, link)
            .map_err(|e| MetadataError::io("symlink", link, e))
    }

    fn create_directories(&self, path: &Path) -> Result<(), MetadataError> {
        fs::create_dir_all(path).map_err(|e| MetadataError::io("mkdir", path, e))
    }

    fn atomic_move(&self, src: &Path, dst: &Path) -> Result<bool, MetadataError> {
        match fs::rename(src, dst) {
            Ok(()) => Ok(true),
            Err(e) if e.raw_os_error() == Some(libc::EXDEV) => {
                fs::copy(src, dst).map_err(|e| MetadataError::io("copy", src, e))?;
                fs::remove_file(src).map_err(|e| MetadataError::io("unlink", src, e))?;
                Ok(false)
            }
            Err(e) => Err(MetadataError::io("rename", src, e)),
        }
    }

    fn read_dir(
        &self,
        path: &Path,
    ) -> Result<Box<dyn Iterator<Item = Result<DirEntry, MetadataError>>>, MetadataError> {
        let entries = fs::read_dir(path).map_err(|e| MetadataError::io("readdir", path, e))?;
        let iter = entries.map(|entry| {
            let entry = entry.map_err(|e| MetadataError::io("readdir", path, e))?;
            let meta = entry
                .metadata()
                .map_err(|e| MetadataError::io("stat", &entry.path(), e))?;
            Ok(DirEntry {
                file_name: entry.file_name(),
                attributes: PosixBackend::to_attrs(&entry.path(), &meta)?,
            })
        });
        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_and_mkdir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PosixBackend::new();
        let nested = dir.path().join("a/b/c");
        backend.create_directories(&nested).unwrap();
        let attrs = backend.stat(&nested).unwrap();
        assert_eq!(attrs.file_type(), crate::principal::FileType::Directory);
    }

    #[test]
    fn symlink_round_trips_target_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PosixBackend::new();
        let target = dir.path().join("target.txt");
        fs::write(&target, b"hi").unwrap();
        let link = dir.path().join("link");
        backend.create_symbolic_link(&link, target.as_os_str().as_bytes()).unwrap();
        let read_back = backend.read_symlink_target(&link).unwrap();
        assert_eq!(read_back, target.as_os_str().as_bytes());
    }

    #[test]
    fn atomic_move_renames_within_same_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PosixBackend::new();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"payload").unwrap();
        let renamed = backend.atomic_move(&src, &dst).unwrap();
        assert!(renamed);
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn stat_if_exists_returns_none_for_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let backend = PosixBackend::new();
        let missing = dir.path().join("nope");
        assert!(backend.stat_if_exists(&missing).unwrap().is_none());
    }
}
