//! The generator: per-segment directory setup, deletion, and itemization
//! (spec §4.6).

use std::io::{Read, Write};
use std::path::Path;

use flist::FileInfo;
use metadata::{FileAttributeBackend, LinkOption};
use rsync_io::DuplexChannel;
use signature::{BlockChecksum, SignatureLayout, SignatureLayoutParams, calculate_signature_layout, generate_file_signature};

use crate::deferred::{DeferredAttrQueue, DeferredAttrUpdate};
use crate::error::EngineError;
use crate::itemize::ItemizeFlags;

/// The outcome of itemizing one entry: the flags to report, and the
/// checksum header to stream when [`ItemizeFlags::TRANSFER`] is set.
pub struct ItemizeOutcome {
    /// The computed itemization flags.
    pub flags: ItemizeFlags,
    /// The local file's current block signature, present iff `flags`
    /// carries [`ItemizeFlags::TRANSFER`].
    pub checksum_header: Option<(SignatureLayout, Vec<BlockChecksum>)>,
}

/// Compares `entry` against whatever currently exists at `local_path` and
/// decides how it should be itemized (spec §4.6 step 3).
///
/// For a regular file whose size or mtime differs from the peer's (or when
/// `ignore_times` forces a re-check regardless), this computes a fresh
/// block-checksum header over the file *currently on disk* — the replica
/// the sender will diff its copy against.
pub fn itemize_entry(
    backend: &dyn FileAttributeBackend,
    local_path: &Path,
    entry: &FileInfo,
    ignore_times: bool,
    preserve_links: bool,
    checksum_seed: u32,
) -> Result<ItemizeOutcome, EngineError> {
    let peer_attrs = entry.attributes();
    let current = backend.stat_if_exists(local_path)?;

    match entry {
        FileInfo::Plain(_) if peer_attrs.file_type() == metadata::FileType::Directory => {
            let existed = current.is_some();
            if !existed {
                backend.create_directories(local_path)?;
            }
            let flags = if existed { ItemizeFlags::empty() } else { ItemizeFlags::empty().with(ItemizeFlags::LOCAL_CHANGE) };
            Ok(ItemizeOutcome { flags, checksum_header: None })
        }
        FileInfo::Plain(_) => {
            let needs_transfer = match &current {
                None => true,
                Some(attrs) => {
                    ignore_times || attrs.size() != peer_attrs.size() || attrs.last_modified() != peer_attrs.last_modified()
                }
            };

            let mut flags = ItemizeFlags::empty();
            if current.is_none() {
                flags = flags.with(ItemizeFlags::IS_NEW);
            }
            if let Some(attrs) = &current {
                if attrs.size() != peer_attrs.size() {
                    flags = flags.with(ItemizeFlags::REPORT_SIZE);
                }
                if attrs.last_modified() != peer_attrs.last_modified() {
                    flags = flags.with(ItemizeFlags::REPORT_TIME);
                }
                if attrs.mode() != peer_attrs.mode() {
                    flags = flags.with(ItemizeFlags::REPORT_PERMS);
                }
            }

            if !needs_transfer {
                return Ok(ItemizeOutcome { flags: flags.with(ItemizeFlags::NO_CHANGE), checksum_header: None });
            }

            let size = current.as_ref().map_or(0, |a| a.size() as u64);
            let layout = calculate_signature_layout(SignatureLayoutParams::new(size, None))?;
            let blocks = match std::fs::File::open(local_path) {
                Ok(mut file) => generate_file_signature(&mut file, &layout, checksum_seed)?,
                Err(_) => Vec::new(),
            };

            Ok(ItemizeOutcome {
                flags: flags.with(ItemizeFlags::TRANSFER),
                checksum_header: Some((layout, blocks)),
            })
        }
        FileInfo::Symlink { target, .. } => {
            if !preserve_links {
                return Ok(ItemizeOutcome { flags: ItemizeFlags::empty(), checksum_header: None });
            }
            let current_target = backend.read_symlink_target(local_path).ok();
            if current_target.as_deref() == Some(target.as_slice()) {
                return Ok(ItemizeOutcome { flags: ItemizeFlags::empty().with(ItemizeFlags::NO_CHANGE), checksum_header: None });
            }
            if current.is_some() {
                backend.unlink(local_path)?;
            }
            backend.create_symbolic_link(local_path, target)?;
            let flags = if current.is_some() {
                ItemizeFlags::empty()
            } else {
                ItemizeFlags::empty().with(ItemizeFlags::LOCAL_CHANGE)
            };
            Ok(ItemizeOutcome { flags, checksum_header: None })
        }
        FileInfo::Device { .. } => Err(EngineError::UnsupportedEntryKind(local_path.to_path_buf())),
    }
}

/// Writes `index` and `outcome.flags` to `channel`, followed by the
/// checksum header when [`ItemizeFlags::TRANSFER`] is set (spec §4.6 step
/// 3: "Emit `sendItemizeInfo(index, curAttrs, newAttrs, TRANSFER)` then, for
/// each block, ...").
pub fn send_itemize_info<T: Read + Write>(
    channel: &mut DuplexChannel<T>,
    index: i32,
    outcome: &ItemizeOutcome,
) -> Result<(), EngineError> {
    channel.encode_index(index);
    channel.put(&outcome.flags.bits().to_le_bytes());
    if let Some((layout, blocks)) = &outcome.checksum_header {
        transfer::write_checksum_header(channel, layout, blocks)?;
    }
    Ok(())
}

/// Queues the deferred mode/mtime/owner/group update for a directory entry
/// (spec §4.6: "schedule deferred attr update").
pub fn queue_directory_attrs(queue: &mut DeferredAttrQueue, path: &Path, entry: &FileInfo) {
    let attrs = entry.attributes();
    let update = DeferredAttrUpdate::new(path.to_path_buf(), LinkOption::Follow)
        .with_mode(attrs.mode())
        .with_mtime(attrs.last_modified())
        .with_user(attrs.user().clone())
        .with_group(attrs.group().clone());
    queue.push(update);
}

#[cfg(test)]
mod tests {
    use super::*;
    use flist::FileEntryData;
    use metadata::posix::PosixBackend;
    use metadata::{Group, RsyncFileAttributes, User};
    use std::fs;
    use tempfile::tempdir;

    fn plain_file(name: &str, size: i64, mtime: i64) -> FileInfo {
        let attrs = RsyncFileAttributes::new(0o100_644, size, mtime, User::nobody(), Group::nobody()).unwrap();
        FileInfo::Plain(FileEntryData::new(name.as_bytes().to_vec(), attrs, None))
    }

    fn directory(name: &str) -> FileInfo {
        let attrs = RsyncFileAttributes::new(0o040_755, 0, 0, User::nobody(), Group::nobody()).unwrap();
        FileInfo::Plain(FileEntryData::new(name.as_bytes().to_vec(), attrs, None))
    }

    #[test]
    fn new_file_is_itemized_as_is_new_and_transfer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let backend = PosixBackend::new();
        let entry = plain_file("new.txt", 0, 0);

        let outcome = itemize_entry(&backend, &path, &entry, false, true, 0).unwrap();
        assert!(outcome.flags.contains(ItemizeFlags::IS_NEW));
        assert!(outcome.flags.contains(ItemizeFlags::TRANSFER));
    }

    #[test]
    fn unchanged_file_reports_no_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("same.txt");
        fs::write(&path, b"hello").unwrap();
        let meta = fs::metadata(&path).unwrap();
        let mtime = meta.modified().unwrap().duration_since(std::time::UNIX_EPOCH).unwrap().as_secs() as i64;

        let backend = PosixBackend::new();
        let entry = plain_file("same.txt", 5, mtime);
        let outcome = itemize_entry(&backend, &path, &entry, false, true, 0).unwrap();
        assert!(outcome.flags.contains(ItemizeFlags::NO_CHANGE));
        assert!(outcome.checksum_header.is_none());
    }

    #[test]
    fn absent_directory_is_created_and_marked_local_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub");
        let backend = PosixBackend::new();
        let entry = directory("sub");

        let outcome = itemize_entry(&backend, &path, &entry, false, true, 0).unwrap();
        assert!(outcome.flags.contains(ItemizeFlags::LOCAL_CHANGE));
        assert!(path.is_dir());
    }

    #[test]
    fn device_entries_are_rejected_as_unsupported() {
        let attrs = RsyncFileAttributes::new(0o020_644, 0, 0, User::nobody(), Group::nobody()).unwrap();
        let entry = FileInfo::Device {
            data: FileEntryData::new(b"dev0".to_vec(), attrs, None),
            major: 1,
            minor: 2,
        };
        let backend = PosixBackend::new();
        let err = itemize_entry(&backend, Path::new("/tmp/dev0"), &entry, false, true, 0).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedEntryKind(_)));
    }
}
