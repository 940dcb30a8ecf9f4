//! Receiver-side delta reading, merging, and installation (spec §4.8 "Merge").

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use matching::{Delta, DeltaToken, MatchError, apply_delta};
use metadata::{FileAttributeBackend, Group, LinkOption, User};
use protocol::index::{DONE, EOF, OFFSET};
use rsync_io::DuplexChannel;

use crate::error::TransferError;

/// Bit set on the itemize-flags byte when the entry carries a following
/// checksum header and delta stream (kept in sync by convention with the
/// generator's own flag of the same name — `transfer` sits below `engine` in
/// the dependency graph and cannot share its type).
pub const TRANSFER_FLAG: u16 = 0x0040;

/// One event read off the index stream (spec §4.8 main loop): the special
/// `DONE`/`EOF` sentinels, a stub-directory placeholder, or a file index
/// paired with its itemize-flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveEvent {
    /// No more indices in this batch.
    Done,
    /// End of the file list (recursive mode).
    Eof,
    /// A stub directory placeholder, carrying the directory's file-list
    /// index.
    StubDirectory(i32),
    /// A regular file-list entry, carrying its itemize-flags byte.
    File {
        /// The entry's index into the file list.
        index: i32,
        /// Raw itemize-flags bits (see [`TRANSFER_FLAG`]).
        itemize_flags: u16,
    },
}

/// Reads the next index off `channel` and classifies it (spec §4.8): `DONE`
/// and `EOF` are returned as-is; an index `<= OFFSET` addresses a stub
/// directory; anything else is a file index, followed by its itemize-flags
/// byte.
pub fn next_receive_event<T: Read + Write>(channel: &mut DuplexChannel<T>) -> Result<ReceiveEvent, TransferError> {
    let index = channel.decode_index()?;
    if index == DONE {
        return Ok(ReceiveEvent::Done);
    }
    if index == EOF {
        return Ok(ReceiveEvent::Eof);
    }
    if index <= OFFSET {
        let dir_index = -(OFFSET - index);
        return Ok(ReceiveEvent::StubDirectory(dir_index));
    }

    let mut flags_bytes = [0u8; 2];
    channel.get(&mut flags_bytes)?;
    Ok(ReceiveEvent::File {
        index,
        itemize_flags: u16::from_le_bytes(flags_bytes),
    })
}

/// Reads a token stream (as written by
/// [`crate::sender::send_file_delta`]) from `channel`, without replaying it
/// yet.
///
/// Token framing per spec §4.8: `getInt()` yields `0` to terminate, a
/// positive length `n` to read `n` literal bytes, or a negative value whose
/// `-(value + 1)` is a block index. The stream ends with the 16-byte
/// whole-file MD5.
pub fn read_delta<T: Read + Write>(channel: &mut DuplexChannel<T>) -> Result<Delta, TransferError> {
    let mut tokens = Vec::new();
    loop {
        let marker = channel.get_int()?;
        if marker == 0 {
            break;
        } else if marker < 0 {
            let block_index = (-(marker as i64) - 1) as u64;
            tokens.push(DeltaToken::Match(block_index));
        } else {
            let mut bytes = vec![0u8; marker as usize];
            channel.get(&mut bytes)?;
            tokens.push(DeltaToken::Literal(bytes));
        }
    }

    let mut file_checksum = [0u8; 16];
    channel.get(&mut file_checksum)?;
    Ok(Delta::new(tokens, file_checksum))
}

/// Reads a token stream from `channel` and replays it against `replica` to
/// reconstruct the sender's file in memory.
pub fn receive_file_delta<T: Read + Write>(
    channel: &mut DuplexChannel<T>,
    replica: &[u8],
    block_length: u32,
) -> Result<Vec<u8>, TransferError> {
    let delta = read_delta(channel)?;
    Ok(apply_delta(replica, &delta, block_length)?)
}

/// Attributes to apply to a freshly-received file before it's renamed into
/// place (spec §4.6 ordering: mode, then mtime, then uid, then gid).
#[derive(Debug, Clone, Default)]
pub struct ReceivedFileAttrs {
    /// Permission bits to set, if any.
    pub mode: Option<u32>,
    /// Modification time to set, if any.
    pub mtime: Option<i64>,
    /// Owning user to set, if any.
    pub user: Option<User>,
    /// Owning group to set, if any.
    pub group: Option<Group>,
}

impl ReceivedFileAttrs {
    fn apply(&self, backend: &dyn FileAttributeBackend, path: &Path) -> Result<(), TransferError> {
        if let Some(mode) = self.mode {
            backend.set_file_mode(path, mode, LinkOption::Follow)?;
        }
        if let Some(mtime) = self.mtime {
            backend.set_last_modified_time(path, mtime, LinkOption::Follow)?;
        }
        if let Some(user) = &self.user {
            backend.set_owner(path, user, LinkOption::Follow)?;
        }
        if let Some(group) = &self.group {
            backend.set_group(path, group, LinkOption::Follow)?;
        }
        Ok(())
    }
}

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_temp_path(destination_path: &Path) -> PathBuf {
    let parent = destination_path.parent().unwrap_or_else(|| Path::new("."));
    let name = destination_path.file_name().map_or_else(|| "rrsync".to_string(), |n| n.to_string_lossy().into_owned());
    let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    parent.join(format!(".{name}.{}.{counter}.tmp", std::process::id()))
}

/// Reads the full token stream for one file off `channel`, merges it
/// against whatever currently sits at `destination_path` (or an empty
/// replica if nothing does), and installs the result (spec §4.8 "Merge
/// algorithm" and "temp file + atomic rename"):
///
/// 1. Build the delta from the wire, then merge it against the replica
///    currently on disk.
/// 2. If whole-file MD5 verification fails, re-read the replica (it may
///    have changed underneath us) and retry the merge once against the
///    same delta; a second failure purges the attempt and fails the file.
/// 3. Write the merged bytes to a temp file beside the destination.
/// 4. Apply `attrs` to the temp file.
/// 5. Atomically rename the temp file onto `destination_path`.
pub fn receive_indexed_file<T: Read + Write>(
    channel: &mut DuplexChannel<T>,
    backend: &dyn FileAttributeBackend,
    destination_path: &Path,
    block_length: u32,
    attrs: &ReceivedFileAttrs,
) -> Result<PathBuf, TransferError> {
    let delta = read_delta(channel)?;

    let merged = match apply_delta(&read_replica(destination_path), &delta, block_length) {
        Ok(bytes) => bytes,
        Err(MatchError::ChecksumMismatch) => {
            apply_delta(&read_replica(destination_path), &delta, block_length)
                .map_err(|_| TransferError::VerificationFailed(destination_path.to_path_buf()))?
        }
        Err(other) => return Err(other.into()),
    };

    if let Some(parent) = destination_path.parent() {
        backend.create_directories(parent)?;
    }

    let temp_path = unique_temp_path(destination_path);
    std::fs::write(&temp_path, &merged).map_err(|source| {
        TransferError::Metadata(metadata::MetadataError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })
    })?;

    if let Err(err) = attrs.apply(backend, &temp_path) {
        let _ = backend.unlink(&temp_path);
        return Err(err);
    }

    match backend.atomic_move(&temp_path, destination_path) {
        Ok(_) => Ok(destination_path.to_path_buf()),
        Err(err) => {
            let _ = backend.unlink(&temp_path);
            Err(err.into())
        }
    }
}

fn read_replica(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata::posix::PosixBackend;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn empty_delta_with_no_replica_reconstructs_empty_file() {
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(0);
        channel.put(&rsync_checksums::strong::Md5::digest(&[]));
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let reconstructed = receive_file_delta(&mut reader, &[], 512).unwrap();
        assert!(reconstructed.is_empty());
    }

    #[test]
    fn literal_only_stream_reconstructs_the_sent_bytes() {
        use rsync_checksums::strong::Md5;

        let payload = b"hello there".to_vec();
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(payload.len() as i32);
        channel.put(&payload);
        channel.put_int(0);
        channel.put(&Md5::digest(&payload));
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let reconstructed = receive_file_delta(&mut reader, &[], 8).unwrap();
        assert_eq!(reconstructed, payload);
    }

    #[test]
    fn checksum_mismatch_surfaces_as_a_transfer_error() {
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(0);
        channel.put(&[0xAAu8; 16]);
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let err = receive_file_delta(&mut reader, &[], 512).unwrap_err();
        assert!(matches!(err, TransferError::Match(matching::MatchError::ChecksumMismatch)));
    }

    #[test]
    fn done_eof_and_stub_directory_indices_are_classified() {
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.encode_index(DONE);
        channel.encode_index(EOF);
        channel.encode_index(OFFSET - 5);
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        assert_eq!(next_receive_event(&mut reader).unwrap(), ReceiveEvent::Done);
        assert_eq!(next_receive_event(&mut reader).unwrap(), ReceiveEvent::Eof);
        assert_eq!(next_receive_event(&mut reader).unwrap(), ReceiveEvent::StubDirectory(5));
    }

    #[test]
    fn file_index_carries_its_itemize_flags_byte() {
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.encode_index(3);
        channel.put(&TRANSFER_FLAG.to_le_bytes());
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let event = next_receive_event(&mut reader).unwrap();
        assert_eq!(event, ReceiveEvent::File { index: 3, itemize_flags: TRANSFER_FLAG });
    }

    #[test]
    fn new_file_is_written_to_a_temp_path_then_renamed_into_place() {
        use rsync_checksums::strong::Md5;

        let dir = tempdir().unwrap();
        let destination = dir.path().join("received.txt");
        let payload = b"brand new content".to_vec();

        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(payload.len() as i32);
        channel.put(&payload);
        channel.put_int(0);
        channel.put(&Md5::digest(&payload));
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let backend = PosixBackend::new();
        let attrs = ReceivedFileAttrs { mode: Some(0o644), ..Default::default() };

        let result_path = receive_indexed_file(&mut reader, &backend, &destination, 8, &attrs).unwrap();
        assert_eq!(result_path, destination);
        assert_eq!(std::fs::read(&destination).unwrap(), payload);

        let siblings: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(siblings, vec![std::ffi::OsString::from("received.txt")]);
    }

    #[test]
    fn existing_file_is_merged_against_on_disk_replica() {
        use rsync_checksums::strong::Md5;

        let dir = tempdir().unwrap();
        let destination = dir.path().join("existing.txt");
        std::fs::write(&destination, b"the quick brown fox").unwrap();

        let updated = b"the slow brown fox".to_vec();
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(updated.len() as i32);
        channel.put(&updated);
        channel.put_int(0);
        channel.put(&Md5::digest(&updated));
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let backend = PosixBackend::new();
        let attrs = ReceivedFileAttrs::default();

        receive_indexed_file(&mut reader, &backend, &destination, 8, &attrs).unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), updated);
    }

    #[test]
    fn persistent_checksum_mismatch_is_reported_without_leaving_a_temp_file() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("broken.txt");

        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(0);
        channel.put(&[0xAAu8; 16]);
        channel.flush().unwrap();
        let wire = channel.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let backend = PosixBackend::new();
        let attrs = ReceivedFileAttrs::default();

        let err = receive_indexed_file(&mut reader, &backend, &destination, 512, &attrs).unwrap_err();
        assert!(matches!(err, TransferError::VerificationFailed(_)));
        assert!(!destination.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
