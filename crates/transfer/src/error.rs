//! Errors raised while streaming a checksum header or a delta over the wire.

use std::path::PathBuf;

/// Errors produced by [`crate::sender`] or [`crate::receiver`].
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The underlying duplex channel failed.
    #[error(transparent)]
    Channel(#[from] rsync_io::IoError),
    /// Replaying a delta against the replica failed verification.
    #[error(transparent)]
    Match(#[from] matching::MatchError),
    /// A file-attribute backend operation failed.
    #[error(transparent)]
    Metadata(#[from] metadata::MetadataError),
    /// A path's encoded bytes could not be emitted through the session's
    /// strict text codec (spec §4.7 "Path safety at sender").
    #[error("path {0:?} cannot be represented by the session's text codec")]
    UnrepresentablePath(PathBuf),
    /// A wildcard appeared in a server-side source argument (spec §4.7:
    /// "Wildcards in received (server-side) source arguments are rejected").
    #[error("wildcards in server-side source arguments are not allowed")]
    WildcardRejected,
    /// The peer requested a transfer for an entry kind this implementation
    /// cannot send (spec §4.6: "Device/fifo/socket: unsupported").
    #[error("unsupported entry kind for transfer: {0}")]
    Unsupported(String),
    /// A relative path from the peer would resolve outside the destination
    /// root once `..`/`.` components are normalized (spec §4.8: relative
    /// path escape is rejected, not silently clamped).
    #[error("path {0:?} escapes the destination root")]
    SecurityError(PathBuf),
    /// The source/destination argument combination has no valid resolution
    /// under the destination path-resolution policy table (spec §4.8): e.g.
    /// multiple sources or a source directory against an existing plain-file
    /// target.
    #[error("destination {0:?} cannot receive this combination of sources")]
    DestinationConflict(PathBuf),
    /// A delta failed whole-file MD5 verification even after one retry, and
    /// the partially-written temp file was purged (spec §4.8: retry once,
    /// then fail the file).
    #[error("checksum verification for {0:?} failed after a retry; transfer of this file abandoned")]
    VerificationFailed(PathBuf),
}
