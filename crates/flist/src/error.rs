//! Errors raised while building or mutating a [`crate::Filelist`].

/// Errors produced by file-list construction and traversal.
#[derive(Debug, thiserror::Error)]
pub enum FileListError {
    /// A filesystem operation failed while walking a directory.
    #[error(transparent)]
    Metadata(#[from] metadata::MetadataError),
    /// A path component could not be represented (name too long for the
    /// wire format, or contains a NUL byte).
    #[error("path component {0:?} is not representable on the wire")]
    UnrepresentablePath(std::path::PathBuf),
    /// A stub-directory index was requested outside the range the segment
    /// map currently covers.
    #[error("stub directory index {0} is out of range")]
    StubIndexOutOfRange(i64),
    /// A stub-directory index was requested that has already been consumed
    /// (expanded into its own segment).
    #[error("stub directory index {0} has already been consumed")]
    StubAlreadyConsumed(i64),
}
