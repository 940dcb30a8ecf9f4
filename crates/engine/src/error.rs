//! Errors raised while the generator drives a segment or applies deferred
//! attributes.

use std::path::PathBuf;

/// Errors produced by [`crate::generator::Generator`] and
/// [`crate::deferred::DeferredAttrQueue`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A file-attribute backend operation failed.
    #[error(transparent)]
    Metadata(#[from] metadata::MetadataError),
    /// Evaluating the filter stack against a path failed.
    #[error(transparent)]
    Filter(#[from] filters::FilterError),
    /// A file-list operation (segment/stub lookup) failed.
    #[error(transparent)]
    FileList(#[from] flist::FileListError),
    /// Streaming the checksum header or delta over the wire failed.
    #[error(transparent)]
    Transfer(#[from] transfer::TransferError),
    /// Computing a local signature layout or block checksums failed.
    #[error(transparent)]
    Signature(#[from] signature::SignatureError),
    /// The generator was asked to itemize an entry kind it cannot transfer
    /// (spec §4.6: "Device/fifo/socket: unsupported").
    #[error("unsupported entry kind for {0}")]
    UnsupportedEntryKind(PathBuf),
}
