//! Errors raised while sequencing a session handshake or parsing arguments.

/// Errors produced by [`crate::session`] and [`crate::args`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Line or channel I/O failed.
    #[error(transparent)]
    Io(#[from] rsync_io::IoError),
    /// Framing or version negotiation failed.
    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),
    /// A generator call failed mid-session.
    #[error(transparent)]
    Engine(#[from] engine::EngineError),
    /// Streaming or merging a file's delta failed.
    #[error(transparent)]
    Transfer(#[from] transfer::TransferError),
    /// A file-attribute backend operation failed outside of a generator or
    /// transfer call (e.g. preparing the destination root).
    #[error(transparent)]
    Metadata(#[from] metadata::MetadataError),
    /// Walking the source tree to build the in-memory file list failed.
    #[error(transparent)]
    FileList(#[from] flist::FileListError),
    /// The server rejected the client's credentials (spec §4.2 step 4).
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The requested module does not exist on this server.
    #[error("unknown module: {0}")]
    ModuleNotFound(String),
    /// The server reported an error status during the handshake.
    #[error("server error: {0}")]
    ServerError(String),
    /// The client asked for recursion but the peer didn't negotiate
    /// `CF_INC_RECURSE` (spec §4.2 step 7: "Client requires `CF_INC_RECURSE`
    /// iff it asked for recursion").
    #[error("peer does not support incremental recursion")]
    RecursionNotSupported,
    /// Argument parsing failed (spec §4.3): an option was malformed, took
    /// an argument it shouldn't, or a required option was never set.
    #[error("argument error: {0}")]
    ArgumentParse(String),
}
