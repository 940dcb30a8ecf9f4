//! Errors raised while driving the duplex channel or daemon handshake lines.

/// Errors produced by [`crate::channel::DuplexChannel`] or
/// [`crate::handshake`].
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The underlying transport returned an I/O error.
    #[error("transport I/O error: {0}")]
    Transport(#[from] std::io::Error),
    /// A multiplexed frame or index could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
    /// The peer closed the connection before a complete read could finish
    /// (spec §4.1 "unexpected end-of-stream → `ChannelEof`").
    #[error("channel reached end of stream before the read completed")]
    ChannelEof,
    /// A daemon handshake line exceeded the maximum accepted length without
    /// a terminating newline.
    #[error("daemon handshake line exceeded {limit} bytes without a newline")]
    LineTooLong {
        /// The configured maximum line length.
        limit: usize,
    },
}
