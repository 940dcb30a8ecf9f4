//! Error taxonomy for the wire-level protocol crate (spec §7: `ProtocolError`).

use crate::envelope::EnvelopeError;

/// Errors raised while framing, versioning, or codec-decoding protocol bytes.
///
/// Corresponds to spec §7's `ProtocolError`: "peer violates the protocol (bad
/// version, bad flags, invalid index, malformed arguments, undecodable
/// text)". Session aborts on any variant here.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Peer advertised a protocol version older than what we require.
    #[error("peer protocol version {peer} is older than the minimum supported version {minimum}")]
    UnsupportedVersion {
        /// Version advertised by the peer.
        peer: u32,
        /// Minimum version this implementation accepts.
        minimum: u32,
    },

    /// A multiplexed message frame was malformed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// The index codec read a byte sequence it cannot interpret.
    #[error("invalid index encoding: {0}")]
    InvalidIndex(String),

    /// The text codec was asked to decode bytes that do not round-trip.
    #[error("text does not round-trip under the strict codec: {0}")]
    UndecodableText(String),

    /// The channel hit end-of-stream in the middle of a read.
    #[error("unexpected end of stream")]
    ChannelEof,
}
