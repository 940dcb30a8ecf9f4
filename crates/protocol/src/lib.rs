#![deny(missing_docs)]

//! # Overview
//!
//! Wire-level building blocks for rsync protocol 30: multiplexed message
//! framing ([`envelope`]), the variable-width file-list index codec
//! ([`index`]), the strict text codec ([`text`]), and version/compat-flag
//! negotiation ([`version`]).
//!
//! # Design
//!
//! Every type here is pure encode/decode logic with no I/O of its own;
//! `rsync_io`'s `ByteChannel`/`MultiplexChannel` drive these codecs against
//! an actual transport. Keeping the codecs I/O-free makes them exhaustively
//! unit- and property-testable without a socket.
//!
//! # Errors
//!
//! [`error::ProtocolError`] is the taxonomy's `ProtocolError` (spec §7):
//! bad version, bad flags, invalid index, or undecodable text all unwind
//! through this type.
//!
//! # Examples
//!
//! ```
//! use protocol::index::IndexCodec;
//!
//! let mut encoder = IndexCodec::new();
//! let mut decoder = IndexCodec::new();
//! let wire = encoder.encode(42);
//! assert_eq!(decoder.decode(&wire).unwrap(), (42, wire.len()));
//! ```

pub mod envelope;
pub mod error;
pub mod index;
pub mod text;
pub mod version;

pub use envelope::{
    EnvelopeError, HEADER_LEN, LogCode, LogCodeConversionError, MAX_PAYLOAD_LENGTH, MPLEX_BASE,
    MessageCode, MessageCodeParseError, MessageFrame, MessageHeader, PAYLOAD_MASK,
};
pub use error::ProtocolError;
pub use index::{DONE, EOF, IndexCodec, OFFSET};
pub use text::{StrictUtf8Codec, TextCodec};
pub use version::{CompatFlags, PROTOCOL_SUBVERSION, PROTOCOL_VERSION, negotiate};
