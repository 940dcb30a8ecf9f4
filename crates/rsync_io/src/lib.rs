#![deny(missing_docs)]

//! # Overview
//!
//! Transport-facing primitives for the rsync protocol core: the multiplexed
//! duplex channel (spec §4.1) and the line-oriented daemon handshake (spec
//! §4.2). Everything here is generic over any [`std::io::Read`] +
//! [`std::io::Write`] transport — a TCP socket, a pair of pipes, or an
//! in-memory buffer in tests.
//!
//! # Design
//!
//! [`channel::DuplexChannel`] wraps a transport and exposes the byte/int/char
//! primitives and index codec the rest of the core drives the session with,
//! transparently demultiplexing out-of-band messages from the raw transfer
//! stream. [`pipe::DuplexPipe`] is one such transport: an in-memory duplex
//! byte pipe for connecting two roles running as threads in the same
//! process rather than across a socket. [`handshake`] provides the
//! `@RSYNCD:` banner, status-line, and
//! challenge/response helpers the session layer sequences into the full
//! handshake (spec §4.2); it deliberately stops short of owning that
//! sequencing itself; protocol version and compatibility-flag negotiation
//! above the line level live in the `protocol` crate.
//!
//! # Errors
//!
//! [`error::IoError`] wraps transport I/O failures, wraps
//! [`protocol::ProtocolError`], and reports the channel-specific failure
//! modes from spec §4.1 (`ChannelEof`, oversize handshake lines).
//!
//! # Examples
//!
//! ```
//! use rsync_io::channel::DuplexChannel;
//! use std::io::Cursor;
//!
//! let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
//! channel.put_int(7);
//! channel.encode_index(42);
//! channel.flush()?;
//!
//! let wire = channel.into_inner().into_inner();
//! let mut reader = DuplexChannel::new(Cursor::new(wire));
//! assert_eq!(reader.get_int()?, 7);
//! assert_eq!(reader.decode_index()?, 42);
//! # Ok::<(), rsync_io::error::IoError>(())
//! ```

pub mod channel;
pub mod error;
pub mod handshake;
pub mod pipe;

pub use channel::DuplexChannel;
pub use error::IoError;
pub use pipe::DuplexPipe;
