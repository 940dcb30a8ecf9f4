#![deny(missing_docs)]

//! Sender and receiver wire logic for the rsync transfer core.
//!
//! # Overview
//!
//! This crate implements the per-file data phase of a protocol-30 transfer
//! (spec §4.6 "Checksum generation", §4.7 "Matching algorithm", §4.8
//! "Merge"): encoding/decoding the `Checksum.Header`, matching a source file
//! against a peer's block signature, and streaming the resulting delta over
//! a [`rsync_io::DuplexChannel`].
//!
//! # Design
//!
//! The heavy lifting — block-sizing heuristics, per-block checksums, the
//! sliding-window matcher, and delta replay — lives in the [`signature`] and
//! [`matching`] crates, both of which operate purely on in-memory byte
//! slices. This crate is the thin wire layer on top: it owns the framing
//! (`putInt`/`getInt` token streams, the checksum header layout) and nothing
//! else. Keeping the wire codec separate from the matching algorithm mirrors
//! how [`protocol`] separates envelope framing from the index codec.
//!
//! # Errors
//!
//! Every public function returns [`TransferError`], which wraps channel I/O
//! failures, delta-replay verification failures, and metadata failures
//! behind one error type so callers orchestrating a whole session don't have
//! to match on four different crates' error enums.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use std::num::NonZeroU32;
//! use rsync_io::DuplexChannel;
//! use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
//! use transfer::{header, sender, receiver};
//!
//! let replica = b"hello world".to_vec();
//! let layout = calculate_signature_layout(SignatureLayoutParams::new(
//!     replica.len() as u64,
//!     Some(NonZeroU32::new(4).unwrap()),
//! )).unwrap();
//! let blocks = generate_file_signature(&mut Cursor::new(replica.clone()), &layout, 7).unwrap();
//!
//! let mut header_channel = DuplexChannel::new(Cursor::new(Vec::new()));
//! header::write_checksum_header(&mut header_channel, &layout, &blocks).unwrap();
//! header_channel.flush().unwrap();
//! let mut header_reader = DuplexChannel::new(Cursor::new(header_channel.into_inner().into_inner()));
//! let (peer_layout, peer_blocks) = header::read_checksum_header(&mut header_reader).unwrap();
//!
//! let source = b"hello world, extended".to_vec();
//! let mut delta_channel = DuplexChannel::new(Cursor::new(Vec::new()));
//! sender::send_file_delta(&mut delta_channel, &source, &peer_layout, &peer_blocks, 7).unwrap();
//! let mut delta_reader = DuplexChannel::new(Cursor::new(delta_channel.into_inner().into_inner()));
//! let reconstructed = receiver::receive_file_delta(&mut delta_reader, &replica, peer_layout.block_length().get()).unwrap();
//! assert_eq!(reconstructed, source);
//! ```

pub mod destination;
pub mod error;
pub mod header;
pub mod receiver;
pub mod sender;

pub use destination::{DestinationPolicy, TargetState, join_within_root, resolve_destination_policy};
pub use error::TransferError;
pub use header::{read_checksum_header, write_checksum_header};
pub use receiver::{ReceiveEvent, ReceivedFileAttrs, receive_file_delta, receive_indexed_file};
pub use sender::send_file_delta;
