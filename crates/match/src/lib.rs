#![deny(missing_docs)]

//! # Overview
//!
//! Rolling-checksum block matching: the sender-side search that turns a
//! source file and a peer's block signature into a literal/match delta
//! stream, and the receiver-side replay that turns that delta back into file
//! contents (spec §4.7 "Sender", §4.8 "Receiver" → "Merge").
//!
//! # Design
//!
//! [`ChecksumIndex`] builds the rolling-value multimap once per file.
//! [`generate_delta`] then slides a window across the source, probing the
//! index at every position and falling back to a seeded MD5 check before
//! accepting a match, exactly as upstream rsync's `hash_search()` does.
//! [`apply_delta`] is the inverse: replaying a [`Delta`] against the replica
//! it was generated from.
//!
//! # Errors
//!
//! [`MatchError`] reports a delta whose tokens don't reconstruct to the
//! expected whole-file checksum, or that reference a block past the end of
//! the replica's signature.
//!
//! # Examples
//!
//! ```
//! use matching::{ChecksumIndex, apply_delta, generate_delta};
//! use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
//! use std::io::Cursor;
//! use std::num::NonZeroU32;
//!
//! let replica = b"the quick brown fox".to_vec();
//! let layout = calculate_signature_layout(SignatureLayoutParams::new(
//!     replica.len() as u64,
//!     Some(NonZeroU32::new(8).unwrap()),
//! ))?;
//! let blocks = generate_file_signature(&mut Cursor::new(replica.clone()), &layout, 0)?;
//! let index = ChecksumIndex::build(&blocks, &layout);
//!
//! let source = b"the quick brown fox jumps".to_vec();
//! let delta = generate_delta(&source, &layout, &index, 0);
//! let reconstructed = apply_delta(&replica, &delta, layout.block_length().get())?;
//! assert_eq!(reconstructed, source);
//! # Ok::<(), matching::MatchError>(())
//! ```

pub mod delta;
pub mod error;
pub mod index;
pub mod merge;

pub use delta::{Delta, DeltaToken, MAX_LITERAL_LEN, generate_delta};
pub use error::MatchError;
pub use index::ChecksumIndex;
pub use merge::apply_delta;
