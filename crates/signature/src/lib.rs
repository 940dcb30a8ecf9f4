#![deny(missing_docs)]

//! # Overview
//!
//! Block-checksum signature layout and generation (spec §4.6, §3
//! `Checksum.Header`): deriving a file's block length and digest length
//! from its size, then streaming the rolling-plus-seeded-strong checksum
//! pair for every block.
//!
//! # Design
//!
//! [`calculate_signature_layout`] implements the block-sizing heuristic
//! (`pow2_sqrt`) and digest-length formula verbatim; [`generate_file_signature`]
//! drives [`rsync_checksums::RollingChecksum`] and
//! [`rsync_checksums::strong::seeded_block_digest`] one block at a time over
//! any [`std::io::Read`], so callers can point it at a file, a pipe, or an
//! in-memory buffer.
//!
//! # Errors
//!
//! [`SignatureError`] wraps I/O failures from the source reader and rejects
//! a zero forced block length.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
//!
//! let data = b"hello world, this is file content".to_vec();
//! let layout = calculate_signature_layout(SignatureLayoutParams::new(data.len() as u64, None))?;
//! let blocks = generate_file_signature(&mut Cursor::new(data), &layout, 0)?;
//! assert_eq!(blocks.len() as u64, layout.chunk_count());
//! # Ok::<(), signature::SignatureError>(())
//! ```

pub mod error;
pub mod generate;
pub mod layout;

pub use error::SignatureError;
pub use generate::{BlockChecksum, generate_file_signature};
pub use layout::{SignatureLayout, SignatureLayoutParams, calculate_signature_layout};
