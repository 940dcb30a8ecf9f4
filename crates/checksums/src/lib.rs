#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `rsync_checksums` provides the rolling and strong checksum primitives used
//! by the rsync transfer core. The algorithms are byte-for-byte compatible
//! with upstream rsync protocol 30 so delta-transfer heuristics remain
//! interchangeable with the C reference implementation.
//!
//! # Design
//!
//! The crate offers two modules:
//!
//! - [`rolling`] implements the Adler-32-style weak checksum (`rsum`) used for
//!   block matching during delta transfers.
//! - [`strong`] exposes the MD5 digest together with the
//!   [`strong::StrongDigest`] trait higher layers use to abstract over the
//!   checksum algorithm, plus [`strong::seeded_block_digest`] which mixes in
//!   the session's checksum seed the way the signature and matching crates
//!   require.
//!
//! # Invariants
//!
//! - `RollingChecksum` truncates both state components to 16 bits after every
//!   update, matching upstream rsync's behaviour.
//! - Rolling updates reject mismatched slice lengths and empty windows so the
//!   caller never observes silent state corruption.
//!
//! # Errors
//!
//! [`RollingError`] reports invalid rolling operations (empty windows, window
//! lengths that overflow `u32`, or mismatched slice lengths) and implements
//! [`std::error::Error`]. [`RollingSliceError`] signals that a digest could
//! not be reconstructed from a byte slice because the input length differed
//! from the expected four bytes.
//!
//! # Examples
//!
//! ```
//! use rsync_checksums::RollingChecksum;
//!
//! let mut rolling = RollingChecksum::new();
//! rolling.update(b"abcd");
//! assert_eq!(rolling.len(), 4);
//!
//! rolling.roll(b'a', b'e').unwrap();
//! assert_eq!(rolling.len(), 4);
//! ```

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingDigest, RollingError, RollingSliceError};
