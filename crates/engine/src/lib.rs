#![deny(missing_docs)]

//! The generator: job queue, itemization, deletion pass, and deferred
//! attribute application that drive one side of a transfer (spec §4.6).
//!
//! # Overview
//!
//! The generator lives on the receiver side. It consumes the incoming file
//! list and, for each segment, creates any missing target directory, runs
//! the `--delete` pass, and itemizes every entry: deciding whether a file
//! needs a checksum header and data stream, a directory needs creation, or
//! a symlink needs recreating. Itemization and deletion are both exposed as
//! plain functions operating on a [`metadata::FileAttributeBackend`] rather
//! than a single monolithic "run" method, so a caller driving the actual
//! three-task session (not built by this crate) can interleave them with
//! job-queue draining and channel I/O as the concurrency model requires.
//! `core::orchestrator` is that caller: it drives the Generator thread of a
//! local session directly through [`generator::itemize_entry`] and
//! [`generator::send_itemize_info`] per entry, rather than through
//! [`jobs::JobQueue`]'s batch shape, since a local sync has one flat file
//! list to walk rather than segments arriving incrementally over the wire.
//!
//! # Design
//!
//! [`jobs::JobQueue`] is the batched FIFO spec §5 describes for the
//! incremental-recursion case, where segments arrive as stub directories
//! are expanded; this crate doesn't own the duplex channel's blocking-read
//! suspension points, so draining it is still a caller's job.
//! [`deferred::DeferredAttrQueue`] is the separate LIFO the same section
//! calls out, applied at the TRANSFER→TEAR_DOWN_1 transition in mode →
//! mtime → uid → gid order — `core::orchestrator` defers draining it until
//! every thread of a session has joined, so a directory's permissions are
//! never finalized before its contents have landed.
//! [`itemize::ItemizeFlags`] follows the same thin-newtype-over-an-int
//! style as [`protocol::CompatFlags`] rather than pulling in a bitflags
//! dependency.
//!
//! # Errors
//!
//! [`EngineError`] wraps the metadata, filter, file-list, transfer, and
//! signature failures a generator call can surface, so callers match one
//! error type per call rather than threading through each dependency's own.
//!
//! # Examples
//!
//! ```no_run
//! use std::collections::HashSet;
//! use std::path::Path;
//! use engine::delete::delete_extraneous;
//! use filters::{FilterList, FilterStack};
//! use metadata::posix::PosixBackend;
//!
//! let backend = PosixBackend::new();
//! let stack = FilterStack::new(FilterList::parse("", Path::new(".")).unwrap());
//! let removed = delete_extraneous(&backend, &stack, Path::new("/tmp/target"), &HashSet::new())?;
//! # Ok::<(), engine::EngineError>(())
//! ```

pub mod deferred;
pub mod delete;
pub mod error;
pub mod generator;
pub mod itemize;
pub mod jobs;

pub use deferred::{DeferredAttrQueue, DeferredAttrUpdate};
pub use delete::delete_extraneous;
pub use error::EngineError;
pub use generator::{ItemizeOutcome, itemize_entry, queue_directory_attrs, send_itemize_info};
pub use itemize::ItemizeFlags;
pub use jobs::{Job, JobQueue};
