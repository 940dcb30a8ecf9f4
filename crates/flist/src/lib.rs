#![deny(missing_docs)]

//! # Overview
//!
//! The file-list protocol (spec §4.5): a segmented, globally-indexed map of
//! per-index [`FileInfo`], the custom total order both sides use to sort
//! entries within a segment, and the stub-directory queue that drives
//! incremental-recurse expansion.
//!
//! # Design
//!
//! [`FileInfo`] is a tagged sum (`Plain`, `Device`, `Symlink`) rather than a
//! trait-object hierarchy, per spec §9: every variant shares
//! [`entry::FileEntryData`], and the "does this entry resolve to a real
//! local path" distinction is carried as an `Option<PathBuf>` field rather
//! than a separate type. [`Filelist`] owns every live [`Segment`] and the
//! pending stub-directory queue; [`FileListBuilder`]/[`FileListWalker`] are
//! a convenience eager traversal of a real directory tree built on top of
//! [`metadata::FileAttributeBackend`], for callers that want one flattened,
//! sorted pass rather than driving expansion segment by segment.
//!
//! # Errors
//!
//! [`FileListError`] wraps the underlying [`metadata::MetadataError`] plus
//! the file-list-specific failure modes: unrepresentable paths and
//! stub-directory index misuse (out of range vs. already consumed — spec §9
//! calls out that upstream conflates the two; this implementation does not).
//!
//! # Examples
//!
//! ```no_run
//! use flist::FileListBuilder;
//!
//! let walker = FileListBuilder::new("/tmp/example").build()?;
//! for entry in walker {
//!     let entry = entry?;
//!     println!("{}", entry.relative_path().display());
//! }
//! # Ok::<(), flist::FileListError>(())
//! ```

pub mod compare;
pub mod entry;
pub mod error;
pub mod filelist;
pub mod segment;
pub mod walker;

pub use compare::{compare_entries, compare_name_bytes};
pub use entry::{FileEntryData, FileInfo};
pub use error::FileListError;
pub use filelist::Filelist;
pub use segment::Segment;
pub use walker::{FileListBuilder, FileListEntry, FileListWalker};
