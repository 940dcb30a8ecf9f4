#![deny(missing_docs)]

//! # Overview
//!
//! The file-attribute back-end (spec §6): user/group principals, POSIX
//! file-type classification, the [`FileAttributeBackend`] trait the transfer
//! core depends on, and [`posix::PosixBackend`], the default implementation.
//!
//! # Design
//!
//! The core never calls `std::fs` or `rustix` directly; it goes through
//! [`FileAttributeBackend`] so alternative backends (a dry-run backend, a
//! test double) can be substituted without touching transfer logic. Every
//! operation that can target a symlink takes a [`LinkOption`] so a caller
//! never accidentally follows one (spec §6: "for symlinks, operations must
//! not follow").
//!
//! # Errors
//!
//! [`MetadataError`] covers both OS failures and invalid principal data
//! (spec §7's `MetadataError`/`PrincipalError`).
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use metadata::{FileAttributeBackend, posix::PosixBackend};
//!
//! let backend = PosixBackend::new();
//! backend.create_directories(Path::new("/tmp/example/a/b"))?;
//! # Ok::<(), metadata::MetadataError>(())
//! ```

pub mod backend;
pub mod posix;
pub mod principal;

pub use backend::{DirEntry, FileAttributeBackend, LinkOption, MetadataError};
pub use principal::{FileType, Group, PrincipalError, RsyncFileAttributes, User, file_type};
