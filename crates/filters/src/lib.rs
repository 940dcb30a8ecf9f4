#![deny(missing_docs)]

//! # Overview
//!
//! Filter rules and path matching (spec §4.4): parsing `-`/`+`/`P`/`R`/`H`/`S`
//! rules and `merge`/`dir-merge` directives, compiling rsync-style wildcard
//! patterns, and evaluating a path against the active chain of filter lists
//! while walking a tree.
//!
//! # Design
//!
//! [`rule::FilterRule`] compiles its pattern straight to a [`regex::Regex`]
//! rather than going through a generic gitignore-style glob crate, because
//! the wildcard-to-regex mapping rsync uses is its own
//! (`*` → `[^/].*`, not the usual `[^/]*`). [`list::FilterList`] parses one
//! filter file, splicing one-shot `merge`/`.` directives in immediately and
//! keeping `dir-merge`/`:` directives as markers; [`stack::FilterStack`]
//! is the thing a directory walk actually drives, pushing/popping a level
//! per `dir-merge` file found on the way down and evaluating the
//! first-match-wins chain (local list, then inheriting ancestors).
//!
//! # Errors
//!
//! [`FilterError`] covers unparseable rule syntax, invalid patterns, and
//! unreadable merge files.
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use filters::{FilterList, FilterStack};
//!
//! let root = FilterList::parse("+ important.log\n- *.log\n", Path::new(".")).unwrap();
//! let stack = FilterStack::new(root);
//! assert!(stack.is_excluded("debug.log", false));
//! assert!(!stack.is_excluded("important.log", false));
//! ```

pub mod error;
pub mod list;
pub mod rule;
pub mod stack;

pub use error::FilterError;
pub use list::{DirMergeSpec, FilterItem, FilterList};
pub use rule::{Decision, FilterRule, RuleGroup, RuleKind};
pub use stack::FilterStack;
