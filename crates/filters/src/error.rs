//! Errors raised while parsing filter rules.

/// Errors produced when parsing a filter rule or merge directive.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The rule's leading token did not name a recognized kind or merge
    /// directive.
    #[error("unrecognized filter rule {0:?}")]
    UnrecognizedRule(String),
    /// A rule or merge directive had no pattern/path argument.
    #[error("filter rule {0:?} is missing its pattern")]
    MissingPattern(String),
    /// The pattern compiled to an invalid regular expression.
    #[error("invalid filter pattern {0:?}: {1}")]
    InvalidPattern(String, regex::Error),
    /// A `merge`/`.` directive's file could not be read.
    #[error("could not read merge file {path}: {source}")]
    MergeFileUnreadable {
        /// Path of the merge file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
