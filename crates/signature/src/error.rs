//! Errors raised while computing a signature layout or block checksums.

/// Errors produced by signature layout computation or generation.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// An explicitly forced block length was zero.
    #[error("forced block length must be non-zero")]
    ZeroBlockLength,
    /// Reading the source data failed.
    #[error("failed to read source data: {0}")]
    Io(#[from] std::io::Error),
}
