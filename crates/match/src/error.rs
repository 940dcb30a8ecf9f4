//! Errors raised while generating or applying a delta.

/// Errors produced by [`crate::generate_delta`] or [`crate::apply_delta`].
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// A match token referenced a block index past the end of the replica's
    /// signature.
    #[error("match token referenced block {index}, but the replica only has {block_count} blocks")]
    BlockIndexOutOfRange {
        /// The out-of-range block index carried by the token.
        index: u64,
        /// Number of blocks the replica's signature actually covers.
        block_count: u64,
    },
    /// The whole-file MD5 computed while replaying the delta did not match
    /// the checksum the sender attached to it.
    #[error("reconstructed file checksum does not match the expected whole-file digest")]
    ChecksumMismatch,
}
