//! Receiver-side delta application (spec §4.8 "Merge"): replaying a
//! [`Delta`] against the replica it was computed from to reconstruct the
//! sender's file.

use rsync_checksums::strong::{Md5, StrongDigest};

use crate::delta::{Delta, DeltaToken};
use crate::error::MatchError;

/// Replays `delta` against `replica` (the receiver's existing copy of the
/// file, or an empty slice when there is none) and returns the reconstructed
/// file contents.
///
/// Verifies the running MD5 against [`Delta::file_checksum`] before
/// returning, so a corrupted transfer is caught here rather than silently
/// accepted.
pub fn apply_delta(replica: &[u8], delta: &Delta, block_length: u32) -> Result<Vec<u8>, MatchError> {
    let block_length = block_length as u64;
    let block_count = if block_length == 0 {
        0
    } else {
        replica.len() as u64 / block_length + u64::from(replica.len() as u64 % block_length != 0)
    };

    let mut output = Vec::new();
    let mut running_md5 = Md5::new();

    for token in delta.tokens() {
        match token {
            DeltaToken::Literal(bytes) => {
                output.extend_from_slice(bytes);
                running_md5.update(bytes);
            }
            DeltaToken::Match(index) => {
                if *index >= block_count {
                    return Err(MatchError::BlockIndexOutOfRange {
                        index: *index,
                        block_count,
                    });
                }
                let start = (*index * block_length) as usize;
                let end = (start as u64 + block_length).min(replica.len() as u64) as usize;
                let block = &replica[start..end];
                output.extend_from_slice(block);
                running_md5.update(block);
            }
        }
    }

    if running_md5.finalize() != delta.file_checksum() {
        return Err(MatchError::ChecksumMismatch);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChecksumIndex;
    use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
    use std::io::Cursor;
    use std::num::NonZeroU32;

    fn round_trip(replica: &[u8], source: &[u8], block_length: u32) -> Vec<u8> {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            replica.len() as u64,
            Some(NonZeroU32::new(block_length).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(replica.to_vec()), &layout, 0).unwrap();
        let index = ChecksumIndex::build(&blocks, &layout);
        let delta = crate::delta::generate_delta(source, &layout, &index, 0);
        apply_delta(replica, &delta, layout.block_length().get()).unwrap()
    }

    #[test]
    fn reconstructs_identical_file_purely_from_matches() {
        let data = vec![42u8; 64];
        let reconstructed = round_trip(&data, &data, 16);
        assert_eq!(reconstructed, data);
    }

    #[test]
    fn reconstructs_file_with_appended_literal_tail() {
        let replica = vec![1u8; 32];
        let mut source = replica.clone();
        source.extend_from_slice(b"tail");
        let reconstructed = round_trip(&replica, &source, 8);
        assert_eq!(reconstructed, source);
    }

    #[test]
    fn reconstructs_completely_rewritten_file() {
        let replica = vec![0u8; 16];
        let source = b"a completely different body".to_vec();
        let reconstructed = round_trip(&replica, &source, 8);
        assert_eq!(reconstructed, source);
    }

    #[test]
    fn out_of_range_match_token_is_rejected() {
        let delta = Delta::new(vec![DeltaToken::Match(99)], [0u8; 16]);
        let err = apply_delta(&[1, 2, 3], &delta, 8).unwrap_err();
        assert!(matches!(err, MatchError::BlockIndexOutOfRange { index: 99, .. }));
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let delta = Delta::new(vec![DeltaToken::Literal(b"abc".to_vec())], [0xAAu8; 16]);
        let err = apply_delta(&[], &delta, 8).unwrap_err();
        assert!(matches!(err, MatchError::ChecksumMismatch));
    }
}
