//! Sender-side delta generation against a peer's block signature (spec §4.7
//! "Matching algorithm").

use rsync_checksums::strong::{Md5, StrongDigest, seeded_block_digest};
use rsync_checksums::RollingChecksum;
use signature::SignatureLayout;

use crate::index::ChecksumIndex;

/// Maximum number of bytes carried by a single literal token (spec §4.7
/// "Literal chunking: max 8192 bytes per literal frame").
pub const MAX_LITERAL_LEN: usize = 8192;

/// One step of the delta stream: either literal bytes not found in the
/// peer's signature, or a reference to one of the peer's existing blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaToken {
    /// Bytes the peer does not already have, to be sent verbatim.
    Literal(Vec<u8>),
    /// A block index into the peer's signature that reproduces this span of
    /// the source file unchanged.
    Match(u64),
}

/// The full output of matching a source file against a peer's signature: the
/// ordered literal/match tokens plus the whole-file MD5 of the source (spec
/// §4.7 step 4, computed "without the seed").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    tokens: Vec<DeltaToken>,
    file_checksum: [u8; 16],
}

impl Delta {
    /// Builds a delta from tokens and a whole-file checksum already decoded
    /// off the wire, for callers that stream a delta in rather than
    /// computing one with [`generate_delta`].
    #[must_use]
    pub fn new(tokens: Vec<DeltaToken>, file_checksum: [u8; 16]) -> Self {
        Self { tokens, file_checksum }
    }

    /// The ordered literal/match tokens.
    #[must_use]
    pub fn tokens(&self) -> &[DeltaToken] {
        &self.tokens
    }

    /// The whole-file MD5 of the source data this delta was generated from.
    #[must_use]
    pub fn file_checksum(&self) -> [u8; 16] {
        self.file_checksum
    }
}

/// Matches `source` against the peer's `index` (built over `layout`) and
/// produces the literal/match token stream plus whole-file checksum.
///
/// `source` is matched as a single contiguous view, mirroring the file view
/// the sender holds over the whole source file (spec §4.7 step 2).
#[must_use]
pub fn generate_delta(source: &[u8], layout: &SignatureLayout, index: &ChecksumIndex, checksum_seed: u32) -> Delta {
    let n = source.len();
    let block_length = layout.block_length().get() as usize;
    let remainder = layout.remainder() as usize;
    let digest_length = layout.digest_length() as usize;
    let smallest_chunk = if remainder > 0 { remainder } else { block_length };

    let mut tokens = Vec::new();
    let mut whole_md5 = Md5::new();
    let mut literal_start = 0usize;
    let mut cursor = 0usize;

    if n > 0 && block_length > 0 && !index.is_empty() {
        let mut window_len = block_length.min(n);
        let mut rolling = RollingChecksum::new();
        rolling.update(&source[cursor..cursor + window_len]);

        loop {
            if window_len >= smallest_chunk {
                let window = &source[cursor..cursor + window_len];
                let strong = seeded_block_digest(window, checksum_seed);
                if let Some(block_index) = index.find_match(rolling.value(), window_len as u32, &strong[..digest_length]) {
                    let matched_end = cursor + window_len;
                    whole_md5.update(&source[literal_start..matched_end]);
                    flush_literal(&mut tokens, &source[literal_start..cursor]);
                    tokens.push(DeltaToken::Match(block_index));

                    cursor = matched_end;
                    literal_start = cursor;
                    if cursor >= n {
                        break;
                    }
                    window_len = block_length.min(n - cursor);
                    rolling.reset();
                    rolling.update(&source[cursor..cursor + window_len]);
                    continue;
                }
            }

            if cursor + window_len >= n {
                break;
            }
            let outgoing = source[cursor];
            let incoming = source[cursor + window_len];
            rolling.roll(outgoing, incoming).expect("single-byte roll never fails on a non-empty window");
            cursor += 1;
        }
    }

    whole_md5.update(&source[literal_start..n]);
    flush_literal(&mut tokens, &source[literal_start..n]);

    Delta {
        tokens,
        file_checksum: whole_md5.finalize(),
    }
}

/// Splits `bytes` into [`MAX_LITERAL_LEN`]-sized [`DeltaToken::Literal`]
/// tokens, emitting nothing for an empty span.
fn flush_literal(tokens: &mut Vec<DeltaToken>, bytes: &[u8]) {
    for chunk in bytes.chunks(MAX_LITERAL_LEN) {
        tokens.push(DeltaToken::Literal(chunk.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChecksumIndex;
    use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
    use std::io::Cursor;
    use std::num::NonZeroU32;

    fn index_for(data: &[u8], seed: u32, block_length: u32) -> (SignatureLayout, ChecksumIndex) {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(NonZeroU32::new(block_length).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(data.to_vec()), &layout, seed).unwrap();
        (layout, ChecksumIndex::build(&blocks, &layout))
    }

    #[test]
    fn identical_files_produce_pure_match_stream() {
        let data = vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let (layout, index) = index_for(&data, 99, 4);
        let delta = generate_delta(&data, &layout, &index, 99);
        assert!(delta.tokens().iter().all(|t| matches!(t, DeltaToken::Match(_))));
        assert_eq!(delta.tokens().len(), 4);
    }

    #[test]
    fn appended_tail_becomes_trailing_literal() {
        let original = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let (layout, index) = index_for(&original, 5, 4);
        let mut modified = original.clone();
        modified.extend_from_slice(b"NEW");
        let delta = generate_delta(&modified, &layout, &index, 5);
        assert!(matches!(delta.tokens().last(), Some(DeltaToken::Literal(bytes)) if bytes == b"NEW"));
    }

    #[test]
    fn inserted_prefix_is_emitted_as_literal_before_the_match() {
        let original = vec![9u8; 16];
        let (layout, index) = index_for(&original, 1, 8);
        let mut modified = b"XYZ".to_vec();
        modified.extend_from_slice(&original);
        let delta = generate_delta(&modified, &layout, &index, 1);
        assert!(matches!(&delta.tokens()[0], DeltaToken::Literal(bytes) if bytes == b"XYZ"));
        assert!(delta.tokens()[1..].iter().any(|t| matches!(t, DeltaToken::Match(_))));
    }

    #[test]
    fn completely_different_content_is_all_literal() {
        let original = vec![0u8; 32];
        let (layout, index) = index_for(&original, 3, 8);
        let modified = vec![0xFFu8; 32];
        let delta = generate_delta(&modified, &layout, &index, 3);
        assert!(delta.tokens().iter().all(|t| matches!(t, DeltaToken::Literal(_))));
    }

    #[test]
    fn whole_file_checksum_matches_plain_md5_of_source() {
        let data = b"some file contents to checksum".to_vec();
        let (layout, index) = index_for(&data, 0, 8);
        let delta = generate_delta(&data, &layout, &index, 0);
        let expected = Md5::digest(&data);
        assert_eq!(delta.file_checksum(), expected);
    }

    #[test]
    fn empty_source_yields_no_tokens() {
        let (layout, index) = index_for(&[], 0, 512);
        let delta = generate_delta(&[], &layout, &index, 0);
        assert!(delta.tokens().is_empty());
    }

    #[test]
    fn literal_runs_longer_than_max_are_split_into_chunks() {
        let original = vec![7u8; 512];
        let (layout, index) = index_for(&original, 0, 512);
        let mut modified = vec![1u8; MAX_LITERAL_LEN + 10];
        modified.extend_from_slice(&original);
        let delta = generate_delta(&modified, &layout, &index, 0);
        let literal_lens: Vec<usize> = delta
            .tokens()
            .iter()
            .take_while(|t| matches!(t, DeltaToken::Literal(_)))
            .map(|t| match t {
                DeltaToken::Literal(bytes) => bytes.len(),
                DeltaToken::Match(_) => unreachable!(),
            })
            .collect();
        assert!(literal_lens.iter().all(|&len| len <= MAX_LITERAL_LEN));
        assert_eq!(literal_lens.iter().sum::<usize>(), MAX_LITERAL_LEN + 10);
    }
}
