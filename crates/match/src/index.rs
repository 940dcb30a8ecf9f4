//! A rolling-checksum-keyed multimap over a block signature (spec §4.7 step
//! 1: "build a multimap keyed by rolling").

use rustc_hash::FxHashMap;
use signature::{BlockChecksum, SignatureLayout};

/// One indexed block: its expected length and truncated strong checksum,
/// carried alongside the rolling value used as the map key.
#[derive(Debug, Clone)]
struct IndexedBlock {
    index: u64,
    length: u32,
    strong: Vec<u8>,
}

/// A multimap from rolling checksum value to the blocks that produced it,
/// built once per file from the peer's signature and then probed once per
/// byte position while sliding the matching window.
///
/// Collisions on the rolling value are expected and cheap: upstream rsync's
/// 32-bit weak checksum collides often enough on real data that every lookup
/// must be prepared to walk a short chain and fall back to the strong
/// checksum.
#[derive(Debug, Clone, Default)]
pub struct ChecksumIndex {
    by_rolling: FxHashMap<u32, Vec<IndexedBlock>>,
}

impl ChecksumIndex {
    /// Builds an index over `blocks`, a signature produced for `layout`.
    ///
    /// Every block but the last is assumed to be `layout.block_length()`
    /// bytes long; the last is `layout.remainder()` bytes long when the
    /// remainder is non-zero.
    #[must_use]
    pub fn build(blocks: &[BlockChecksum], layout: &SignatureLayout) -> Self {
        let block_length = layout.block_length().get();
        let remainder = layout.remainder();
        let last = blocks.len().wrapping_sub(1);

        let mut by_rolling: FxHashMap<u32, Vec<IndexedBlock>> = FxHashMap::default();
        for (i, block) in blocks.iter().enumerate() {
            let length = if i == last && remainder > 0 { remainder } else { block_length };
            by_rolling.entry(block.rolling()).or_default().push(IndexedBlock {
                index: i as u64,
                length,
                strong: block.strong().to_vec(),
            });
        }

        Self { by_rolling }
    }

    /// Looks up the block index matching a rolling value, window length, and
    /// seeded strong digest, verifying the strong checksum before reporting a
    /// match so rolling-value collisions never produce a false positive.
    #[must_use]
    pub(crate) fn find_match(&self, rolling: u32, window_len: u32, strong_digest: &[u8]) -> Option<u64> {
        let candidates = self.by_rolling.get(&rolling)?;
        candidates
            .iter()
            .find(|candidate| candidate.length == window_len && candidate.strong == strong_digest)
            .map(|candidate| candidate.index)
    }

    /// Whether the index has no blocks at all (e.g. the peer's file was empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_rolling.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
    use std::io::Cursor;

    #[test]
    fn finds_exact_block_by_rolling_and_strong() {
        let data = b"0123456789abcdef".to_vec();
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(std::num::NonZeroU32::new(8).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(data.clone()), &layout, 7).unwrap();
        let index = ChecksumIndex::build(&blocks, &layout);

        let window = &data[8..16];
        let mut rolling = rsync_checksums::RollingChecksum::new();
        rolling.update(window);
        let strong = rsync_checksums::strong::seeded_block_digest(window, 7);

        let found = index.find_match(rolling.value(), 8, &strong[..layout.digest_length() as usize]);
        assert_eq!(found, Some(1));
    }

    #[test]
    fn rejects_rolling_collision_without_strong_match() {
        let data = b"0123456789abcdef".to_vec();
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(std::num::NonZeroU32::new(8).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(data), &layout, 7).unwrap();
        let index = ChecksumIndex::build(&blocks, &layout);

        let bogus_strong = vec![0u8; layout.digest_length() as usize];
        let found = index.find_match(blocks[0].rolling(), 8, &bogus_strong);
        assert_eq!(found, None);
    }

    #[test]
    fn empty_signature_yields_empty_index() {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(0, None)).unwrap();
        let index = ChecksumIndex::build(&[], &layout);
        assert!(index.is_empty());
    }
}
