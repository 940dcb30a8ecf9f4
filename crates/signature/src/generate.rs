//! Computing the per-block checksum pairs for a signature (spec §4.6: "for
//! each block, `putInt(rolling_adler)` + `put(md5(block ‖ seed)[0..digestLength])`").

use std::io::Read;

use rsync_checksums::{RollingChecksum, strong::seeded_block_digest};

use crate::error::SignatureError;
use crate::layout::SignatureLayout;

/// One block's checksum pair: the rolling weak checksum and the truncated
/// seeded strong checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockChecksum {
    rolling: u32,
    strong: Vec<u8>,
}

impl BlockChecksum {
    /// Builds a checksum pair from values decoded off the wire, bypassing
    /// local computation entirely.
    #[must_use]
    pub fn from_wire(rolling: u32, strong: Vec<u8>) -> Self {
        Self { rolling, strong }
    }

    /// The rolling (weak) checksum.
    #[must_use]
    pub fn rolling(&self) -> u32 {
        self.rolling
    }

    /// The truncated strong checksum, `layout.digest_length()` bytes long.
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }
}

/// Reads `reader` to EOF and produces one [`BlockChecksum`] per
/// `layout.block_length()`-sized chunk (the final chunk may be shorter, per
/// `layout.remainder()`).
pub fn generate_file_signature(
    reader: &mut impl Read,
    layout: &SignatureLayout,
    checksum_seed: u32,
) -> Result<Vec<BlockChecksum>, SignatureError> {
    let block_length = layout.block_length().get() as usize;
    let digest_length = layout.digest_length() as usize;
    let mut blocks = Vec::with_capacity(layout.chunk_count() as usize);
    let mut buf = vec![0u8; block_length];

    loop {
        let mut filled = 0;
        while filled < block_length {
            let read = reader.read(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        if filled == 0 {
            break;
        }

        let chunk = &buf[..filled];
        let mut rolling = RollingChecksum::new();
        rolling.update(chunk);
        let full_digest = seeded_block_digest(chunk, checksum_seed);

        blocks.push(BlockChecksum {
            rolling: rolling.value(),
            strong: full_digest[..digest_length].to_vec(),
        });

        if filled < block_length {
            break;
        }
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{SignatureLayoutParams, calculate_signature_layout};
    use std::io::Cursor;
    use std::num::NonZeroU32;

    #[test]
    fn empty_input_yields_no_blocks() {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(0, None)).unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(Vec::new()), &layout, 0).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn single_short_block_matches_remainder() {
        let data = vec![7u8; 100];
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(NonZeroU32::new(512).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(data), &layout, 42).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].strong().len(), layout.digest_length() as usize);
    }

    #[test]
    fn multiple_full_blocks_are_emitted_in_order() {
        let data: Vec<u8> = (0..1024u32).map(|i| (i % 256) as u8).collect();
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(NonZeroU32::new(256).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(data), &layout, 0).unwrap();
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn different_seeds_change_the_strong_checksum() {
        let data = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(NonZeroU32::new(8).unwrap()),
        ))
        .unwrap();
        let a = generate_file_signature(&mut Cursor::new(data.clone()), &layout, 1).unwrap();
        let b = generate_file_signature(&mut Cursor::new(data), &layout, 2).unwrap();
        assert_ne!(a[0].strong(), b[0].strong());
    }
}
