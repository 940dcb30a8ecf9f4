//! Block-checksum header layout (spec §3 `Checksum.Header`, §4.6).

use std::num::NonZeroU32;

use crate::error::SignatureError;

/// Inputs to [`calculate_signature_layout`].
#[derive(Debug, Clone, Copy)]
pub struct SignatureLayoutParams {
    file_len: u64,
    forced_block_length: Option<NonZeroU32>,
}

impl SignatureLayoutParams {
    /// Builds layout parameters for a file of `file_len` bytes, optionally
    /// forcing a specific block length instead of deriving one.
    #[must_use]
    pub fn new(file_len: u64, forced_block_length: Option<NonZeroU32>) -> Self {
        Self {
            file_len,
            forced_block_length,
        }
    }
}

/// A computed `Checksum.Header` (spec §3): `blockLength ∈ [0, 2^17]`,
/// `digestLength ∈ [0, 16]`, `remainder ∈ [0, blockLength]`,
/// `chunkCount ≥ 0`, with `chunkCount = ceil(fileSize / blockLength)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureLayout {
    file_len: u64,
    block_length: NonZeroU32,
    digest_length: u8,
    remainder: u32,
    chunk_count: u64,
}

impl SignatureLayout {
    /// Length of the file this layout describes.
    #[must_use]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Length of each block, in bytes.
    #[must_use]
    pub fn block_length(&self) -> NonZeroU32 {
        self.block_length
    }

    /// Length of the truncated strong checksum per block, in bytes.
    #[must_use]
    pub fn digest_length(&self) -> u8 {
        self.digest_length
    }

    /// Bytes in the final, short block (0 if the file divides evenly).
    #[must_use]
    pub fn remainder(&self) -> u32 {
        self.remainder
    }

    /// Total number of blocks (`chunkCount`).
    #[must_use]
    pub fn chunk_count(&self) -> u64 {
        self.chunk_count
    }

    /// Number of blocks, as a plain integer (alias for [`Self::chunk_count`]
    /// used where a `usize` is more convenient than a protocol-shaped name).
    #[must_use]
    pub fn block_count(&self) -> u64 {
        self.chunk_count
    }

    /// Reconstructs a layout from the fields transmitted on the wire (spec
    /// §3 `Checksum.Header`), for the peer that receives a signature rather
    /// than computing one: the sender doesn't know (and must not guess) the
    /// replica's size or block-sizing heuristic, only what was sent.
    #[must_use]
    pub fn from_wire(block_length: NonZeroU32, digest_length: u8, remainder: u32, chunk_count: u64) -> Self {
        let file_len = if chunk_count == 0 {
            0
        } else if remainder > 0 {
            (chunk_count - 1) * u64::from(block_length.get()) + u64::from(remainder)
        } else {
            chunk_count * u64::from(block_length.get())
        };
        Self {
            file_len,
            block_length,
            digest_length,
            remainder,
            chunk_count,
        }
    }
}

const MIN_BLOCK_LENGTH: u64 = 512;

/// Derives the block-checksum header for a file of `params.file_len` bytes
/// (spec §4.6):
///
/// `blockLength = max(512, pow2_sqrt(size))`, `digestLength =
/// clamp(⌈(10 + 2·log2(size) − log2(blockLength) − 24)/8⌉, 2, 16)`,
/// `remainder = size mod blockLength`, `chunkCount = ceil(size/blockLength)`.
pub fn calculate_signature_layout(params: SignatureLayoutParams) -> Result<SignatureLayout, SignatureError> {
    let block_length = match params.forced_block_length {
        Some(forced) => forced,
        None => default_block_length(params.file_len),
    };

    let digest_length = derive_digest_length(params.file_len, block_length.get());
    let block_length_u64 = u64::from(block_length.get());

    let remainder = if params.file_len == 0 {
        0
    } else {
        (params.file_len % block_length_u64) as u32
    };

    let chunk_count = params.file_len.div_ceil(block_length_u64);

    Ok(SignatureLayout {
        file_len: params.file_len,
        block_length,
        digest_length,
        remainder,
        chunk_count,
    })
}

/// `pow2_sqrt(size)`: the largest power of two `<= sqrt(size)`, floored at
/// [`MIN_BLOCK_LENGTH`] (spec §8: "`pow2SquareRoot(n)` returns the largest
/// power of two ≤ √n" — rounding up here would inflate the derived digest
/// length and chunk count and break wire-compatibility with real rsync
/// peers).
fn default_block_length(size: u64) -> NonZeroU32 {
    let sqrt = integer_sqrt_floor(size);
    let pow2 = if sqrt == 0 { 1 } else { largest_power_of_two_not_exceeding(sqrt) };
    let bounded = pow2.max(MIN_BLOCK_LENGTH).min(u64::from(u32::MAX));
    NonZeroU32::new(bounded as u32).unwrap_or_else(|| NonZeroU32::new(MIN_BLOCK_LENGTH as u32).unwrap())
}

/// Integer square root, rounded down, computed via `f64::sqrt` plus a
/// correction step to guard against floating-point rounding near perfect
/// squares.
fn integer_sqrt_floor(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut r = (n as f64).sqrt() as u64;
    while r > 0 && r * r > n {
        r -= 1;
    }
    while (r + 1).saturating_mul(r + 1) <= n {
        r += 1;
    }
    r
}

/// The largest power of two `<= n`, for `n >= 1`.
fn largest_power_of_two_not_exceeding(n: u64) -> u64 {
    1u64 << (63 - n.leading_zeros())
}

fn derive_digest_length(size: u64, block_length: u32) -> u8 {
    if size == 0 {
        return 2;
    }
    let log2_size = (size as f64).log2();
    let log2_block = f64::from(block_length.max(1)).log2();
    let raw = (10.0 + 2.0 * log2_size - log2_block - 24.0) / 8.0;
    raw.ceil().clamp(2.0, 16.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(file_len: u64) -> SignatureLayout {
        calculate_signature_layout(SignatureLayoutParams::new(file_len, None)).unwrap()
    }

    #[test]
    fn empty_file_has_zero_remainder_and_minimum_digest() {
        let layout = layout(0);
        assert_eq!(layout.remainder(), 0);
        assert_eq!(layout.digest_length(), 2);
        assert_eq!(layout.chunk_count(), 0);
    }

    #[test]
    fn block_length_never_drops_below_the_floor() {
        for size in [1u64, 10, 100, 511] {
            assert_eq!(layout(size).block_length().get(), 512);
        }
    }

    #[test]
    fn block_length_is_always_a_power_of_two() {
        for size in [513u64, 10_000, 1_048_576, 50_000_000] {
            let length = layout(size).block_length().get();
            assert!(length.is_power_of_two(), "{length} is not a power of two for size {size}");
        }
    }

    #[test]
    fn chunk_count_matches_ceil_division() {
        let layout = layout(10_000);
        let expected = (10_000u64).div_ceil(u64::from(layout.block_length().get()));
        assert_eq!(layout.chunk_count(), expected);
    }

    #[test]
    fn remainder_is_always_within_block_length() {
        for size in [1u64, 500, 512, 513, 100_000, 1_048_577] {
            let layout = layout(size);
            assert!(layout.remainder() < layout.block_length().get());
        }
    }

    #[test]
    fn digest_length_is_clamped_to_valid_range() {
        for size in [1u64, 512, 1_000_000, u32::MAX as u64] {
            let digest_length = layout(size).digest_length();
            assert!((2..=16).contains(&digest_length));
        }
    }

    #[test]
    fn block_length_rounds_the_square_root_down_not_up() {
        // sqrt(2_000_000) ~= 1414.21; the largest power of two <= 1414 is
        // 1024, not 2048 (which is what rounding the square root up to the
        // next power of two would give).
        assert_eq!(layout(2_000_000).block_length().get(), 1024);
    }

    #[test]
    fn forced_block_length_overrides_the_heuristic() {
        let forced = NonZeroU32::new(4096).unwrap();
        let layout = calculate_signature_layout(SignatureLayoutParams::new(1_000_000, Some(forced))).unwrap();
        assert_eq!(layout.block_length(), forced);
    }
}
