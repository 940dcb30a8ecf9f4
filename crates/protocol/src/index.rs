//! Variable-width file-list index codec (spec §4.1, §8).
//!
//! Indices are delta-encoded against the previously emitted value in their
//! domain (non-negative indices against `prev_positive`, negative indices
//! against `prev_negative`'s magnitude), with an escape for jumps too large
//! to fit the compact forms.

use crate::error::ProtocolError;

/// Sentinel meaning "no more indices in this batch".
pub const DONE: i32 = -1;

/// Sentinel meaning "end of the file list" (recursive mode).
pub const EOF: i32 = -2;

/// Base used to address a stub directory: the wire value is
/// `-(OFFSET - dirIndex)`.
pub const OFFSET: i32 = -101;

const NEG_PREFIX: u8 = 0xFF;
const EXT_PREFIX: u8 = 0xFE;
const MAX_SHORT_DIFF: i32 = 0xFD;
const MAX_EXT_DIFF: i32 = 0x7FFF;

/// Streaming encode/decode state for one direction of the index codec.
///
/// Each side of the channel keeps one `IndexCodec` per direction (one for
/// encoding outbound indices, one for decoding inbound ones); the two
/// directions never share `prev_positive`/`prev_negative` state.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexCodec {
    prev_positive: i32,
    prev_negative: i32,
}

impl IndexCodec {
    /// Builds a codec with both domains starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value` and advances this codec's delta state.
    #[must_use]
    pub fn encode(&mut self, value: i32) -> Vec<u8> {
        if value == DONE {
            return vec![0];
        }
        if value >= 0 {
            encode_diff_form(value, &mut self.prev_positive)
        } else {
            let magnitude = value.checked_neg().expect("index magnitude overflow");
            let mut out = vec![NEG_PREFIX];
            out.extend(encode_diff_form(magnitude, &mut self.prev_negative));
            out
        }
    }

    /// Decodes one index from the front of `bytes`, returning the value and
    /// the number of bytes consumed.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<(i32, usize), ProtocolError> {
        let &lead = bytes
            .first()
            .ok_or_else(|| ProtocolError::InvalidIndex("empty input".to_string()))?;

        if lead == 0 {
            return Ok((DONE, 1));
        }
        if lead == NEG_PREFIX {
            let rest = &bytes[1..];
            let (magnitude, consumed) = decode_diff_form(rest, &mut self.prev_negative)?;
            return Ok((-magnitude, consumed + 1));
        }
        decode_diff_form(bytes, &mut self.prev_positive)
    }
}

fn encode_diff_form(value: i32, prev: &mut i32) -> Vec<u8> {
    let diff = value - *prev;
    *prev = value;

    if (1..=MAX_SHORT_DIFF).contains(&diff) {
        return vec![diff as u8];
    }
    if (0..=MAX_EXT_DIFF).contains(&diff) {
        return vec![EXT_PREFIX, (diff >> 8) as u8, diff as u8];
    }

    let raw = value as u32;
    vec![
        EXT_PREFIX,
        0x80 | ((raw >> 24) & 0x7F) as u8,
        (raw >> 16) as u8,
        (raw >> 8) as u8,
        raw as u8,
    ]
}

fn decode_diff_form(bytes: &[u8], prev: &mut i32) -> Result<(i32, usize), ProtocolError> {
    let &lead = bytes
        .first()
        .ok_or_else(|| ProtocolError::InvalidIndex("truncated index".to_string()))?;

    match lead {
        0 | NEG_PREFIX => Err(ProtocolError::InvalidIndex(format!(
            "unexpected lead byte {lead:#04x} in delta form"
        ))),
        EXT_PREFIX => {
            let &b1 = bytes
                .get(1)
                .ok_or_else(|| ProtocolError::InvalidIndex("truncated extended index".into()))?;
            if b1 & 0x80 != 0 {
                let tail = bytes
                    .get(2..5)
                    .ok_or_else(|| ProtocolError::InvalidIndex("truncated absolute index".into()))?;
                let raw = (u32::from(b1 & 0x7F) << 24)
                    | (u32::from(tail[0]) << 16)
                    | (u32::from(tail[1]) << 8)
                    | u32::from(tail[2]);
                let value = raw as i32;
                *prev = value;
                Ok((value, 5))
            } else {
                let &b2 = bytes
                    .get(2)
                    .ok_or_else(|| ProtocolError::InvalidIndex("truncated extended index".into()))?;
                let diff = (i32::from(b1) << 8) | i32::from(b2);
                let value = *prev + diff;
                *prev = value;
                Ok((value, 3))
            }
        }
        short => {
            let value = *prev + i32::from(short);
            *prev = value;
            Ok((value, 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn done_round_trips() {
        let mut enc = IndexCodec::new();
        let mut dec = IndexCodec::new();
        let bytes = enc.encode(DONE);
        assert_eq!(bytes, vec![0]);
        assert_eq!(dec.decode(&bytes).unwrap(), (DONE, 1));
    }

    #[test]
    fn small_positive_sequence_round_trips() {
        let mut enc = IndexCodec::new();
        let mut dec = IndexCodec::new();
        for value in 0..300i32 {
            let bytes = enc.encode(value);
            let (decoded, consumed) = dec.decode(&bytes).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn negative_offset_round_trips() {
        let mut enc = IndexCodec::new();
        let mut dec = IndexCodec::new();
        let stub = -(OFFSET - 42);
        let bytes = enc.encode(stub);
        assert_eq!(dec.decode(&bytes).unwrap().0, stub);
    }

    #[test]
    fn eof_round_trips() {
        let mut enc = IndexCodec::new();
        let mut dec = IndexCodec::new();
        let bytes = enc.encode(EOF);
        assert_eq!(dec.decode(&bytes).unwrap().0, EOF);
    }

    #[test]
    fn large_jump_uses_extended_form_and_round_trips() {
        let mut enc = IndexCodec::new();
        let mut dec = IndexCodec::new();
        let bytes = enc.encode(1_000_000);
        assert_eq!(dec.decode(&bytes).unwrap().0, 1_000_000);
    }

    #[test]
    fn out_of_order_values_fall_back_to_absolute_form() {
        let mut enc = IndexCodec::new();
        let mut dec = IndexCodec::new();

        let first = enc.encode(500_000);
        assert_eq!(dec.decode(&first).unwrap().0, 500_000);

        let second = enc.encode(10);
        assert_eq!(dec.decode(&second).unwrap().0, 10);
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_sequences(values in prop::collection::vec(-2_000_000i32..2_000_000i32, 0..64)) {
            let mut enc = IndexCodec::new();
            let mut dec = IndexCodec::new();
            for value in values {
                if value == DONE {
                    continue;
                }
                let bytes = enc.encode(value);
                let (decoded, consumed) = dec.decode(&bytes).unwrap();
                prop_assert_eq!(decoded, value);
                prop_assert_eq!(consumed, bytes.len());
            }
        }
    }
}
