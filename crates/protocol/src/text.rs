//! Strict text codec for path names and protocol text (spec §6, §8).
//!
//! The codec contract requires round-tripping the ASCII bytes the protocol
//! treats as structurally significant (`/`, `.`, NUL, CR, LF); a codec that
//! cannot is rejected at construction rather than failing unpredictably
//! later on arbitrary path bytes.

use crate::error::ProtocolError;

/// Bytes the wire format treats as structurally significant and that any
/// codec must round-trip unchanged.
const SENTINEL_BYTES: &[u8] = &[b'/', b'.', 0x00, b'\r', b'\n'];

/// A character-set codec used to decode peer-supplied text (path names, log
/// lines, module listings) into Rust strings and back.
pub trait TextCodec: std::fmt::Debug + Send + Sync {
    /// Encodes `text` to wire bytes.
    fn encode(&self, text: &str) -> Result<Vec<u8>, ProtocolError>;

    /// Decodes wire `bytes` into text, failing rather than losing data.
    fn decode(&self, bytes: &[u8]) -> Result<String, ProtocolError>;
}

/// The default codec: strict UTF-8, matching spec §6's "default to UTF-8
/// when the codec is configurable".
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictUtf8Codec;

impl StrictUtf8Codec {
    /// Builds the codec, rejecting it (in principle) if it fails to
    /// round-trip the protocol's structurally significant bytes.
    pub fn new() -> Result<Self, ProtocolError> {
        let codec = Self;
        codec.check_round_trip()?;
        Ok(codec)
    }

    fn check_round_trip(&self) -> Result<(), ProtocolError> {
        let text = std::str::from_utf8(SENTINEL_BYTES).expect("ASCII is valid UTF-8");
        let encoded = self.encode(text)?;
        if encoded != SENTINEL_BYTES {
            return Err(ProtocolError::UndecodableText(
                "sentinel bytes do not round-trip through this codec".to_string(),
            ));
        }
        Ok(())
    }
}

impl TextCodec for StrictUtf8Codec {
    fn encode(&self, text: &str) -> Result<Vec<u8>, ProtocolError> {
        Ok(text.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, ProtocolError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| ProtocolError::UndecodableText(e.to_string()))
    }
}
