//! Multiplexed message framing (spec §4.1): `tag(1)=MPLEX_BASE+category |
//! length(3, little-endian) | payload`, packed here as a single little-endian
//! `u32` header followed by the payload bytes.

use std::convert::TryFrom;
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Number of header bytes preceding every multiplexed frame's payload.
pub const HEADER_LEN: usize = 4;

/// Base tag value; a frame's wire tag is `MPLEX_BASE + category`.
pub const MPLEX_BASE: u8 = 7;

/// Largest payload length a 3-byte length field can represent.
pub const MAX_PAYLOAD_LENGTH: u32 = 0x00FF_FFFF;

/// Mask isolating the 24-bit payload length from a packed header word.
pub const PAYLOAD_MASK: u32 = MAX_PAYLOAD_LENGTH;

/// Errors raised while encoding or decoding a [`MessageHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The header's top byte was below [`MPLEX_BASE`].
    #[error("invalid multiplexed tag byte: {0}")]
    InvalidTag(u8),
    /// The header's category byte did not match any [`MessageCode`].
    #[error("unknown multiplexed message code: {0}")]
    UnknownMessageCode(u8),
    /// Fewer than [`HEADER_LEN`] bytes were available to decode a header.
    #[error("truncated multiplexed header: got {actual} bytes, need {HEADER_LEN}")]
    TruncatedHeader {
        /// Bytes actually available.
        actual: usize,
    },
    /// A payload length exceeded [`MAX_PAYLOAD_LENGTH`].
    #[error("multiplexed payload length {0} exceeds the 24-bit limit")]
    OversizedPayload(u32),
}

/// Category of a multiplexed message (spec §4.1's "tag... category byte").
///
/// Values mirror the wire constants used by the rsync protocol family so a
/// captured session can be decoded without a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCode {
    /// Raw transfer byte-stream.
    Data,
    /// Per-file transfer error, textual.
    ErrorXfer,
    /// Informational text.
    Info,
    /// Fatal error, textual.
    Error,
    /// Non-fatal warning, textual.
    Warning,
    /// Socket-level error, textual.
    ErrorSocket,
    /// Arbitrary log text.
    Log,
    /// Client-originated text (daemon mode).
    Client,
    /// UTF-8 conversion error, textual.
    ErrorUtf8,
    /// Request the generator to redo a file.
    Redo,
    /// End-of-session statistics payload.
    Stats,
    /// Per-file I/O error mask (spec §7 `IoError`); also disables deletion.
    IoError,
    /// I/O operation timed out.
    IoTimeout,
    /// No-op keepalive.
    NoOp,
    /// Fatal error causing session exit.
    ErrorExit,
    /// Generic success acknowledgement.
    Success,
    /// Acknowledges a file was deleted.
    Deleted,
    /// Purge request for an index (spec §4.1 `NO_SEND`).
    NoSend,
}

impl MessageCode {
    const ALL: [MessageCode; 18] = [
        MessageCode::Data,
        MessageCode::ErrorXfer,
        MessageCode::Info,
        MessageCode::Error,
        MessageCode::Warning,
        MessageCode::ErrorSocket,
        MessageCode::Log,
        MessageCode::Client,
        MessageCode::ErrorUtf8,
        MessageCode::Redo,
        MessageCode::Stats,
        MessageCode::IoError,
        MessageCode::IoTimeout,
        MessageCode::NoOp,
        MessageCode::ErrorExit,
        MessageCode::Success,
        MessageCode::Deleted,
        MessageCode::NoSend,
    ];

    /// Alias kept for upstream naming symmetry: `MSG_FLUSH` is `MSG_INFO`.
    pub const FLUSH: MessageCode = MessageCode::Info;

    /// Returns every known message code, ascending by wire value.
    #[must_use]
    pub const fn all() -> &'static [MessageCode] {
        &Self::ALL
    }

    /// Returns the raw wire byte for this code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            MessageCode::Data => 0,
            MessageCode::ErrorXfer => 1,
            MessageCode::Info => 2,
            MessageCode::Error => 3,
            MessageCode::Warning => 4,
            MessageCode::ErrorSocket => 5,
            MessageCode::Log => 6,
            MessageCode::Client => 7,
            MessageCode::ErrorUtf8 => 8,
            MessageCode::Redo => 9,
            MessageCode::Stats => 10,
            MessageCode::IoError => 22,
            MessageCode::IoTimeout => 33,
            MessageCode::NoOp => 42,
            MessageCode::ErrorExit => 86,
            MessageCode::Success => 100,
            MessageCode::Deleted => 101,
            MessageCode::NoSend => 102,
        }
    }

    /// Looks up a code by its raw wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MessageCode::Data),
            1 => Some(MessageCode::ErrorXfer),
            2 => Some(MessageCode::Info),
            3 => Some(MessageCode::Error),
            4 => Some(MessageCode::Warning),
            5 => Some(MessageCode::ErrorSocket),
            6 => Some(MessageCode::Log),
            7 => Some(MessageCode::Client),
            8 => Some(MessageCode::ErrorUtf8),
            9 => Some(MessageCode::Redo),
            10 => Some(MessageCode::Stats),
            22 => Some(MessageCode::IoError),
            33 => Some(MessageCode::IoTimeout),
            42 => Some(MessageCode::NoOp),
            86 => Some(MessageCode::ErrorExit),
            100 => Some(MessageCode::Success),
            101 => Some(MessageCode::Deleted),
            102 => Some(MessageCode::NoSend),
            _ => None,
        }
    }

    /// Returns the upstream `MSG_*` identifier for this code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MessageCode::Data => "MSG_DATA",
            MessageCode::ErrorXfer => "MSG_ERROR_XFER",
            MessageCode::Info => "MSG_INFO",
            MessageCode::Error => "MSG_ERROR",
            MessageCode::Warning => "MSG_WARNING",
            MessageCode::ErrorSocket => "MSG_ERROR_SOCKET",
            MessageCode::Log => "MSG_LOG",
            MessageCode::Client => "MSG_CLIENT",
            MessageCode::ErrorUtf8 => "MSG_ERROR_UTF8",
            MessageCode::Redo => "MSG_REDO",
            MessageCode::Stats => "MSG_STATS",
            MessageCode::IoError => "MSG_IO_ERROR",
            MessageCode::IoTimeout => "MSG_IO_TIMEOUT",
            MessageCode::NoOp => "MSG_NOOP",
            MessageCode::ErrorExit => "MSG_ERROR_EXIT",
            MessageCode::Success => "MSG_SUCCESS",
            MessageCode::Deleted => "MSG_DELETED",
            MessageCode::NoSend => "MSG_NO_SEND",
        }
    }

    /// Whether this code carries human-readable text destined for the
    /// session's message log rather than transfer control data.
    #[must_use]
    pub const fn is_logging(self) -> bool {
        matches!(
            self,
            MessageCode::ErrorXfer
                | MessageCode::Info
                | MessageCode::Error
                | MessageCode::Warning
                | MessageCode::ErrorSocket
                | MessageCode::ErrorUtf8
                | MessageCode::Log
                | MessageCode::Client
        )
    }
}

impl From<MessageCode> for u8 {
    fn from(code: MessageCode) -> Self {
        code.as_u8()
    }
}

impl TryFrom<u8> for MessageCode {
    type Error = EnvelopeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(EnvelopeError::UnknownMessageCode(value))
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing a [`MessageCode`] name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown multiplexed message code name: {0:?}")]
pub struct MessageCodeParseError(String);

impl MessageCodeParseError {
    /// Returns the name that failed to parse.
    #[must_use]
    pub fn invalid_name(&self) -> &str {
        &self.0
    }
}

impl FromStr for MessageCode {
    type Err = MessageCodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "MSG_FLUSH" {
            return Ok(MessageCode::Info);
        }
        Self::all()
            .iter()
            .copied()
            .find(|code| code.name() == s)
            .ok_or_else(|| MessageCodeParseError(s.to_string()))
    }
}

/// Category used by the textual log-message path, mirroring [`MessageCode`]'s
/// numbering for the subset of codes that originate from the logging layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCode {
    /// No category (placeholder / unset).
    None,
    /// Per-file transfer error.
    ErrorXfer,
    /// Informational text.
    Info,
    /// Fatal error.
    Error,
    /// Non-fatal warning.
    Warning,
    /// Socket-level error.
    ErrorSocket,
    /// Arbitrary log text.
    Log,
    /// Client-originated text.
    Client,
    /// UTF-8 conversion error.
    ErrorUtf8,
}

impl LogCode {
    const ALL: [LogCode; 9] = [
        LogCode::None,
        LogCode::ErrorXfer,
        LogCode::Info,
        LogCode::Error,
        LogCode::Warning,
        LogCode::ErrorSocket,
        LogCode::Log,
        LogCode::Client,
        LogCode::ErrorUtf8,
    ];

    /// Returns every known log code, ascending by wire value.
    #[must_use]
    pub const fn all() -> &'static [LogCode] {
        &Self::ALL
    }

    /// Returns the raw wire byte for this code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            LogCode::None => 0,
            LogCode::ErrorXfer => 1,
            LogCode::Info => 2,
            LogCode::Error => 3,
            LogCode::Warning => 4,
            LogCode::ErrorSocket => 5,
            LogCode::Log => 6,
            LogCode::Client => 7,
            LogCode::ErrorUtf8 => 8,
        }
    }

    /// Looks up a code by its raw wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogCode::None),
            1 => Some(LogCode::ErrorXfer),
            2 => Some(LogCode::Info),
            3 => Some(LogCode::Error),
            4 => Some(LogCode::Warning),
            5 => Some(LogCode::ErrorSocket),
            6 => Some(LogCode::Log),
            7 => Some(LogCode::Client),
            8 => Some(LogCode::ErrorUtf8),
            _ => None,
        }
    }

    /// Returns the upstream `F*` identifier for this code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LogCode::None => "FNONE",
            LogCode::ErrorXfer => "FERROR_XFER",
            LogCode::Info => "FINFO",
            LogCode::Error => "FERROR",
            LogCode::Warning => "FWARNING",
            LogCode::ErrorSocket => "FERROR_SOCKET",
            LogCode::Log => "FLOG",
            LogCode::Client => "FCLIENT",
            LogCode::ErrorUtf8 => "FERROR_UTF8",
        }
    }
}

impl fmt::Display for LogCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing or converting a [`LogCode`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogCodeConversionError {
    /// A numeric value did not match any known [`LogCode`].
    #[error("unknown log code value: {0}")]
    Value(u8),
    /// A name did not match any known [`LogCode`].
    #[error("unknown log code name: {0:?}")]
    Name(String),
}

impl LogCodeConversionError {
    /// Returns the offending value, if this was a numeric conversion error.
    #[must_use]
    pub fn invalid_value(&self) -> Option<u8> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Name(_) => None,
        }
    }

    /// Returns the offending name, if this was a name-parsing error.
    #[must_use]
    pub fn invalid_name(&self) -> Option<&str> {
        match self {
            Self::Name(n) => Some(n.as_str()),
            Self::Value(_) => None,
        }
    }
}

impl TryFrom<u8> for LogCode {
    type Error = LogCodeConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(LogCodeConversionError::Value(value))
    }
}

impl FromStr for LogCode {
    type Err = LogCodeConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|code| code.name() == s)
            .ok_or_else(|| LogCodeConversionError::Name(s.to_string()))
    }
}

/// The fixed-size header preceding every multiplexed frame's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    code: MessageCode,
    payload_len: u32,
}

impl MessageHeader {
    /// Builds a header, rejecting payload lengths over [`MAX_PAYLOAD_LENGTH`].
    pub const fn new(code: MessageCode, payload_len: u32) -> Result<Self, EnvelopeError> {
        if payload_len > MAX_PAYLOAD_LENGTH {
            return Err(EnvelopeError::OversizedPayload(payload_len));
        }
        Ok(Self { code, payload_len })
    }

    /// Returns the message category.
    #[must_use]
    pub const fn code(&self) -> MessageCode {
        self.code
    }

    /// Returns the payload length as transmitted on the wire.
    #[must_use]
    pub const fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// Returns the payload length as a `usize` for buffer sizing.
    #[must_use]
    pub fn payload_len_usize(&self) -> usize {
        debug_assert!(usize::BITS >= 24, "platform cannot address 24-bit lengths");
        self.payload_len as usize
    }

    /// Packs this header into its wire `u32` representation.
    #[must_use]
    pub const fn encode_raw(&self) -> u32 {
        ((MPLEX_BASE as u32 + self.code.as_u8() as u32) << 24) | self.payload_len
    }

    /// Encodes this header to its 4 little-endian wire bytes.
    #[must_use]
    pub const fn encode(&self) -> [u8; HEADER_LEN] {
        self.encode_raw().to_le_bytes()
    }

    /// Writes the encoded header into the front of `buffer`.
    pub fn encode_into_slice(&self, buffer: &mut [u8]) -> Result<(), EnvelopeError> {
        if buffer.len() < HEADER_LEN {
            return Err(EnvelopeError::TruncatedHeader {
                actual: buffer.len(),
            });
        }
        buffer[..HEADER_LEN].copy_from_slice(&self.encode());
        Ok(())
    }

    /// Decodes a packed wire `u32` into its tag and payload-length parts.
    pub fn from_raw(raw: u32) -> Result<Self, EnvelopeError> {
        let tag = (raw >> 24) as u8;
        let payload_len = raw & PAYLOAD_MASK;
        if tag < MPLEX_BASE {
            return Err(EnvelopeError::InvalidTag(tag));
        }
        let code_byte = tag - MPLEX_BASE;
        let code =
            MessageCode::from_u8(code_byte).ok_or(EnvelopeError::UnknownMessageCode(code_byte))?;
        Ok(Self { code, payload_len })
    }

    /// Decodes a header from its first [`HEADER_LEN`] bytes, ignoring any
    /// trailing bytes in `bytes`. The payload length is masked to 24 bits.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < HEADER_LEN {
            return Err(EnvelopeError::TruncatedHeader {
                actual: bytes.len(),
            });
        }
        let mut raw = [0u8; HEADER_LEN];
        raw.copy_from_slice(&bytes[..HEADER_LEN]);
        Self::from_raw(u32::from_le_bytes(raw))
    }
}

impl TryFrom<[u8; HEADER_LEN]> for MessageHeader {
    type Error = EnvelopeError;

    fn try_from(bytes: [u8; HEADER_LEN]) -> Result<Self, Self::Error> {
        Self::from_raw(u32::from_le_bytes(bytes))
    }
}

impl TryFrom<&[u8; HEADER_LEN]> for MessageHeader {
    type Error = EnvelopeError;

    fn try_from(bytes: &[u8; HEADER_LEN]) -> Result<Self, Self::Error> {
        Self::from_raw(u32::from_le_bytes(*bytes))
    }
}

/// A decoded multiplexed message: a [`MessageCode`] plus its owned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFrame {
    code: MessageCode,
    payload: Vec<u8>,
}

impl MessageFrame {
    /// Builds a frame, rejecting payloads over [`MAX_PAYLOAD_LENGTH`].
    pub fn new(code: MessageCode, payload: Vec<u8>) -> Result<Self, EnvelopeError> {
        MessageHeader::new(code, payload.len() as u32)?;
        Ok(Self { code, payload })
    }

    /// Returns the message category.
    #[must_use]
    pub fn code(&self) -> MessageCode {
        self.code
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns a mutable view of the payload bytes.
    pub fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    /// Recomputes this frame's header, failing if the payload has since grown
    /// past [`MAX_PAYLOAD_LENGTH`].
    pub fn header(&self) -> Result<MessageHeader, EnvelopeError> {
        MessageHeader::new(self.code, self.payload.len() as u32)
    }

    /// Splits the frame into its code and owned payload.
    #[must_use]
    pub fn into_parts(self) -> (MessageCode, Vec<u8>) {
        (self.code, self.payload)
    }

    /// Discards the code and returns the owned payload.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Decodes one frame from the front of `bytes`, returning the frame and
    /// the unconsumed remainder.
    pub fn decode_from_slice(bytes: &[u8]) -> io::Result<(Self, &[u8])> {
        if bytes.len() < HEADER_LEN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated multiplexed header",
            ));
        }
        let header = MessageHeader::decode(&bytes[..HEADER_LEN])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let payload_len = header.payload_len_usize();
        let rest = &bytes[HEADER_LEN..];
        if rest.len() < payload_len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated multiplexed payload",
            ));
        }
        let (payload, remainder) = rest.split_at(payload_len);
        Ok((
            Self {
                code: header.code(),
                payload: payload.to_vec(),
            },
            remainder,
        ))
    }

    /// Decodes a single frame that must consume the whole of `bytes`.
    pub fn decode_one(bytes: &[u8]) -> io::Result<Self> {
        let (frame, remainder) = Self::decode_from_slice(bytes)?;
        if !remainder.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "input slice contains {} trailing bytes after multiplexed frame",
                    remainder.len()
                ),
            ));
        }
        Ok(frame)
    }

    /// Reads exactly one frame from `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut header_bytes = [0u8; HEADER_LEN];
        reader.read_exact(&mut header_bytes)?;
        let header = MessageHeader::decode(&header_bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut payload = vec![0u8; header.payload_len_usize()];
        reader.read_exact(&mut payload)?;
        Ok(Self {
            code: header.code(),
            payload,
        })
    }

    /// Writes this frame's header and payload into `writer`.
    pub fn encode_into_writer<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let header = self
            .header()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        writer.write_all(&header.encode())?;
        writer.write_all(&self.payload)
    }

    /// Appends this frame's wire bytes to `buffer`.
    pub fn encode_into_vec(&self, buffer: &mut Vec<u8>) -> Result<(), EnvelopeError> {
        let header = self.header()?;
        buffer.extend_from_slice(&header.encode());
        buffer.extend_from_slice(&self.payload);
        Ok(())
    }
}

impl TryFrom<&[u8]> for MessageFrame {
    type Error = io::Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::decode_one(bytes)
    }
}

/// Writes `frame` to `writer` as a standalone multiplexed message.
pub fn send_frame<W: Write>(writer: &mut W, frame: &MessageFrame) -> io::Result<()> {
    frame.encode_into_writer(writer)
}
