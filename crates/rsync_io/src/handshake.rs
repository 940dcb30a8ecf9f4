//! Line-oriented daemon handshake primitives (spec §4.2): the `@RSYNCD:`
//! version banner, module-name/status lines, and challenge/response
//! authentication. Orchestrating the full handshake sequence for either
//! role is left to the session layer; this module only provides the
//! individual line and digest operations it's built from.

use std::io::{ErrorKind, Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::RngCore;
use rsync_checksums::strong::{Md5, StrongDigest};

use crate::error::IoError;

/// Major protocol version advertised in the `@RSYNCD:` banner.
pub const BANNER_MAJOR: u32 = 30;

/// Minor protocol version advertised in the `@RSYNCD:` banner.
pub const BANNER_MINOR: u32 = 0;

/// Default cap on a single handshake line, guarding against an unterminated
/// peer stream consuming unbounded memory.
pub const MAX_LINE_LEN: usize = 4096;

/// Formats the `@RSYNCD: MAJOR.MINOR` version banner (spec §4.2 step 1).
#[must_use]
pub fn format_version_banner() -> String {
    format!("@RSYNCD: {BANNER_MAJOR}.{BANNER_MINOR}\n")
}

/// Parses a peer's `@RSYNCD: MAJOR.MINOR` banner line (without the trailing
/// newline), returning its major and minor version numbers.
pub fn parse_version_banner(line: &str) -> Result<(u32, u32), IoError> {
    let rest = line
        .strip_prefix("@RSYNCD: ")
        .ok_or_else(|| malformed_banner(line))?;
    let (major_str, minor_str) = rest.split_once('.').ok_or_else(|| malformed_banner(line))?;
    let major: u32 = major_str.parse().map_err(|_| malformed_banner(line))?;
    let minor: u32 = minor_str.parse().map_err(|_| malformed_banner(line))?;
    Ok((major, minor))
}

fn malformed_banner(line: &str) -> IoError {
    IoError::Protocol(protocol::ProtocolError::UndecodableText(format!(
        "malformed @RSYNCD: banner: {line:?}"
    )))
}

/// A status line sent by the daemon after the module name is read (spec §4.2
/// step 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonStatus {
    /// `@RSYNCD: AUTHREQD <challenge>`.
    AuthRequired {
        /// The base64, unpadded challenge the client must respond to.
        challenge: String,
    },
    /// `@RSYNCD: OK`.
    Ok,
    /// `@RSYNCD: ERROR <message>`.
    Error(String),
    /// `@RSYNCD: EXIT`.
    Exit,
    /// A plain MOTD line with no `@RSYNCD:` prefix, to be delivered to the
    /// caller's listing queue.
    Motd(String),
}

impl DaemonStatus {
    /// Classifies one line received from the daemon after the module name.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.strip_prefix("@RSYNCD: ") {
            Some(rest) if rest == "OK" => Self::Ok,
            Some(rest) if rest == "EXIT" => Self::Exit,
            Some(rest) => match rest.strip_prefix("AUTHREQD ") {
                Some(challenge) => Self::AuthRequired {
                    challenge: challenge.to_string(),
                },
                None => rest
                    .strip_prefix("ERROR")
                    .map(|msg| Self::Error(msg.trim_start().to_string()))
                    .unwrap_or_else(|| Self::Motd(line.to_string())),
            },
            None => Self::Motd(line.to_string()),
        }
    }
}

/// Generates an 8-byte random authentication challenge (spec §4.2 step 4:
/// "Challenge is 8 random bytes").
#[must_use]
pub fn generate_challenge() -> [u8; 8] {
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Encodes a challenge as unpadded base64, for inclusion in an `AUTHREQD`
/// status line.
#[must_use]
pub fn encode_challenge(challenge: &[u8]) -> String {
    STANDARD_NO_PAD.encode(challenge)
}

/// Decodes a base64, unpadded challenge from an `AUTHREQD` status line.
pub fn decode_challenge(encoded: &str) -> Result<Vec<u8>, IoError> {
    STANDARD_NO_PAD
        .decode(encoded)
        .map_err(|err| IoError::Protocol(protocol::ProtocolError::UndecodableText(err.to_string())))
}

/// Computes the client's authentication response: `base64(MD5(password ‖
/// challenge))`, matching what [`format_auth_response`] sends on the wire.
#[must_use]
pub fn compute_auth_digest(password: &[u8], challenge: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(password);
    hasher.update(challenge);
    STANDARD_NO_PAD.encode(hasher.finalize())
}

/// Formats the client's authentication response line (spec §4.2 step 4):
/// `<username> <base64(MD5(password‖challenge))>\n`.
#[must_use]
pub fn format_auth_response(username: &str, password: &[u8], challenge: &[u8]) -> String {
    format!("{username} {}\n", compute_auth_digest(password, challenge))
}

/// Reads one line (without its trailing `\n`) from `reader`, one byte at a
/// time, failing if more than [`MAX_LINE_LEN`] bytes are read without a
/// newline.
pub fn read_line(reader: &mut impl Read) -> Result<String, IoError> {
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Err(IoError::ChannelEof),
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                bytes.push(byte[0]);
                if bytes.len() > MAX_LINE_LEN {
                    return Err(IoError::LineTooLong { limit: MAX_LINE_LEN });
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(IoError::Transport(err)),
        }
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes)
        .map_err(|err| IoError::Protocol(protocol::ProtocolError::UndecodableText(err.to_string())))
}

/// Writes `line` followed by `\n` and flushes the transport.
pub fn write_line(writer: &mut impl Write, line: &str) -> Result<(), IoError> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
