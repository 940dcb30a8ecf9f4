//! Sender-side delta streaming (spec §4.7 steps 2-4).

use std::io::{Read, Write};

use matching::{ChecksumIndex, generate_delta};
use rsync_io::DuplexChannel;
use signature::{BlockChecksum, SignatureLayout};

use crate::error::TransferError;

/// Matches `source` against the peer's checksum header and streams the
/// resulting literal/match tokens plus whole-file MD5 to `channel`.
///
/// Literal spans arrive from [`generate_delta`] already split at the
/// [`matching::MAX_LITERAL_LEN`] boundary, so each is written verbatim as
/// `putInt(len)` + the bytes; a match is `putInt(-(chunkIndex+1))`; the
/// stream ends with a `putInt(0)` terminator followed by the 16-byte digest.
pub fn send_file_delta<T: Read + Write>(
    channel: &mut DuplexChannel<T>,
    source: &[u8],
    layout: &SignatureLayout,
    peer_blocks: &[BlockChecksum],
    checksum_seed: u32,
) -> Result<(), TransferError> {
    let index = ChecksumIndex::build(peer_blocks, layout);
    let delta = generate_delta(source, layout, &index, checksum_seed);

    for token in delta.tokens() {
        match token {
            matching::DeltaToken::Literal(bytes) => {
                channel.put_int(bytes.len() as i32);
                channel.put(bytes);
            }
            matching::DeltaToken::Match(block_index) => {
                channel.put_int(-(*block_index as i32 + 1));
            }
        }
    }
    channel.put_int(0);
    channel.put(&delta.file_checksum());
    channel.flush()?;
    Ok(())
}
