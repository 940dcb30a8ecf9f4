//! Wire encoding of a `Checksum.Header` (spec §3) and its per-block checksum
//! pairs, shared by both the generator side (which has the blocks already)
//! and the sender side (which must reconstruct a [`SignatureLayout`] purely
//! from what's transmitted).

use std::io::{Read, Write};
use std::num::NonZeroU32;

use rsync_io::DuplexChannel;
use signature::{BlockChecksum, SignatureLayout};

use crate::error::TransferError;

/// Writes `layout` and `blocks` to `channel`: `chunkCount`, `blockLength`,
/// `digestLength`, `remainder` as 4-byte ints, then `chunkCount` pairs of
/// `putInt(rolling)` + `put(md5[0..digestLength])` (spec §4.6).
pub fn write_checksum_header<T: Read + Write>(
    channel: &mut DuplexChannel<T>,
    layout: &SignatureLayout,
    blocks: &[BlockChecksum],
) -> Result<(), TransferError> {
    channel.put_int(layout.chunk_count() as i32);
    channel.put_int(layout.block_length().get() as i32);
    channel.put_int(i32::from(layout.digest_length()));
    channel.put_int(layout.remainder() as i32);
    for block in blocks {
        channel.put_int(block.rolling() as i32);
        channel.put(block.strong());
    }
    Ok(())
}

/// Reads a `chunkCount`/`blockLength`/`digestLength`/`remainder` header plus
/// its block checksum pairs, reconstructing a [`SignatureLayout`] from the
/// wire values directly rather than re-deriving one from a local file size.
pub fn read_checksum_header<T: Read + Write>(
    channel: &mut DuplexChannel<T>,
) -> Result<(SignatureLayout, Vec<BlockChecksum>), TransferError> {
    let chunk_count = channel.get_int()? as u32 as u64;
    let block_length_raw = channel.get_int()? as u32;
    let digest_length = channel.get_int()? as u8;
    let remainder = channel.get_int()? as u32;

    let block_length = NonZeroU32::new(block_length_raw).unwrap_or_else(|| NonZeroU32::new(1).unwrap());
    let layout = SignatureLayout::from_wire(block_length, digest_length, remainder, chunk_count);

    let mut blocks = Vec::with_capacity(chunk_count as usize);
    for _ in 0..chunk_count {
        let rolling = channel.get_int()? as u32;
        let mut strong = vec![0u8; digest_length as usize];
        channel.get(&mut strong)?;
        blocks.push(BlockChecksum::from_wire(rolling, strong));
    }

    Ok((layout, blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::{SignatureLayoutParams, calculate_signature_layout, generate_file_signature};
    use std::io::Cursor;

    #[test]
    fn header_and_blocks_round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".to_vec();
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            Some(NonZeroU32::new(8).unwrap()),
        ))
        .unwrap();
        let blocks = generate_file_signature(&mut Cursor::new(data), &layout, 3).unwrap();

        let mut writer = DuplexChannel::new(Cursor::new(Vec::new()));
        write_checksum_header(&mut writer, &layout, &blocks).unwrap();
        writer.flush().unwrap();
        let wire = writer.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let (read_layout, read_blocks) = read_checksum_header(&mut reader).unwrap();

        assert_eq!(read_layout.block_length(), layout.block_length());
        assert_eq!(read_layout.digest_length(), layout.digest_length());
        assert_eq!(read_layout.remainder(), layout.remainder());
        assert_eq!(read_layout.chunk_count(), layout.chunk_count());
        assert_eq!(read_blocks.len(), blocks.len());
        for (a, b) in read_blocks.iter().zip(blocks.iter()) {
            assert_eq!(a.rolling(), b.rolling());
            assert_eq!(a.strong(), b.strong());
        }
    }

    #[test]
    fn empty_file_header_carries_no_blocks() {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(0, None)).unwrap();
        let mut writer = DuplexChannel::new(Cursor::new(Vec::new()));
        write_checksum_header(&mut writer, &layout, &[]).unwrap();
        writer.flush().unwrap();
        let wire = writer.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        let (read_layout, read_blocks) = read_checksum_header(&mut reader).unwrap();
        assert_eq!(read_layout.chunk_count(), 0);
        assert!(read_blocks.is_empty());
    }
}
