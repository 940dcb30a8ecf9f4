//! The multiplexed duplex channel (spec §4.1): raw transfer bytes and tagged
//! out-of-band messages share one byte stream, demultiplexed transparently
//! on read and flushed as `MSG_DATA` frames on write.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};

use protocol::{HEADER_LEN, IndexCodec, MAX_PAYLOAD_LENGTH, MessageCode, MessageFrame, MessageHeader};

use crate::error::IoError;

/// A duplex channel layered over any [`Read`] + [`Write`] transport.
///
/// Outbound bytes written through [`Self::put_byte`]/[`Self::put_int`]/etc.
/// accumulate in an internal buffer and are only framed as `MSG_DATA` when
/// [`Self::flush`] runs; inbound reads transparently skip over (and queue)
/// any non-`MSG_DATA` frames encountered while filling the read buffer.
pub struct DuplexChannel<T> {
    transport: T,
    out: Vec<u8>,
    in_buf: VecDeque<u8>,
    pending_messages: VecDeque<MessageFrame>,
    index_encoder: IndexCodec,
    index_decoder: IndexCodec,
}

impl<T: Read + Write> DuplexChannel<T> {
    /// Wraps `transport` in a fresh channel with empty buffers.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            out: Vec::new(),
            in_buf: VecDeque::new(),
            pending_messages: VecDeque::new(),
            index_encoder: IndexCodec::new(),
            index_decoder: IndexCodec::new(),
        }
    }

    /// Unwraps the channel, discarding any buffered-but-unflushed output.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Reads one raw data byte.
    pub fn get_byte(&mut self) -> Result<u8, IoError> {
        self.next_data_byte()
    }

    /// Alias for [`Self::get_byte`], kept for parity with upstream naming.
    pub fn get_char(&mut self) -> Result<u8, IoError> {
        self.get_byte()
    }

    /// Reads a 4-byte little-endian signed integer.
    pub fn get_int(&mut self) -> Result<i32, IoError> {
        let mut bytes = [0u8; 4];
        self.get(&mut bytes)?;
        Ok(i32::from_le_bytes(bytes))
    }

    /// Fills `buf` with raw data bytes.
    pub fn get(&mut self, buf: &mut [u8]) -> Result<(), IoError> {
        for slot in buf.iter_mut() {
            *slot = self.next_data_byte()?;
        }
        Ok(())
    }

    /// Discards `n` raw data bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), IoError> {
        for _ in 0..n {
            self.next_data_byte()?;
        }
        Ok(())
    }

    /// Number of data bytes already buffered without a further transport read.
    #[must_use]
    pub fn peek_bytes_available(&self) -> usize {
        self.in_buf.len()
    }

    /// Writes one raw data byte.
    pub fn put_byte(&mut self, byte: u8) {
        self.out.push(byte);
    }

    /// Alias for [`Self::put_byte`], kept for parity with upstream naming.
    pub fn put_char(&mut self, byte: u8) {
        self.put_byte(byte);
    }

    /// Writes a 4-byte little-endian signed integer.
    pub fn put_int(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes raw data bytes.
    pub fn put(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Encodes `value` with the index codec and appends it to the output
    /// buffer.
    pub fn encode_index(&mut self, value: i32) {
        let bytes = self.index_encoder.encode(value);
        self.put(&bytes);
    }

    /// Decodes one index from the data stream, reading a byte at a time
    /// until the variable-width encoding is complete.
    pub fn decode_index(&mut self) -> Result<i32, IoError> {
        let mut buf = Vec::with_capacity(5);
        loop {
            buf.push(self.next_data_byte()?);
            match self.index_decoder.decode(&buf) {
                Ok((value, _consumed)) => return Ok(value),
                Err(_) if buf.len() < 6 => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Flushes any pending raw data as one or more `MSG_DATA` frames.
    ///
    /// Per the auto-flush policy (spec §4.1), this also runs implicitly
    /// before any blocking transport read so a peer waiting on our data is
    /// never starved by our own buffering.
    pub fn flush(&mut self) -> Result<(), IoError> {
        if self.out.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.out);
        for chunk in pending.chunks(MAX_PAYLOAD_LENGTH as usize) {
            let header = MessageHeader::new(MessageCode::Data, chunk.len() as u32)?;
            self.transport.write_all(&header.encode())?;
            self.transport.write_all(chunk)?;
        }
        self.transport.flush()?;
        Ok(())
    }

    /// Writes an out-of-band message frame, flushing any pending data bytes
    /// first so the two streams interleave in the order they were produced.
    pub fn put_message(&mut self, frame: MessageFrame) -> Result<(), IoError> {
        self.flush()?;
        let header = frame.header()?;
        self.transport.write_all(&header.encode())?;
        self.transport.write_all(frame.payload())?;
        self.transport.flush()?;
        Ok(())
    }

    /// Pops the oldest out-of-band message observed while filling the read
    /// buffer, if any.
    pub fn take_message(&mut self) -> Option<MessageFrame> {
        self.pending_messages.pop_front()
    }

    fn next_data_byte(&mut self) -> Result<u8, IoError> {
        while self.in_buf.is_empty() {
            self.fill_from_transport()?;
        }
        Ok(self.in_buf.pop_front().expect("checked non-empty above"))
    }

    fn fill_from_transport(&mut self) -> Result<(), IoError> {
        if self.in_buf.is_empty() {
            self.flush()?;
        }

        let mut header_bytes = [0u8; HEADER_LEN];
        read_exact_or_eof(&mut self.transport, &mut header_bytes)?;
        let header = MessageHeader::decode(&header_bytes)?;

        let mut payload = vec![0u8; header.payload_len_usize()];
        read_exact_or_eof(&mut self.transport, &mut payload)?;

        if header.code() == MessageCode::Data {
            self.in_buf.extend(payload);
        } else {
            self.pending_messages.push_back(MessageFrame::new(header.code(), payload)?);
        }
        Ok(())
    }
}

fn read_exact_or_eof<T: Read>(transport: &mut T, buf: &mut [u8]) -> Result<(), IoError> {
    transport.read_exact(buf).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            IoError::ChannelEof
        } else {
            IoError::Transport(err)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn put_int_and_flush_produce_a_single_data_frame() {
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_int(42);
        channel.flush().unwrap();
        let written = channel.into_inner().into_inner();
        let header = MessageHeader::decode(&written).unwrap();
        assert_eq!(header.code(), MessageCode::Data);
        assert_eq!(header.payload_len_usize(), 4);
        assert_eq!(&written[HEADER_LEN..], &42i32.to_le_bytes());
    }

    #[test]
    fn get_int_round_trips_through_a_data_frame() {
        let header = MessageHeader::new(MessageCode::Data, 4).unwrap();
        let mut wire = header.encode().to_vec();
        wire.extend_from_slice(&99i32.to_le_bytes());
        let mut channel = DuplexChannel::new(Cursor::new(wire));
        assert_eq!(channel.get_int().unwrap(), 99);
    }

    #[test]
    fn non_data_frames_are_queued_rather_than_returned_as_bytes() {
        let info = MessageHeader::new(MessageCode::Info, 5).unwrap();
        let mut wire = info.encode().to_vec();
        wire.extend_from_slice(b"hello");
        let data = MessageHeader::new(MessageCode::Data, 1).unwrap();
        wire.extend_from_slice(&data.encode());
        wire.push(7);

        let mut channel = DuplexChannel::new(Cursor::new(wire));
        assert_eq!(channel.get_byte().unwrap(), 7);
        let message = channel.take_message().expect("info message queued");
        assert_eq!(message.code(), MessageCode::Info);
        assert_eq!(message.payload(), b"hello");
    }

    #[test]
    fn index_round_trips_through_the_channel() {
        let mut writer = DuplexChannel::new(Cursor::new(Vec::new()));
        for value in [0, 1, 5, 200, 100_000, -1, -2, -500] {
            writer.encode_index(value);
        }
        writer.flush().unwrap();
        let wire = writer.into_inner().into_inner();

        let mut reader = DuplexChannel::new(Cursor::new(wire));
        for expected in [0, 1, 5, 200, 100_000, -1, -2, -500] {
            assert_eq!(reader.decode_index().unwrap(), expected);
        }
    }

    #[test]
    fn truncated_stream_reports_channel_eof() {
        let mut channel = DuplexChannel::new(Cursor::new(vec![7u8, 0, 0]));
        let err = channel.get_int().unwrap_err();
        assert!(matches!(err, IoError::ChannelEof));
    }

    #[test]
    fn put_message_flushes_pending_data_first_to_preserve_ordering() {
        let mut channel = DuplexChannel::new(Cursor::new(Vec::new()));
        channel.put_byte(1);
        let frame = MessageFrame::new(MessageCode::Warning, b"careful".to_vec()).unwrap();
        channel.put_message(frame).unwrap();

        let written = channel.into_inner().into_inner();
        let data_header = MessageHeader::decode(&written).unwrap();
        assert_eq!(data_header.code(), MessageCode::Data);
        let offset = HEADER_LEN + data_header.payload_len_usize();
        let message_header = MessageHeader::decode(&written[offset..]).unwrap();
        assert_eq!(message_header.code(), MessageCode::Warning);
    }
}
