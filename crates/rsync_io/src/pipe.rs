//! An in-memory duplex byte pipe connecting two endpoints in the same
//! process, for roles that talk to each other without a real socket (spec
//! §4.1: the channel is generic over any transport, not just a `TcpStream`).

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{Receiver, Sender, channel};

/// One endpoint of an in-memory duplex pipe, built via [`DuplexPipe::pair`].
///
/// Bytes [`Write`]n on one endpoint become [`Read`]able on the other. A
/// `read` blocks until data arrives or the peer endpoint is dropped, at
/// which point it reports a clean end-of-stream (`Ok(0)`) rather than an
/// error, matching how a closed socket behaves.
pub struct DuplexPipe {
    outbound: Sender<Vec<u8>>,
    inbound: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl DuplexPipe {
    /// Builds a connected pair of endpoints.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = channel();
        let (tx_b, rx_b) = channel();
        (
            Self { outbound: tx_a, inbound: rx_b, pending: VecDeque::new() },
            Self { outbound: tx_b, inbound: rx_a, pending: VecDeque::new() },
        )
    }
}

impl Read for DuplexPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.inbound.recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.pending.pop_front().expect("checked non-empty above");
        }
        Ok(n)
    }
}

impl Write for DuplexPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outbound
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer endpoint dropped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_written_on_one_end_are_read_on_the_other() {
        let (mut a, mut b) = DuplexPipe::pair();
        a.write_all(b"hello").unwrap();
        let mut buf = [0u8; 5];
        b.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn both_directions_are_independent() {
        let (mut a, mut b) = DuplexPipe::pair();
        a.write_all(b"ping").unwrap();
        b.write_all(b"pong").unwrap();

        let mut from_a = [0u8; 4];
        b.read_exact(&mut from_a).unwrap();
        assert_eq!(&from_a, b"ping");

        let mut from_b = [0u8; 4];
        a.read_exact(&mut from_b).unwrap();
        assert_eq!(&from_b, b"pong");
    }

    #[test]
    fn reading_after_the_peer_is_dropped_reports_clean_eof() {
        let (a, mut b) = DuplexPipe::pair();
        drop(a);
        let mut buf = [0u8; 1];
        assert_eq!(b.read(&mut buf).unwrap(), 0);
    }
}
