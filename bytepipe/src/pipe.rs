//! Bidirectional in-memory channel built from two ring buffers.
//!
//! A [`Pipe`] is both a test double for a physical transport and a
//! real intra-process channel: two [`PipeEnd`]s cross-wired over two
//! [`RingBuffer`]s. End A writes into the A→B buffer and reads from
//! the B→A buffer; end B does the opposite.
//!
//! The buffers live in one shared heap allocation that both ends hold
//! onto, so their storage never moves for the life of the channel.
//! While the `Pipe` owns both ends, the channel cannot close;
//! [`Pipe::into_ends`] releases the two ends so each can move to its
//! own thread, after which dropping either end hangs the channel up.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::buffer::RingBuffer;
use crate::connection::{Connection, yield_now};
use crate::error::{Error, Result};

/// Capacity of each direction of a default-sized pipe.
pub const DEFAULT_PIPE_CAPACITY: usize = 4096;

#[derive(Debug)]
struct Shared<const N: usize> {
    a_to_b: RingBuffer<N>,
    b_to_a: RingBuffer<N>,

    /// Cleared when either end is dropped; turns the peer's reads into
    /// drain-then-end-of-stream.
    open: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// A bidirectional in-memory byte channel.
///
/// Construction builds both buffers and both endpoints in one step.
/// Each endpoint is created exactly once and lives as long as the
/// channel, so the one-producer/one-consumer discipline of the
/// underlying buffers holds by construction.
#[derive(Debug)]
pub struct Pipe<const N: usize> {
    end_a: PipeEnd<N>,
    end_b: PipeEnd<N>,
}

impl<const N: usize> Pipe<N> {
    /// Creates a connected pair of endpoints over fresh buffers.
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            a_to_b: RingBuffer::new(),
            b_to_a: RingBuffer::new(),
            open: AtomicBool::new(true),
        });
        Self {
            end_a: PipeEnd {
                shared: shared.clone(),
                side: Side::A,
            },
            end_b: PipeEnd {
                shared,
                side: Side::B,
            },
        }
    }

    /// Returns endpoint A.
    pub fn end_a(&mut self) -> &mut PipeEnd<N> {
        &mut self.end_a
    }

    /// Returns endpoint B.
    pub fn end_b(&mut self) -> &mut PipeEnd<N> {
        &mut self.end_b
    }

    /// Returns both endpoints at once.
    pub fn ends(&mut self) -> (&mut PipeEnd<N>, &mut PipeEnd<N>) {
        (&mut self.end_a, &mut self.end_b)
    }

    /// Consumes the pipe and releases its two endpoints, so each can
    /// move to its own thread.
    ///
    /// The buffers stay pinned in the shared allocation. Once split,
    /// dropping either end hangs up the channel for the peer.
    pub fn into_ends(self) -> (PipeEnd<N>, PipeEnd<N>) {
        let Pipe { end_a, end_b } = self;
        (end_a, end_b)
    }
}

impl<const N: usize> Default for Pipe<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// One side of a [`Pipe`].
///
/// Implements [`Connection`]. A blocking read on a pipe end suspends
/// until the peer writes or hangs up; in single-threaded use, prefer
/// the non-blocking calls.
#[derive(Debug)]
pub struct PipeEnd<const N: usize> {
    shared: Arc<Shared<N>>,
    side: Side,
}

impl<const N: usize> PipeEnd<N> {
    fn read_buf(&self) -> &RingBuffer<N> {
        match self.side {
            Side::A => &self.shared.b_to_a,
            Side::B => &self.shared.a_to_b,
        }
    }

    fn write_buf(&self) -> &RingBuffer<N> {
        match self.side {
            Side::A => &self.shared.a_to_b,
            Side::B => &self.shared.b_to_a,
        }
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }

    /// Returns the number of bytes ready to read from this end.
    pub fn available(&self) -> usize {
        self.read_buf().count()
    }

    /// Returns the free capacity for writing from this end.
    pub fn write_space(&self) -> usize {
        self.write_buf().free()
    }

    /// No-op: every successful write is already visible to the peer.
    pub fn flush(&mut self) {}
}

impl<const N: usize> Drop for PipeEnd<N> {
    fn drop(&mut self) {
        self.shared.open.store(false, Ordering::Release);
    }
}

impl<const N: usize> Connection for PipeEnd<N> {
    fn try_read_one(&mut self) -> Result<Option<u8>> {
        if let Some(b) = self.read_buf().get() {
            return Ok(Some(b));
        }
        if !self.is_open() {
            return Err(Error::EndOfStream);
        }
        Ok(None)
    }

    fn read_one(&mut self) -> Result<u8> {
        loop {
            match self.try_read_one()? {
                Some(b) => return Ok(b),
                None => yield_now(),
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.try_read_one() {
                Ok(Some(b)) => {
                    buf[n] = b;
                    n += 1;
                }
                Ok(None) => yield_now(),
                Err(Error::EndOfStream) if n > 0 => break,
                Err(e) => return Err(e),
            }
        }
        Ok(n)
    }

    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.read_buf().get() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 && !buf.is_empty() && !self.is_open() {
            return Err(Error::EndOfStream);
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(Error::EndOfStream);
        }

        // All-or-nothing: the peer is the only other party on this
        // buffer and can only free space, so the check cannot go stale.
        let dst = self.write_buf();
        if buf.len() > dst.free() {
            return Err(Error::BufferFull);
        }
        for &b in buf {
            let stored = dst.put(b);
            debug_assert!(stored);
        }
        Ok(())
    }

    fn available_for_reading(&mut self) -> bool {
        self.available() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_both_directions() {
        let mut pipe: Pipe<64> = Pipe::new();

        pipe.end_a().write(b"to b").unwrap();
        pipe.end_b().write(b"to a").unwrap();

        let mut buf = [0u8; 8];
        let n = pipe.end_b().try_read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"to b");

        let n = pipe.end_a().try_read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"to a");
    }

    #[test]
    fn test_read_one_returns_bytes_in_order() {
        let mut pipe: Pipe<64> = Pipe::new();

        pipe.end_a().write(b"abc").unwrap();
        assert_eq!(pipe.end_b().read_one().unwrap(), b'a');
        assert_eq!(pipe.end_b().try_read_one().unwrap(), Some(b'b'));
        assert_eq!(pipe.end_b().read_one().unwrap(), b'c');
        assert_eq!(pipe.end_b().try_read_one().unwrap(), None);
    }

    #[test]
    fn test_write_overflow_fails_cleanly() {
        let mut pipe: Pipe<{ DEFAULT_PIPE_CAPACITY }> = Pipe::new();

        let oversized = [0x5A; DEFAULT_PIPE_CAPACITY + 904];
        assert_eq!(pipe.end_a().write(&oversized), Err(Error::BufferFull));

        // Failed write leaves the buffer completely unchanged
        assert_eq!(pipe.end_a().write_space(), DEFAULT_PIPE_CAPACITY);
        assert_eq!(pipe.end_b().available(), 0);
    }

    #[test]
    fn test_write_overflow_preserves_existing_data() {
        let mut pipe: Pipe<8> = Pipe::new();

        pipe.end_a().write(b"abcde").unwrap();
        assert_eq!(pipe.end_a().write(b"fghi"), Err(Error::BufferFull));

        let mut buf = [0u8; 8];
        let n = pipe.end_b().try_read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"abcde");
    }

    #[test]
    fn test_available_is_read_only() {
        let mut pipe: Pipe<16> = Pipe::new();
        pipe.end_a().write(b"xyz").unwrap();

        let end_b = pipe.end_b();
        assert_eq!(end_b.available(), 3);
        assert_eq!(end_b.available(), 3);
        assert!(end_b.available_for_reading());
        assert!(end_b.available_for_reading());
        assert_eq!(end_b.available(), 3);
    }

    #[test]
    fn test_write_space_tracks_occupancy() {
        let mut pipe: Pipe<16> = Pipe::new();

        assert_eq!(pipe.end_a().write_space(), 16);
        pipe.end_a().write(b"1234").unwrap();
        assert_eq!(pipe.end_a().write_space(), 12);

        let mut buf = [0u8; 4];
        pipe.end_b().try_read(&mut buf).unwrap();
        assert_eq!(pipe.end_a().write_space(), 16);
    }

    #[test]
    fn test_flush_is_noop() {
        let mut pipe: Pipe<16> = Pipe::new();
        pipe.end_a().write(b"ab").unwrap();
        pipe.end_a().flush();
        assert_eq!(pipe.end_b().available(), 2);
    }

    #[test]
    fn test_hangup_drains_then_ends() {
        let (mut end_a, mut end_b) = Pipe::<16>::new().into_ends();

        end_a.write(b"last").unwrap();
        drop(end_a);

        // Buffered bytes are still delivered
        let mut buf = [0u8; 8];
        assert_eq!(end_b.try_read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"last");

        // Then the closure is permanent and distinct from "no data"
        assert_eq!(end_b.try_read_one(), Err(Error::EndOfStream));
        assert_eq!(end_b.read_one(), Err(Error::EndOfStream));
        assert_eq!(end_b.try_read(&mut buf), Err(Error::EndOfStream));
        assert!(!end_b.available_for_reading());
        assert_eq!(end_b.write(b"x"), Err(Error::EndOfStream));
    }

    #[test]
    fn test_read_returns_short_prefix_on_hangup() {
        let (mut end_a, mut end_b) = Pipe::<16>::new().into_ends();

        end_a.write(b"abc").unwrap();
        drop(end_a);

        let mut buf = [0u8; 8];
        assert_eq!(end_b.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(end_b.read(&mut buf), Err(Error::EndOfStream));
    }
}
