//! Watermark extension of the ring buffer for XON/XOFF flow control.

use super::RingBuffer;

/// A ring buffer with high/low occupancy watermarks.
///
/// The predicates are level-triggered: they report the current
/// condition on every call and never remember having fired. Tracking
/// "already paused" is the caller's job, so the hysteresis band between
/// the two watermarks is what prevents XOFF/XON flapping when occupancy
/// hovers near a single cutoff.
#[derive(Debug)]
pub struct FlowControlBuffer<const N: usize> {
    ring: RingBuffer<N>,
    high: usize,
    low: usize,
}

impl<const N: usize> FlowControlBuffer<N> {
    /// Creates a buffer with absolute watermark counts.
    ///
    /// # Panics
    ///
    /// Panics unless `low < high <= N`: a high watermark at or below
    /// the low one would make the two predicates overlap.
    pub fn new(high: usize, low: usize) -> Self {
        assert!(low < high, "low watermark must be below high watermark");
        assert!(high <= N, "high watermark cannot exceed capacity");
        Self {
            ring: RingBuffer::new(),
            high,
            low,
        }
    }

    /// Creates a buffer with watermarks as percentages of capacity.
    ///
    /// Reference sizing is 75% high, 25% low.
    pub fn from_percent(high_pct: usize, low_pct: usize) -> Self {
        Self::new(N * high_pct / 100, N * low_pct / 100)
    }

    /// True when occupancy has reached the high watermark and the
    /// producer side should ask the peer to pause.
    pub fn should_send_xoff(&self) -> bool {
        self.ring.count() >= self.high
    }

    /// True when occupancy has drained to the low watermark.
    ///
    /// Meant to be consulted only while the caller considers itself
    /// paused.
    pub fn should_send_xon(&self) -> bool {
        self.ring.count() <= self.low
    }

    /// Returns the high watermark as an absolute count.
    pub fn high_watermark(&self) -> usize {
        self.high
    }

    /// Returns the low watermark as an absolute count.
    pub fn low_watermark(&self) -> usize {
        self.low
    }

    /// Stores one byte; see [`RingBuffer::put`].
    pub fn put(&self, byte: u8) -> bool {
        self.ring.put(byte)
    }

    /// Pops one byte; see [`RingBuffer::get`].
    pub fn get(&self) -> Option<u8> {
        self.ring.get()
    }

    /// Returns the number of buffered bytes.
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    /// Returns the remaining free space.
    pub fn free(&self) -> usize {
        self.ring.free()
    }

    /// Returns the buffer capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Discards all buffered bytes; see [`RingBuffer::clear`].
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}
