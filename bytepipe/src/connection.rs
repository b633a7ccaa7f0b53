//! The stream-connection capability contract.
//!
//! Every transport backend implements this trait on top of a ring
//! buffer: the in-memory [`Pipe`](crate::pipe::Pipe) as well as the
//! generic [`FlowConnection`](crate::adapter::FlowConnection) adapter.
//! The contract is a byte stream: no framing, no message boundaries.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::error::Result;

/// Capability set of a byte-stream connection.
///
/// Blocking calls poll the backend and yield control between attempts;
/// the core defines no timeout, so a stream that never produces data
/// and never closes blocks its caller indefinitely. Timeout policy
/// belongs to the adapter or the application.
pub trait Connection {
    /// Returns one byte without blocking.
    ///
    /// `Ok(None)` means no data yet; `Err(EndOfStream)` means the
    /// stream is over and fully drained.
    fn try_read_one(&mut self) -> Result<Option<u8>>;

    /// Returns one byte, suspending the caller until it arrives or the
    /// stream permanently ends.
    fn read_one(&mut self) -> Result<u8>;

    /// Fills `buf`, blocking until it is full or the stream ends.
    ///
    /// Returns the number of bytes obtained: `buf.len()` in the normal
    /// case, the shorter prefix if the stream ended first, or
    /// `Err(EndOfStream)` if it was already over and nothing was read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Copies whatever is immediately available into `buf`.
    ///
    /// Never blocks. Returns 0 up to the backend's read cap. A closed
    /// and drained stream reports `Err(EndOfStream)` instead of 0.
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Transmits all of `buf`.
    ///
    /// Backends over a physical transport retry transient backpressure
    /// internally until the write completes or the transport fails.
    /// The pipe backend instead fails fast with `BufferFull`, since
    /// nothing is guaranteed to drain the other end.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// True iff an immediately following read would return at least
    /// one byte. Never consumes buffered data.
    fn available_for_reading(&mut self) -> bool;

    /// Reads up to `max` bytes into a fresh vector, blocking like
    /// [`read`](Connection::read).
    #[cfg(feature = "alloc")]
    fn read_vec(&mut self, max: usize) -> Result<Vec<u8>> {
        let mut buf = alloc::vec![0u8; max];
        let n = self.read(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// Yields the current context between polling attempts.
#[cfg(feature = "std")]
pub(crate) fn yield_now() {
    std::thread::yield_now();
}

/// Yields the current context between polling attempts.
#[cfg(not(feature = "std"))]
pub(crate) fn yield_now() {
    core::hint::spin_loop();
}
