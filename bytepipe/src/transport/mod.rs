//! Raw byte transport abstraction.
//!
//! This module provides the `Transport` trait that the generic adapter
//! drives: a byte source/sink over any physical channel (serial port,
//! TCP socket, USB CDC, etc.)
//!
//! # Implementations
//!
//! - `LoopbackTransport`: In-memory loopback for testing
//! - `StdTransport`: Wraps std::io Read/Write types (requires `std` feature)
//!
//! # Example
//!
//! ```rust,ignore
//! use bytepipe::transport::{Transport, LoopbackTransport};
//!
//! let mut transport = LoopbackTransport::<1024>::new();
//! transport.write(b"Hello")?;
//!
//! let mut buf = [0u8; 32];
//! let n = transport.read(&mut buf)?;
//! assert_eq!(&buf[..n], b"Hello");
//! ```

use crate::buffer::RingBuffer;
use crate::connection::yield_now;
use crate::error::{Error, Result};

/// Transport trait for reading and writing raw bytes.
///
/// This is the boundary with the physical channel. Implementations
/// must keep the two end-of-data conditions distinct: `Ok(0)` from
/// `read` means the stream is permanently over, `Err(WouldBlock)`
/// means nothing has arrived yet.
pub trait Transport {
    /// Reads bytes into the buffer.
    ///
    /// Returns the number of bytes read. `Ok(0)` signals permanent end
    /// of stream; `Err(WouldBlock)` signals an empty but healthy
    /// channel. Any other error is fatal.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Writes bytes from the buffer.
    ///
    /// Returns the number of bytes accepted, which may be short.
    /// `Err(WouldBlock)` signals transient backpressure.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Flushes any buffered data.
    fn flush(&mut self) -> Result<()>;

    /// Writes all bytes, retrying transient backpressure until complete.
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.write(&buf[written..]) {
                Ok(0) => return Err(Error::Io),
                Ok(n) => written += n,
                Err(Error::WouldBlock) => yield_now(),
                Err(e) => return Err(e),
            }
        }
        self.flush()
    }
}

/// A loopback transport for testing.
///
/// Data written is immediately available to be read back. `close`
/// scripts a permanent end of stream: reads drain the remaining bytes,
/// then report `Ok(0)`.
#[derive(Debug)]
pub struct LoopbackTransport<const N: usize> {
    buffer: RingBuffer<N>,
    closed: bool,
}

impl<const N: usize> LoopbackTransport<N> {
    /// Creates a new open loopback transport.
    pub fn new() -> Self {
        Self {
            buffer: RingBuffer::new(),
            closed: false,
        }
    }

    /// Returns the number of bytes available to read.
    pub fn available(&self) -> usize {
        self.buffer.count()
    }

    /// Marks the transport permanently closed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns true once the transport has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<const N: usize> Default for LoopbackTransport<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Transport for LoopbackTransport<N> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.buffer.get() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 && !buf.is_empty() {
            if self.closed {
                return Ok(0);
            }
            return Err(Error::WouldBlock);
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::Io);
        }
        let mut n = 0;
        for &b in buf {
            if !self.buffer.put(b) {
                break;
            }
            n += 1;
        }
        if n == 0 && !buf.is_empty() {
            return Err(Error::WouldBlock);
        }
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Wrapper adapting std::io types to the transport contract.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct StdTransport<T> {
    inner: T,
}

#[cfg(feature = "std")]
impl<T> StdTransport<T> {
    /// Creates a new StdTransport wrapping the given type.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns a reference to the inner type.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Returns a mutable reference to the inner type.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consumes the wrapper and returns the inner type.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<T: std::io::Read + std::io::Write> Transport for StdTransport<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match std::io::Read::read(&mut self.inner, buf) {
            Ok(n) => Ok(n),
            Err(e) => match e.kind() {
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted => {
                    Err(Error::WouldBlock)
                }
                _ => Err(Error::Io),
            },
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match std::io::Write::write(&mut self.inner, buf) {
            Ok(n) => Ok(n),
            Err(e) => match e.kind() {
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted => {
                    Err(Error::WouldBlock)
                }
                _ => Err(Error::Io),
            },
        }
    }

    fn flush(&mut self) -> Result<()> {
        match std::io::Write::flush(&mut self.inner) {
            Ok(()) => Ok(()),
            Err(e) => match e.kind() {
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted => {
                    Err(Error::WouldBlock)
                }
                _ => Err(Error::Io),
            },
        }
    }
}
