//! Error taxonomy shared by buffers, connections, and transports.

use core::fmt;

/// Errors reported by connections and transports.
///
/// Buffer-level full/empty conditions are ordinary return values
/// (`bool` / `Option`), never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Immediate write into a buffer that nothing is guaranteed to drain.
    BufferFull,

    /// No data available yet on an otherwise healthy transport.
    WouldBlock,

    /// The remote end closed; no more data will ever arrive.
    EndOfStream,

    /// Unrecoverable transport failure.
    Io,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferFull => write!(f, "Buffer full"),
            Error::WouldBlock => write!(f, "Operation would block"),
            Error::EndOfStream => write!(f, "End of stream"),
            Error::Io => write!(f, "Transport I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        let kind = match err {
            Error::BufferFull => std::io::ErrorKind::StorageFull,
            Error::WouldBlock => std::io::ErrorKind::WouldBlock,
            Error::EndOfStream => std::io::ErrorKind::UnexpectedEof,
            Error::Io => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
