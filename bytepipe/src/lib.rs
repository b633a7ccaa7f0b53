//! # Bytepipe - A Backpressure-Aware Byte-Stream Transport
//!
//! Bytepipe is a `no_std` compatible byte-stream transport abstraction
//! that provides:
//!
//! - **Bounded buffering**: Fixed-capacity ring buffers, safe for one
//!   producer and one consumer running truly concurrently
//! - **Flow control**: High/low watermark predicates driving an in-band
//!   XON/XOFF backpressure handshake
//! - **A uniform connection contract**: Non-blocking and blocking reads,
//!   complete writes, and readiness queries over any transport
//! - **An in-memory pipe**: A bidirectional channel built from two ring
//!   buffers, usable as a test double or an intra-process transport
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! ├─────────────────────────────────────────────────────────┤
//! │                  Connection Contract                     │
//! │  ┌─────────────────┐        ┌─────────────────────┐     │
//! │  │     PipeEnd     │        │   FlowConnection    │     │
//! │  └─────────────────┘        └─────────────────────┘     │
//! ├─────────────────────────────────────────────────────────┤
//! │                     Buffer Layer                         │
//! │  ┌─────────────┐ ┌──────────────────┐                   │
//! │  │ RingBuffer  │ │ FlowControlBuffer│                   │
//! │  └─────────────┘ └──────────────────┘                   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Transport Layer                       │
//! │  ┌─────────────────────────────────────────────────┐    │
//! │  │          Custom Transport (read/write)          │    │
//! │  └─────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use bytepipe::{Config, Connection, FlowConnection};
//!
//! let mut conn: FlowConnection<_, 4096> =
//!     FlowConnection::new(transport, Config::default().with_flow_control(true));
//!
//! // Send data
//! conn.write(b"Hello, World!")?;
//!
//! // Receive data
//! let mut buf = [0u8; 32];
//! let n = conn.try_read(&mut buf)?;
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod connection;
pub mod error;
#[cfg(feature = "alloc")]
pub mod pipe;
pub mod transport;

// Re-export commonly used types
pub use adapter::FlowConnection;
pub use buffer::{FlowControlBuffer, RingBuffer};
pub use config::Config;
pub use connection::Connection;
pub use error::{Error, Result};
#[cfg(feature = "alloc")]
pub use pipe::{Pipe, PipeEnd};
pub use transport::Transport;

/// In-band control byte asking the peer to resume sending.
pub const XON: u8 = 0x11;

/// In-band control byte asking the peer to pause sending.
pub const XOFF: u8 = 0x13;
