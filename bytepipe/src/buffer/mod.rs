//! Buffer layer for the transport abstraction.
//!
//! This module provides the buffer building blocks:
//! - RingBuffer: bounded SPSC circular byte buffer
//! - FlowControlBuffer: ring buffer with XON/XOFF watermark predicates

mod flow;
mod ring;

pub use flow::FlowControlBuffer;
pub use ring::RingBuffer;
