//! Generic flow-controlled transport adapter.
//!
//! One adapter serves every physical backend: anything that can source
//! and sink raw bytes through the [`Transport`] trait gets buffering,
//! the XON/XOFF handshake, and the [`Connection`] contract from here.
//! The adapter owns its buffer and is constructed explicitly, then
//! handed to the application.
//!
//! The handshake is edge-triggered on top of the buffer's
//! level-triggered predicates: the adapter tracks whether it is
//! paused and transmits each control byte exactly once per
//! transition. The buffer itself never transmits anything.

use crate::buffer::FlowControlBuffer;
use crate::config::Config;
use crate::connection::{Connection, yield_now};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::{XOFF, XON};

/// Bytes pulled from the transport per pump pass.
const PUMP_CHUNK: usize = 64;

/// A [`Connection`] over any byte transport, with buffering and
/// XON/XOFF flow control.
///
/// `N` is the receive buffer capacity. Watermarks are derived from it
/// via the [`Config`] percentages.
#[derive(Debug)]
pub struct FlowConnection<T, const N: usize> {
    transport: T,
    ring: FlowControlBuffer<N>,
    max_read_size: usize,
    flow_control: bool,

    /// Set after transmitting XOFF, cleared after XON. Owned here, not
    /// in the buffer: the predicates stay level-triggered.
    paused: bool,

    /// Sticky record of producer-side data loss.
    overflow: bool,

    /// A control byte the transport refused to accept yet.
    pending_ctl: Option<u8>,

    closed: bool,
}

impl<T: Transport, const N: usize> FlowConnection<T, N> {
    /// Creates an adapter over the given transport.
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            ring: FlowControlBuffer::from_percent(
                config.high_watermark_pct,
                config.low_watermark_pct,
            ),
            max_read_size: config.max_read_size,
            flow_control: config.flow_control,
            paused: false,
            overflow: false,
            pending_ctl: None,
            closed: false,
        }
    }

    /// Creates an adapter with the default configuration.
    pub fn with_defaults(transport: T) -> Self {
        Self::new(transport, Config::default())
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the adapter and returns the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Turns the XON/XOFF handshake on and announces readiness to the
    /// peer with an initial XON.
    pub fn enable_flow_control(&mut self) -> Result<()> {
        self.flow_control = true;
        self.paused = false;
        self.send_ctl(XON)
    }

    /// Turns the XON/XOFF handshake off.
    pub fn disable_flow_control(&mut self) {
        self.flow_control = false;
    }

    /// True once at least one received byte has been dropped because
    /// the buffer was full.
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    /// Resets the overflow indicator.
    pub fn clear_overflow(&mut self) {
        self.overflow = false;
    }

    /// True once the transport has permanently ended or failed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the number of received bytes waiting in the buffer.
    pub fn buffered(&self) -> usize {
        self.ring.count()
    }

    /// Transmits a control byte, or remembers it if the transport is
    /// backpressured.
    ///
    /// An undelivered opposite signal cancels out instead: the peer
    /// never saw it, so there is nothing to revoke on the wire.
    fn send_ctl(&mut self, byte: u8) -> Result<()> {
        match self.pending_ctl {
            Some(p) if p == byte => return Ok(()),
            Some(_) => {
                self.pending_ctl = None;
                return Ok(());
            }
            None => {}
        }
        if self.closed {
            return Err(Error::EndOfStream);
        }
        match self.transport.write(&[byte]) {
            Ok(n) if n > 0 => {
                log::debug!("sent control byte {byte:#04x}");
                Ok(())
            }
            Ok(_) | Err(Error::WouldBlock) => {
                self.pending_ctl = Some(byte);
                Ok(())
            }
            Err(e) => {
                self.closed = true;
                Err(e)
            }
        }
    }

    /// Retries a deferred control byte before any other transmission.
    fn flush_pending_ctl(&mut self) {
        let Some(byte) = self.pending_ctl else {
            return;
        };
        if self.closed {
            return;
        }
        match self.transport.write(&[byte]) {
            Ok(n) if n > 0 => {
                self.pending_ctl = None;
                log::debug!("sent deferred control byte {byte:#04x}");
            }
            Ok(_) | Err(Error::WouldBlock) => {}
            Err(_) => {
                self.closed = true;
            }
        }
    }

    /// Producer path: moves bytes from the transport into the buffer.
    ///
    /// Stops at a full buffer. A byte that arrives with no room left
    /// is dropped and recorded in the overflow indicator; after every
    /// stored byte the XOFF condition is re-checked so the pause
    /// signal goes out as soon as the high watermark is crossed.
    fn pump(&mut self) {
        if self.closed {
            return;
        }
        self.flush_pending_ctl();

        let mut chunk = [0u8; PUMP_CHUNK];
        loop {
            if self.ring.is_full() {
                break;
            }
            match self.transport.read(&mut chunk) {
                Ok(0) => {
                    log::debug!("transport reached end of stream");
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    log::trace!("pumped {n} bytes from transport");
                    for &b in &chunk[..n] {
                        if !self.ring.put(b) {
                            if !self.overflow {
                                log::warn!("receive buffer full, dropping data");
                            }
                            self.overflow = true;
                            break;
                        }
                        if self.flow_control && !self.paused && self.ring.should_send_xoff() {
                            self.paused = true;
                            let _ = self.send_ctl(XOFF);
                        }
                    }
                }
                Err(Error::WouldBlock) => break,
                Err(_) => {
                    log::debug!("transport failed, closing connection");
                    self.closed = true;
                    break;
                }
            }
        }
    }

    /// Consumer path: re-checks the resume condition after a drain.
    fn maybe_resume(&mut self) {
        if self.flow_control && self.paused && self.ring.should_send_xon() {
            self.paused = false;
            let _ = self.send_ctl(XON);
        }
    }
}

impl<T: Transport, const N: usize> Connection for FlowConnection<T, N> {
    fn try_read_one(&mut self) -> Result<Option<u8>> {
        if let Some(b) = self.ring.get() {
            self.maybe_resume();
            return Ok(Some(b));
        }
        self.pump();
        if let Some(b) = self.ring.get() {
            self.maybe_resume();
            return Ok(Some(b));
        }
        if self.closed {
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
        self.pump();

        let cap = buf.len().min(self.max_read_size);
        let mut n = 0;
        while n < cap {
            match self.ring.get() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        if n > 0 {
            self.maybe_resume();
        } else if self.closed && !buf.is_empty() {
            return Err(Error::EndOfStream);
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::EndOfStream);
        }
        self.flush_pending_ctl();

        let mut written = 0;
        while written < buf.len() {
            match self.transport.write(&buf[written..]) {
                Ok(0) | Err(Error::WouldBlock) => yield_now(),
                Ok(n) => written += n,
                Err(e) => {
                    self.closed = true;
                    return Err(e);
                }
            }
        }
        match self.transport.flush() {
            Ok(()) | Err(Error::WouldBlock) => Ok(()),
            Err(e) => {
                self.closed = true;
                Err(e)
            }
        }
    }

    fn available_for_reading(&mut self) -> bool {
        if self.ring.count() > 0 {
            return true;
        }
        self.pump();
        self.ring.count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted duplex test double: a fixed inbound tape and a capture
    /// of everything transmitted.
    struct ScriptTransport {
        rx: [u8; 256],
        rx_len: usize,
        rx_pos: usize,
        tx: [u8; 256],
        tx_len: usize,
        /// Number of upcoming writes to refuse with WouldBlock.
        block_writes: usize,
        closed: bool,
    }

    impl ScriptTransport {
        fn new(rx: &[u8]) -> Self {
            let mut t = Self {
                rx: [0; 256],
                rx_len: rx.len(),
                rx_pos: 0,
                tx: [0; 256],
                tx_len: 0,
                block_writes: 0,
                closed: false,
            };
            t.rx[..rx.len()].copy_from_slice(rx);
            t
        }

        fn sent(&self) -> &[u8] {
            &self.tx[..self.tx_len]
        }
    }

    impl Transport for ScriptTransport {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            if self.rx_pos == self.rx_len {
                if self.closed {
                    return Ok(0);
                }
                return Err(Error::WouldBlock);
            }
            let n = buf.len().min(self.rx_len - self.rx_pos);
            buf[..n].copy_from_slice(&self.rx[self.rx_pos..self.rx_pos + n]);
            self.rx_pos += n;
            Ok(n)
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            if self.block_writes > 0 {
                self.block_writes -= 1;
                return Err(Error::WouldBlock);
            }
            let n = buf.len().min(self.tx.len() - self.tx_len);
            self.tx[self.tx_len..self.tx_len + n].copy_from_slice(&buf[..n]);
            self.tx_len += n;
            Ok(n)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn flow_config() -> Config {
        Config::default().with_flow_control(true)
    }

    #[test]
    fn test_reads_arrive_in_order() {
        let transport = ScriptTransport::new(b"hello");
        let mut conn: FlowConnection<_, 16> = FlowConnection::with_defaults(transport);

        assert_eq!(conn.try_read_one().unwrap(), Some(b'h'));
        assert_eq!(conn.read_one().unwrap(), b'e');

        let mut buf = [0u8; 8];
        let n = conn.try_read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"llo");
        assert_eq!(conn.try_read_one().unwrap(), None);
    }

    #[test]
    fn test_write_passes_through() {
        let transport = ScriptTransport::new(b"");
        let mut conn: FlowConnection<_, 16> = FlowConnection::with_defaults(transport);

        conn.write(b"abc").unwrap();
        assert_eq!(conn.transport().sent(), b"abc");
    }

    #[test]
    fn test_write_retries_transient_backpressure() {
        let mut transport = ScriptTransport::new(b"");
        transport.block_writes = 2;
        let mut conn: FlowConnection<_, 16> = FlowConnection::with_defaults(transport);

        conn.write(b"payload").unwrap();
        assert_eq!(conn.transport().sent(), b"payload");
    }

    #[test]
    fn test_xoff_sent_once_at_high_watermark() {
        // Capacity 8, watermarks 6/2
        let transport = ScriptTransport::new(b"0123456789");
        let mut conn: FlowConnection<_, 8> = FlowConnection::new(transport, flow_config());

        assert!(conn.available_for_reading());
        assert_eq!(conn.transport().sent(), &[XOFF]);

        // Re-checking readiness does not re-send the signal
        assert!(conn.available_for_reading());
        assert_eq!(conn.transport().sent(), &[XOFF]);
    }

    #[test]
    fn test_xon_sent_once_after_drain() {
        let transport = ScriptTransport::new(b"0123456789");
        let mut conn: FlowConnection<_, 8> = FlowConnection::new(transport, flow_config());

        let mut buf = [0u8; 6];
        conn.read(&mut buf).unwrap();
        // Occupancy is now at or below the low watermark
        assert!(conn.buffered() <= 2);
        assert_eq!(conn.transport().sent(), &[XOFF, XON]);

        // Two bytes survived the overflow; draining them re-sends nothing
        let mut rest = [0u8; 4];
        let n = conn.try_read(&mut rest).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&rest[..n], b"67");
        assert_eq!(conn.transport().sent(), &[XOFF, XON]);
    }

    #[test]
    fn test_no_signals_without_flow_control() {
        let transport = ScriptTransport::new(b"0123456789");
        let mut conn: FlowConnection<_, 8> = FlowConnection::with_defaults(transport);

        let mut buf = [0u8; 8];
        conn.read(&mut buf).unwrap();
        assert_eq!(conn.transport().sent(), b"");
    }

    #[test]
    fn test_overflow_is_observable() {
        let transport = ScriptTransport::new(&[0xEE; 40]);
        let mut conn: FlowConnection<_, 8> = FlowConnection::with_defaults(transport);

        assert!(conn.available_for_reading());
        assert!(conn.overflowed());
        assert_eq!(conn.buffered(), 8);

        conn.clear_overflow();
        assert!(!conn.overflowed());
    }

    #[test]
    fn test_deferred_control_byte_precedes_payload() {
        let mut transport = ScriptTransport::new(b"0123456789");
        transport.block_writes = 1;
        let mut conn: FlowConnection<_, 8> = FlowConnection::new(transport, flow_config());

        // XOFF attempt hits the blocked write and is remembered
        assert!(conn.available_for_reading());
        assert_eq!(conn.transport().sent(), b"");

        // The deferred XOFF goes out before the payload
        conn.write(b"ok").unwrap();
        assert_eq!(conn.transport().sent(), &[XOFF, b'o', b'k']);
    }

    #[test]
    fn test_opposite_pending_signal_cancels() {
        let mut transport = ScriptTransport::new(b"0123456789");
        transport.block_writes = 1;
        let mut conn: FlowConnection<_, 8> = FlowConnection::new(transport, flow_config());

        // XOFF deferred by the blocked write
        assert!(conn.available_for_reading());

        // Draining below the low watermark wants XON while XOFF is
        // still undelivered: the peer never paused, nothing is sent
        let mut buf = [0u8; 6];
        conn.read(&mut buf).unwrap();
        conn.write(b"x").unwrap();
        assert_eq!(conn.transport().sent(), b"x");
    }

    #[test]
    fn test_end_of_stream_after_drain() {
        let mut transport = ScriptTransport::new(b"bye");
        transport.closed = true;
        let mut conn: FlowConnection<_, 16> = FlowConnection::with_defaults(transport);

        let mut buf = [0u8; 8];
        assert_eq!(conn.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"bye");

        assert!(conn.is_closed());
        assert!(!conn.available_for_reading());
        assert_eq!(conn.try_read_one(), Err(Error::EndOfStream));
        assert_eq!(conn.read_one(), Err(Error::EndOfStream));
        assert_eq!(conn.read(&mut buf), Err(Error::EndOfStream));
        assert_eq!(conn.write(b"x"), Err(Error::EndOfStream));
    }

    #[test]
    fn test_try_read_respects_read_cap() {
        let transport = ScriptTransport::new(&[0x42; 64]);
        let config = Config::default().with_max_read_size(4);
        let mut conn: FlowConnection<_, 128> = FlowConnection::new(transport, config);

        let mut buf = [0u8; 64];
        assert_eq!(conn.try_read(&mut buf).unwrap(), 4);
        assert_eq!(conn.try_read(&mut buf).unwrap(), 4);
    }

    #[test]
    fn test_enable_flow_control_announces_xon() {
        let transport = ScriptTransport::new(b"");
        let mut conn: FlowConnection<_, 16> = FlowConnection::with_defaults(transport);

        conn.enable_flow_control().unwrap();
        assert_eq!(conn.transport().sent(), &[XON]);
    }
}
