//! Configuration for flow-controlled connections.

/// Default high watermark, as a percentage of buffer capacity.
pub const DEFAULT_HIGH_WATERMARK_PCT: usize = 75;

/// Default low watermark, as a percentage of buffer capacity.
pub const DEFAULT_LOW_WATERMARK_PCT: usize = 25;

/// Default cap on the bytes returned by a single non-blocking read.
pub const DEFAULT_MAX_READ_SIZE: usize = 32;

/// Tunables of a [`FlowConnection`](crate::adapter::FlowConnection).
///
/// Buffer capacity is a const generic, fixed at construction; the
/// watermarks here are applied to it as percentages.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// High watermark, percent of capacity. Crossing it triggers XOFF.
    pub high_watermark_pct: usize,

    /// Low watermark, percent of capacity. Draining to it triggers XON.
    pub low_watermark_pct: usize,

    /// Cap on the bytes a single non-blocking read may return.
    pub max_read_size: usize,

    /// Whether the XON/XOFF handshake is active from the start.
    pub flow_control: bool,
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            high_watermark_pct: DEFAULT_HIGH_WATERMARK_PCT,
            low_watermark_pct: DEFAULT_LOW_WATERMARK_PCT,
            max_read_size: DEFAULT_MAX_READ_SIZE,
            flow_control: false,
        }
    }

    /// Sets the watermark percentages. High must stay above low.
    pub fn with_watermarks(mut self, high_pct: usize, low_pct: usize) -> Self {
        self.high_watermark_pct = high_pct;
        self.low_watermark_pct = low_pct;
        self
    }

    /// Sets the non-blocking read cap.
    pub fn with_max_read_size(mut self, size: usize) -> Self {
        self.max_read_size = size;
        self
    }

    /// Enables or disables the XON/XOFF handshake.
    pub fn with_flow_control(mut self, enable: bool) -> Self {
        self.flow_control = enable;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
