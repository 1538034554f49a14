//! Stream client configuration

use std::time::Duration;

use rigstream_wire::{ByteOrder, DEFAULT_MAX_BODY_LEN};

/// Default capture server port
pub const DEFAULT_PORT: u16 = 802;

/// Stream client configuration
#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Connection is considered lost after this long without a frame
    pub frame_timeout: Duration,
    /// Wait between losing a connection and dialing again
    pub reconnect_delay: Duration,
    /// Upper bound on a single connect attempt
    pub connect_timeout: Duration,
    /// Largest accepted frame body
    pub max_body_len: usize,
    /// Byte order of the length header
    pub byte_order: ByteOrder,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_timeout: Duration::from_millis(500),
            reconnect_delay: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(3),
            max_body_len: DEFAULT_MAX_BODY_LEN,
            byte_order: ByteOrder::LittleEndian,
        }
    }
}
