//! Tick-driven stream client
//!
//! The client never blocks. The owner calls [`StreamClient::update`] once
//! per tick with the elapsed time; socket work happens on the connection
//! task and is picked up here. Timeouts are counted down from those tick
//! deltas, so a stalled tick loop never loses a connection on its own.
//!
//! ```text
//! Disconnected -> Connecting -> Connected <-> WaitingReconnect -> Connecting ...
//! ```

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use rigstream_core::TrackerWeights;
use rigstream_wire::decode_tracker_frame;

use crate::config::StreamConfig;
use crate::link::{Link, LinkEvent};

/// Connection state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    WaitingReconnect,
}

/// Client counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub frames_received: u64,
    pub decode_failures: u64,
    pub connect_attempts: u64,
    pub connections_lost: u64,
}

/// Capture server client
pub struct StreamClient {
    config: StreamConfig,
    runtime: Handle,
    state: ConnectionState,
    endpoint: Option<(String, u16)>,
    link: Option<Link>,
    /// Bumped for every new link and on disconnect
    generation: u64,
    /// Time left before a silent connection counts as lost
    timeout_left: Duration,
    /// Time left before the next dial
    reconnect_left: Duration,
    last_weights: Option<TrackerWeights>,
    stats: StreamStats,
}

impl StreamClient {
    /// Create a disconnected client whose connection tasks run on `runtime`
    pub fn new(config: StreamConfig, runtime: Handle) -> Self {
        Self {
            timeout_left: config.frame_timeout,
            reconnect_left: config.reconnect_delay,
            config,
            runtime,
            state: ConnectionState::Disconnected,
            endpoint: None,
            link: None,
            generation: 0,
            last_weights: None,
            stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Last endpoint passed to [`connect`](Self::connect)
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        self.endpoint.as_ref().map(|(host, port)| (host.as_str(), *port))
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Start connecting to `host:port`. Returns immediately; any previous
    /// connection is dropped first.
    pub fn connect(&mut self, host: impl Into<String>, port: u16) {
        let host = host.into();
        self.link = None;
        self.generation += 1;
        self.stats.connect_attempts += 1;

        info!(host = %host, port, "Connecting to capture server");
        self.link = Some(Link::spawn(
            &self.runtime,
            host.clone(),
            port,
            self.config.clone(),
            self.generation,
        ));
        self.endpoint = Some((host, port));
        self.state = ConnectionState::Connecting;
    }

    /// Drop the connection from any state. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.link = None;
        if self.state != ConnectionState::Disconnected {
            debug!("Disconnecting from capture server");
        }
        self.generation += 1;
        self.state = ConnectionState::Disconnected;
    }

    /// Advance the client by `dt`. Returns the weights of a newly received
    /// frame; when that frame fails to decode, the last good weights are
    /// returned instead and the read is re-armed rather than left for the
    /// timeout to reconnect.
    pub fn update(&mut self, dt: Duration) -> Option<TrackerWeights> {
        match self.state {
            ConnectionState::Disconnected => None,
            ConnectionState::WaitingReconnect => {
                self.reconnect_left = self.reconnect_left.saturating_sub(dt);
                if self.reconnect_left.is_zero() {
                    if let Some((host, port)) = self.endpoint.clone() {
                        self.connect(host, port);
                    } else {
                        self.state = ConnectionState::Disconnected;
                    }
                }
                None
            }
            ConnectionState::Connecting => {
                match self.poll_link() {
                    Some(LinkEvent::Connected) => {
                        if let Some((host, port)) = self.endpoint() {
                            info!(host, port, "Connected to capture server");
                        }
                        self.state = ConnectionState::Connected;
                        self.timeout_left = self.config.frame_timeout;
                    }
                    Some(LinkEvent::Failed(e)) => {
                        warn!("Capture server connection failed: {}", e);
                        self.wait_reconnect();
                    }
                    Some(LinkEvent::Lost(e)) => {
                        warn!("Capture server connection lost while connecting: {}", e);
                        self.wait_reconnect();
                    }
                    Some(LinkEvent::Frame(_)) | None => {}
                }
                None
            }
            ConnectionState::Connected => match self.poll_link() {
                Some(LinkEvent::Frame(body)) => self.accept_frame(&body),
                Some(LinkEvent::Lost(e)) => {
                    // The budget below still decides when to reconnect
                    warn!("Capture stream read failed: {}", e);
                    self.tick_timeout(dt);
                    None
                }
                _ => {
                    self.tick_timeout(dt);
                    None
                }
            },
        }
    }

    fn poll_link(&mut self) -> Option<LinkEvent> {
        self.link.as_mut().and_then(Link::poll)
    }

    fn accept_frame(&mut self, body: &[u8]) -> Option<TrackerWeights> {
        self.stats.frames_received += 1;
        self.timeout_left = self.config.frame_timeout;
        if let Some(link) = &self.link {
            link.rearm();
        }

        match decode_tracker_frame(body) {
            Ok(weights) => {
                self.last_weights = Some(weights.clone());
                Some(weights)
            }
            Err(e) => {
                self.stats.decode_failures += 1;
                debug!("Dropping undecodable frame: {}", e);
                self.last_weights.clone()
            }
        }
    }

    fn tick_timeout(&mut self, dt: Duration) {
        self.timeout_left = self.timeout_left.saturating_sub(dt);
        if self.timeout_left.is_zero() {
            warn!(
                "No frame from capture server for {:?}, reconnecting",
                self.config.frame_timeout
            );
            self.stats.connections_lost += 1;
            self.wait_reconnect();
        }
    }

    fn wait_reconnect(&mut self) {
        self.link = None;
        self.generation += 1;
        self.reconnect_left = self.config.reconnect_delay;
        self.state = ConnectionState::WaitingReconnect;
    }
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("state", &self.state)
            .field("endpoint", &self.endpoint)
            .field("stats", &self.stats)
            .finish()
    }
}
