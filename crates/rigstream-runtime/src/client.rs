//! Live client
//!
//! Per tick: pull the newest tracker frame from the stream client, blend
//! it against the loaded expression set and write the result to the rig.

use std::path::Path;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, warn};

use rigstream_core::{ControlId, ControlValues, RigResult, TrackerWeights};
use rigstream_pose::construct_rig_values;
use rigstream_state::ExpressionStore;
use rigstream_transport::{ConnectionState, StreamClient, StreamConfig, DEFAULT_PORT};

use crate::editor::{apply_control_values, validate_controls};
use crate::scene::SceneRig;

/// Live client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Capture server host
    pub server: String,
    pub port: u16,
    /// Connect as part of [`LiveClient::start`]
    pub connect_on_start: bool,
    pub stream: StreamConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server: "localhost".to_string(),
            port: DEFAULT_PORT,
            connect_on_start: true,
            stream: StreamConfig::default(),
        }
    }
}

/// Drives a rig from a capture server
#[derive(Debug)]
pub struct LiveClient {
    config: ClientConfig,
    stream: StreamClient,
    store: Option<ExpressionStore>,
    offsets: ControlValues,
    weights: TrackerWeights,
}

impl LiveClient {
    /// Connection tasks run on `runtime`
    pub fn new(config: ClientConfig, runtime: Handle) -> Self {
        let stream = StreamClient::new(config.stream.clone(), runtime);
        LiveClient {
            config,
            stream,
            store: None,
            offsets: ControlValues::new(),
            weights: TrackerWeights::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stream(&self) -> &StreamClient {
        &self.stream
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.stream.state()
    }

    /// Loaded expression set, if any
    pub fn store(&self) -> Option<&ExpressionStore> {
        self.store.as_ref()
    }

    /// Offsets captured by the last [`start`](Self::start)
    pub fn offsets(&self) -> &ControlValues {
        &self.offsets
    }

    /// Weights of the last frame received
    pub fn weights(&self) -> &TrackerWeights {
        &self.weights
    }

    /// Load a character setup. A failed load keeps the previous one.
    pub fn load_setup(&mut self, text: &str) -> RigResult<()> {
        let mut store = ExpressionStore::new();
        store.load(text)?;
        self.store = Some(store);
        Ok(())
    }

    pub fn load_setup_file(&mut self, path: impl AsRef<Path>) -> RigResult<()> {
        let mut store = ExpressionStore::new();
        store.load_file(path)?;
        self.store = Some(store);
        Ok(())
    }

    pub fn set_store(&mut self, store: ExpressionStore) {
        self.store = Some(store);
    }

    /// Check the setup against the rig, take the neutral offsets and
    /// connect if configured to. Returns the controls the rig is missing.
    pub fn start(&mut self, rig: &dyn SceneRig) -> Vec<ControlId> {
        let mut missing = Vec::new();
        match &self.store {
            Some(store) => {
                missing = validate_controls(rig, store.controls());
                if !missing.is_empty() {
                    let names: Vec<&str> = missing.iter().map(ControlId::as_str).collect();
                    warn!("These controls are not in the scene: {}", names.join(", "));
                }
                self.offsets = store.neutral_offsets();
                info!("Loaded character setup");
            }
            None => info!("No character setup loaded"),
        }

        if self.config.connect_on_start {
            self.stream.connect(self.config.server.clone(), self.config.port);
        }
        info!("Live client started");
        missing
    }

    /// Advance by `dt`. When a frame arrives and a setup is loaded, the
    /// blended values are written to `rig`; returns how many were written.
    pub fn tick(&mut self, dt: Duration, rig: &mut dyn SceneRig) -> Option<usize> {
        let weights = self.stream.update(dt)?;
        if weights.is_empty() {
            return None;
        }
        self.weights = weights;

        let store = self.store.as_ref()?;
        let values = construct_rig_values(store, &self.weights, &self.offsets);
        Some(apply_control_values(rig, &values))
    }

    /// Turn streaming on or off
    pub fn set_streaming(&mut self, streaming: bool) {
        self.config.connect_on_start = streaming;
        if streaming {
            self.stream.connect(self.config.server.clone(), self.config.port);
        } else {
            self.stream.disconnect();
        }
    }

    pub fn stop(&mut self) {
        self.stream.disconnect();
        info!("Live client stopped");
    }
}
