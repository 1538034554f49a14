//! rigstream live client
//!
//! Connects to a capture server and drives the demo face rig, logging the
//! pose as frames arrive. With `--replay` a local mock server plays
//! synthetic frames so no capture hardware is needed.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rigstream_runtime::client::{ClientConfig, LiveClient};
use rigstream_runtime::scene::InMemoryRig;
use rigstream_state::ExpressionStore;
use rigstream_test::{demo_rig, demo_store, sample_frames, MockCaptureServer, FACE_SHAPES};
use rigstream_transport::{ConnectionState, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(name = "rigstream-live")]
#[command(about = "Drive a demo face rig from a capture server")]
struct Args {
    /// Capture server host
    #[arg(long, default_value = "localhost")]
    server: String,

    /// Capture server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Character setup file (defaults to the built-in demo setup)
    #[arg(long)]
    setup: Option<PathBuf>,

    /// Write the setup in use to this file and exit
    #[arg(long)]
    save_setup: Option<PathBuf>,

    /// Play synthetic frames from a local mock server
    #[arg(long)]
    replay: bool,

    /// Tick interval
    #[arg(long, default_value = "16ms", value_parser = humantime::parse_duration)]
    tick: Duration,

    /// How long to run
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    duration: Duration,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let store = match &args.setup {
        Some(path) => {
            let mut store = ExpressionStore::new();
            store.load_file(path)?;
            info!("Loaded setup from {}", path.display());
            store
        }
        None => demo_store()?,
    };

    if let Some(path) = &args.save_setup {
        store.save_file(path)?;
        info!("Saved setup to {}", path.display());
        return Ok(());
    }

    // Kept alive for the whole session
    let replay_server = if args.replay {
        Some(start_replay().await?)
    } else {
        None
    };

    let config = match &replay_server {
        Some(server) => ClientConfig {
            server: "127.0.0.1".to_string(),
            port: server.port(),
            ..Default::default()
        },
        None => ClientConfig {
            server: args.server.clone(),
            port: args.port,
            ..Default::default()
        },
    };
    info!("Streaming from {}:{}", config.server, config.port);

    let mut rig = demo_rig();
    let mut client = LiveClient::new(config, Handle::current());
    client.set_store(store);
    client.start(&rig);

    run(&mut client, &mut rig, args.tick, args.duration).await;
    client.stop();

    let stats = client.stream().stats();
    info!(
        frames_received = stats.frames_received,
        decode_failures = stats.decode_failures,
        connect_attempts = stats.connect_attempts,
        connections_lost = stats.connections_lost,
        "Session finished"
    );
    Ok(())
}

async fn start_replay() -> Result<MockCaptureServer> {
    let server = MockCaptureServer::bind().await?;
    // Eight seconds of motion at 30 fps
    let _replay = server.replay(sample_frames(240, 1.0 / 30.0), Duration::from_millis(33))?;
    info!("Replay server on {}", server.local_addr());
    Ok(server)
}

async fn run(client: &mut LiveClient, rig: &mut InMemoryRig, tick: Duration, duration: Duration) {
    let mut ticker = tokio::time::interval(tick);
    let start = Instant::now();
    let mut last = start;
    let mut applied: u64 = 0;

    while last.duration_since(start) < duration {
        ticker.tick().await;
        let now = Instant::now();
        let dt = now.duration_since(last);
        last = now;

        if let Some(written) = client.tick(dt, rig) {
            applied += 1;
            debug!(written, "Frame applied");
            if applied % 30 == 0 {
                log_pose(rig, client.connection_state());
            }
        }
    }
}

fn log_pose(rig: &InMemoryRig, state: ConnectionState) {
    let Some(face) = rig.object("Face") else {
        return;
    };
    let shapes: Vec<String> = FACE_SHAPES
        .iter()
        .filter_map(|name| face.blend_shape(name).map(|w| format!("{}={:.2}", name, w)))
        .collect();
    let jaw = rig.object("Jaw").map(|o| o.rotation).unwrap_or_default();
    info!(
        ?state,
        jaw = %format!("[{:.3}, {:.3}, {:.3}, {:.3}]", jaw.x, jaw.y, jaw.z, jaw.w),
        "{}",
        shapes.join(" ")
    );
}
