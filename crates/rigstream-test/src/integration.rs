//! End-to-end tests
//!
//! A mock capture server feeds a live client that drives the demo rig
//! over real loopback sockets.

use std::time::Duration;

use proptest::prelude::*;
use tokio::runtime::Handle;

use rigstream_core::{ControlId, TrackerWeights};
use rigstream_pose::{construct_rig_values, Rotation};
use rigstream_runtime::client::{ClientConfig, LiveClient};
use rigstream_runtime::editor::remote_apply;
use rigstream_runtime::scene::{InMemoryRig, SceneRig};
use rigstream_transport::{ConnectionState, StreamConfig};
use rigstream_wire::{encode_control_values, ByteOrder};

use crate::fixtures::{demo_rig, demo_store, sample_weights};
use crate::server::MockCaptureServer;

// ============================================================================
// HELPERS
// ============================================================================

const TICK: Duration = Duration::from_millis(100);

fn config_for(server: &MockCaptureServer) -> ClientConfig {
    ClientConfig {
        server: "127.0.0.1".to_string(),
        port: server.port(),
        ..Default::default()
    }
}

fn weights(pairs: &[(&str, f32)]) -> TrackerWeights {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Tick with zero elapsed time until the client is connected and the
/// server has seen `connections` accepts
async fn wait_connected(
    client: &mut LiveClient,
    rig: &mut InMemoryRig,
    server: &MockCaptureServer,
    connections: usize,
) {
    for _ in 0..200 {
        client.tick(Duration::ZERO, rig);
        if client.connection_state() == ConnectionState::Connected
            && server.connections() >= connections
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("client stuck in {:?}", client.connection_state());
}

/// Tick with zero elapsed time until a frame is applied
async fn next_applied(client: &mut LiveClient, rig: &mut InMemoryRig) -> usize {
    for _ in 0..200 {
        if let Some(written) = client.tick(Duration::ZERO, rig) {
            return written;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no frame applied");
}

fn blend_shape(rig: &InMemoryRig, name: &str) -> f32 {
    rig.object("Face").and_then(|face| face.blend_shape(name)).unwrap_or(f32::NAN)
}

async fn started_client(server: &MockCaptureServer, rig: &mut InMemoryRig) -> LiveClient {
    let mut client = LiveClient::new(config_for(server), Handle::current());
    client.set_store(demo_store().unwrap());
    assert!(client.start(&*rig).is_empty());
    wait_connected(&mut client, rig, server, 1).await;
    client
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_frames_drive_rig() {
    let server = MockCaptureServer::bind().await.unwrap();
    let mut rig = demo_rig();
    let mut client = started_client(&server, &mut rig).await;

    server
        .send_weights(&weights(&[("left_blink", 1.0), ("mouth_open", 0.5)]))
        .unwrap();
    assert_eq!(next_applied(&mut client, &mut rig).await, 14);

    assert_eq!(blend_shape(&rig, "blink_L"), 1.0);
    assert_eq!(blend_shape(&rig, "blink_R"), 0.0);

    let jaw = rig.object("Jaw").unwrap();
    assert!((jaw.position[1] + 0.01).abs() < 1e-6);
    assert!((jaw.position[2] - 0.005).abs() < 1e-6);
    let half_open = Rotation::from_axis_angle([1.0, 0.0, 0.0], 0.175);
    assert!(jaw.rotation.approx_eq(&half_open, 1e-4));

    // Expressions absent from the frame leave their controls at neutral
    let eye = rig.read_control(&ControlId::new("LeftEye:rot")).unwrap();
    assert!(Rotation::from(eye).approx_eq(&Rotation::identity(), 1e-6));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_legacy_setup_plays_current_frames() {
    let server = MockCaptureServer::bind().await.unwrap();
    let mut rig = demo_rig();

    let legacy = demo_store()
        .unwrap()
        .save()
        .replace("\"left_blink\"", "\"eyes_leftEye_blink\"")
        .replace("\"mouth_left_smile\"", "\"smile_big_left\"");

    let mut client = LiveClient::new(config_for(&server), Handle::current());
    client.load_setup(&legacy).unwrap();
    assert!(client.start(&rig).is_empty());
    wait_connected(&mut client, &mut rig, &server, 1).await;

    server
        .send_weights(&weights(&[("left_blink", 1.0), ("mouth_left_smile", 0.5)]))
        .unwrap();
    next_applied(&mut client, &mut rig).await;

    assert_eq!(blend_shape(&rig, "blink_L"), 1.0);
    assert_eq!(blend_shape(&rig, "smile_L"), 0.5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reconnects_after_server_drop() {
    let server = MockCaptureServer::bind().await.unwrap();
    let mut rig = demo_rig();
    let mut client = started_client(&server, &mut rig).await;

    server.drop_clients();
    for _ in 0..5 {
        client.tick(TICK, &mut rig);
    }
    assert_eq!(client.connection_state(), ConnectionState::WaitingReconnect);

    client.tick(Duration::from_millis(500), &mut rig);
    assert_eq!(client.connection_state(), ConnectionState::Connecting);
    wait_connected(&mut client, &mut rig, &server, 2).await;
    assert_eq!(client.stream().stats().connect_attempts, 2);

    server.send_weights(&weights(&[("right_blink", 0.25)])).unwrap();
    next_applied(&mut client, &mut rig).await;
    assert_eq!(blend_shape(&rig, "blink_R"), 0.25);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_big_endian_headers() {
    let server = MockCaptureServer::bind_with(ByteOrder::BigEndian).await.unwrap();
    let mut rig = demo_rig();

    let config = ClientConfig {
        stream: StreamConfig {
            byte_order: ByteOrder::BigEndian,
            ..Default::default()
        },
        ..config_for(&server)
    };
    let mut client = LiveClient::new(config, Handle::current());
    client.set_store(demo_store().unwrap());
    client.start(&rig);
    wait_connected(&mut client, &mut rig, &server, 1).await;

    server.send_weights(&weights(&[("left_brow_up", 0.75)])).unwrap();
    next_applied(&mut client, &mut rig).await;
    assert_eq!(blend_shape(&rig, "brow_up_L"), 0.75);
    assert_eq!(client.weights()["left_brow_up"], 0.75);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_replayed_frames_keep_arriving() {
    let server = MockCaptureServer::bind().await.unwrap();
    let mut rig = demo_rig();
    let mut client = started_client(&server, &mut rig).await;

    let frames = (0..4).map(|i| sample_weights(i as f32 * 0.75)).collect();
    let _replay = server.replay(frames, Duration::from_millis(5)).unwrap();

    for _ in 0..6 {
        next_applied(&mut client, &mut rig).await;
    }
    assert!(client.stream().stats().frames_received >= 6);
    assert_eq!(client.stream().stats().decode_failures, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbage_frame_is_survived() {
    let server = MockCaptureServer::bind().await.unwrap();
    let mut rig = demo_rig();
    let mut client = started_client(&server, &mut rig).await;

    server.send_weights(&weights(&[("left_blink", 0.5)])).unwrap();
    next_applied(&mut client, &mut rig).await;

    server.send_body(b"not a tracker frame").unwrap();
    server.send_weights(&weights(&[("left_blink", 1.0)])).unwrap();

    let mut seen = Vec::new();
    while seen.last() != Some(&1.0) && seen.len() < 5 {
        next_applied(&mut client, &mut rig).await;
        seen.push(blend_shape(&rig, "blink_L"));
    }
    assert_eq!(seen.last(), Some(&1.0));
    assert_eq!(client.stream().stats().decode_failures, 1);
    assert_eq!(client.connection_state(), ConnectionState::Connected);
}

#[test]
fn test_dictionary_round_trip_through_rig() {
    let store = demo_store().unwrap();
    let offsets = store.neutral_offsets();
    let values = construct_rig_values(&store, &sample_weights(1.3), &offsets);

    let mut rig = demo_rig();
    let applied = remote_apply(&mut rig, &encode_control_values(&values)).unwrap();
    assert_eq!(applied, values.len());

    for (control, value) in &values {
        let read = rig.read_control(control).unwrap();
        for (a, b) in read.components().iter().zip(value.components()) {
            assert!((a - b).abs() < 1e-5, "{}: {:?} vs {:?}", control, read, value);
        }
    }
}

proptest! {
    #[test]
    fn prop_blended_values_are_finite(t in 0.0f32..60.0) {
        let store = demo_store().unwrap();
        let values = construct_rig_values(&store, &sample_weights(t), &store.neutral_offsets());
        prop_assert_eq!(values.len(), 14);
        for value in values.values() {
            prop_assert!(value.components().iter().all(|c| c.is_finite()));
        }
    }
}
