//! Demo rig, expression set and tracker frames

use std::f32::consts::TAU;

use rigstream_core::{ControlId, RigResult, RigValue, TrackerWeights, NEUTRAL_ATTR};
use rigstream_pose::Rotation;
use rigstream_runtime::editor::{capture_pose, scene_controls};
use rigstream_runtime::scene::{InMemoryRig, SceneObject, SceneRig};
use rigstream_state::ExpressionStore;

/// Blend shapes on the demo face mesh
pub const FACE_SHAPES: &[&str] = &[
    "blink_L",
    "blink_R",
    "smile_L",
    "smile_R",
    "brow_up_L",
    "brow_up_R",
];

/// Objects the demo setup is authored against
pub const DEMO_OBJECTS: &[&str] = &["Jaw", "LeftEye", "RightEye", "Face"];

/// A small face: a jaw, two eyes and a mesh with blend shapes
pub fn demo_rig() -> InMemoryRig {
    InMemoryRig::new()
        .with_object("Jaw", SceneObject::new())
        .with_object("LeftEye", SceneObject::new())
        .with_object("RightEye", SceneObject::new())
        .with_object("Face", SceneObject::with_blend_shapes(FACE_SHAPES.iter().copied()))
}

fn eye_turn(angle: f32) -> RigValue {
    Rotation::from_axis_angle([0.0, 1.0, 0.0], angle).into()
}

/// Poses captured into the demo setup: expression attr and the controls
/// moved away from rest
pub fn demo_poses() -> Vec<(&'static str, Vec<(&'static str, RigValue)>)> {
    vec![
        ("left_blink", vec![("Face:blink_L", RigValue::scalar(1.0))]),
        ("right_blink", vec![("Face:blink_R", RigValue::scalar(1.0))]),
        ("mouth_left_smile", vec![("Face:smile_L", RigValue::scalar(1.0))]),
        ("mouth_right_smile", vec![("Face:smile_R", RigValue::scalar(1.0))]),
        ("left_brow_up", vec![("Face:brow_up_L", RigValue::scalar(1.0))]),
        ("right_brow_up", vec![("Face:brow_up_R", RigValue::scalar(1.0))]),
        (
            "mouth_open",
            vec![
                ("Jaw:rot", Rotation::from_axis_angle([1.0, 0.0, 0.0], 0.35).into()),
                ("Jaw:pos", RigValue::offset(0.0, -0.02, 0.01)),
            ],
        ),
        (
            "eyes_rotate_left",
            vec![("LeftEye:rot", eye_turn(0.4)), ("RightEye:rot", eye_turn(0.4))],
        ),
        (
            "eyes_rotate_right",
            vec![("LeftEye:rot", eye_turn(-0.4)), ("RightEye:rot", eye_turn(-0.4))],
        ),
    ]
}

/// Expression set authored on [`demo_rig`] by posing it and capturing
/// each of [`demo_poses`]
pub fn demo_store() -> RigResult<ExpressionStore> {
    let rest = demo_rig();
    let mut store = ExpressionStore::from_template()?;
    store.add_controls(scene_controls(&rest, DEMO_OBJECTS))?;
    capture_pose(&mut store, &rest, NEUTRAL_ATTR)?;

    for (attr, pose) in demo_poses() {
        let mut rig = rest.clone();
        for (control, value) in pose {
            rig.write_control(&ControlId::new(control), value);
        }
        capture_pose(&mut store, &rig, attr)?;
    }
    Ok(store)
}

/// Tracker weights at time `t` seconds: periodic blinks, a slow smile,
/// jaw motion and an eye sweep
pub fn sample_weights(t: f32) -> TrackerWeights {
    let wave = |period: f32, phase: f32| 0.5 - 0.5 * (TAU * (t / period + phase)).cos();
    let sweep = (TAU * t / 4.0).sin();
    let blink = wave(3.0, 0.0).powi(16);

    [
        ("left_blink", blink),
        ("right_blink", blink),
        ("mouth_left_smile", wave(5.0, 0.1)),
        ("mouth_right_smile", wave(5.0, 0.1)),
        ("left_brow_up", wave(7.0, 0.3)),
        ("right_brow_up", wave(7.0, 0.3)),
        ("mouth_open", wave(1.5, 0.0)),
        ("eyes_rotate_left", sweep.max(0.0)),
        ("eyes_rotate_right", (-sweep).max(0.0)),
    ]
    .into_iter()
    .map(|(attr, weight)| (attr.to_string(), weight))
    .collect()
}

/// `count` frames of [`sample_weights`] spaced `step` seconds apart
pub fn sample_frames(count: usize, step: f32) -> Vec<TrackerWeights> {
    (0..count).map(|i| sample_weights(i as f32 * step)).collect()
}
