//! Pose editing helpers
//!
//! The authoring workflow without a GUI: pick objects, turn them into
//! controls, pose the rig and capture the pose into an expression.

use tracing::{debug, warn};

use rigstream_core::{ControlId, ControlValues, RigError, RigResult};
use rigstream_state::ExpressionStore;
use rigstream_wire::decode_control_values;

use crate::scene::SceneRig;

/// Every control of the named objects, in object order. Objects the scene
/// does not have are skipped.
pub fn scene_controls<I, S>(rig: &dyn SceneRig, objects: I) -> Vec<ControlId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut controls = Vec::new();
    for object in objects {
        let object = object.as_ref();
        match rig.controls_for_object(object) {
            Some(found) => controls.extend(found),
            None => debug!(object, "Object not in scene"),
        }
    }
    controls
}

/// Controls the scene cannot resolve
pub fn validate_controls(rig: &dyn SceneRig, controls: &[ControlId]) -> Vec<ControlId> {
    controls
        .iter()
        .filter(|c| !rig.has_control(c))
        .cloned()
        .collect()
}

/// Current scene values of the controls the scene has
pub fn read_controls(rig: &dyn SceneRig, controls: &[ControlId]) -> ControlValues {
    controls
        .iter()
        .filter_map(|c| rig.read_control(c).map(|v| (c.clone(), v)))
        .collect()
}

/// Write every value the scene accepts. Returns the number written.
pub fn apply_control_values(rig: &mut dyn SceneRig, values: &ControlValues) -> usize {
    let mut written = 0;
    for (control, value) in values {
        if rig.write_control(control, *value) {
            written += 1;
        }
    }
    written
}

/// Apply values sent in the tab-separated dictionary form
pub fn remote_apply(rig: &mut dyn SceneRig, text: &str) -> RigResult<usize> {
    let values = decode_control_values(text)?;
    Ok(apply_control_values(rig, &values))
}

/// Store the current scene pose into `attr` and mark it in use.
///
/// Does nothing when the store has no controls yet. Returns the number
/// of slots captured.
pub fn capture_pose(
    store: &mut ExpressionStore,
    rig: &dyn SceneRig,
    attr: &str,
) -> RigResult<usize> {
    if store.expression(attr).is_none() {
        return Err(RigError::ExpressionNotFound(attr.to_string()));
    }
    if store.controls().is_empty() {
        return Ok(0);
    }

    let values = read_controls(rig, store.controls());
    let missing = store.controls().len() - values.len();
    if missing > 0 {
        warn!(attr, missing, "Some controls are not in the scene; keeping their stored values");
    }

    let captured = store.set_control_values(attr, &values)?;
    store.set_in_use(attr, true)?;
    Ok(captured)
}

/// Pose the rig with the stored values of `attr`
pub fn show_pose(store: &ExpressionStore, rig: &mut dyn SceneRig, attr: &str) -> RigResult<usize> {
    let values = store.control_values(attr)?;
    Ok(apply_control_values(rig, &values))
}

/// Pose the rig with the neutral offsets
pub fn reset_to_neutral(store: &ExpressionStore, rig: &mut dyn SceneRig) -> usize {
    apply_control_values(rig, &store.neutral_offsets())
}
