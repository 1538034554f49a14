//! Blend engine
//!
//! Combines one tracker frame with the expression store and the neutral
//! offsets into a value for every control.

use std::collections::BTreeSet;

use rigstream_core::{ControlId, ControlValues, RigValue, TrackerWeights, ValueArity};
use rigstream_state::ExpressionStore;

use crate::rotation::Rotation;

/// Blend every in-use, weighted expression on top of `offsets`.
///
/// Expressions are applied in store declaration order; for rotations this
/// order decides the composition. An attr names the first expression that
/// carries it; later ones with the same attr are never blended. A control
/// with no entry in `offsets` starts from its synthesized rest value.
/// Weights for attributes the store does not have are ignored.
pub fn construct_rig_values(
    store: &ExpressionStore,
    weights: &TrackerWeights,
    offsets: &ControlValues,
) -> ControlValues {
    let mut result = offsets.clone();
    let controls = store.controls();
    let mut seen = BTreeSet::new();

    for expression in store.expressions() {
        if !seen.insert(expression.attr.as_str()) || !expression.in_use {
            continue;
        }
        let Some(&weight) = weights.get(&expression.attr) else {
            continue;
        };

        for (control, value) in controls.iter().zip(&expression.values) {
            let offset = offset_for(offsets, control);
            let slot = result.entry(control.clone()).or_insert(offset);
            *slot = blend_slot(*slot, *value, offset, weight);
        }
    }

    result
}

fn offset_for(offsets: &ControlValues, control: &ControlId) -> RigValue {
    offsets
        .get(control)
        .copied()
        .unwrap_or_else(|| RigValue::neutral_for(control))
}

/// Apply one weighted expression value to the running result of a control.
/// A value whose arity differs from the offset's leaves `current` as is.
pub fn blend_slot(current: RigValue, value: RigValue, offset: RigValue, weight: f32) -> RigValue {
    if value.arity() != offset.arity() {
        return current;
    }
    match value.arity() {
        ValueArity::Scalar => {
            let mut out = current;
            out.0[0] += value.x() * weight;
            out
        }
        ValueArity::Offset => current + (value - offset) * weight,
        ValueArity::Rotation => {
            let diff = Rotation::from(value) * Rotation::from(offset).inverse();
            let partial = Rotation::identity().slerp(&diff, weight);
            (partial * Rotation::from(current)).into()
        }
    }
}
