//! Tracker weights and control value maps

use std::collections::BTreeMap;

use crate::{ControlId, RigValue};

/// Reserved expression attribute holding the neutral pose
pub const NEUTRAL_ATTR: &str = "neutral";

/// One decoded server update: expression attribute -> live weight.
/// Weights are conventionally in [0, 1] but never clamped.
pub type TrackerWeights = BTreeMap<String, f32>;

/// Control -> value mapping, as produced by blending or read from a rig
pub type ControlValues = BTreeMap<ControlId, RigValue>;
