//! Legacy attribute renames
//!
//! Tracker attribute names changed twice over the life of the capture
//! server. Setups authored against older servers are brought forward on
//! every load by two rename batches, oldest generation first, so a name
//! from the first generation reaches its current form in one pass.

use tracing::debug;

use crate::set::{ExpressionSet, CURRENT_VERSION};

/// `(old attr, new attr)`
pub type Rename = (&'static str, &'static str);

/// First generation (LD15) to second (LD11)
pub const RENAMES_LD15_TO_LD11: &[Rename] = &[
    ("eyes_lookRight", "eyes_rotate_right"),
    ("eyes_lookLeft", "eyes_rotate_left"),
    ("eyes_lookDown", "eyes_rotate_down"),
    ("eyes_lookUp", "eyes_rotate_up"),
    ("eyes_leftEye_blink", "left_blink"),
    ("eyes_rightEye_blink", "right_blink"),
    ("brows_leftBrow_up", "left_brow_up"),
    ("brows_leftBrow_down", "left_brow_down"),
    ("brows_rightBrow_up", "right_brow_up"),
    ("brows_rightBrow_down", "right_brow_down"),
    ("brows_midBrows_up", "mid_brows_up"),
    ("brows_midBrows_down", "mid_brows_down"),
    ("jaw_open", "mouth_open"),
    ("jaw_right", "jaw_rotate_y_min"),
    ("jaw_left", "jaw_rotate_y_max"),
    ("mouth_right", "scrunch_right"),
    ("mouth_left", "scrunch_left"),
    ("mouth_leftMouth_smile", "smile_big_left"),
    ("mouth_rightMouth_smile", "smile_big_right"),
    ("mouth_leftMouth_frown", "left_frown"),
    ("mouth_rightMouth_frown", "right_frown"),
    ("mouth_phoneme_oo", "oo_tight"),
    ("mouth_upperLip_left_up", "upper_lip_left_up"),
    ("mouth_upperLip_right_up", "upper_lip_right_up"),
    ("mouth_lowerLip_left_down", "lower_lip_left_down"),
    ("mouth_lowerLip_right_down", "lower_lip_right_down"),
];

/// Second generation (LD11) to current (RT40)
pub const RENAMES_LD11_TO_RT40: &[Rename] = &[
    ("left_frown", "mouth_left_frown"),
    ("lower_lip_left_down", "lip_lower_left_down"),
    ("lower_lip_right_down", "lip_lower_right_down"),
    ("normalFV", "mouth_phoneme_fv"),
    ("oo_tight", "mouth_phoneme_oh_q"),
    ("right_frown", "mouth_right_frown"),
    ("smile_big_left", "mouth_left_smile"),
    ("smile_big_right", "mouth_right_smile"),
    ("upper_lip_left_up", "lip_upper_left_up"),
    ("upper_lip_right_up", "lip_upper_right_up"),
];

/// Batches in the order they are applied
pub const RENAME_BATCHES: &[&[Rename]] = &[RENAMES_LD15_TO_LD11, RENAMES_LD11_TO_RT40];

/// Rename the first expression carrying `old`. Returns whether one matched.
pub fn rename_attr(set: &mut ExpressionSet, old: &str, new: &str) -> bool {
    match set.expression_mut(old) {
        Some(expression) => {
            debug!(from = old, to = new, "Renaming expression attribute");
            expression.attr = new.to_string();
            true
        }
        None => false,
    }
}

/// Apply every rename batch. Returns the number of expressions renamed.
pub fn apply_renames(set: &mut ExpressionSet) -> usize {
    let mut renamed = 0;
    for batch in RENAME_BATCHES {
        for (old, new) in batch.iter() {
            if rename_attr(set, old, new) {
                renamed += 1;
            }
        }
    }
    renamed
}

/// Hook for sets written by another format version.
///
/// There are no format changes yet beyond the attribute renames, so the
/// set is left as it is.
pub fn upgrade(set: &mut ExpressionSet) {
    if set.meta.version == CURRENT_VERSION {
        return;
    }
    debug!(
        from = %set.meta.version,
        to = CURRENT_VERSION,
        "No upgrade steps for expression set version"
    );
}
