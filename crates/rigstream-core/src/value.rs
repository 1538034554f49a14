//! Rig values - a 4-slot numeric tuple tagged by arity
//!
//! Unused trailing slots hold a NaN sentinel. The number of leading live
//! slots decides what the value means:
//! - slot 2 is the sentinel: scalar (blend-shape weight)
//! - slot 4 is the sentinel: offset (x, y, z translation)
//! - otherwise: rotation quaternion (x, y, z, w)

use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::{ControlId, ControlKind, RigError, RigResult};

/// Marker for an unused slot
pub const SENTINEL: f32 = f32::NAN;

/// Semantic kind of a rig value, inferred from its live slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueArity {
    Scalar,
    Offset,
    Rotation,
}

impl ValueArity {
    /// Number of live slots for this arity
    pub fn len(self) -> usize {
        match self {
            ValueArity::Scalar => 1,
            ValueArity::Offset => 3,
            ValueArity::Rotation => 4,
        }
    }
}

/// A 4-slot value; see the module docs for the arity rules
#[derive(Clone, Copy)]
pub struct RigValue(pub [f32; 4]);

impl RigValue {
    /// All four slots zero. Reads as a (degenerate) rotation.
    pub const ZERO: RigValue = RigValue([0.0, 0.0, 0.0, 0.0]);

    /// Identity quaternion (x, y, z, w)
    pub const IDENTITY_ROTATION: RigValue = RigValue([0.0, 0.0, 0.0, 1.0]);

    pub fn scalar(x: f32) -> Self {
        RigValue([x, SENTINEL, SENTINEL, SENTINEL])
    }

    pub fn offset(x: f32, y: f32, z: f32) -> Self {
        RigValue([x, y, z, SENTINEL])
    }

    pub fn rotation(x: f32, y: f32, z: f32, w: f32) -> Self {
        RigValue([x, y, z, w])
    }

    /// Build from the live components, padding the rest with the sentinel.
    /// Only 1, 3 or 4 components describe a valid value.
    pub fn from_components(components: &[f32]) -> RigResult<Self> {
        match components.len() {
            1 | 3 | 4 => {
                let mut slots = [SENTINEL; 4];
                slots[..components.len()].copy_from_slice(components);
                Ok(RigValue(slots))
            }
            n => Err(RigError::InvalidArity(n)),
        }
    }

    /// Neutral default for a control, with the arity its kind implies:
    /// identity rotation, zero offset or zero scalar
    pub fn neutral_for(control: &ControlId) -> Self {
        match control.kind() {
            ControlKind::Rotation => RigValue::IDENTITY_ROTATION,
            ControlKind::Translation => RigValue::offset(0.0, 0.0, 0.0),
            ControlKind::BlendShape => RigValue::scalar(0.0),
        }
    }

    pub fn arity(&self) -> ValueArity {
        if self.0[1].is_nan() {
            ValueArity::Scalar
        } else if self.0[3].is_nan() {
            ValueArity::Offset
        } else {
            ValueArity::Rotation
        }
    }

    /// Leading slots up to (not including) the first sentinel
    pub fn components(&self) -> &[f32] {
        let live = self.0.iter().position(|v| v.is_nan()).unwrap_or(4);
        &self.0[..live]
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.0[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.0[2]
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.0[3]
    }

    pub fn slots(&self) -> [f32; 4] {
        self.0
    }
}

impl Default for RigValue {
    fn default() -> Self {
        RigValue::ZERO
    }
}

/// Structural equality: sentinel slots compare equal to each other
impl PartialEq for RigValue {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl fmt::Debug for RigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.arity(), self.components())
    }
}

impl Add for RigValue {
    type Output = RigValue;

    fn add(self, rhs: RigValue) -> RigValue {
        RigValue([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
        ])
    }
}

impl Sub for RigValue {
    type Output = RigValue;

    fn sub(self, rhs: RigValue) -> RigValue {
        RigValue([
            self.0[0] - rhs.0[0],
            self.0[1] - rhs.0[1],
            self.0[2] - rhs.0[2],
            self.0[3] - rhs.0[3],
        ])
    }
}

impl Mul<f32> for RigValue {
    type Output = RigValue;

    fn mul(self, t: f32) -> RigValue {
        RigValue([self.0[0] * t, self.0[1] * t, self.0[2] * t, self.0[3] * t])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_inference() {
        assert_eq!(RigValue::scalar(0.3).arity(), ValueArity::Scalar);
        assert_eq!(RigValue::offset(1.0, 2.0, 3.0).arity(), ValueArity::Offset);
        assert_eq!(
            RigValue::rotation(0.0, 0.0, 0.0, 1.0).arity(),
            ValueArity::Rotation
        );
        assert_eq!(RigValue::ZERO.arity(), ValueArity::Rotation);
    }

    #[test]
    fn test_components_truncate_at_sentinel() {
        assert_eq!(RigValue::scalar(2.0).components(), &[2.0]);
        assert_eq!(RigValue::offset(1.0, 2.0, 3.0).components(), &[1.0, 2.0, 3.0]);
        assert_eq!(RigValue::IDENTITY_ROTATION.components().len(), 4);
    }

    #[test]
    fn test_from_components_rejects_bad_arity() {
        assert!(RigValue::from_components(&[]).is_err());
        assert!(RigValue::from_components(&[1.0, 2.0]).is_err());
        assert!(RigValue::from_components(&[1.0; 5]).is_err());
        assert_eq!(
            RigValue::from_components(&[1.0, 2.0, 3.0]).unwrap(),
            RigValue::offset(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_nan_slots_compare_equal() {
        assert_eq!(RigValue::scalar(1.5), RigValue::scalar(1.5));
        assert_ne!(RigValue::scalar(1.5), RigValue::offset(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_neutral_for_control() {
        assert_eq!(
            RigValue::neutral_for(&ControlId::new("Jaw:rot")),
            RigValue::IDENTITY_ROTATION
        );
        let pos = RigValue::neutral_for(&ControlId::new("Jaw:pos"));
        assert_eq!(pos, RigValue::offset(0.0, 0.0, 0.0));
        assert_eq!(pos.arity(), ValueArity::Offset);

        let blink = RigValue::neutral_for(&ControlId::new("Face:blink"));
        assert_eq!(blink, RigValue::scalar(0.0));
        assert_eq!(blink.arity(), ValueArity::Scalar);
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = RigValue::offset(1.0, 2.0, 3.0);
        let b = RigValue::offset(0.5, 0.5, 0.5);
        let d = (a - b) * 2.0;
        assert_eq!(d, RigValue::offset(1.0, 3.0, 5.0));
        assert_eq!(RigValue::ZERO + d, RigValue::offset(1.0, 3.0, 5.0));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_components_rebuild_value(
                x in -1e3f32..1e3,
                y in -1e3f32..1e3,
                z in -1e3f32..1e3,
                w in -1e3f32..1e3,
            ) {
                for v in [
                    RigValue::scalar(x),
                    RigValue::offset(x, y, z),
                    RigValue::rotation(x, y, z, w),
                ] {
                    prop_assert_eq!(RigValue::from_components(v.components()).unwrap(), v);
                }
            }
        }
    }
}
