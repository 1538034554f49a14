//! Unit quaternions in rig slot order (x, y, z, w)

use std::ops::Mul;

use rigstream_core::RigValue;

/// Below this squared length a quaternion is treated as degenerate
const DEGENERATE_NORM_SQ: f32 = 1.0e-8;

/// Above this cosine slerp falls back to normalized lerp
const NLERP_THRESHOLD: f32 = 0.9995;

/// Rotation quaternion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Rotation of `angle` radians about a unit `axis`
    pub fn from_axis_angle(axis: [f32; 3], angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            x: axis[0] * s,
            y: axis[1] * s,
            z: axis[2] * s,
            w: c,
        }
    }

    pub fn dot(&self, other: &Rotation) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn norm_sq(&self) -> f32 {
        self.dot(self)
    }

    pub fn conjugate(&self) -> Rotation {
        Rotation {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Multiplicative inverse; identity for a degenerate quaternion
    pub fn inverse(&self) -> Rotation {
        let n = self.norm_sq();
        if n < DEGENERATE_NORM_SQ {
            return Rotation::identity();
        }
        let c = self.conjugate();
        Rotation {
            x: c.x / n,
            y: c.y / n,
            z: c.z / n,
            w: c.w / n,
        }
    }

    /// Unit-length copy; identity for a degenerate quaternion
    pub fn normalize(&self) -> Rotation {
        let n = self.norm_sq();
        if n < DEGENERATE_NORM_SQ {
            return Rotation::identity();
        }
        let len = n.sqrt();
        Rotation {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        }
    }

    /// Spherical linear interpolation along the shortest arc.
    /// `t` is clamped to [0, 1].
    pub fn slerp(&self, other: &Rotation, t: f32) -> Rotation {
        let t = t.clamp(0.0, 1.0);
        let from = self.normalize();
        let mut to = other.normalize();

        let mut dot = from.dot(&to);
        if dot < 0.0 {
            dot = -dot;
            to = Rotation {
                x: -to.x,
                y: -to.y,
                z: -to.z,
                w: -to.w,
            };
        }

        if dot > NLERP_THRESHOLD {
            return Rotation {
                x: from.x + (to.x - from.x) * t,
                y: from.y + (to.y - from.y) * t,
                z: from.z + (to.z - from.z) * t,
                w: from.w + (to.w - from.w) * t,
            }
            .normalize();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta_0 = theta_0.sin();
        let s0 = (theta_0 - theta).sin() / sin_theta_0;
        let s1 = theta.sin() / sin_theta_0;

        Rotation {
            x: from.x * s0 + to.x * s1,
            y: from.y * s0 + to.y * s1,
            z: from.z * s0 + to.z * s1,
            w: from.w * s0 + to.w * s1,
        }
    }

    /// Component-wise closeness, treating `q` and `-q` as the same rotation
    pub fn approx_eq(&self, other: &Rotation, eps: f32) -> bool {
        (self.dot(other).abs() - (self.norm_sq() * other.norm_sq()).sqrt()).abs() < eps
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`
impl Mul for Rotation {
    type Output = Rotation;

    fn mul(self, b: Rotation) -> Rotation {
        let a = self;
        Rotation {
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        }
    }
}

impl From<RigValue> for Rotation {
    fn from(v: RigValue) -> Self {
        Rotation::new(v.x(), v.y(), v.z(), v.w())
    }
}

impl From<Rotation> for RigValue {
    fn from(q: Rotation) -> Self {
        RigValue::rotation(q.x, q.y, q.z, q.w)
    }
}
