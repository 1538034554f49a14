//! rigstream Pose - Blending expressions into rig values
//!
//! A tracker frame is a set of expression weights. Each weighted
//! expression pushes the rig away from its neutral pose:
//! - blend shapes add weighted deltas
//! - translations add the weighted difference from neutral
//! - rotations compose a partial rotation from neutral, one expression
//!   at a time, in the order the expressions are declared

pub mod blend;
pub mod rotation;

pub use blend::*;
pub use rotation::*;
