//! rigstream Core - Fundamental types shared by every layer
//!
//! This crate defines:
//! - Control identifiers (`object:attribute`)
//! - The 4-slot rig value with sentinel-truncated arity
//! - Tracker weights and control value maps
//! - The error taxonomy used across the workspace

pub mod control;
pub mod error;
pub mod tracker;
pub mod value;

pub use control::*;
pub use error::*;
pub use tracker::*;
pub use value::*;
