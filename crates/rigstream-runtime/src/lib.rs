//! rigstream Runtime - Driving a rig from a capture server
//!
//! This crate ties the layers together:
//! - The scene capability a host implements to expose its rig
//! - The live client tick loop (network, blend, apply)
//! - Pose editing helpers used to author an expression set
//! - An in-memory rig for tests and headless tools

pub mod client;
pub mod editor;
pub mod scene;

pub use client::*;
pub use editor::*;
pub use scene::*;
