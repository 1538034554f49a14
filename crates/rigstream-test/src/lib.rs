//! rigstream Test Harness - Capture server mock and end-to-end checks
//!
//! This crate provides:
//! - A mock capture server speaking the framed tracker protocol
//! - A demo rig and an expression set authored against it
//! - Synthetic tracker frames
//! - End-to-end tests across every layer

pub mod fixtures;
pub mod server;

#[cfg(test)]
mod integration;

pub use fixtures::*;
pub use server::*;
