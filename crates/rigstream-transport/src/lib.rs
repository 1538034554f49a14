//! rigstream Transport - TCP client for capture servers
//!
//! This crate provides:
//! - Stream configuration (timeouts, reconnect delay, framing limits)
//! - A connection task that reads length-prefixed frames one at a time
//! - A tick-driven client state machine with timeout and reconnect

pub mod client;
pub mod config;
mod link;

pub use client::*;
pub use config::*;
