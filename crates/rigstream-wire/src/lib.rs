//! rigstream Wire - Record text format and stream framing
//!
//! This crate implements:
//! - A closer-stack scanner for splitting record text at top-level separators
//! - Schema-directed serialize/deserialize driven by per-record field tables
//! - The 4-byte length-prefixed frame header
//! - The tracker-frame record carried in each frame body
//! - The tab-separated control dictionary form

pub mod codec;
pub mod dictionary;
pub mod frame;
pub mod scan;
pub mod schema;
pub mod tracker;

pub use codec::*;
pub use dictionary::*;
pub use frame::*;
pub use scan::*;
pub use schema::*;
pub use tracker::*;

pub use rigstream_core::{RigError, RigResult};
