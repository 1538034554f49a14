//! rigstream State - Expression store
//!
//! This crate owns the character setup:
//! - Expression set records and their text form
//! - The control/value alignment invariant
//! - Legacy attribute renames applied on load
//! - Neutral offsets used as the blend base

pub mod migrate;
pub mod set;
pub mod store;

pub use migrate::*;
pub use set::*;
pub use store::*;
