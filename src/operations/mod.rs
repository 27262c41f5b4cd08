//! Operations module
//!
//! Coordinates the clone workflow and its post-extraction actions

pub mod actions;
pub mod clone;

pub use actions::*;
pub use clone::*;
