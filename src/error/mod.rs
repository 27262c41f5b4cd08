//! Error handling module
//!
//! Defines the error taxonomy shared by every stage of the clone pipeline

pub mod types;

pub use types::*;
