//! Command-line interface module
//!
//! Handles argument parsing and console reporting

pub mod args;
pub mod console;

pub use args::*;
pub use console::*;
