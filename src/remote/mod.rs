//! Remote repository access
//!
//! Parses repository specifiers and fetches archive snapshots over HTTP

pub mod download;
pub mod fetch;
pub mod specifier;

pub use download::*;
pub use fetch::*;
pub use specifier::*;
