//! Archive handling module
//!
//! Owns the temporary downloaded archive and extracts subtrees from it

pub mod extract;
pub mod handle;

pub use extract::*;
pub use handle::*;
