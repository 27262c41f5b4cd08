//! `degit` - copy a snapshot of a remote repository into a local directory
//!
//! This library downloads the `.tar.gz` snapshot an archive host serves for
//! `owner/repo` at a given ref, extracts the requested sub-directory with the
//! host's wrapper directory stripped, and applies the optional `degit.json`
//! post-extraction actions. No version-control history is fetched.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod operations;
pub mod remote;
pub mod system;
pub mod utils;

use anyhow::Result;
use cli::Args;
use config::Settings;
use error::DegitError;
use events::EventSink;
use operations::CloneOperation;
use remote::CloneSpec;
use system::System;

/// Main entry point for the degit library
///
/// The specifier is parsed before anything touches the network or the
/// filesystem. Without an explicit destination the current directory is used.
///
/// # Errors
///
/// Returns an error if the specifier is invalid, the settings cannot be
/// resolved, or the clone fails.
pub async fn run(args: Args, system: &dyn System, events: &dyn EventSink) -> Result<()> {
    let spec = CloneSpec::parse(&args.specifier)?;
    let settings = Settings::load(system)?;

    let destination = match args.destination {
        Some(destination) => destination,
        None => system.current_dir().map_err(|e| {
            DegitError::filesystem(format!("Cannot get current directory: {e}"))
        })?,
    };

    let operation = CloneOperation::new(spec, &settings, events)?;
    operation.execute(&destination).await
}
