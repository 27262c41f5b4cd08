//! # `degit`
//!
//! Copies the files of a remote repository snapshot into a local directory,
//! without cloning its history.
//!
//! ## Usage
//!
//! ```sh
//! degit owner/repo                      # default branch into the current directory
//! degit owner/repo/sub/dir#v2.0.0 out   # one sub-directory of a tag into ./out
//! ```
//!
//! Set `RUST_LOG=debug` for detailed logs.

use clap::Parser as _;
use degit::cli::{Args, ConsoleSink};
use degit::error::DegitError;
use degit::system::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    let console = ConsoleSink::new();
    let result = degit::run(args, &system, &console).await;
    console.finish();

    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<DegitError>()
                    .map_or(1, DegitError::exit_code),
            );
        }
    }
}
