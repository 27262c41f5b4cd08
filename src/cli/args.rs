use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for degit
#[derive(Parser, Debug, Clone)]
#[command(name = "degit")]
#[command(about = "Scaffold a project from a snapshot of a remote repository")]
#[command(
    long_about = "Scaffold a project from a snapshot of a remote repository.\n\n\
                  Downloads a snapshot of owner/repo (optionally a sub-directory at a given \
                  branch, tag or commit) and copies its files into DESTINATION, without any \
                  version-control history.\n\n\
                  Settings: DEGIT_BASE_URL, DEGIT_MAX_REDIRECTS, DEGIT_CONFIG"
)]
#[command(version)]
pub struct Args {
    /// Repository to copy: owner/repo[/sub/path][#ref]
    #[arg(value_name = "SPECIFIER")]
    pub specifier: String,

    /// Directory to copy into (defaults to the current directory)
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,
}
