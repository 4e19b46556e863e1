pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "drive")]
#[command(about = "Browse and upload to your drive from the command line")]
pub struct Args {
    /// Backend API base URL (defaults to the configured one)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the drive config directory (defaults to ~/.drive)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
