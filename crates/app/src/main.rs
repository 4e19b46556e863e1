// CLI modules
mod args;
mod logging;
mod op;
mod ops;
mod state;
mod version;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{
    Digest, Download, Init, Login, Logout, Ls, Mkdir, Mv, Refresh, Rm, Share, Upload, Version,
    Whoami,
};
use state::{AppState, StateError};

command_enum! {
    (Init, Init),
    (Login, Login),
    (Logout, Logout),
    (Whoami, Whoami),
    (Refresh, Refresh),
    (Ls, Ls),
    (Mkdir, Mkdir),
    (Mv, Mv),
    (Rm, Rm),
    (Upload, Upload),
    (Download, Download),
    (Share, Share),
    (Digest, Digest),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // A missing drive directory is fine until a command needs it
    let state = match AppState::load(args.config_path.clone()) {
        Ok(state) => Some(state),
        Err(StateError::NotInitialized) => None,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = state
        .as_ref()
        .map(|s| s.config.log_level())
        .unwrap_or(tracing::level_filters::LevelFilter::INFO);
    let _log_guard = logging::init_logging(log_level);

    // Resolve remote URL: explicit flag > config api_url > hardcoded default
    let remote = op::resolve_remote(args.remote, state.as_ref());

    let ctx = match op::OpContext::new(remote, args.config_path, state) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            drop(_log_guard);
            std::process::exit(1);
        }
    }
}
