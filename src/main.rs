//! DistortX CLI Video Distorter
//!
//! A command-line tool that applies one controlled visual distortion to a
//! video file and maintains a metadata ledger mapping every output to the
//! ordered history of distortions that produced it.
//!
//! # Usage
//!
//! ```bash
//! distorter distort --vid_in clip.mp4 --vid_out clip_bw3.mp4 --type BW --level 3
//! distorter distort --vid_in clip.mp4 --vid_out clip_rand.mp4 --meta_path meta/ledger.txt
//! distorter check --vid_in clip.mp4 --vid_out clip_bw3.mp4
//! distorter inspect --vid_in clip.mp4 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use distortx_cli::cli::{commands, Cli, Commands};

/// Main entry point for the DistortX CLI application
fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    distortx_cli::init()?;

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute the requested command
    match cli.command {
        Commands::Distort(args) => {
            info!("Executing distort command");
            commands::distort(args)?;
        }
        Commands::Check(args) => {
            info!("Executing check command");
            commands::check(args)?;
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args)?;
        }
    }

    Ok(())
}
