//! CLI module for DistortX
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// DistortX CLI Video Distorter
///
/// Applies one controlled visual distortion to a video file, chosen explicitly
/// or at random, and records every output's distortion history in a ledger.
#[derive(Parser)]
#[command(name = "distorter")]
#[command(about = "DistortX CLI Video Distorter - Controlled video degradation for VQA corpora")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Apply a distortion to a video file
    Distort(args::DistortArgs),
    /// Compare the basic properties of two video files
    Check(args::CheckArgs),
    /// Inspect video file information
    Inspect(args::InspectArgs),
}
