//! Command-line argument definitions

use clap::Args;

/// Arguments for the distort command
#[derive(Args, Debug, Clone)]
pub struct DistortArgs {
    /// Input video file path
    #[arg(long = "vid_in", value_name = "PATH")]
    pub vid_in: String,

    /// Output video file path (parent directory is created)
    #[arg(long = "vid_out", value_name = "PATH")]
    pub vid_out: String,

    /// Distortion type: CS, CC, BW, GNC, GB, JPEG, or VC (random when omitted)
    #[arg(long = "type", value_name = "CODE")]
    pub distortion_type: Option<String>,

    /// Distortion level, 1 (mildest) to 5 (harshest) (random when omitted)
    #[arg(long = "level", value_name = "LEVEL")]
    pub level: Option<String>,

    /// Ledger file recording each output's distortion history
    #[arg(long = "meta_path", value_name = "PATH")]
    pub meta_path: Option<String>,

    /// Encode through an AVI intermediate and repair the container with ffmpeg
    #[arg(long = "via_xvid")]
    pub via_xvid: bool,

    /// Seed for reproducible selection and stochastic distortions
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Reference video file path
    #[arg(long = "vid_in", value_name = "PATH")]
    pub vid_in: String,

    /// Video file to compare against the reference
    #[arg(long = "vid_out", value_name = "PATH")]
    pub vid_out: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(long = "vid_in", value_name = "PATH")]
    pub vid_in: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
