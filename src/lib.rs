//! DistortX CLI Video Distorter Library
//!
//! A command-line tool that applies a single controlled visual distortion to a
//! video file and records the distortion lineage of every output it produces.

pub mod cli;
pub mod distortion;
pub mod engine;
pub mod error;
pub mod meta;
pub mod probe;
pub mod transcode;

// Re-export commonly used types
pub use distortion::{DistortionLevel, DistortionType};
pub use engine::{VideoFrame, VideoStream};
pub use error::{DistortError, DistortResult};
pub use meta::MetaLedger;
pub use probe::VideoInfo;

/// Initialize the DistortX library
pub fn init() -> DistortResult<()> {
    ffmpeg_next::init()?;
    Ok(())
}
