//! Error handling module for DistortX

use thiserror::Error;

/// Main error type for DistortX operations
#[derive(Error, Debug)]
pub enum DistortError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Input and output arguments name the same file
    #[error("Input and output paths must differ: {path}")]
    SamePath { path: String },

    /// Unrecognized distortion type token
    #[error("Unknown distortion type: {token}. Expected one of CS, CC, BW, GNC, GB, JPEG, VC")]
    UnknownDistortionType { token: String },

    /// Distortion level outside the supported range
    #[error("Invalid distortion level: {value}. Levels run from 1 (mildest) to 5 (harshest)")]
    InvalidLevel { value: String },

    /// Input container contradicts what was decoded from it
    #[error("Corrupt input: {message}")]
    CorruptInput { message: String },

    /// Internal configuration or dispatch error
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// External transcoder binary could not be located
    #[error("FFmpeg executable not found: {message}")]
    TranscoderNotFound { message: String },

    /// External transcoder ran but exited non-zero
    #[error("Transcoder exited with status {status}: {stderr}")]
    TranscoderFailed { status: i32, stderr: String },

    /// Property mismatch reported by the check command
    #[error("Video comparison failed: {message}")]
    CheckFailed { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// FFmpeg error
    #[error("FFmpeg error: {0}")]
    FFmpegError(#[from] ffmpeg_next::Error),
}

/// Result type alias for DistortX operations
pub type DistortResult<T> = std::result::Result<T, DistortError>;
