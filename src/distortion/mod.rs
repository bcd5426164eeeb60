//! Distortion catalogue, severity resolution, and random selection

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use crate::engine::VideoFrame;
use crate::error::{DistortError, DistortResult};

pub mod framewise;

/// The seven supported distortion families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistortionType {
    /// CS: desaturate toward grayscale
    ColorSaturation,
    /// CC: compress contrast about the frame mean
    ColorContrast,
    /// BW: mask random blocks with mid-gray
    BlockWise,
    /// GNC: additive Gaussian color noise
    GaussianNoise,
    /// GB: Gaussian blur
    GaussianBlur,
    /// JPEG: still-image compression artifacts
    JpegArtifact,
    /// VC: whole-container re-compression
    VideoCompression,
}

impl DistortionType {
    /// Every family, in severity-table order
    pub const ALL: [DistortionType; 7] = [
        DistortionType::ColorSaturation,
        DistortionType::ColorContrast,
        DistortionType::BlockWise,
        DistortionType::GaussianNoise,
        DistortionType::GaussianBlur,
        DistortionType::JpegArtifact,
        DistortionType::VideoCompression,
    ];

    /// Short code used on the command line and in ledger entries
    pub fn code(&self) -> &'static str {
        match self {
            DistortionType::ColorSaturation => "CS",
            DistortionType::ColorContrast => "CC",
            DistortionType::BlockWise => "BW",
            DistortionType::GaussianNoise => "GNC",
            DistortionType::GaussianBlur => "GB",
            DistortionType::JpegArtifact => "JPEG",
            DistortionType::VideoCompression => "VC",
        }
    }

    /// Human-readable phrase for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            DistortionType::ColorSaturation => "color saturation shift",
            DistortionType::ColorContrast => "color contrast compression",
            DistortionType::BlockWise => "block-wise masking",
            DistortionType::GaussianNoise => "Gaussian color noise",
            DistortionType::GaussianBlur => "Gaussian blur",
            DistortionType::JpegArtifact => "JPEG compression artifacts",
            DistortionType::VideoCompression => "video re-compression",
        }
    }

    /// Parse a command-line token into a distortion type
    pub fn parse(token: &str) -> DistortResult<Self> {
        match token.to_uppercase().as_str() {
            "CS" => Ok(DistortionType::ColorSaturation),
            "CC" => Ok(DistortionType::ColorContrast),
            "BW" => Ok(DistortionType::BlockWise),
            "GNC" => Ok(DistortionType::GaussianNoise),
            "GB" => Ok(DistortionType::GaussianBlur),
            "JPEG" => Ok(DistortionType::JpegArtifact),
            "VC" => Ok(DistortionType::VideoCompression),
            _ => Err(DistortError::UnknownDistortionType {
                token: token.to_string(),
            }),
        }
    }

    /// True for distortions applied to the whole container rather than
    /// frame by frame
    pub fn is_video_level(&self) -> bool {
        matches!(self, DistortionType::VideoCompression)
    }

    /// Severity value for a level, from the fixed per-family table.
    ///
    /// CS and CC get smaller as the level rises (less surviving saturation
    /// or contrast); the other families grow.
    pub fn severity(&self, level: DistortionLevel) -> f64 {
        let idx = (level.get() - 1) as usize;
        match self {
            DistortionType::ColorSaturation => [0.4, 0.3, 0.2, 0.1, 0.0][idx],
            DistortionType::ColorContrast => [0.85, 0.725, 0.6, 0.475, 0.35][idx],
            DistortionType::BlockWise => [16.0, 32.0, 48.0, 64.0, 80.0][idx],
            DistortionType::GaussianNoise => [0.001, 0.002, 0.005, 0.01, 0.05][idx],
            DistortionType::GaussianBlur => [7.0, 9.0, 13.0, 17.0, 21.0][idx],
            DistortionType::JpegArtifact => [2.0, 3.0, 4.0, 5.0, 6.0][idx],
            DistortionType::VideoCompression => [30.0, 32.0, 35.0, 38.0, 40.0][idx],
        }
    }

    /// Apply this distortion to one frame in place.
    ///
    /// Only the frame-level families can be applied here; VC operates on the
    /// whole container through the external transcoder.
    pub fn apply(
        &self,
        frame: &mut VideoFrame,
        severity: f64,
        rng: &mut StdRng,
    ) -> DistortResult<()> {
        match self {
            DistortionType::ColorSaturation => framewise::color_saturation(frame, severity),
            DistortionType::ColorContrast => framewise::color_contrast(frame, severity),
            DistortionType::BlockWise => framewise::block_wise(frame, severity, rng),
            DistortionType::GaussianNoise => framewise::gaussian_noise(frame, severity, rng),
            DistortionType::GaussianBlur => framewise::gaussian_blur(frame, severity),
            DistortionType::JpegArtifact => framewise::jpeg_artifact(frame, severity),
            DistortionType::VideoCompression => Err(DistortError::ConfigurationError {
                message: "video re-compression is container-level and cannot be applied per frame"
                    .to_string(),
            }),
        }
    }
}

impl fmt::Display for DistortionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Distortion strength on the 1 (mildest) to 5 (harshest) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DistortionLevel(u8);

impl DistortionLevel {
    /// Every valid level, mildest first
    pub const ALL: [DistortionLevel; 5] = [
        DistortionLevel(1),
        DistortionLevel(2),
        DistortionLevel(3),
        DistortionLevel(4),
        DistortionLevel(5),
    ];

    /// Validate a raw level value
    pub fn new(value: u8) -> DistortResult<Self> {
        if (1..=5).contains(&value) {
            Ok(DistortionLevel(value))
        } else {
            Err(DistortError::InvalidLevel {
                value: value.to_string(),
            })
        }
    }

    /// Parse a command-line token into a level
    pub fn parse(token: &str) -> DistortResult<Self> {
        let value = token.parse::<u8>().map_err(|_| DistortError::InvalidLevel {
            value: token.to_string(),
        })?;
        Self::new(value)
    }

    /// The raw level value
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for DistortionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Draw a distortion type uniformly at random
pub fn choose_type(rng: &mut StdRng) -> DistortionType {
    DistortionType::ALL[rng.gen_range(0..DistortionType::ALL.len())]
}

/// Draw a level uniformly at random
pub fn choose_level(rng: &mut StdRng) -> DistortionLevel {
    DistortionLevel(rng.gen_range(1..=5))
}

/// Resolve the `--type` token: absent or `random` draws from the catalogue
pub fn resolve_type(token: Option<&str>, rng: &mut StdRng) -> DistortResult<DistortionType> {
    match token {
        None => Ok(choose_type(rng)),
        Some(t) if t.eq_ignore_ascii_case("random") => Ok(choose_type(rng)),
        Some(t) => DistortionType::parse(t),
    }
}

/// Resolve the `--level` token: absent or `random` draws uniformly
pub fn resolve_level(token: Option<&str>, rng: &mut StdRng) -> DistortResult<DistortionLevel> {
    match token {
        None => Ok(choose_level(rng)),
        Some(t) if t.eq_ignore_ascii_case("random") => Ok(choose_level(rng)),
        Some(t) => DistortionLevel::parse(t),
    }
}
