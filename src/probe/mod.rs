//! Container probing and property comparison

use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::media;
use serde::{Deserialize, Serialize};

use crate::error::{DistortError, DistortResult};

/// Tolerance when comparing frame rates of two files
const FPS_TOLERANCE: f64 = 1e-3;

/// Basic properties of a video file's primary stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Probed path
    pub path: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Average frame rate
    pub fps: f64,
    /// Container-reported frame count (0 when unknown)
    pub frame_count: i64,
    /// Codec name
    pub codec: String,
    /// Duration in seconds (0 when unknown)
    pub duration_seconds: f64,
}

impl VideoInfo {
    /// Probe `path` without decoding any frames
    pub fn probe(path: &Path) -> DistortResult<Self> {
        ffmpeg::init()?;

        let ictx = ffmpeg::format::input(&path)?;
        let stream = ictx
            .streams()
            .best(media::Type::Video)
            .ok_or_else(|| DistortError::CorruptInput {
                message: format!("no video stream in {}", path.display()),
            })?;

        let parameters = stream.parameters();
        let codec_id = parameters.id();
        let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .video()?;

        let mut rate = stream.avg_frame_rate();
        if rate.numerator() == 0 {
            rate = stream.rate();
        }

        let duration_seconds = if ictx.duration() > 0 {
            ictx.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        Ok(Self {
            path: path.display().to_string(),
            width: decoder.width(),
            height: decoder.height(),
            fps: f64::from(rate),
            frame_count: stream.frames().max(0),
            codec: ffmpeg::decoder::find(codec_id)
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| format!("{codec_id:?}")),
            duration_seconds,
        })
    }
}

/// One compared property of two videos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckItem {
    /// Property name
    pub property: String,
    /// Value on the reference side
    pub reference: String,
    /// Value on the candidate side
    pub candidate: String,
    /// Whether the two sides agree
    pub matches: bool,
}

/// Property-by-property comparison of two videos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Reference path
    pub reference: String,
    /// Candidate path
    pub candidate: String,
    /// Compared properties
    pub items: Vec<CheckItem>,
    /// True when every property matches
    pub passed: bool,
}

impl CheckReport {
    /// Compare width, height, frame rate, codec, and frame count
    pub fn compare(reference: &VideoInfo, candidate: &VideoInfo) -> Self {
        let items = vec![
            CheckItem::exact("width", &reference.width, &candidate.width),
            CheckItem::exact("height", &reference.height, &candidate.height),
            CheckItem {
                property: "fps".to_string(),
                reference: format!("{:.3}", reference.fps),
                candidate: format!("{:.3}", candidate.fps),
                matches: (reference.fps - candidate.fps).abs() <= FPS_TOLERANCE,
            },
            CheckItem::exact("codec", &reference.codec, &candidate.codec),
            CheckItem::exact(
                "frame_count",
                &reference.frame_count,
                &candidate.frame_count,
            ),
        ];
        let passed = items.iter().all(|item| item.matches);
        Self {
            reference: reference.path.clone(),
            candidate: candidate.path.clone(),
            items,
            passed,
        }
    }

    /// Names of the properties that differ
    pub fn mismatched_properties(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !item.matches)
            .map(|item| item.property.as_str())
            .collect()
    }
}

impl CheckItem {
    fn exact<T: std::fmt::Display + PartialEq>(property: &str, a: &T, b: &T) -> Self {
        Self {
            property: property.to_string(),
            reference: a.to_string(),
            candidate: b.to_string(),
            matches: a == b,
        }
    }
}
