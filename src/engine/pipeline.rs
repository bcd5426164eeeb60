//! Frame pipeline orchestration: decode, transform, encode

use std::path::Path;

use ffmpeg_next as ffmpeg;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use tracing::{info, warn};

use super::{decoder, encoder, repair};
use crate::distortion::DistortionType;
use crate::error::{DistortError, DistortResult};
use crate::transcode::Transcoder;

/// Summary of a completed frame-pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Frames decoded, transformed, and re-encoded
    pub frames: usize,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame rate carried over from the input
    pub fps: f64,
    /// Whether the output went through the AVI repair step
    pub repaired: bool,
}

/// Decode-transform-encode pipeline for the frame-level distortions
pub struct FramePipeline {
    via_xvid: bool,
}

impl FramePipeline {
    /// `via_xvid` forces the container-repair encode path
    pub fn new(via_xvid: bool) -> Self {
        Self { via_xvid }
    }

    /// Run one distortion over every frame of `input` and write `output`.
    ///
    /// Encoding reuses the input's codec when an encoder for it is linked
    /// in; otherwise, or when `via_xvid` is set, the repair path encodes an
    /// AVI intermediate and hands it to the external transcoder.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        distortion: DistortionType,
        severity: f64,
        rng: &mut StdRng,
    ) -> DistortResult<PipelineSummary> {
        let mut stream = decoder::decode(input)?;
        info!(
            "decoded {} frames ({}x{}) from {}",
            stream.frames.len(),
            stream.width,
            stream.height,
            input.display()
        );

        let bar = progress_bar(stream.frames.len(), distortion.code());
        for frame in stream.frames.iter_mut() {
            distortion.apply(frame, severity, rng)?;
            if frame.width != stream.width
                || frame.height != stream.height
                || frame.data.len() != frame.expected_len()
            {
                return Err(DistortError::ConfigurationError {
                    message: format!("{distortion} changed the frame geometry"),
                });
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        let repaired = self.via_xvid || ffmpeg::encoder::find(stream.codec).is_none();
        if repaired {
            if !self.via_xvid {
                warn!(
                    "no encoder for {:?}; falling back to the AVI repair path",
                    stream.codec
                );
            }
            let transcoder = Transcoder::locate()?;
            repair::reencode_via_avi(&stream, output, &transcoder)?;
        } else {
            encoder::encode(&stream, output, stream.codec, None)?;
        }

        Ok(PipelineSummary {
            frames: stream.frames.len(),
            width: stream.width,
            height: stream.height,
            fps: f64::from(stream.fps),
            repaired,
        })
    }
}

fn progress_bar(total: usize, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template(&format!(
            "{label} {{bar:40.cyan/blue}} {{pos}}/{{len}} [{{elapsed_precise}}]"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );
    bar
}
