//! Per-frame distortion capabilities over packed RGB24 buffers
//!
//! All operations work in place, preserve frame dimensions, and saturate to
//! the 0..=255 byte range. Stochastic ones take the run's RNG so a seeded
//! invocation reproduces the same output.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::engine::VideoFrame;
use crate::error::{DistortError, DistortResult};

/// Rec.601 luma weights for RGB
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// Gray value painted into masked blocks
const MASK_GRAY: u8 = 128;

/// One mask block per this many pixels of frame area
const PIXELS_PER_BLOCK: usize = 256 * 256;

/// Blend every pixel toward its luma; `severity` is the chroma fraction
/// that survives (0.0 turns the frame grayscale).
pub fn color_saturation(frame: &mut VideoFrame, severity: f64) -> DistortResult<()> {
    let s = severity as f32;
    for px in frame.data.chunks_exact_mut(VideoFrame::CHANNELS) {
        let luma = LUMA[0] * px[0] as f32 + LUMA[1] * px[1] as f32 + LUMA[2] * px[2] as f32;
        for c in 0..VideoFrame::CHANNELS {
            px[c] = clamp_u8(luma + s * (px[c] as f32 - luma));
        }
    }
    Ok(())
}

/// Scale every channel's distance from the frame mean by `severity`
/// (1.0 leaves the frame untouched, smaller values flatten it).
pub fn color_contrast(frame: &mut VideoFrame, severity: f64) -> DistortResult<()> {
    if frame.data.is_empty() {
        return Ok(());
    }
    let s = severity as f32;
    let sum: u64 = frame.data.iter().map(|&v| v as u64).sum();
    let mean = sum as f32 / frame.data.len() as f32;
    for v in frame.data.iter_mut() {
        *v = clamp_u8(mean + s * (*v as f32 - mean));
    }
    Ok(())
}

/// Paint mid-gray squares of `severity` x `severity` pixels at random
/// positions. Block count scales with frame area, at least one; the edge
/// clamps when the frame is smaller than the block.
pub fn block_wise(frame: &mut VideoFrame, severity: f64, rng: &mut StdRng) -> DistortResult<()> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    if width == 0 || height == 0 {
        return Ok(());
    }
    let edge = (severity as usize).clamp(1, width.min(height));
    let count = (width * height / PIXELS_PER_BLOCK).max(1);
    for _ in 0..count {
        let x0 = rng.gen_range(0..=width - edge);
        let y0 = rng.gen_range(0..=height - edge);
        for y in y0..y0 + edge {
            let start = (y * width + x0) * VideoFrame::CHANNELS;
            frame.data[start..start + edge * VideoFrame::CHANNELS].fill(MASK_GRAY);
        }
    }
    Ok(())
}

/// Add independent zero-mean Gaussian noise to every channel; `severity`
/// is the variance on the unit intensity scale.
pub fn gaussian_noise(frame: &mut VideoFrame, severity: f64, rng: &mut StdRng) -> DistortResult<()> {
    let sigma = severity.sqrt() * 255.0;
    let normal = Normal::new(0.0, sigma).map_err(|e| DistortError::ConfigurationError {
        message: format!("invalid noise distribution (sigma {sigma}): {e}"),
    })?;
    for v in frame.data.iter_mut() {
        *v = clamp_u8(*v as f32 + normal.sample(rng) as f32);
    }
    Ok(())
}

/// Separable Gaussian blur with an odd kernel edge of `severity` pixels
/// and the sigma OpenCV derives from the kernel size. Frame edges clamp.
pub fn gaussian_blur(frame: &mut VideoFrame, severity: f64) -> DistortResult<()> {
    let size = severity as usize;
    if size < 3 || size % 2 == 0 {
        return Err(DistortError::ConfigurationError {
            message: format!("blur kernel size must be odd and at least 3, got {size}"),
        });
    }
    let kernel = gaussian_kernel(size);
    let half = (size / 2) as isize;
    let width = frame.width as usize;
    let height = frame.height as usize;
    let row = width * VideoFrame::CHANNELS;

    let mut scratch = vec![0u8; frame.data.len()];
    // Horizontal pass: frame -> scratch
    for y in 0..height {
        for x in 0..width {
            for c in 0..VideoFrame::CHANNELS {
                let mut acc = 0.0f32;
                for (k, coeff) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - half).clamp(0, width as isize - 1) as usize;
                    acc += coeff * frame.data[y * row + sx * VideoFrame::CHANNELS + c] as f32;
                }
                scratch[y * row + x * VideoFrame::CHANNELS + c] = clamp_u8(acc);
            }
        }
    }
    // Vertical pass: scratch -> frame
    for y in 0..height {
        for x in 0..width {
            for c in 0..VideoFrame::CHANNELS {
                let mut acc = 0.0f32;
                for (k, coeff) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - half).clamp(0, height as isize - 1) as usize;
                    acc += coeff * scratch[sy * row + x * VideoFrame::CHANNELS + c] as f32;
                }
                frame.data[y * row + x * VideoFrame::CHANNELS + c] = clamp_u8(acc);
            }
        }
    }
    Ok(())
}

/// Encode the frame to JPEG in memory and decode it back; `severity` maps
/// to quality as `round(100 / severity)`.
pub fn jpeg_artifact(frame: &mut VideoFrame, severity: f64) -> DistortResult<()> {
    let quality = (100.0 / severity).round().clamp(1.0, 100.0) as u8;
    let image = image::RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| DistortError::ConfigurationError {
            message: "frame buffer does not match its dimensions".to_string(),
        })?;

    let mut encoded = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, quality);
    encoder.encode_image(&image).map_err(jpeg_error)?;

    let decoded = image::load_from_memory_with_format(&encoded, image::ImageFormat::Jpeg)
        .map_err(jpeg_error)?
        .into_rgb8();
    if decoded.as_raw().len() != frame.data.len() {
        return Err(DistortError::ConfigurationError {
            message: format!(
                "JPEG round trip changed the buffer length: {} -> {}",
                frame.data.len(),
                decoded.as_raw().len()
            ),
        });
    }
    frame.data.copy_from_slice(decoded.as_raw());
    Ok(())
}

fn jpeg_error(e: image::ImageError) -> DistortError {
    DistortError::ConfigurationError {
        message: format!("JPEG round trip failed: {e}"),
    }
}

fn gaussian_kernel(size: usize) -> Vec<f32> {
    // OpenCV's derived sigma for an auto-sigma GaussianBlur call
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as isize;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
