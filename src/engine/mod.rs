//! Frame pipeline engine: decode, transform, encode

use ffmpeg_next::codec;
use ffmpeg_next::Rational;

pub mod decoder;
pub mod encoder;
pub mod pipeline;
pub mod repair;

/// One decoded frame as a packed RGB24 buffer (row-major, no padding)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Packed RGB24 bytes, `width * height * 3` long
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Bytes per pixel
    pub const CHANNELS: usize = 3;

    /// Frame filled with a constant byte value
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        let len = width as usize * height as usize * Self::CHANNELS;
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }

    /// Number of pixels in the frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Buffer length implied by the dimensions
    pub fn expected_len(&self) -> usize {
        self.pixel_count() * Self::CHANNELS
    }
}

/// A fully decoded clip ready for per-frame transforms
#[derive(Debug, Clone)]
pub struct VideoStream {
    /// Frames in presentation order
    pub frames: Vec<VideoFrame>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame rate as reported by the container
    pub fps: Rational,
    /// Source codec, reused for the output when an encoder exists
    pub codec: codec::Id,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_frame_has_expected_geometry() {
        let frame = VideoFrame::filled(320, 240, 0);
        assert_eq!(frame.pixel_count(), 320 * 240);
        assert_eq!(frame.data.len(), frame.expected_len());
        assert_eq!(frame.data.len(), 320 * 240 * 3);
    }

    #[test]
    fn filled_frame_is_uniform() {
        let frame = VideoFrame::filled(4, 4, 128);
        assert!(frame.data.iter().all(|&v| v == 128));
    }
}
