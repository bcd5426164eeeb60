//! Whole-clip decoding into packed RGB24 frames

use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::media;
use ffmpeg::software::scaling;
use ffmpeg::util::frame::video::Video;
use tracing::debug;

use super::{VideoFrame, VideoStream};
use crate::error::{DistortError, DistortResult};

/// Decode every video frame of `path` into packed RGB24.
///
/// The container-reported frame count, when it reports one, must match the
/// number of frames actually decoded; a shortfall or excess means the file
/// is truncated or lies about itself and the run stops.
pub fn decode(path: &Path) -> DistortResult<VideoStream> {
    ffmpeg::init()?;

    let mut ictx = ffmpeg::format::input(&path)?;

    let (stream_index, reported_frames, fps, codec_id, parameters) = {
        let stream = ictx
            .streams()
            .best(media::Type::Video)
            .ok_or_else(|| DistortError::CorruptInput {
                message: format!("no video stream in {}", path.display()),
            })?;
        let mut rate = stream.avg_frame_rate();
        if rate.numerator() == 0 {
            rate = stream.rate();
        }
        (
            stream.index(),
            stream.frames(),
            rate,
            stream.parameters().id(),
            stream.parameters(),
        )
    };

    let mut decoder = ffmpeg::codec::context::Context::from_parameters(parameters)?
        .decoder()
        .video()?;
    let width = decoder.width();
    let height = decoder.height();

    let mut scaler = scaling::Context::get(
        decoder.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        scaling::Flags::BILINEAR,
    )?;

    let mut frames: Vec<VideoFrame> = Vec::new();
    let mut drain = |decoder: &mut ffmpeg::decoder::Video,
                     frames: &mut Vec<VideoFrame>|
     -> DistortResult<()> {
        let mut decoded = Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let mut rgb = Video::empty();
            scaler.run(&decoded, &mut rgb)?;
            frames.push(destride(&rgb, width, height));
        }
        Ok(())
    };

    for (stream, packet) in ictx.packets() {
        if stream.index() == stream_index {
            decoder.send_packet(&packet)?;
            drain(&mut decoder, &mut frames)?;
        }
    }
    decoder.send_eof()?;
    drain(&mut decoder, &mut frames)?;

    if reported_frames > 0 && frames.len() as i64 != reported_frames {
        return Err(DistortError::CorruptInput {
            message: format!(
                "{} reports {} frames but {} were decoded",
                path.display(),
                reported_frames,
                frames.len()
            ),
        });
    }
    if reported_frames <= 0 {
        debug!(
            "{} does not report a frame count; trusting the {} decoded frames",
            path.display(),
            frames.len()
        );
    }

    Ok(VideoStream {
        frames,
        width,
        height,
        fps,
        codec: codec_id,
    })
}

/// Copy a scaled RGB24 frame out of its aligned buffer into a packed one
fn destride(frame: &Video, width: u32, height: u32) -> VideoFrame {
    let stride = frame.stride(0);
    let row = width as usize * VideoFrame::CHANNELS;
    let raw = frame.data(0);
    let data: Vec<u8> = (0..height as usize)
        .flat_map(|y| &raw[y * stride..y * stride + row])
        .copied()
        .collect();
    VideoFrame {
        width,
        height,
        data,
    }
}
