//! Encoding packed RGB24 frames back into a container

use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::codec;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling;
use ffmpeg::util::frame::video::Video;
use tracing::debug;

use super::{VideoFrame, VideoStream};
use crate::error::{DistortError, DistortResult};

/// Encode `stream` to `output` with the given codec, preserving the source
/// dimensions and frame rate. `container` forces a muxer by name; `None`
/// lets the output extension decide.
pub fn encode(
    stream: &VideoStream,
    output: &Path,
    codec_id: codec::Id,
    container: Option<&str>,
) -> DistortResult<()> {
    ffmpeg::init()?;

    let codec = ffmpeg::encoder::find(codec_id).ok_or_else(|| DistortError::ConfigurationError {
        message: format!("no encoder available for codec {codec_id:?}"),
    })?;

    let mut octx = match container {
        Some(name) => ffmpeg::format::output_as(&output, name)?,
        None => ffmpeg::format::output(&output)?,
    };
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

    let mut ost = octx.add_stream(codec)?;
    let ost_index = ost.index();

    let mut encoder = codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()?;
    encoder.set_width(stream.width);
    encoder.set_height(stream.height);
    encoder.set_format(Pixel::YUV420P);
    encoder.set_frame_rate(Some(stream.fps));
    let enc_time_base = stream.fps.invert();
    encoder.set_time_base(enc_time_base);
    if global_header {
        encoder.set_flags(codec::Flags::GLOBAL_HEADER);
    }

    let mut opened = encoder.open_as(codec)?;
    ost.set_parameters(&opened);

    octx.write_header()?;
    let ost_time_base = octx
        .stream(ost_index)
        .ok_or_else(|| DistortError::ConfigurationError {
            message: "output stream disappeared after header write".to_string(),
        })?
        .time_base();

    debug!(
        "encoding {} frames as {:?} into {}",
        stream.frames.len(),
        codec_id,
        output.display()
    );

    let mut scaler = scaling::Context::get(
        Pixel::RGB24,
        stream.width,
        stream.height,
        Pixel::YUV420P,
        stream.width,
        stream.height,
        scaling::Flags::BILINEAR,
    )?;

    let mut packet = ffmpeg::Packet::empty();
    for (index, frame) in stream.frames.iter().enumerate() {
        let mut rgb = Video::new(Pixel::RGB24, stream.width, stream.height);
        restride(frame, &mut rgb);
        let mut yuv = Video::empty();
        scaler.run(&rgb, &mut yuv)?;
        yuv.set_pts(Some(index as i64));
        opened.send_frame(&yuv)?;
        while opened.receive_packet(&mut packet).is_ok() {
            packet.set_stream(ost_index);
            packet.rescale_ts(enc_time_base, ost_time_base);
            packet.write_interleaved(&mut octx)?;
        }
    }
    opened.send_eof()?;
    while opened.receive_packet(&mut packet).is_ok() {
        packet.set_stream(ost_index);
        packet.rescale_ts(enc_time_base, ost_time_base);
        packet.write_interleaved(&mut octx)?;
    }
    octx.write_trailer()?;
    Ok(())
}

/// Copy a packed RGB24 buffer into the aligned frame FFmpeg expects
fn restride(frame: &VideoFrame, dst: &mut Video) {
    let stride = dst.stride(0);
    let row = frame.width as usize * VideoFrame::CHANNELS;
    let data = dst.data_mut(0);
    for (y, src_row) in frame.data.chunks_exact(row).enumerate() {
        data[y * stride..y * stride + row].copy_from_slice(src_row);
    }
}
