//! Container repair through an MPEG4/AVI intermediate
//!
//! Some distorted frame sequences cannot be encoded straight into the
//! requested container, either because the source codec has no encoder in
//! the linked FFmpeg or because the container rejects what the pipeline
//! produces. The repair path writes a universally-encodable AVI next to the
//! output and lets the external transcoder produce the final file.

use std::path::Path;

use ffmpeg_next::codec;
use tempfile::Builder;
use tracing::debug;

use super::{encoder, VideoStream};
use crate::error::DistortResult;
use crate::transcode::Transcoder;

/// Encode `stream` into a temporary AVI beside `output`, then convert it
/// into the requested container. The intermediate is removed on every exit
/// path, including failures.
pub fn reencode_via_avi(
    stream: &VideoStream,
    output: &Path,
    transcoder: &Transcoder,
) -> DistortResult<()> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("distorted");

    let temp = Builder::new()
        .prefix(&format!("{stem}_tmp_"))
        .suffix(".avi")
        .tempfile_in(dir)?;
    let temp_path = temp.into_temp_path();
    debug!("repair intermediate at {}", temp_path.display());

    encoder::encode(stream, &temp_path, codec::Id::MPEG4, Some("avi"))?;
    transcoder.convert(&temp_path, output)?;

    temp_path.close()?;
    Ok(())
}
