//! Library-level tests for the decode-distort-encode pipeline
//!
//! These tests generate real fixtures with the system ffmpeg and are
//! skipped when it is not installed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use distortx_cli::distortion::{DistortionLevel, DistortionType};
use distortx_cli::engine::{decoder, pipeline::FramePipeline};
use distortx_cli::error::DistortError;
use distortx_cli::probe::VideoInfo;
use distortx_cli::transcode::Transcoder;

mod test_utils {
    use std::path::Path;
    use std::process::Command;

    /// Generate a short test clip with the system ffmpeg
    pub fn create_test_video(output: &Path, frames: u32, fps: u32, size: &str) {
        let duration = frames as f64 / fps as f64;
        let status = Command::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                &format!("testsrc=duration={duration}:size={size}:rate={fps}"),
                "-c:v",
                "mpeg4",
                "-y",
            ])
            .arg(output)
            .output()
            .expect("failed to spawn ffmpeg");
        assert!(
            status.status.success(),
            "fixture generation failed: {}",
            String::from_utf8_lossy(&status.stderr)
        );
    }

    pub fn ffmpeg_missing() -> bool {
        distortx_cli::transcode::Transcoder::locate().is_err()
    }
}

use test_utils::{create_test_video, ffmpeg_missing};

#[test]
fn decode_reports_fixture_geometry() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.mp4");
    create_test_video(&input, 50, 25, "320x240");

    let stream = decoder::decode(&input).unwrap();
    assert_eq!(stream.width, 320);
    assert_eq!(stream.height, 240);
    assert_eq!(stream.frames.len(), 50);
    assert_eq!(f64::from(stream.fps), 25.0);
    for frame in &stream.frames {
        assert_eq!(frame.data.len(), frame.expected_len());
    }
}

#[test]
fn decode_rejects_a_file_with_no_video_stream() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let garbage = dir.path().join("not_a_video.mp4");
    std::fs::write(&garbage, b"this is not a container").unwrap();

    let err = decoder::decode(&garbage).unwrap_err();
    assert!(matches!(
        err,
        DistortError::FFmpegError(_) | DistortError::CorruptInput { .. }
    ));
}

#[test]
fn pipeline_preserves_geometry_for_every_frame_level_type() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.mp4");
    create_test_video(&input, 25, 25, "160x120");

    let level = DistortionLevel::new(2).unwrap();
    for ty in DistortionType::ALL.iter().filter(|t| !t.is_video_level()) {
        let output = dir.path().join(format!("out_{ty}.mp4"));
        let mut rng = StdRng::seed_from_u64(7);
        let pipeline = FramePipeline::new(false);
        let summary = pipeline
            .run(&input, &output, *ty, ty.severity(level), &mut rng)
            .unwrap();

        assert_eq!(summary.frames, 25, "{ty}");
        assert_eq!(summary.width, 160, "{ty}");
        assert_eq!(summary.height, 120, "{ty}");
        assert_eq!(summary.fps, 25.0, "{ty}");

        let info = VideoInfo::probe(&output).unwrap();
        assert_eq!(info.width, 160, "{ty}");
        assert_eq!(info.height, 120, "{ty}");
        assert_eq!(info.fps, 25.0, "{ty}");
        assert_eq!(info.frame_count, 25, "{ty}");
    }
}

#[test]
fn pipeline_output_differs_from_its_input() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.mp4");
    let output = dir.path().join("output.mp4");
    create_test_video(&input, 10, 25, "160x120");

    let level = DistortionLevel::new(5).unwrap();
    let ty = DistortionType::ColorSaturation;
    let mut rng = StdRng::seed_from_u64(1);
    FramePipeline::new(false)
        .run(&input, &output, ty, ty.severity(level), &mut rng)
        .unwrap();

    // Level 5 saturation is full grayscale; the decoded output must be
    // visibly flatter in chroma than the colorful test source.
    let distorted = decoder::decode(&output).unwrap();
    let frame = &distorted.frames[0];
    let mut max_spread = 0i16;
    for px in frame.data.chunks_exact(3) {
        let max = px.iter().copied().max().unwrap() as i16;
        let min = px.iter().copied().min().unwrap() as i16;
        max_spread = max_spread.max(max - min);
    }
    // The encode round trip leaks some chroma back in, but nothing close
    // to the saturated bars of testsrc.
    assert!(
        max_spread < 128,
        "grayscale output still has channel spread {max_spread}"
    );
}

#[test]
fn repair_path_produces_the_requested_container() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.mp4");
    let output = dir.path().join("repaired.mp4");
    create_test_video(&input, 20, 25, "160x120");

    let level = DistortionLevel::new(1).unwrap();
    let ty = DistortionType::BlockWise;
    let mut rng = StdRng::seed_from_u64(3);
    let summary = FramePipeline::new(true)
        .run(&input, &output, ty, ty.severity(level), &mut rng)
        .unwrap();
    assert!(summary.repaired);
    assert!(output.exists());

    let info = VideoInfo::probe(&output).unwrap();
    assert_eq!(info.width, 160);
    assert_eq!(info.height, 120);

    // The AVI intermediate must not survive next to the output.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "avi"))
        .collect();
    assert!(leftovers.is_empty(), "repair left {leftovers:?} behind");
}

#[test]
fn video_level_compression_skips_the_frame_pipeline() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.mp4");
    let output = dir.path().join("compressed.mp4");
    create_test_video(&input, 50, 25, "320x240");

    let level = DistortionLevel::new(5).unwrap();
    let ty = DistortionType::VideoCompression;
    let severity = ty.severity(level);
    assert_eq!(severity, 40.0);

    let transcoder = Transcoder::locate().unwrap();
    transcoder.compress(&input, &output, severity as u32).unwrap();

    let info = VideoInfo::probe(&output).unwrap();
    assert_eq!(info.width, 320);
    assert_eq!(info.height, 240);
    assert_eq!(info.fps, 25.0);
}

#[test]
fn transcoder_failure_surfaces_exit_status_and_stderr() {
    if ffmpeg_missing() {
        eprintln!("skipping: ffmpeg not installed");
        return;
    }
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does_not_exist.mp4");
    let output = dir.path().join("out.mp4");

    let transcoder = Transcoder::locate().unwrap();
    let err = transcoder.convert(&missing, &output).unwrap_err();
    match err {
        DistortError::TranscoderFailed { status, stderr } => {
            assert_ne!(status, 0);
            assert!(!stderr.is_empty());
        }
        other => panic!("expected TranscoderFailed, got {other:?}"),
    }
}
