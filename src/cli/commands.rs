//! Command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::cli::args::{CheckArgs, DistortArgs, InspectArgs};
use crate::distortion::{self, DistortionLevel, DistortionType};
use crate::engine::pipeline::FramePipeline;
use crate::error::DistortError;
use crate::meta::MetaLedger;
use crate::probe::{CheckReport, VideoInfo};
use crate::transcode::Transcoder;

/// Execute the distort command
pub fn distort(args: DistortArgs) -> Result<()> {
    info!("Starting distort operation");
    info!("Input: {}", args.vid_in);
    info!("Output: {}", args.vid_out);

    check_preconditions(&args)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Resolve type and level once; everything downstream uses this pair
    let distortion_type = distortion::resolve_type(args.distortion_type.as_deref(), &mut rng)?;
    let level = distortion::resolve_level(args.level.as_deref(), &mut rng)?;
    let severity = distortion_type.severity(level);

    info!(
        "Applying level-{} {} (severity {})",
        level,
        distortion_type.label(),
        severity
    );

    let input = Path::new(&args.vid_in);
    let output = Path::new(&args.vid_out);
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }

    if distortion_type.is_video_level() {
        if args.via_xvid {
            debug!("--via_xvid has no effect on container-level re-compression");
        }
        let transcoder = Transcoder::locate()?;
        transcoder.compress(input, output, severity as u32)?;
        println!(
            "Re-compressed {} -> {} (crf {})",
            args.vid_in, args.vid_out, severity as u32
        );
    } else {
        let pipeline = FramePipeline::new(args.via_xvid);
        let summary = pipeline.run(input, output, distortion_type, severity, &mut rng)?;
        println!(
            "Distorted {} frames ({}x{} @ {:.3} fps) -> {}",
            summary.frames, summary.width, summary.height, summary.fps, args.vid_out
        );
        if summary.repaired {
            println!("Container repaired through an AVI intermediate");
        }
    }

    if let Some(meta_path) = &args.meta_path {
        update_ledger(meta_path, &args.vid_in, &args.vid_out, distortion_type, level)?;
        println!(
            "Ledger updated: {} now carries {}:{}",
            args.vid_out, distortion_type, level
        );
    }

    info!("Distort operation completed successfully");
    Ok(())
}

/// Execute the check command
pub fn check(args: CheckArgs) -> Result<()> {
    info!("Starting check operation");
    info!("Reference: {}", args.vid_in);
    info!("Candidate: {}", args.vid_out);

    let reference = VideoInfo::probe(Path::new(&args.vid_in))
        .with_context(|| format!("Failed to probe {}", args.vid_in))?;
    let candidate = VideoInfo::probe(Path::new(&args.vid_out))
        .with_context(|| format!("Failed to probe {}", args.vid_out))?;
    let report = CheckReport::compare(&reference, &candidate);

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize check report to JSON")?;
        println!("{}", json);
    } else {
        display_check_report(&report);
    }

    if report.passed {
        info!("Check operation completed successfully");
        Ok(())
    } else {
        Err(DistortError::CheckFailed {
            message: report.mismatched_properties().join(", "),
        }
        .into())
    }
}

/// Execute the inspect command
pub fn inspect(args: InspectArgs) -> Result<()> {
    info!("Starting inspect operation");
    info!("Input: {}", args.vid_in);

    let video_info = VideoInfo::probe(Path::new(&args.vid_in))
        .with_context(|| format!("Failed to probe {}", args.vid_in))?;

    if args.json {
        let json = serde_json::to_string_pretty(&video_info)
            .context("Failed to serialize video info to JSON")?;
        println!("{}", json);
    } else {
        display_video_info(&video_info);
    }

    info!("Inspect operation completed successfully");
    Ok(())
}

/// Validate the distort arguments before any media work starts
fn check_preconditions(args: &DistortArgs) -> Result<(), DistortError> {
    if !Path::new(&args.vid_in).exists() {
        return Err(DistortError::InputFileNotFound {
            path: args.vid_in.clone(),
        });
    }
    if args.vid_in == args.vid_out {
        return Err(DistortError::SamePath {
            path: args.vid_in.clone(),
        });
    }
    Ok(())
}

/// Load, extend, and rewrite the distortion history ledger
fn update_ledger(
    meta_path: &str,
    input: &str,
    output: &str,
    distortion_type: DistortionType,
    level: DistortionLevel,
) -> Result<()> {
    let path = Path::new(meta_path);
    let mut ledger =
        MetaLedger::load(path).with_context(|| format!("Failed to load ledger {meta_path}"))?;
    ledger.record(input, output, distortion_type, level);
    ledger
        .persist(path)
        .with_context(|| format!("Failed to persist ledger {meta_path}"))?;
    Ok(())
}

/// Display a check report in human-readable format
fn display_check_report(report: &CheckReport) {
    println!("Video Comparison");
    println!("================");
    println!("Reference: {}", report.reference);
    println!("Candidate: {}", report.candidate);
    println!();

    for item in &report.items {
        let status = if item.matches { "ok      " } else { "MISMATCH" };
        println!(
            "  {} {:<12} {} vs {}",
            status, item.property, item.reference, item.candidate
        );
    }
    println!();

    if report.passed {
        println!("No problem.");
    } else {
        println!(
            "Found {} mismatched properties",
            report.mismatched_properties().len()
        );
    }
}

/// Display video information in human-readable format
fn display_video_info(video_info: &VideoInfo) {
    println!("Video Information");
    println!("=================");
    println!("File: {}", video_info.path);
    println!("Dimensions: {}x{}", video_info.width, video_info.height);
    println!("Frame Rate: {:.3} fps", video_info.fps);
    if video_info.frame_count > 0 {
        println!("Frames: {}", video_info.frame_count);
    } else {
        println!("Frames: unknown");
    }
    println!("Codec: {}", video_info.codec);
    println!("Duration: {:.3}s", video_info.duration_seconds);
}
