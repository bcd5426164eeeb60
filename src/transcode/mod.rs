//! External FFmpeg transcoder invocation

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{DistortError, DistortResult};

/// Environment variable overriding transcoder discovery
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// Most stderr lines kept in a failure report
const STDERR_TAIL_LINES: usize = 6;

/// Handle to the system FFmpeg binary
#[derive(Debug, Clone)]
pub struct Transcoder {
    binary: PathBuf,
}

impl Transcoder {
    /// Locate the ffmpeg binary: `FFMPEG_PATH` wins, then `PATH`
    pub fn locate() -> DistortResult<Self> {
        if let Ok(custom) = env::var(FFMPEG_PATH_ENV) {
            let binary = PathBuf::from(&custom);
            if binary.is_file() {
                debug!("using transcoder from {FFMPEG_PATH_ENV}: {}", binary.display());
                return Ok(Self { binary });
            }
            return Err(DistortError::TranscoderNotFound {
                message: format!("{FFMPEG_PATH_ENV} points to {custom}, which is not a file"),
            });
        }
        let binary = which::which("ffmpeg").map_err(|_| DistortError::TranscoderNotFound {
            message: "ffmpeg is not on PATH; install it or set FFMPEG_PATH".to_string(),
        })?;
        debug!("using transcoder at {}", binary.display());
        Ok(Self { binary })
    }

    /// Path of the located binary
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Re-compress a whole container at the given constant rate factor
    pub fn compress(&self, input: &Path, output: &Path, crf: u32) -> DistortResult<()> {
        info!("re-compressing {} at crf {}", input.display(), crf);
        self.run(&compress_args(input, output, crf))
    }

    /// Convert a file into whatever container the output extension names
    pub fn convert(&self, input: &Path, output: &Path) -> DistortResult<()> {
        info!("converting {} -> {}", input.display(), output.display());
        self.run(&convert_args(input, output))
    }

    fn run(&self, args: &[OsString]) -> DistortResult<()> {
        debug!("running {} {:?}", self.binary.display(), args);
        let output = Command::new(&self.binary).args(args).output()?;
        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DistortError::TranscoderFailed {
                status,
                stderr: stderr_tail(&stderr),
            });
        }
        Ok(())
    }
}

fn compress_args(input: &Path, output: &Path, crf: u32) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        input.into(),
        "-crf".into(),
        crf.to_string().into(),
        output.into(),
    ]
}

fn convert_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec!["-y".into(), "-i".into(), input.into(), output.into()]
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_args_carry_the_crf() {
        let args = compress_args(Path::new("in.mp4"), Path::new("out.mp4"), 40);
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(rendered, vec!["-y", "-i", "in.mp4", "-crf", "40", "out.mp4"]);
    }

    #[test]
    fn convert_args_overwrite_and_infer_container() {
        let args = convert_args(Path::new("tmp.avi"), Path::new("out.mp4"));
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(rendered, vec!["-y", "-i", "tmp.avi", "out.mp4"]);
    }

    #[test]
    fn stderr_tail_keeps_only_the_last_lines() {
        let noisy: String = (0..20).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&noisy);
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 19"));
        assert!(!tail.contains("line 0\n"));
    }

    #[test]
    fn stderr_tail_drops_blank_lines() {
        assert_eq!(stderr_tail("\n\nboom\n\n"), "boom");
    }
}
