//! Still-frame sampling through an external decoder (ffmpeg).
//!
//! Each call works in its own temporary directory:
//!
//! ```text
//! video_process_XXXXXX/
//!   input.h264        repaired elementary stream
//!   frame_0001.jpg    first sampled frame
//!   frame_0002.jpg
//!   ...
//! ```
//!
//! The decoder numbers frames with a fixed-width, zero-padded counter, so
//! ascending name order is chronological order for up to 9999 frames per call.
//! The directory is removed when the call returns, whatever the outcome.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error};

use super::MediaError;

/// Output file name pattern handed to the decoder.
pub const FRAME_PATTERN: &str = "frame_%04d.jpg";

const FRAME_PREFIX: &str = "frame_";
const FRAME_SUFFIX: &str = ".jpg";
const INPUT_NAME: &str = "input.h264";

/// Default decoder program, resolved through `PATH`.
pub const DEFAULT_DECODER: &str = "ffmpeg";

/// Default JPEG quality (`-qscale:v`, 2 is near-lossless).
pub const DEFAULT_QUALITY: u8 = 2;

/// Samples JPEG stills from an H.264 Annex B stream.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    program: PathBuf,
    quality: u8,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(DEFAULT_DECODER, DEFAULT_QUALITY)
    }
}

impl FrameSampler {
    pub fn new(program: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            program: program.into(),
            quality,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Sample one frame every `1 / fps` seconds from `stream`.
    ///
    /// Returns encoded JPEG frames in chronological order. Decoder failure, or
    /// a run that produces no frames, is a [`MediaError::Subprocess`].
    pub async fn sample(&self, stream: &[u8], fps: u32) -> Result<Vec<Vec<u8>>, MediaError> {
        let workdir = tempfile::Builder::new()
            .prefix("video_process_")
            .tempdir()?;

        let input = workdir.path().join(INPUT_NAME);
        tokio::fs::write(&input, stream).await?;

        self.run_decoder(&input, &workdir.path().join(FRAME_PATTERN), fps)
            .await?;

        let frames = read_frames(workdir.path()).await?;
        if frames.is_empty() {
            return Err(MediaError::Subprocess(
                "decoder produced no frames".to_string(),
            ));
        }

        debug!(frames = frames.len(), fps, "Sampled video frames");
        Ok(frames)
    }

    async fn run_decoder(&self, input: &Path, pattern: &Path, fps: u32) -> Result<(), MediaError> {
        debug!(program = %self.program.display(), fps, "Running video decoder");

        let output = Command::new(&self.program)
            .arg("-f")
            .arg("h264")
            .arg("-i")
            .arg(input)
            .arg("-vf")
            .arg(format!("fps={fps}"))
            .arg("-qscale:v")
            .arg(self.quality.to_string())
            .arg("-y")
            .arg(pattern)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MediaError::Subprocess(format!(
                    "failed to start {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr.trim().lines().last().unwrap_or_default();
            error!(status = %output.status, "Video decoder failed: {}", tail);
            return Err(MediaError::Subprocess(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                tail
            )));
        }

        Ok(())
    }
}

fn is_frame_name(name: &str) -> bool {
    name.starts_with(FRAME_PREFIX) && name.ends_with(FRAME_SUFFIX)
}

/// Read every sampled frame in `dir`, ordered by file name.
async fn read_frames(dir: &Path) -> Result<Vec<Vec<u8>>, MediaError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str().filter(|n| is_frame_name(n)) {
            names.push(name.to_string());
        }
    }
    names.sort();

    let mut frames = Vec::with_capacity(names.len());
    for name in names {
        frames.push(tokio::fs::read(dir.join(name)).await?);
    }
    Ok(frames)
}
