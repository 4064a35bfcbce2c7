//! Media preparation for the realtime protocol.
//!
//! - [`wav`]: WAV container framing and concatenation of PCM audio
//! - [`h264`]: SPS/PPS injection for raw H.264 captures
//! - [`frames`]: JPEG frame sampling through ffmpeg
//! - [`framer`]: expansion of one video capture event into per-frame events
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_realtime_sdk::core::media::{pcm_to_wav, repair, FrameSampler, ParameterSets};
//!
//! let wav = pcm_to_wav(&pcm, 16000, 1, 16);
//!
//! let stream = repair(&capture, &ParameterSets::default());
//! let frames = FrameSampler::default().sample(&stream, 2).await?;
//! ```

use thiserror::Error;

pub mod frames;
pub mod framer;
pub mod h264;
pub mod wav;

pub use frames::{DEFAULT_DECODER, DEFAULT_QUALITY, FRAME_PATTERN, FrameSampler};
pub use framer::{DEFAULT_VIDEO_FPS, VideoFramer, VideoFramingOptions};
pub use h264::{DEFAULT_PPS_BASE64, DEFAULT_SPS_BASE64, ParameterSets, START_CODE, repair};
pub use wav::{WAV_HEADER_SIZE, WaveFormat, concat_wavs, create_header, pcm_to_wav};

/// Errors from media preparation.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Audio inputs are malformed or have incompatible formats
    #[error("Media format error: {0}")]
    Format(String),

    /// External decoder failed or produced no output
    #[error("Subprocess error: {0}")]
    Subprocess(String),

    /// SPS or PPS payload could not be decoded
    #[error("Invalid parameter set: {0}")]
    InvalidParameterSet(String),

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
