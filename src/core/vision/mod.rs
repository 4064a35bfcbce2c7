//! Vision model collaborator.
//!
//! Sends batches of sampled JPEG frames plus a text prompt to the GLM-4.5V
//! chat completion API, and reads frames back out of recorded sessions.

use thiserror::Error;

mod client;
mod recording;

pub use client::{
    Choice, ChoiceMessage, DEFAULT_VISION_TIMEOUT, GLM_VISION_MODEL, GLM_VISION_URL, Usage,
    VisionClient, VisionConfig, VisionResponse,
};
pub use recording::{VISION_RESPONSE_TYPE, process_recording, recorded_frames};

/// Errors from the vision collaborator.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vision API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No video frames found in {0}")]
    NoFrames(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
