//! Frames from newline-delimited JSON session recordings.

use std::path::Path;

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::VisionError;
use super::client::{Usage, VisionClient, VisionResponse};
use crate::core::realtime::EventType;
use crate::utils::unix_secs;

/// `type` of the line appended by [`process_recording`].
pub const VISION_RESPONSE_TYPE: &str = "glm4.5v.response";

#[derive(Debug, Deserialize)]
struct RecordedEvent {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    video_frame: Option<String>,
}

#[derive(Debug, Serialize)]
struct VisionRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    content: &'a str,
    timestamp: i64,
    usage: &'a Usage,
}

/// Collect the video frames of every `append_video_frame` event in `path`.
///
/// Lines that are not JSON objects, or fail to parse, are skipped. Frames
/// that are not valid base64 are skipped with a warning.
pub async fn recorded_frames(path: impl AsRef<Path>) -> Result<Vec<Vec<u8>>, VisionError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await?;
    let frame_type = EventType::InputVideoFrameAppend.as_str();

    let mut frames = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if !line.starts_with('{') {
            continue;
        }

        let Ok(event) = serde_json::from_str::<RecordedEvent>(line) else {
            continue;
        };
        if event.event_type != frame_type {
            continue;
        }

        match event.video_frame.filter(|f| !f.is_empty()) {
            Some(encoded) => match BASE64_STANDARD.decode(encoded.as_bytes()) {
                Ok(frame) => frames.push(frame),
                Err(e) => warn!(line = number + 1, "Skipping undecodable video frame: {}", e),
            },
            None => continue,
        }
    }

    info!(path = %path.display(), frames = frames.len(), "Loaded recorded frames");
    Ok(frames)
}

/// Describe the frames of a recording and optionally append the answer to
/// `output` as one JSON line.
pub async fn process_recording(
    client: &VisionClient,
    input: impl AsRef<Path>,
    prompt: &str,
    output: Option<&Path>,
) -> Result<VisionResponse, VisionError> {
    let input = input.as_ref();
    let frames = recorded_frames(input).await?;
    if frames.is_empty() {
        return Err(VisionError::NoFrames(input.display().to_string()));
    }

    let response = client.describe(&frames, prompt).await?;

    if let Some(output) = output {
        if let Err(e) = append_record(output, &response).await {
            warn!(path = %output.display(), "Failed to save vision response: {}", e);
        }
    }

    Ok(response)
}

async fn append_record(path: &Path, response: &VisionResponse) -> Result<(), VisionError> {
    let record = VisionRecord {
        record_type: VISION_RESPONSE_TYPE,
        content: response.content().unwrap_or_default(),
        timestamp: unix_secs(),
        usage: &response.usage,
    };
    let mut line =
        serde_json::to_vec(&record).map_err(|e| VisionError::InvalidResponse(e.to_string()))?;
    line.push(b'\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&line).await?;
    file.flush().await?;
    Ok(())
}
