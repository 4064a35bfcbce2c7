//! Expansion of one raw video capture event into per-frame wire events.

use tracing::debug;

use super::frames::{DEFAULT_DECODER, DEFAULT_QUALITY, FrameSampler};
use super::h264::{ParameterSets, repair};
use crate::core::realtime::{Event, EventType, RealtimeError, RealtimeResult};

/// Default sampling rate in frames per second.
pub const DEFAULT_VIDEO_FPS: u32 = 2;

/// Parameters for turning raw H.264 captures into frame events.
#[derive(Debug, Clone)]
pub struct VideoFramingOptions {
    /// Frames sampled per second of video
    /// Default: 2
    pub fps: u32,

    /// Decoder program
    /// Default: "ffmpeg"
    pub decoder: String,

    /// JPEG quality passed to the decoder
    /// Default: 2
    pub quality: u8,

    /// SPS/PPS injected ahead of each capture
    pub parameter_sets: ParameterSets,
}

impl Default for VideoFramingOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_VIDEO_FPS,
            decoder: DEFAULT_DECODER.to_string(),
            quality: DEFAULT_QUALITY,
            parameter_sets: ParameterSets::default(),
        }
    }
}

/// Repairs, samples and re-wraps video capture events.
#[derive(Debug, Clone)]
pub struct VideoFramer {
    sampler: FrameSampler,
    parameter_sets: ParameterSets,
    fps: u32,
}

impl VideoFramer {
    pub fn new(options: &VideoFramingOptions) -> Self {
        Self {
            sampler: FrameSampler::new(&options.decoder, options.quality),
            parameter_sets: options.parameter_sets.clone(),
            fps: options.fps,
        }
    }

    /// Check that `event` is a video frame append carrying a non-empty capture.
    pub fn validate(event: &Event) -> RealtimeResult<&[u8]> {
        if event.event_type != EventType::InputVideoFrameAppend {
            return Err(RealtimeError::ValidationError(format!(
                "expected {}, got {}",
                EventType::InputVideoFrameAppend,
                event.event_type
            )));
        }
        match event.video_frame.as_deref() {
            Some(frame) if !frame.is_empty() => Ok(frame),
            _ => Err(RealtimeError::ValidationError(
                "video_frame is empty".to_string(),
            )),
        }
    }

    /// Produce one event per sampled frame, in chronological order.
    ///
    /// Each result is a copy of `event` with `video_frame` replaced by one JPEG.
    pub async fn frame_event(&self, event: &Event) -> RealtimeResult<Vec<Event>> {
        let capture = Self::validate(event)?;
        if self.fps == 0 {
            return Err(RealtimeError::ValidationError(
                "video sampling rate must be positive".to_string(),
            ));
        }

        let stream = repair(capture, &self.parameter_sets);
        let frames = self.sampler.sample(&stream, self.fps).await?;

        debug!(
            capture_bytes = capture.len(),
            frames = frames.len(),
            "Framed video capture"
        );

        Ok(frames
            .into_iter()
            .map(|frame| Event {
                video_frame: Some(frame),
                ..event.clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_wrong_type() {
        let mut event = Event::audio_append(&[0, 1]);
        event.video_frame = Some(vec![1, 2, 3]);
        assert!(matches!(
            VideoFramer::validate(&event),
            Err(RealtimeError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_frame() {
        let empty = Event::video_frame_append(Vec::new());
        assert!(VideoFramer::validate(&empty).is_err());

        let mut missing = Event::video_frame_append(vec![1]);
        missing.video_frame = None;
        assert!(VideoFramer::validate(&missing).is_err());
    }

    #[test]
    fn test_validate_accepts_capture() {
        let event = Event::video_frame_append(vec![0x65, 0x88]);
        assert_eq!(VideoFramer::validate(&event).unwrap(), &[0x65, 0x88]);
    }

    #[tokio::test]
    async fn test_zero_fps_rejected() {
        let framer = VideoFramer::new(&VideoFramingOptions {
            fps: 0,
            ..Default::default()
        });
        let err = framer
            .frame_event(&Event::video_frame_append(vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_decoder_failure_propagates() {
        let framer = VideoFramer::new(&VideoFramingOptions {
            decoder: "/nonexistent/decoder-binary".to_string(),
            ..Default::default()
        });
        let err = framer
            .frame_event(&Event::video_frame_append(vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RealtimeError::Media(crate::core::media::MediaError::Subprocess(_))
        ));
    }
}
