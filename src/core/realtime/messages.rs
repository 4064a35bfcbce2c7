//! GLM Realtime WebSocket message types.
//!
//! Every message on the socket is a single JSON object. The `type` field is the
//! discriminator; all other fields are optional and only present when the event
//! type uses them, which keeps wire payloads compact.
//!
//! # Protocol Overview
//!
//! Client events (sent to server):
//! - session.update - Update session configuration
//! - input_audio_buffer.append - Append audio to buffer
//! - input_audio_buffer.append_video_frame - Append one still video frame
//! - input_audio_buffer.commit - Commit audio buffer
//! - conversation.item.create - Add item to conversation
//! - response.create - Generate a response
//!
//! Server events (received from server):
//! - session.created / session.updated
//! - input_audio_buffer.speech_started / speech_stopped
//! - response.created / response.done
//! - response.audio.delta / response.audio_transcript.delta
//! - error

use std::fmt;
use std::str::FromStr;

use base64::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::serde_base64;

// =============================================================================
// Event Type
// =============================================================================

/// Discriminator carried in the `type` field of every event.
///
/// Unknown discriminators decode into [`EventType::Custom`] so a server that
/// introduces a new event never breaks an existing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    // Client events
    SessionUpdate,
    TranscriptionSessionUpdate,
    InputAudioBufferAppend,
    InputVideoFrameAppend,
    InputAudioBufferCommit,
    InputAudioBufferClear,
    ConversationItemCreate,
    ConversationItemRetrieve,
    ConversationItemTruncate,
    ConversationItemDelete,
    ResponseCreate,
    ResponseCancel,

    // Server events
    Error,
    SessionCreated,
    SessionUpdated,
    ConversationCreated,
    ConversationItemCreated,
    ConversationItemRetrieved,
    TranscriptionCompleted,
    TranscriptionFailed,
    ConversationItemTruncated,
    ConversationItemDeleted,
    InputAudioBufferCommitted,
    InputAudioBufferCleared,
    SpeechStarted,
    SpeechStopped,
    ResponseCreated,
    ResponseDone,
    ResponseOutputItemAdded,
    ResponseOutputItemDone,
    ResponseContentPartAdded,
    ResponseContentPartDone,
    ResponseTextDelta,
    ResponseTextDone,
    ResponseAudioTranscriptDelta,
    ResponseAudioTranscriptDone,
    ResponseAudioDelta,
    ResponseAudioDone,
    ResponseFunctionCallArgumentsDelta,
    ResponseFunctionCallArgumentsDone,
    TranscriptionSessionUpdated,
    RateLimitsUpdated,

    // Vendor extensions
    FunctionCallSimpleBrowser,
    FunctionCallSimpleBrowserResult,

    /// Any discriminator not listed above.
    Custom(String),
}

impl EventType {
    /// Wire name of this event type.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::SessionUpdate => "session.update",
            EventType::TranscriptionSessionUpdate => "transcription_session.update",
            EventType::InputAudioBufferAppend => "input_audio_buffer.append",
            EventType::InputVideoFrameAppend => "input_audio_buffer.append_video_frame",
            EventType::InputAudioBufferCommit => "input_audio_buffer.commit",
            EventType::InputAudioBufferClear => "input_audio_buffer.clear",
            EventType::ConversationItemCreate => "conversation.item.create",
            EventType::ConversationItemRetrieve => "conversation.item.retrieve",
            EventType::ConversationItemTruncate => "conversation.item.truncate",
            EventType::ConversationItemDelete => "conversation.item.delete",
            EventType::ResponseCreate => "response.create",
            EventType::ResponseCancel => "response.cancel",
            EventType::Error => "error",
            EventType::SessionCreated => "session.created",
            EventType::SessionUpdated => "session.updated",
            EventType::ConversationCreated => "conversation.created",
            EventType::ConversationItemCreated => "conversation.item.created",
            EventType::ConversationItemRetrieved => "conversation.item.retrieved",
            EventType::TranscriptionCompleted => {
                "conversation.item.input_audio_transcription.completed"
            }
            EventType::TranscriptionFailed => "conversation.item.input_audio_transcription.failed",
            EventType::ConversationItemTruncated => "conversation.item.truncated",
            EventType::ConversationItemDeleted => "conversation.item.deleted",
            EventType::InputAudioBufferCommitted => "input_audio_buffer.committed",
            EventType::InputAudioBufferCleared => "input_audio_buffer.cleared",
            EventType::SpeechStarted => "input_audio_buffer.speech_started",
            EventType::SpeechStopped => "input_audio_buffer.speech_stopped",
            EventType::ResponseCreated => "response.created",
            EventType::ResponseDone => "response.done",
            EventType::ResponseOutputItemAdded => "response.output_item.added",
            EventType::ResponseOutputItemDone => "response.output_item.done",
            EventType::ResponseContentPartAdded => "response.content_part.added",
            EventType::ResponseContentPartDone => "response.content_part.done",
            EventType::ResponseTextDelta => "response.text.delta",
            EventType::ResponseTextDone => "response.text.done",
            EventType::ResponseAudioTranscriptDelta => "response.audio_transcript.delta",
            EventType::ResponseAudioTranscriptDone => "response.audio_transcript.done",
            EventType::ResponseAudioDelta => "response.audio.delta",
            EventType::ResponseAudioDone => "response.audio.done",
            EventType::ResponseFunctionCallArgumentsDelta => {
                "response.function_call_arguments.delta"
            }
            EventType::ResponseFunctionCallArgumentsDone => "response.function_call_arguments.done",
            EventType::TranscriptionSessionUpdated => "transcription_session.updated",
            EventType::RateLimitsUpdated => "rate_limits.updated",
            EventType::FunctionCallSimpleBrowser => "response.function_call.simple_browser",
            EventType::FunctionCallSimpleBrowserResult => {
                "response.function_call.simple_browser.result"
            }
            EventType::Custom(name) => name.as_str(),
        }
    }

    /// Whether this type is emitted by the server.
    pub fn is_server_event(&self) -> bool {
        !matches!(
            self,
            EventType::SessionUpdate
                | EventType::TranscriptionSessionUpdate
                | EventType::InputAudioBufferAppend
                | EventType::InputVideoFrameAppend
                | EventType::InputAudioBufferCommit
                | EventType::InputAudioBufferClear
                | EventType::ConversationItemCreate
                | EventType::ConversationItemRetrieve
                | EventType::ConversationItemTruncate
                | EventType::ConversationItemDelete
                | EventType::ResponseCreate
                | EventType::ResponseCancel
                | EventType::Custom(_)
        )
    }
}

impl FromStr for EventType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let event_type = match s {
            "session.update" => EventType::SessionUpdate,
            "transcription_session.update" => EventType::TranscriptionSessionUpdate,
            "input_audio_buffer.append" => EventType::InputAudioBufferAppend,
            "input_audio_buffer.append_video_frame" => EventType::InputVideoFrameAppend,
            "input_audio_buffer.commit" => EventType::InputAudioBufferCommit,
            "input_audio_buffer.clear" => EventType::InputAudioBufferClear,
            "conversation.item.create" => EventType::ConversationItemCreate,
            "conversation.item.retrieve" => EventType::ConversationItemRetrieve,
            "conversation.item.truncate" => EventType::ConversationItemTruncate,
            "conversation.item.delete" => EventType::ConversationItemDelete,
            "response.create" => EventType::ResponseCreate,
            "response.cancel" => EventType::ResponseCancel,
            "error" => EventType::Error,
            "session.created" => EventType::SessionCreated,
            "session.updated" => EventType::SessionUpdated,
            "conversation.created" => EventType::ConversationCreated,
            "conversation.item.created" => EventType::ConversationItemCreated,
            "conversation.item.retrieved" => EventType::ConversationItemRetrieved,
            "conversation.item.input_audio_transcription.completed" => {
                EventType::TranscriptionCompleted
            }
            "conversation.item.input_audio_transcription.failed" => EventType::TranscriptionFailed,
            "conversation.item.truncated" => EventType::ConversationItemTruncated,
            "conversation.item.deleted" => EventType::ConversationItemDeleted,
            "input_audio_buffer.committed" => EventType::InputAudioBufferCommitted,
            "input_audio_buffer.cleared" => EventType::InputAudioBufferCleared,
            "input_audio_buffer.speech_started" => EventType::SpeechStarted,
            "input_audio_buffer.speech_stopped" => EventType::SpeechStopped,
            "response.created" => EventType::ResponseCreated,
            "response.done" => EventType::ResponseDone,
            "response.output_item.added" => EventType::ResponseOutputItemAdded,
            "response.output_item.done" => EventType::ResponseOutputItemDone,
            "response.content_part.added" => EventType::ResponseContentPartAdded,
            "response.content_part.done" => EventType::ResponseContentPartDone,
            "response.text.delta" => EventType::ResponseTextDelta,
            "response.text.done" => EventType::ResponseTextDone,
            "response.audio_transcript.delta" => EventType::ResponseAudioTranscriptDelta,
            "response.audio_transcript.done" => EventType::ResponseAudioTranscriptDone,
            "response.audio.delta" => EventType::ResponseAudioDelta,
            "response.audio.done" => EventType::ResponseAudioDone,
            "response.function_call_arguments.delta" => {
                EventType::ResponseFunctionCallArgumentsDelta
            }
            "response.function_call_arguments.done" => EventType::ResponseFunctionCallArgumentsDone,
            "transcription_session.updated" => EventType::TranscriptionSessionUpdated,
            "rate_limits.updated" => EventType::RateLimitsUpdated,
            "response.function_call.simple_browser" => EventType::FunctionCallSimpleBrowser,
            "response.function_call.simple_browser.result" => {
                EventType::FunctionCallSimpleBrowserResult
            }
            other => EventType::Custom(other.to_string()),
        };
        Ok(event_type)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        // Infallible: unknown names become Custom
        Ok(name.parse().unwrap_or(EventType::Custom(name)))
    }
}

// =============================================================================
// Event
// =============================================================================

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

/// A single protocol event, client- or server-emitted.
///
/// Only `event_type` is required. Which of the remaining fields is populated
/// depends on the event type; absent fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Optional client-assigned event identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Event discriminator
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Session configuration (session.update, session.created, session.updated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    /// Base64-encoded audio (input_audio_buffer.append)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    /// Response information (response.create, response.created, response.done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,

    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub output_index: u32,

    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub content_index: u32,

    /// Incremental payload for *.delta events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,

    /// Conversation item (conversation.item.create, response.output_item.*)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,

    /// Unix milliseconds at which the client sent the event.
    ///
    /// Zero or negative means "not set"; the client stamps it at send time.
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub client_timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,

    /// Raw video bytes: an H.264 capture before framing, one JPEG after.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_base64"
    )]
    pub video_frame: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EventError>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<ContentPart>,

    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub audio_start_ms: i64,

    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub audio_end_ms: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rate_limits: Vec<RateLimit>,
}

impl Event {
    /// Create an empty event of the given type.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_id: None,
            event_type,
            session: None,
            audio: None,
            response: None,
            item_id: None,
            previous_item_id: None,
            response_id: None,
            output_index: 0,
            content_index: 0,
            delta: None,
            item: None,
            client_timestamp: 0,
            text: None,
            transcript: None,
            name: None,
            call_id: None,
            arguments: None,
            video_frame: None,
            instructions: None,
            error: None,
            conversation: None,
            part: None,
            audio_start_ms: 0,
            audio_end_ms: 0,
            rate_limits: Vec::new(),
        }
    }

    /// session.update with the given configuration.
    pub fn session_update(session: Session) -> Self {
        Self {
            session: Some(session),
            ..Self::new(EventType::SessionUpdate)
        }
    }

    /// input_audio_buffer.append carrying the given audio container bytes.
    pub fn audio_append(data: &[u8]) -> Self {
        Self {
            audio: Some(BASE64_STANDARD.encode(data)),
            ..Self::new(EventType::InputAudioBufferAppend)
        }
    }

    /// input_audio_buffer.append_video_frame carrying raw video bytes.
    pub fn video_frame_append(frame: Vec<u8>) -> Self {
        Self {
            video_frame: Some(frame),
            ..Self::new(EventType::InputVideoFrameAppend)
        }
    }

    /// input_audio_buffer.commit
    pub fn audio_commit() -> Self {
        Self::new(EventType::InputAudioBufferCommit)
    }

    /// input_audio_buffer.clear
    pub fn audio_clear() -> Self {
        Self::new(EventType::InputAudioBufferClear)
    }

    /// conversation.item.create with a user text message.
    pub fn user_text(text: &str) -> Self {
        Self {
            item: Some(Item {
                item_type: ItemType::Message,
                role: Some(ItemRole::User),
                content: vec![Content {
                    content_type: Some(ContentType::InputText),
                    text: Some(text.to_string()),
                    transcript: None,
                }],
                ..Item::default()
            }),
            ..Self::new(EventType::ConversationItemCreate)
        }
    }

    /// conversation.item.create carrying a function call result.
    pub fn function_output(call_id: &str, output: &str) -> Self {
        Self {
            item: Some(Item {
                item_type: ItemType::FunctionCallOutput,
                call_id: Some(call_id.to_string()),
                output: Some(output.to_string()),
                ..Item::default()
            }),
            ..Self::new(EventType::ConversationItemCreate)
        }
    }

    /// response.create, optionally overriding the response configuration.
    pub fn response_create(response: Option<Response>) -> Self {
        Self {
            response,
            ..Self::new(EventType::ResponseCreate)
        }
    }

    /// response.cancel
    pub fn response_cancel() -> Self {
        Self::new(EventType::ResponseCancel)
    }

    /// Decode the base64 audio of an append or delta event.
    pub fn decode_audio(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.audio
            .as_deref()
            .or(self.delta.as_deref().filter(|_| {
                self.event_type == EventType::ResponseAudioDelta
            }))
            .map(|encoded| BASE64_STANDARD.decode(encoded))
    }

    /// Serialize to the JSON text sent over the socket.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Output modality of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
    Video,
}

/// Default modalities for a voice session.
pub const DEFAULT_MODALITIES: [Modality; 2] = [Modality::Text, Modality::Audio];

/// Conversation mode selected through beta fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatMode {
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "video_passive")]
    VideoPassive,
    #[serde(rename = "video_preactive")]
    VideoProactive,
}

/// Input noise reduction profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenoiseType {
    NearField,
    FarField,
}

/// Session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modalities: Vec<Modality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// e.g. "pcm", "wav"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<InputAudioTranscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_detection: Option<TurnDetection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_response_output_tokens: Option<MaxTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_noise_reduction: Option<NoiseReduction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta_fields: Option<BetaFields>,
}

/// Maximum tokens configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxTokens {
    /// Specific number of tokens
    Number(i64),
    /// "inf"
    Infinite(String),
}

impl MaxTokens {
    pub fn infinite() -> Self {
        MaxTokens::Infinite("inf".to_string())
    }
}

/// Input audio transcription configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputAudioTranscription {
    pub enabled: bool,
    pub model: String,
}

/// Turn detection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnDetection {
    /// "server_vad" or "client_vad"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub detection_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_padding_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silence_duration_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_response: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_response: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseReduction {
    #[serde(rename = "type")]
    pub denoise_type: DenoiseType,
}

/// Vendor-specific session options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetaFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode: Option<ChatMode>,
    /// Video frames per second the server should expect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_cloned: Option<ClonedVoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_browser: Option<SimpleBrowser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_search: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClonedVoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleBrowser {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub search_meta: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub text_citation: String,
}

// =============================================================================
// Tools
// =============================================================================

/// Function tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    pub name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: std::collections::BTreeMap<String, ToolProperty>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Conversation Items
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Message,
    FunctionCall,
    FunctionCallOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Audio,
    InputText,
    InputAudio,
}

/// Content within a conversation item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Conversation item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Always "realtime.item" when set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ItemRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Content part streamed within a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub object: String,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    InProgress,
    Cancelled,
    Completed,
    Incomplete,
    Failed,
}

/// Response information and per-response overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modalities: Vec<Modality>,
    /// Always "realtime.response" when set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio_format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<Item>,
}

/// Token accounting for a completed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: i64,
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub input_token_details: TokenDetails,
    #[serde(default)]
    pub output_token_details: TokenDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenDetails {
    #[serde(default)]
    pub text_tokens: i64,
    #[serde(default)]
    pub audio_tokens: i64,
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Error detail carried by an `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error_type, self.code, self.message)
    }
}

/// Rate limit information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
    pub name: String,
    pub limit: i64,
    pub remaining: i64,
    pub reset_seconds: f32,
}

// =============================================================================
// Tests
// =============================================================================
