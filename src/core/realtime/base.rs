//! Base traits and types for the GLM realtime client.
//!
//! This module defines the error taxonomy, the connection state, the client
//! options and the handler abstraction through which inbound events are
//! delivered to the application.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use zeroize::Zeroizing;

use super::messages::Event;
use crate::core::media::{MediaError, VideoFramingOptions};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during realtime operations.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Dialing the server failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Send attempted while disconnected
    #[error("Not connected")]
    NotConnected,

    /// Inbound payload could not be decoded
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The registered event handler failed
    #[error("Callback error: {0}")]
    CallbackError(String),

    /// Caller supplied a payload inconsistent with the requested operation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Socket write or close failed
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Event could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Media preparation failed
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Result type for realtime operations.
pub type RealtimeResult<T> = Result<T, RealtimeError>;

// =============================================================================
// Connection State
// =============================================================================

/// Connection state of a realtime client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Result of waiting for the receive loop to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The receive loop has terminated (or was never started).
    Exited,
    /// The wait timeout elapsed first; the loop may still be running.
    TimedOut,
}

// =============================================================================
// Client Options
// =============================================================================

/// Default GLM realtime endpoint.
pub const GLM_REALTIME_URL: &str = "wss://open.bigmodel.cn/api/paas/v4/realtime";

/// Default idle deadline for a single socket read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Default bound for [`ShutdownOutcome`] waits.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options supplied when constructing a client. Never mutated afterwards.
#[derive(Clone)]
pub struct ClientOptions {
    /// WebSocket endpoint URL
    pub url: String,

    /// Bearer credential; no Authorization header is sent when `None`
    pub api_key: Option<Zeroizing<String>>,

    /// Idle deadline for each read, refreshed after every message.
    /// `None` waits indefinitely.
    /// Default: 15s
    pub read_timeout: Option<Duration>,

    /// Absolute lifetime of the receive loop measured from connect.
    /// Default: None (unbounded)
    pub session_deadline: Option<Duration>,

    /// Upper bound for [`crate::RealtimeClient::wait`].
    /// Default: 30s
    pub wait_timeout: Duration,

    /// Video framing parameters used by `send_video`
    pub video: VideoFramingOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            url: GLM_REALTIME_URL.to_string(),
            api_key: None,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            session_deadline: None,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            video: VideoFramingOptions::default(),
        }
    }
}

impl ClientOptions {
    /// Options for `url` with every other value defaulted.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the bearer credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Zeroizing::new(api_key.into()));
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("read_timeout", &self.read_timeout)
            .field("session_deadline", &self.session_deadline)
            .field("wait_timeout", &self.wait_timeout)
            .field("video", &self.video)
            .finish()
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Receives every inbound event decoded by the receive loop.
///
/// Returning an error forces the client to disconnect.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_event(&self, event: Event) -> anyhow::Result<()>;
}

/// Shared handler reference.
pub type BoxedEventHandler = Arc<dyn EventHandler>;

/// Adapter turning an async closure into an [`EventHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn on_event(&self, event: Event) -> anyhow::Result<()> {
        (self.0)(event).await
    }
}

/// Wrap an async closure as a shared [`EventHandler`].
///
/// # Example
///
/// ```rust,ignore
/// let handler = handler_fn(|event| async move {
///     println!("{}", event.event_type);
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> BoxedEventHandler
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}
