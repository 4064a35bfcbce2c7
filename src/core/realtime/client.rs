//! GLM realtime WebSocket client.
//!
//! # API Reference
//!
//! - Endpoint: `wss://open.bigmodel.cn/api/paas/v4/realtime`
//! - Protocol: WebSocket with one JSON event per text message
//! - Authentication: optional `Authorization: Bearer <api key>` at dial time
//!
//! # Concurrency
//!
//! Sends take the connection guard shared and serialize their writes on the
//! socket sink, so concurrent sends never interleave. `connect` and
//! `disconnect` take the guard exclusively; once `disconnect` holds it no send
//! is in flight and none can start until it returns.
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_realtime_sdk::core::realtime::{ClientOptions, Event, RealtimeClient, handler_fn};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = ClientOptions::default().with_api_key("...");
//!     let client = RealtimeClient::with_handler(options, handler_fn(|event| async move {
//!         println!("{}", event.event_type);
//!         Ok(())
//!     }));
//!
//!     client.connect().await?;
//!     client.send(Event::user_text("Hello")).await?;
//!     client.send(Event::response_create(None)).await?;
//!
//!     client.wait().await;
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use http::HeaderValue;
use http::header::AUTHORIZATION;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::base::{
    BoxedEventHandler, ClientOptions, ConnectionState, RealtimeError, RealtimeResult,
    ShutdownOutcome,
};
use super::messages::Event;
use super::receiver::ReceiveLoop;
use super::shutdown::ShutdownCoordinator;
use crate::core::media::VideoFramer;
use crate::utils::unix_millis;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SharedSink = Arc<Mutex<SplitSink<WsStream, Message>>>;

// =============================================================================
// Shared State
// =============================================================================

/// A live socket and the loop reading from it.
struct Connection {
    sink: SharedSink,
    cancel: CancellationToken,
    generation: u64,
}

pub(crate) struct ClientShared {
    options: ClientOptions,
    handler: Option<BoxedEventHandler>,
    /// Mirrors `conn.is_some()` for lock-free reads
    connected: AtomicBool,
    conn: RwLock<Option<Connection>>,
    generation: AtomicU64,
    shutdown: ShutdownCoordinator,
}

impl ClientShared {
    pub(crate) fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub(crate) fn handler(&self) -> Option<&BoxedEventHandler> {
        self.handler.as_ref()
    }

    /// Tear down the connection only if it is still the one started as
    /// `generation`.
    pub(crate) async fn disconnect_generation(&self, generation: u64) {
        let mut guard = self.conn.write().await;
        if guard.as_ref().is_some_and(|c| c.generation == generation) {
            // Close errors are expected once the peer has gone away
            let _ = self.teardown(&mut guard).await;
        }
    }

    async fn teardown(&self, slot: &mut Option<Connection>) -> RealtimeResult<()> {
        let Some(conn) = slot.take() else {
            return Ok(());
        };

        // Visible before the socket closes
        self.connected.store(false, Ordering::SeqCst);
        conn.cancel.cancel();

        let result = conn.sink.lock().await.close().await;
        info!(generation = conn.generation, "Disconnected from GLM realtime server");
        result.map_err(|e| {
            debug!("WebSocket close: {}", e);
            RealtimeError::WebSocketError(e.to_string())
        })
    }
}

// =============================================================================
// Realtime Client
// =============================================================================

/// Client for one GLM realtime session at a time.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct RealtimeClient {
    shared: Arc<ClientShared>,
}

impl RealtimeClient {
    /// Create a client that reads and discards inbound messages.
    pub fn new(options: ClientOptions) -> Self {
        Self::build(options, None)
    }

    /// Create a client that delivers inbound events to `handler`.
    pub fn with_handler(options: ClientOptions, handler: BoxedEventHandler) -> Self {
        Self::build(options, Some(handler))
    }

    fn build(options: ClientOptions, handler: Option<BoxedEventHandler>) -> Self {
        Self {
            shared: Arc::new(ClientShared {
                options,
                handler,
                connected: AtomicBool::new(false),
                conn: RwLock::new(None),
                generation: AtomicU64::new(0),
                shutdown: ShutdownCoordinator::default(),
            }),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.shared.options
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        if self.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Whether a receive loop is still running.
    pub fn is_receiving(&self) -> bool {
        self.shared.shutdown.is_running()
    }

    fn build_request(&self) -> RealtimeResult<http::Request<()>> {
        let mut request = self
            .shared
            .options
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| RealtimeError::ConnectionFailed(format!("Invalid URL: {}", e)))?;

        if let Some(api_key) = &self.shared.options.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", api_key.as_str()))
                .map_err(|e| RealtimeError::ConnectionFailed(format!("Invalid API key: {}", e)))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(request)
    }

    /// Dial the server and start the receive loop.
    ///
    /// Returns immediately if already connected.
    pub async fn connect(&self) -> RealtimeResult<()> {
        let mut guard = self.shared.conn.write().await;
        if guard.is_some() {
            debug!("Already connected");
            return Ok(());
        }

        let url = &self.shared.options.url;
        let request = self.build_request()?;
        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| {
                error!(%url, "Failed to connect: {}", e);
                RealtimeError::ConnectionFailed(e.to_string())
            })?;

        let (sink, stream) = ws_stream.split();
        let sink: SharedSink = Arc::new(Mutex::new(sink));
        let cancel = CancellationToken::new();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let receive_loop = ReceiveLoop::new(
            self.shared.clone(),
            stream,
            cancel.clone(),
            generation,
            self.shared.shutdown.track(),
        );

        *guard = Some(Connection {
            sink,
            cancel,
            generation,
        });
        self.shared.connected.store(true, Ordering::SeqCst);
        tokio::spawn(receive_loop.run());

        info!(%url, generation, "Connected to GLM realtime server");
        Ok(())
    }

    /// Close the connection. No-op when already disconnected.
    pub async fn disconnect(&self) -> RealtimeResult<()> {
        let mut guard = self.shared.conn.write().await;
        self.shared.teardown(&mut guard).await
    }

    /// Send one event.
    ///
    /// A `client_timestamp` of zero or less is replaced with the current time.
    pub async fn send(&self, mut event: Event) -> RealtimeResult<()> {
        let guard = self.shared.conn.read().await;
        let Some(conn) = guard.as_ref() else {
            return Err(RealtimeError::NotConnected);
        };

        if event.client_timestamp <= 0 {
            event.client_timestamp = unix_millis();
        }

        let json = serde_json::to_string(&event)
            .map_err(|e| RealtimeError::SerializationError(e.to_string()))?;

        conn.sink
            .lock()
            .await
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| {
                error!(event_type = %event.event_type, "Failed to send event: {}", e);
                RealtimeError::WebSocketError(e.to_string())
            })
    }

    /// Send a raw H.264 capture as a sequence of sampled JPEG frames.
    ///
    /// `event` must be an `input_audio_buffer.append_video_frame` event whose
    /// `video_frame` holds the capture. Every frame is sent as a copy of
    /// `event` sharing one timestamp, in chronological order. Stops at the
    /// first failed send. Nothing is sampled while disconnected.
    pub async fn send_video(&self, mut event: Event) -> RealtimeResult<usize> {
        VideoFramer::validate(&event)?;
        if !self.is_connected() {
            return Err(RealtimeError::NotConnected);
        }
        if event.client_timestamp <= 0 {
            event.client_timestamp = unix_millis();
        }

        let frames = VideoFramer::new(&self.shared.options.video)
            .frame_event(&event)
            .await?;

        let count = frames.len();
        for frame in frames {
            self.send(frame).await?;
        }

        debug!(frames = count, "Sent video frames");
        Ok(count)
    }

    /// Wait for the receive loop to exit, bounded by the configured wait
    /// timeout. Returns at once if no loop was ever started.
    pub async fn wait(&self) -> ShutdownOutcome {
        self.shared
            .shutdown
            .wait(self.shared.options.wait_timeout)
            .await
    }
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("options", &self.shared.options)
            .field("state", &self.state())
            .finish()
    }
}
