//! Background task that reads, decodes and dispatches inbound events.
//!
//! One loop runs per live connection. It ends when the client disconnects,
//! the socket errors or closes, a read stays idle past the read timeout, the
//! optional session deadline passes, an inbound payload fails to decode, or
//! the event handler fails. Every exit other than a client disconnect tears
//! the connection down so later sends report `NotConnected`.

use std::sync::Arc;

use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::base::RealtimeError;
use super::client::{ClientShared, WsStream};
use super::messages::Event;
use super::shutdown::LoopCompletion;

/// Why the receive loop stopped.
#[derive(Debug)]
enum LoopExit {
    Cancelled,
    ReadTimeout,
    SessionDeadline,
    Closed,
    StreamEnded,
    ReadError(String),
    Failed(RealtimeError),
}

pub(crate) struct ReceiveLoop {
    shared: Arc<ClientShared>,
    stream: SplitStream<WsStream>,
    cancel: CancellationToken,
    generation: u64,
    completion: LoopCompletion,
}

impl ReceiveLoop {
    pub(crate) fn new(
        shared: Arc<ClientShared>,
        stream: SplitStream<WsStream>,
        cancel: CancellationToken,
        generation: u64,
        completion: LoopCompletion,
    ) -> Self {
        Self {
            shared,
            stream,
            cancel,
            generation,
            completion,
        }
    }

    pub(crate) async fn run(mut self) {
        let options = self.shared.options();
        let session_deadline = options.session_deadline.map(|d| Instant::now() + d);
        let read_timeout = options.read_timeout;

        debug!(generation = self.generation, "Receive loop started");

        let exit = loop {
            let now = Instant::now();
            // Per-read deadline is refreshed on every iteration
            let read_deadline = read_timeout.map(|t| now + t);
            let deadline = match (read_deadline, session_deadline) {
                (Some(r), Some(s)) => Some(r.min(s)),
                (r, s) => r.or(s),
            };

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break LoopExit::Cancelled,
                next = next_message(&mut self.stream, deadline) => next,
            };

            let message = match next {
                Some(Some(Ok(message))) => message,
                Some(Some(Err(e))) => break LoopExit::ReadError(e.to_string()),
                Some(None) => break LoopExit::StreamEnded,
                None if session_deadline.is_some_and(|s| Instant::now() >= s) => {
                    break LoopExit::SessionDeadline;
                }
                None => break LoopExit::ReadTimeout,
            };

            match message {
                Message::Text(text) => {
                    if let Err(e) = self.dispatch(text.as_bytes()).await {
                        break LoopExit::Failed(e);
                    }
                }
                Message::Binary(data) => {
                    if let Err(e) = self.dispatch(&data).await {
                        break LoopExit::Failed(e);
                    }
                }
                Message::Close(frame) => {
                    log_close(frame.as_ref());
                    break LoopExit::Closed;
                }
                // tungstenite queues the Pong reply itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        };

        match &exit {
            LoopExit::Cancelled => debug!("Receive loop cancelled"),
            LoopExit::ReadTimeout => warn!(?read_timeout, "No message within read timeout"),
            LoopExit::SessionDeadline => info!("Session deadline reached"),
            LoopExit::Closed => {}
            LoopExit::StreamEnded => info!("WebSocket stream ended"),
            LoopExit::ReadError(e) => error!("WebSocket read error: {}", e),
            LoopExit::Failed(e) => error!("Receive loop failed: {}", e),
        }

        if !matches!(exit, LoopExit::Cancelled) {
            self.shared.disconnect_generation(self.generation).await;
        }

        debug!(generation = self.generation, "Receive loop exited");
        drop(self.completion);
    }

    /// Decode one inbound payload and hand it to the handler.
    ///
    /// Without a handler the payload is dropped undecoded.
    async fn dispatch(&self, payload: &[u8]) -> Result<(), RealtimeError> {
        let Some(handler) = self.shared.handler() else {
            return Ok(());
        };

        let event: Event = serde_json::from_slice(payload).map_err(|e| {
            RealtimeError::ProtocolError(format!(
                "{}: {}",
                e,
                String::from_utf8_lossy(&payload[..payload.len().min(256)])
            ))
        })?;

        debug!(event_type = %event.event_type, "Received event");

        handler
            .on_event(event)
            .await
            .map_err(|e| RealtimeError::CallbackError(format!("{:#}", e)))
    }
}

/// Next message, or `None` once `deadline` passes.
async fn next_message(
    stream: &mut SplitStream<WsStream>,
    deadline: Option<Instant>,
) -> Option<Option<Result<Message, tokio_tungstenite::tungstenite::Error>>> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, stream.next()).await.ok(),
        None => Some(stream.next().await),
    }
}

fn log_close(frame: Option<&CloseFrame>) {
    match frame {
        Some(frame) if frame.code == CloseCode::Normal => {
            info!(reason = %frame.reason, "WebSocket closed by server");
        }
        Some(frame) => {
            warn!(
                code = u16::from(frame.code),
                reason = %frame.reason,
                "WebSocket closed abnormally"
            );
        }
        None => info!("WebSocket closed by server"),
    }
}
