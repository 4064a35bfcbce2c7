//! WebSocket mock of the GLM realtime server
//!
//! Records every text message and Authorization header it receives and lets
//! tests push arbitrary messages to all live connections.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, broadcast};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// Shared state of the mock server
#[derive(Default)]
struct MockState {
    connections: AtomicU64,
    received: Mutex<Vec<String>>,
    auth_headers: std::sync::Mutex<Vec<Option<String>>>,
    pongs: std::sync::Mutex<Vec<Vec<u8>>>,
}

pub struct MockRealtimeServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    push: broadcast::Sender<Message>,
}

impl MockRealtimeServer {
    /// Start a server on an ephemeral localhost port
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState::default());
        let (push, _) = broadcast::channel(64);

        let server_state = state.clone();
        let server_push = push.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                // Subscribe before the handshake so pushes after connect() are never missed
                let outbound = server_push.subscribe();
                tokio::spawn(handle_connection(stream, server_state.clone(), outbound));
            }
        });

        Self { addr, state, push }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/api/paas/v4/realtime", self.addr)
    }

    pub fn connection_count(&self) -> u64 {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub async fn received(&self) -> Vec<String> {
        self.state.received.lock().await.clone()
    }

    /// Received messages parsed as JSON
    pub async fn received_json(&self) -> Vec<serde_json::Value> {
        self.received()
            .await
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state.auth_headers.lock().unwrap().clone()
    }

    /// Payloads of every Pong received, in order
    pub fn pongs(&self) -> Vec<Vec<u8>> {
        self.state.pongs.lock().unwrap().clone()
    }

    /// Send a message to every live connection
    pub fn push(&self, message: Message) {
        let _ = self.push.send(message);
    }

    pub fn push_text(&self, text: &str) {
        self.push(Message::Text(text.to_string().into()));
    }

    /// Wait until at least `count` messages have been received
    pub async fn wait_for_messages(&self, count: usize, timeout: Duration) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let received = self.received().await;
            if received.len() >= count || tokio::time::Instant::now() >= deadline {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    state: Arc<MockState>,
    mut outbound: broadcast::Receiver<Message>,
) {
    let header_state = state.clone();
    let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let auth = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        header_state.auth_headers.lock().unwrap().push(auth);
        Ok(response)
    };

    let Ok(ws_stream) = accept_hdr_async(stream, callback).await else {
        return;
    };
    state.connections.fetch_add(1, Ordering::SeqCst);
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    state.received.lock().await.push(text.to_string());
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Pong(data))) => {
                    state.pongs.lock().unwrap().push(data.to_vec());
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            pushed = outbound.recv() => match pushed {
                Ok(message) => {
                    let closing = matches!(message, Message::Close(_));
                    if write.send(message).await.is_err() || closing {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// An address with nothing listening on it
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}/realtime", addr)
}
