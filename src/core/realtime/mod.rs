//! GLM realtime session client.
//!
//! A single persistent WebSocket carries JSON events in both directions.
//! Outbound events are sent through [`RealtimeClient::send`]; inbound events
//! are decoded by a background receive loop and delivered to an
//! [`EventHandler`].
//!
//! # Architecture
//!
//! - `base`: errors, connection state, options and the handler trait
//! - `messages`: the wire event catalog
//! - `client`: connection lifecycle and the guarded send path
//! - `receiver`: the background receive loop
//! - `shutdown`: bounded wait for the receive loop to exit
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_realtime_sdk::core::realtime::{ClientOptions, Event, RealtimeClient};
//!
//! let client = RealtimeClient::new(ClientOptions::default().with_api_key(key));
//! client.connect().await?;
//! client.send(Event::audio_append(&wav_bytes)).await?;
//! client.send(Event::audio_commit()).await?;
//! ```

mod base;
mod client;
pub mod messages;
mod receiver;
mod shutdown;

pub use base::{
    BoxedEventHandler, ClientOptions, ConnectionState, DEFAULT_READ_TIMEOUT, DEFAULT_WAIT_TIMEOUT,
    EventHandler, FnHandler, GLM_REALTIME_URL, RealtimeError, RealtimeResult, ShutdownOutcome,
    handler_fn,
};
pub use client::RealtimeClient;
pub use messages::{Event, EventError, EventType};
