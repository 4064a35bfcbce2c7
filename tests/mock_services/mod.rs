//! Mock services for integration tests
//!
//! - `realtime`: in-process GLM realtime WebSocket server
//! - `decoder`: shell scripts standing in for ffmpeg

#![allow(dead_code)]

#[cfg(unix)]
pub mod decoder;
pub mod realtime;
