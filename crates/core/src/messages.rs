//! WebSocket message types for the realtime feed

use serde::{Deserialize, Serialize};
use crate::models::*;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for the current state without waiting for the next write
    RequestSnapshot,

    /// Ping to keep connection alive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full club state; replaces whatever the client held before
    Snapshot {
        snapshot: DisplaySnapshot,
    },

    /// Generic error
    Error {
        message: String,
    },

    /// Pong response
    Pong,
}
