//! JSON message types for the browser-facing WebSocket protocol.
//!
//! Every frame is a JSON object naming an `event` and carrying its `data`,
//! the same shape the browser controller already uses for its socket events:
//!
//! ```json
//! {"event":"input","data":{"ls":{"x":0.1,"y":0.0},"buttons":{"a":true}}}
//! {"event":"player_id","data":2}
//! {"event":"error","data":"Server full – max 4 players"}
//! ```
//!
//! Serde's `#[serde(tag = "event", content = "data")]` (adjacent tagging)
//! handles this automatically.
//!
//! # Why is input data a raw `serde_json::Value`?
//!
//! The translator must tolerate partial and malformed input without dropping
//! the frame.  Deserializing into a strict struct would reject a frame with a
//! single bad field, so the payload is kept as a `Value` and interpreted
//! field-by-field by [`webpad_core::translate`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use webpad_core::Slot;

/// Messages a browser sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMsg {
    /// One frame of controller input.
    Input(Value),
}

/// Messages the server sends to a browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMsg {
    /// The connection was accepted and bound to this player number.
    PlayerId(Slot),
    /// The connection was rejected; human-readable reason.
    Error(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
