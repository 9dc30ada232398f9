//! Infrastructure layer for webpad-server.
//!
//! The infrastructure layer handles all I/O: accepting WebSocket connections
//! from browsers and creating virtual gamepads on the host.
//!
//! # Responsibilities
//!
//! - Binding a TCP listener for browser WebSocket connections
//! - Performing the WebSocket HTTP upgrade handshake
//! - Spawning per-connection Tokio tasks
//! - Creating OS-level virtual gamepads (or in-memory mocks)
//! - Discovering the LAN address shown at startup
//! - Handling the graceful shutdown signal
//!
//! # What does NOT belong here?
//!
//! - Slot and session bookkeeping (that is the application layer)
//! - Message type definitions (that is the domain layer)
//! - Configuration parsing (that is done in `main.rs`)

pub mod gamepad;
pub mod net_info;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use gamepad::create_driver;
pub use ws_server::{run_server, serve};
