//! webpad-server library crate.
//!
//! This crate turns browser WebSocket connections into virtual gamepads:
//! every browser that connects is given a player number and its own virtual
//! controller, and every input message it sends is replayed on that
//! controller.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser (JSON over WebSocket)
//!         ↕
//! [webpad-server]
//!   ├── domain/           Pure types: JSON message enums, ServerConfig
//!   ├── application/      SessionManager, SessionRegistry, gamepad traits
//!   └── infrastructure/
//!         ├── ws_server/  WebSocket accept loop (tokio-tungstenite)
//!         ├── gamepad/    Driver backends (mock, Linux uinput)
//!         └── net_info/   LAN address discovery for the startup banner
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `webpad-core` only, and talks to
//!   devices exclusively through the [`application::gamepad::GamepadDriver`]
//!   trait.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.

/// Domain layer: configuration and wire messages (no I/O).
pub mod domain;

/// Application layer: session lifecycle orchestration.
pub mod application;

/// Infrastructure layer: WebSocket server and gamepad drivers.
pub mod infrastructure;
