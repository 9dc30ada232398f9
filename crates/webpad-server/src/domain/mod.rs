//! Domain layer for webpad-server.
//!
//! Pure data types with no I/O:
//!
//! - [`config`] – Runtime configuration (`ServerConfig`, `DriverKind`).
//! - [`messages`] – JSON messages exchanged with the browser.

pub mod config;
pub mod messages;

pub use config::{DriverKind, ServerConfig};
pub use messages::{ClientMsg, ServerMsg};
