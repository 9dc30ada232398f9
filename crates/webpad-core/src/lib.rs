//! # webpad-core
//!
//! Shared library for webpad containing the player-slot pool, the fixed
//! controller button vocabulary, and the translator that turns raw browser
//! input messages into normalized gamepad state.
//!
//! It has zero dependencies on OS APIs, async runtimes, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! webpad turns phones and browsers into game controllers: each remote
//! connection is bound to one virtual Xbox-style gamepad on the host machine,
//! and every touch on the browser's on-screen controls is replayed on that
//! gamepad.
//!
//! This crate (`webpad-core`) is the pure foundation.  It defines:
//!
//! - **`domain`** – Player slots (1..=4) and the allocator that hands them
//!   out lowest-first, plus the opaque `ConnectionId` the transport assigns to
//!   each remote connection.
//!
//! - **`input`** – The 15-entry button vocabulary, the normalized
//!   `DeviceState` snapshot, and `translate`, the function that converts a raw
//!   JSON payload into that snapshot without ever failing.

pub mod domain;
pub mod input;

// Re-export the most-used types at the crate root so callers can write
// `webpad_core::SlotAllocator` instead of `webpad_core::domain::slot::SlotAllocator`.
pub use domain::connection::ConnectionId;
pub use domain::slot::{Slot, SlotAllocator, SlotError, MAX_PLAYERS};
pub use input::button::Button;
pub use input::state::{DeviceState, GamepadReport, StickPosition};
pub use input::translate::translate;
