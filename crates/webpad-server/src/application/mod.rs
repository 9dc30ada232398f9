//! Application layer for webpad-server.
//!
//! This layer contains the session lifecycle logic.  It depends only on the
//! domain layer and `webpad-core`; all device I/O goes through the
//! [`gamepad::GamepadDriver`] trait so it can be tested without an OS driver.
//!
//! - [`gamepad`] – Virtual gamepad traits and best-effort teardown.
//! - [`registry`] – Connection id → session table.
//! - [`session_manager`] – Connect / input / disconnect orchestration.

pub mod gamepad;
pub mod registry;
pub mod session_manager;

pub use gamepad::{probe_driver, reset_and_release, DeviceError, GamepadDriver, VirtualGamepad};
pub use registry::{RegistryError, Session, SessionRegistry, SharedDevice};
pub use session_manager::{PlayerInfo, SessionError, SessionManager};
