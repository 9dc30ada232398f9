//! Input layer: button vocabulary, normalized gamepad state, and translation.
//!
//! ```text
//! browser JSON payload ──translate()──► DeviceState ──► virtual gamepad
//! ```

pub mod button;
pub mod state;
pub mod translate;
