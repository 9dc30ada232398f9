//! Virtual gamepad driver implementations.
//!
//! The native backend is selected at compile time via `#[cfg(...)]`; the mock
//! backend is always available.

pub mod mock;

#[cfg(all(target_os = "linux", feature = "uinput"))]
pub mod uinput;

use std::sync::Arc;

use anyhow::bail;

use crate::application::gamepad::GamepadDriver;
use crate::domain::DriverKind;

/// Instantiates the driver chosen in the configuration.
///
/// # Errors
///
/// Returns an error if the requested backend was not compiled into this
/// binary.
pub fn create_driver(kind: DriverKind) -> anyhow::Result<Arc<dyn GamepadDriver>> {
    match kind {
        DriverKind::Mock => Ok(Arc::new(mock::MockGamepadDriver::new())),
        #[cfg(all(target_os = "linux", feature = "uinput"))]
        DriverKind::Uinput => Ok(Arc::new(uinput::UinputGamepadDriver::new())),
        #[cfg(not(all(target_os = "linux", feature = "uinput")))]
        DriverKind::Uinput => {
            bail!("uinput support is not compiled in; rebuild on Linux with `--features uinput`")
        }
    }
}
