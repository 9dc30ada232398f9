//! Virtual gamepad abstraction consumed by the session manager.
//!
//! The session manager never talks to an OS API directly.  It asks a
//! [`GamepadDriver`] for a new [`VirtualGamepad`] per player and then pushes
//! normalized state into it.  The platform-specific implementations live in
//! `infrastructure::gamepad`.
//!
//! # Device lifecycle
//!
//! ```text
//! driver.create(slot) ──► apply_state(..)* ──► reset() ──► destroy()
//! ```
//!
//! `reset` followed by `destroy` is bundled into [`reset_and_release`], which
//! is best-effort: by the time a device is torn down its player has already
//! left, so a failure is logged and otherwise ignored.

use thiserror::Error;
use tracing::{debug, warn};
use webpad_core::{DeviceState, Slot};

/// Error type for virtual gamepad operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The OS-level virtual device subsystem cannot create a device
    /// (driver not installed, permission denied, resource exhaustion).
    #[error("virtual gamepad driver unavailable: {0}")]
    DriverUnavailable(String),

    /// Writing to an existing device failed.
    #[error("virtual gamepad I/O error: {0}")]
    Io(String),
}

impl DeviceError {
    /// The underlying cause without the variant's prefix.
    pub fn reason(&self) -> &str {
        match self {
            DeviceError::DriverUnavailable(reason) | DeviceError::Io(reason) => reason,
        }
    }
}

/// Creates virtual gamepads.
///
/// Implementations must be cheap to call and must not block on network I/O.
pub trait GamepadDriver: Send + Sync {
    /// Short backend name used in log messages.
    fn name(&self) -> &'static str;

    /// Creates a new virtual gamepad for the given player slot.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DriverUnavailable`] if no device can be created.
    fn create(&self, slot: Slot) -> Result<Box<dyn VirtualGamepad>, DeviceError>;
}

/// One live virtual gamepad.
pub trait VirtualGamepad: Send {
    /// Merges `state` into the device and commits it to the OS.
    ///
    /// Buttons absent from `state.buttons` keep their current value.
    fn apply_state(&mut self, state: &DeviceState) -> Result<(), DeviceError>;

    /// Centres both sticks, releases triggers and every button, and commits.
    fn reset(&mut self) -> Result<(), DeviceError>;

    /// Removes the device from the system.
    fn destroy(self: Box<Self>) -> Result<(), DeviceError>;
}

/// Resets a device to neutral and then destroys it.
///
/// Never fails: errors from either step are logged and swallowed.  `destroy`
/// is attempted even when `reset` fails so the OS device does not leak.
pub fn reset_and_release(mut device: Box<dyn VirtualGamepad>, slot: Slot) {
    if let Err(e) = device.reset() {
        warn!("player {slot}: failed to reset virtual gamepad: {e}");
    }
    match device.destroy() {
        Ok(()) => debug!("player {slot}: virtual gamepad destroyed"),
        Err(e) => warn!("player {slot}: failed to destroy virtual gamepad: {e}"),
    }
}

/// Checks that the driver can create a device right now.
///
/// Creates a throwaway gamepad on slot 1 and immediately releases it.  Used
/// at startup to warn the operator early when the driver is missing.
///
/// # Errors
///
/// Returns the driver's creation error.
pub fn probe_driver(driver: &dyn GamepadDriver) -> Result<(), DeviceError> {
    let slot = Slot::new(1).ok_or_else(|| DeviceError::DriverUnavailable("no probe slot".into()))?;
    let device = driver.create(slot)?;
    reset_and_release(device, slot);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the order of lifecycle calls; optionally fails `reset`.
    struct ScriptedGamepad {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_reset: bool,
        fail_destroy: bool,
    }

    impl VirtualGamepad for ScriptedGamepad {
        fn apply_state(&mut self, _: &DeviceState) -> Result<(), DeviceError> {
            self.calls.lock().unwrap().push("apply");
            Ok(())
        }

        fn reset(&mut self) -> Result<(), DeviceError> {
            self.calls.lock().unwrap().push("reset");
            if self.fail_reset {
                return Err(DeviceError::Io("injected reset failure".into()));
            }
            Ok(())
        }

        fn destroy(self: Box<Self>) -> Result<(), DeviceError> {
            self.calls.lock().unwrap().push("destroy");
            if self.fail_destroy {
                return Err(DeviceError::Io("injected destroy failure".into()));
            }
            Ok(())
        }
    }

    struct ScriptedDriver {
        calls: Arc<Mutex<Vec<&'static str>>>,
        available: bool,
    }

    impl GamepadDriver for ScriptedDriver {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn create(&self, _slot: Slot) -> Result<Box<dyn VirtualGamepad>, DeviceError> {
            if !self.available {
                return Err(DeviceError::DriverUnavailable("not installed".into()));
            }
            self.calls.lock().unwrap().push("create");
            Ok(Box::new(ScriptedGamepad {
                calls: Arc::clone(&self.calls),
                fail_reset: false,
                fail_destroy: false,
            }))
        }
    }

    fn slot1() -> Slot {
        Slot::new(1).unwrap()
    }

    #[test]
    fn test_reset_and_release_resets_before_destroying() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let device = Box::new(ScriptedGamepad {
            calls: Arc::clone(&calls),
            fail_reset: false,
            fail_destroy: false,
        });

        reset_and_release(device, slot1());

        assert_eq!(*calls.lock().unwrap(), vec!["reset", "destroy"]);
    }

    #[test]
    fn test_reset_failure_still_destroys_device() {
        // Arrange: reset fails
        let calls = Arc::new(Mutex::new(Vec::new()));
        let device = Box::new(ScriptedGamepad {
            calls: Arc::clone(&calls),
            fail_reset: true,
            fail_destroy: false,
        });

        // Act: must not panic or propagate
        reset_and_release(device, slot1());

        // Assert
        assert_eq!(*calls.lock().unwrap(), vec!["reset", "destroy"]);
    }

    #[test]
    fn test_destroy_failure_is_swallowed() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let device = Box::new(ScriptedGamepad {
            calls: Arc::clone(&calls),
            fail_reset: true,
            fail_destroy: true,
        });

        reset_and_release(device, slot1());

        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_probe_driver_creates_and_releases_one_device() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let driver = ScriptedDriver {
            calls: Arc::clone(&calls),
            available: true,
        };

        probe_driver(&driver).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["create", "reset", "destroy"]);
    }

    #[test]
    fn test_probe_driver_reports_unavailable_driver() {
        let driver = ScriptedDriver {
            calls: Arc::new(Mutex::new(Vec::new())),
            available: false,
        };

        let result = probe_driver(&driver);

        assert!(matches!(result, Err(DeviceError::DriverUnavailable(_))));
    }

    #[test]
    fn test_reason_strips_variant_prefix() {
        let err = DeviceError::DriverUnavailable("permission denied".into());
        assert_eq!(err.reason(), "permission denied");
        assert_eq!(DeviceError::Io("broken pipe".into()).reason(), "broken pipe");
    }
}
