//! In-memory virtual gamepad driver.
//!
//! # Why a mock driver?
//!
//! The real drivers create OS-level devices that:
//!
//! - Require kernel support and permissions (uinput) to exist at all.
//! - Are visible to every game running on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! `MockGamepadDriver` replaces all of that with in-memory recording.  Each
//! device keeps its current [`GamepadReport`] plus a history of every
//! operation, so tests can assert exactly what was written and in what order.
//!
//! It also backs the `--driver mock` mode of the binary, where applied state
//! is only logged at `trace` level.  That mode is useful for trying the
//! browser controller on a machine with no gamepad driver installed.
//!
//! # Failure injection
//!
//! - [`MockGamepadDriver::set_available`] makes `create` fail with
//!   `DriverUnavailable`.
//! - [`MockDeviceHandle::fail_writes`] makes every operation on one device
//!   fail with `Io`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;
use webpad_core::{DeviceState, GamepadReport, Slot};

use crate::application::gamepad::{DeviceError, GamepadDriver, VirtualGamepad};

/// One recorded device operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    /// `apply_state`, with the report after merging.
    Apply(GamepadReport),
    Reset,
    Destroy,
}

#[derive(Debug, Default)]
struct DeviceRecord {
    report: GamepadReport,
    history: Vec<MockOp>,
    fail_writes: bool,
}

/// Test-side view of one mock device.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    slot: Slot,
    inner: Arc<Mutex<DeviceRecord>>,
}

impl MockDeviceHandle {
    fn new(slot: Slot) -> Self {
        Self {
            slot,
            inner: Arc::new(Mutex::new(DeviceRecord::default())),
        }
    }

    fn record(&self) -> std::sync::MutexGuard<'_, DeviceRecord> {
        self.inner.lock().expect("lock poisoned")
    }

    /// The slot this device was created for.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// The device's current full state.
    pub fn report(&self) -> GamepadReport {
        self.record().report
    }

    /// Every operation performed on the device, oldest first.
    pub fn history(&self) -> Vec<MockOp> {
        self.record().history.clone()
    }

    pub fn apply_count(&self) -> usize {
        self.count(|op| matches!(op, MockOp::Apply(_)))
    }

    pub fn reset_count(&self) -> usize {
        self.count(|op| matches!(op, MockOp::Reset))
    }

    pub fn is_destroyed(&self) -> bool {
        self.count(|op| matches!(op, MockOp::Destroy)) > 0
    }

    /// `true` if the device's final two operations were reset then destroy.
    pub fn reset_before_destroy(&self) -> bool {
        self.record().history.ends_with(&[MockOp::Reset, MockOp::Destroy])
    }

    /// Makes every subsequent operation on this device fail.
    pub fn fail_writes(&self, fail: bool) {
        self.record().fail_writes = fail;
    }

    fn count(&self, pred: impl Fn(&MockOp) -> bool) -> usize {
        self.record().history.iter().filter(|op| pred(op)).count()
    }
}

/// The device object handed to the session manager.
struct MockGamepad {
    handle: MockDeviceHandle,
}

impl VirtualGamepad for MockGamepad {
    fn apply_state(&mut self, state: &DeviceState) -> Result<(), DeviceError> {
        let mut rec = self.handle.record();
        if rec.fail_writes {
            return Err(DeviceError::Io("mock write failure".into()));
        }
        rec.report.merge(state);
        let report = rec.report;
        rec.history.push(MockOp::Apply(report));
        trace!("mock gamepad {}: {:?}", self.handle.slot, report);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), DeviceError> {
        let mut rec = self.handle.record();
        if rec.fail_writes {
            return Err(DeviceError::Io("mock reset failure".into()));
        }
        rec.report = GamepadReport::default();
        rec.history.push(MockOp::Reset);
        Ok(())
    }

    fn destroy(self: Box<Self>) -> Result<(), DeviceError> {
        let mut rec = self.handle.record();
        if rec.fail_writes {
            return Err(DeviceError::Io("mock destroy failure".into()));
        }
        rec.history.push(MockOp::Destroy);
        Ok(())
    }
}

/// A driver that creates [`MockGamepad`]s and keeps a handle to each.
pub struct MockGamepadDriver {
    available: AtomicBool,
    devices: Mutex<Vec<MockDeviceHandle>>,
}

impl MockGamepadDriver {
    /// Creates an available driver with no devices.
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            devices: Mutex::new(Vec::new()),
        }
    }

    /// When `false`, `create` fails with `DriverUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of devices successfully created so far.
    pub fn created_count(&self) -> usize {
        self.devices.lock().expect("lock poisoned").len()
    }

    /// The most recently created device for `slot`.
    pub fn device(&self, slot: Slot) -> Option<MockDeviceHandle> {
        self.devices
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find(|d| d.slot == slot)
            .cloned()
    }

    /// All devices ever created, oldest first.
    pub fn devices(&self) -> Vec<MockDeviceHandle> {
        self.devices.lock().expect("lock poisoned").clone()
    }

    /// Sum of `apply_state` calls across every device.
    pub fn total_applies(&self) -> usize {
        self.devices().iter().map(MockDeviceHandle::apply_count).sum()
    }
}

impl Default for MockGamepadDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl GamepadDriver for MockGamepadDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn create(&self, slot: Slot) -> Result<Box<dyn VirtualGamepad>, DeviceError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(DeviceError::DriverUnavailable("mock driver disabled".into()));
        }
        let handle = MockDeviceHandle::new(slot);
        self.devices
            .lock()
            .expect("lock poisoned")
            .push(handle.clone());
        Ok(Box::new(MockGamepad { handle }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
