//! Linux uinput virtual gamepad driver.
//!
//! Creates one `/dev/uinput` device per player that identifies itself as an
//! Xbox 360 controller, so games and SDL pick up the standard mapping without
//! any configuration.
//!
//! # Axis mapping
//!
//! | State field      | evdev code              | Range            |
//! |------------------|-------------------------|------------------|
//! | left stick x / y | `ABS_X` / `ABS_Y`       | -32768..=32767   |
//! | right stick x / y| `ABS_RX` / `ABS_RY`     | -32768..=32767   |
//! | left trigger     | `ABS_Z`                 | 0..=255          |
//! | right trigger    | `ABS_RZ`                | 0..=255          |
//! | D-pad            | `ABS_HAT0X` / `ABS_HAT0Y` | -1..=1         |
//!
//! evdev's `ABS_Y` grows downwards, so the controller-up-positive `y` of
//! [`StickPosition`] is negated on the way out.
//!
//! # Permissions
//!
//! The process needs write access to `/dev/uinput` (usually membership of the
//! `input` group or a udev rule).  Without it `create` returns
//! `DriverUnavailable`.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, BusType, EventType, InputEvent, InputId, Key,
    UinputAbsSetup,
};
use tracing::debug;
use webpad_core::{Button, DeviceState, GamepadReport, Slot, StickPosition};

use crate::application::gamepad::{DeviceError, GamepadDriver, VirtualGamepad};

const XBOX_VENDOR: u16 = 0x045e;
const XBOX_360_PRODUCT: u16 = 0x028e;
const STICK_MAX: i32 = 32767;
const TRIGGER_MAX: i32 = 255;

/// Face, shoulder, menu, and thumb buttons that map to `EV_KEY` codes.
/// The D-pad is reported on the hat axes instead.
const KEY_MAP: &[(Button, Key)] = &[
    (Button::A, Key::BTN_SOUTH),
    (Button::B, Key::BTN_EAST),
    (Button::X, Key::BTN_NORTH),
    (Button::Y, Key::BTN_WEST),
    (Button::Lb, Key::BTN_TL),
    (Button::Rb, Key::BTN_TR),
    (Button::View, Key::BTN_SELECT),
    (Button::Menu, Key::BTN_START),
    (Button::Home, Key::BTN_MODE),
    (Button::LsClick, Key::BTN_THUMBL),
    (Button::RsClick, Key::BTN_THUMBR),
];

/// Creates uinput-backed gamepads.
#[derive(Debug, Default)]
pub struct UinputGamepadDriver;

impl UinputGamepadDriver {
    pub fn new() -> Self {
        Self
    }
}

impl GamepadDriver for UinputGamepadDriver {
    fn name(&self) -> &'static str {
        "uinput"
    }

    fn create(&self, slot: Slot) -> Result<Box<dyn VirtualGamepad>, DeviceError> {
        let device = build_device(slot).map_err(|e| {
            DeviceError::DriverUnavailable(format!("cannot create uinput device: {e}"))
        })?;
        debug!("player {slot}: uinput gamepad created");
        Ok(Box::new(UinputGamepad {
            device,
            report: GamepadReport::default(),
        }))
    }
}

fn build_device(slot: Slot) -> std::io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();
    for (_, key) in KEY_MAP {
        keys.insert(*key);
    }

    let stick = AbsInfo::new(0, -STICK_MAX - 1, STICK_MAX, 16, 128, 0);
    let trigger = AbsInfo::new(0, 0, TRIGGER_MAX, 0, 0, 0);
    let hat = AbsInfo::new(0, -1, 1, 0, 0, 0);

    let name = format!("webpad Controller {slot}");
    VirtualDeviceBuilder::new()?
        .name(&name)
        .input_id(InputId::new(BusType::BUS_USB, XBOX_VENDOR, XBOX_360_PRODUCT, 0x0110))
        .with_keys(&keys)?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_X, stick))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, stick))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RX, stick))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RY, stick))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_Z, trigger))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RZ, trigger))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_HAT0X, hat))?
        .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_HAT0Y, hat))?
        .build()
}

struct UinputGamepad {
    device: VirtualDevice,
    report: GamepadReport,
}

impl UinputGamepad {
    fn commit(&mut self) -> Result<(), DeviceError> {
        let events = report_events(&self.report);
        self.device
            .emit(&events)
            .map_err(|e| DeviceError::Io(e.to_string()))
    }
}

impl VirtualGamepad for UinputGamepad {
    fn apply_state(&mut self, state: &DeviceState) -> Result<(), DeviceError> {
        self.report.merge(state);
        self.commit()
    }

    fn reset(&mut self) -> Result<(), DeviceError> {
        self.report = GamepadReport::default();
        self.commit()
    }

    fn destroy(self: Box<Self>) -> Result<(), DeviceError> {
        // Closing the uinput file descriptor removes the device.
        drop(self);
        Ok(())
    }
}

/// Full set of events describing `report`; `emit` appends the SYN_REPORT.
fn report_events(report: &GamepadReport) -> Vec<InputEvent> {
    let abs = |axis: AbsoluteAxisType, value: i32| InputEvent::new(EventType::ABSOLUTE, axis.0, value);

    let (lx, ly) = stick_values(report.left_stick);
    let (rx, ry) = stick_values(report.right_stick);
    let (hat_x, hat_y) = hat_values(report);

    let mut events = vec![
        abs(AbsoluteAxisType::ABS_X, lx),
        abs(AbsoluteAxisType::ABS_Y, ly),
        abs(AbsoluteAxisType::ABS_RX, rx),
        abs(AbsoluteAxisType::ABS_RY, ry),
        abs(AbsoluteAxisType::ABS_Z, trigger_value(report.left_trigger)),
        abs(AbsoluteAxisType::ABS_RZ, trigger_value(report.right_trigger)),
        abs(AbsoluteAxisType::ABS_HAT0X, hat_x),
        abs(AbsoluteAxisType::ABS_HAT0Y, hat_y),
    ];
    events.extend(KEY_MAP.iter().map(|(button, key)| {
        InputEvent::new(EventType::KEY, key.code(), i32::from(report.is_pressed(*button)))
    }));
    events
}

fn stick_values(stick: StickPosition) -> (i32, i32) {
    let scale = |v: f32| (v.clamp(-1.0, 1.0) * STICK_MAX as f32).round() as i32;
    (scale(stick.x), scale(-stick.y))
}

fn trigger_value(v: f32) -> i32 {
    (v.clamp(0.0, 1.0) * TRIGGER_MAX as f32).round() as i32
}

fn hat_values(report: &GamepadReport) -> (i32, i32) {
    let axis = |neg: Button, pos: Button| {
        i32::from(report.is_pressed(pos)) - i32::from(report.is_pressed(neg))
    };
    (
        axis(Button::DpadLeft, Button::DpadRight),
        axis(Button::DpadUp, Button::DpadDown),
    )
}
