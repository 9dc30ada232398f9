//! Normalized gamepad state.
//!
//! Two types live here:
//!
//! - [`DeviceState`] is what one browser message *says*: stick and trigger
//!   positions plus the buttons the message mentions.  It is transient and
//!   write-only.
//! - [`GamepadReport`] is what a virtual device *holds*: the full absolute
//!   state after every message so far has been merged in.  Drivers keep one
//!   per device and push it to the OS after each merge.
//!
//! Buttons are incremental: a message that does not mention a button leaves
//! that button as it was.  Sticks and triggers are absolute: a message that
//! omits them moves them back to rest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::button::Button;

/// Position of one analog stick, each component in `[-1.0, 1.0]`.
///
/// `y` follows the controller convention: positive is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickPosition {
    pub x: f32,
    pub y: f32,
}

/// The normalized content of one input message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceState {
    pub left_stick: StickPosition,
    pub right_stick: StickPosition,
    /// Left trigger in `[0.0, 1.0]`.
    pub left_trigger: f32,
    /// Right trigger in `[0.0, 1.0]`.
    pub right_trigger: f32,
    /// Buttons mentioned by the message: `true` = pressed, `false` = released.
    ///
    /// Buttons absent from this map keep their previous state on the device.
    pub buttons: BTreeMap<Button, bool>,
}

impl DeviceState {
    /// Returns `Some(pressed)` if the message mentioned `button`.
    pub fn button(&self, button: Button) -> Option<bool> {
        self.buttons.get(&button).copied()
    }
}

/// The full state held by one virtual gamepad.
///
/// `Default` is the neutral state: sticks centred, triggers released, no
/// buttons held.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GamepadReport {
    pub left_stick: StickPosition,
    pub right_stick: StickPosition,
    pub left_trigger: f32,
    pub right_trigger: f32,
    /// Held buttons as an XUSB button word (see [`Button::xusb_mask`]).
    pub buttons: u16,
}

impl GamepadReport {
    /// Merges one message into the report.
    ///
    /// Axes and triggers are overwritten; only the buttons named in `state`
    /// change.
    pub fn merge(&mut self, state: &DeviceState) {
        self.left_stick = state.left_stick;
        self.right_stick = state.right_stick;
        self.left_trigger = state.left_trigger;
        self.right_trigger = state.right_trigger;
        for (&button, &pressed) in &state.buttons {
            if pressed {
                self.buttons |= button.xusb_mask();
            } else {
                self.buttons &= !button.xusb_mask();
            }
        }
    }

    /// Returns `true` if `button` is currently held.
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.xusb_mask() != 0
    }

    /// Returns `true` if every axis, trigger, and button is at rest.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn with_buttons(buttons: &[(Button, bool)]) -> DeviceState {
        DeviceState {
            buttons: buttons.iter().copied().collect(),
            ..DeviceState::default()
        }
    }

    #[test]
    fn test_default_report_is_neutral() {
        assert!(GamepadReport::default().is_neutral());
    }

    #[test]
    fn test_merge_overwrites_axes_and_triggers() {
        // Arrange
        let mut report = GamepadReport::default();
        let state = DeviceState {
            left_stick: StickPosition { x: 0.5, y: -0.25 },
            right_stick: StickPosition { x: -1.0, y: 1.0 },
            left_trigger: 0.75,
            right_trigger: 1.0,
            buttons: BTreeMap::new(),
        };

        // Act
        report.merge(&state);

        // Assert
        assert_eq!(report.left_stick, state.left_stick);
        assert_eq!(report.right_stick, state.right_stick);
        assert_eq!(report.left_trigger, 0.75);
        assert_eq!(report.right_trigger, 1.0);

        // A following message without axes returns them to rest.
        report.merge(&DeviceState::default());
        assert!(report.is_neutral());
    }

    #[test]
    fn test_merge_keeps_unmentioned_buttons() {
        let mut report = GamepadReport::default();
        report.merge(&with_buttons(&[(Button::A, true), (Button::B, true)]));

        // Second message only releases B.
        report.merge(&with_buttons(&[(Button::B, false)]));

        assert!(report.is_pressed(Button::A));
        assert!(!report.is_pressed(Button::B));
    }

    #[test]
    fn test_merge_with_no_buttons_leaves_button_word_untouched() {
        let mut report = GamepadReport::default();
        report.merge(&with_buttons(&[(Button::DpadUp, true)]));
        report.merge(&DeviceState::default());

        assert_eq!(report.buttons, Button::DpadUp.xusb_mask());
        assert!(!report.is_neutral());
    }

    #[test]
    fn test_device_state_button_lookup() {
        let state = with_buttons(&[(Button::Y, false)]);
        assert_eq!(state.button(Button::Y), Some(false));
        assert_eq!(state.button(Button::X), None);
    }
}
