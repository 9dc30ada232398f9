//! Raw browser payload → [`DeviceState`].
//!
//! The browser sends one JSON object per frame of input:
//!
//! ```json
//! {
//!   "ls": {"x": 0.3, "y": -0.8},
//!   "rs": {"x": 0.0, "y": 0.0},
//!   "lt": 0.0,
//!   "rt": 1.0,
//!   "buttons": {"a": true, "dpad-up": false}
//! }
//! ```
//!
//! Browsers report stick `y` with screen coordinates (down is positive), while
//! a controller reports up as positive, so both stick `y` values are negated.
//!
//! # Leniency
//!
//! [`translate`] never fails.  A client on a flaky connection or an older
//! build may send partial or odd messages, and dropping a whole frame for one
//! bad field would make the controller stutter.  Instead:
//!
//! - Missing or non-numeric axes and triggers become `0.0`.
//! - Numeric strings (`"0.5"`) are accepted like numbers.
//! - `NaN` and infinities are treated as non-numeric.
//! - Values are clamped into their domain.
//! - Unknown button identifiers and non-boolean button values are skipped.

use std::collections::BTreeMap;

use serde_json::Value;

use super::button::Button;
use super::state::{DeviceState, StickPosition};

/// Converts one raw input payload into a normalized [`DeviceState`].
///
/// Anything that is not a JSON object yields the neutral state with no button
/// changes.
pub fn translate(payload: &Value) -> DeviceState {
    DeviceState {
        left_stick: read_stick(payload.get("ls")),
        right_stick: read_stick(payload.get("rs")),
        left_trigger: read_trigger(payload.get("lt")),
        right_trigger: read_trigger(payload.get("rt")),
        buttons: read_buttons(payload.get("buttons")),
    }
}

fn read_stick(value: Option<&Value>) -> StickPosition {
    let Some(stick) = value else {
        return StickPosition::default();
    };
    StickPosition {
        x: clamp_axis(read_number(stick.get("x"))),
        // Screen-down-positive → controller-up-positive.
        y: -clamp_axis(read_number(stick.get("y"))),
    }
}

fn read_trigger(value: Option<&Value>) -> f32 {
    read_number(value).clamp(0.0, 1.0)
}

fn read_buttons(value: Option<&Value>) -> BTreeMap<Button, bool> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(id, pressed)| {
            let button = Button::from_id(id)?;
            let pressed = pressed.as_bool()?;
            Some((button, pressed))
        })
        .collect()
}

fn clamp_axis(v: f32) -> f32 {
    v.clamp(-1.0, 1.0)
}

/// Reads a finite number, defaulting to `0.0`.
fn read_number(value: Option<&Value>) -> f32 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => n as f32,
        _ => 0.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_left_stick_is_clamped_and_vertically_inverted() {
        // Arrange
        let payload = json!({"ls": {"x": 2.0, "y": -2.0}});

        // Act
        let state = translate(&payload);

        // Assert
        assert_eq!(state.left_stick, StickPosition { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_right_stick_in_range_values_pass_through_with_inverted_y() {
        let state = translate(&json!({"rs": {"x": -0.25, "y": 0.5}}));
        assert_eq!(state.right_stick, StickPosition { x: -0.25, y: -0.5 });
    }

    #[test]
    fn test_known_button_applied_and_unknown_ignored() {
        // Arrange
        let payload = json!({"buttons": {"a": true, "unknown-id": true}});

        // Act
        let state = translate(&payload);

        // Assert
        assert_eq!(state.buttons.len(), 1);
        assert_eq!(state.button(Button::A), Some(true));
    }

    #[test]
    fn test_released_buttons_are_reported_as_false() {
        let state = translate(&json!({"buttons": {"dpad-left": false, "rs-click": true}}));
        assert_eq!(state.button(Button::DpadLeft), Some(false));
        assert_eq!(state.button(Button::RsClick), Some(true));
    }

    #[test]
    fn test_omitted_buttons_are_not_in_the_state() {
        let state = translate(&json!({"buttons": {"b": true}}));
        for button in Button::ALL {
            if button != Button::B {
                assert_eq!(state.button(button), None, "{button:?}");
            }
        }
    }

    #[test]
    fn test_non_boolean_button_values_are_skipped() {
        let state = translate(&json!({"buttons": {"a": 1, "b": "yes", "x": null, "y": true}}));
        assert_eq!(state.buttons.len(), 1);
        assert_eq!(state.button(Button::Y), Some(true));
    }

    #[test]
    fn test_triggers_are_clamped_to_unit_range() {
        let state = translate(&json!({"lt": -0.5, "rt": 7.0}));
        assert_eq!(state.left_trigger, 0.0);
        assert_eq!(state.right_trigger, 1.0);
    }

    #[test]
    fn test_trigger_in_range_passes_through() {
        let state = translate(&json!({"lt": 0.4}));
        assert!((state.left_trigger - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_payload_is_neutral() {
        let state = translate(&json!({}));
        assert_eq!(state, DeviceState::default());
    }

    #[test]
    fn test_non_object_payload_is_neutral() {
        assert_eq!(translate(&json!(null)), DeviceState::default());
        assert_eq!(translate(&json!(42)), DeviceState::default());
        assert_eq!(translate(&json!("input")), DeviceState::default());
        assert_eq!(translate(&json!([1, 2, 3])), DeviceState::default());
    }

    #[test]
    fn test_non_numeric_axes_default_to_zero() {
        let payload = json!({
            "ls": {"x": "left", "y": true},
            "rs": {"x": null},
            "lt": {"nested": 1},
            "rt": [0.5]
        });

        let state = translate(&payload);

        assert_eq!(state, DeviceState::default());
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let state = translate(&json!({"ls": {"x": "0.5", "y": " -1 "}, "rt": "0.25"}));
        assert_eq!(state.left_stick, StickPosition { x: 0.5, y: 1.0 });
        assert_eq!(state.right_trigger, 0.25);
    }

    #[test]
    fn test_non_finite_strings_degrade_to_zero() {
        let state = translate(&json!({"ls": {"x": "NaN", "y": "inf"}}));
        assert_eq!(state.left_stick, StickPosition::default());
    }

    #[test]
    fn test_stick_that_is_not_an_object_is_centred() {
        let state = translate(&json!({"ls": 0.9, "rs": "up"}));
        assert_eq!(state.left_stick, StickPosition::default());
        assert_eq!(state.right_stick, StickPosition::default());
    }

    #[test]
    fn test_buttons_that_are_not_a_map_are_ignored() {
        let state = translate(&json!({"buttons": ["a", "b"]}));
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn test_full_payload() {
        let payload = json!({
            "ls": {"x": 0.3, "y": -0.8},
            "rs": {"x": 0.0, "y": 0.0},
            "lt": 0.0,
            "rt": 1.0,
            "buttons": {"a": true, "dpad-up": false, "lb": true}
        });

        let state = translate(&payload);

        assert!((state.left_stick.x - 0.3).abs() < 1e-6);
        assert!((state.left_stick.y - 0.8).abs() < 1e-6);
        assert_eq!(state.right_trigger, 1.0);
        assert_eq!(state.button(Button::A), Some(true));
        assert_eq!(state.button(Button::DpadUp), Some(false));
        assert_eq!(state.button(Button::Lb), Some(true));
    }
}
