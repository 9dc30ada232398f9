//! The fixed controller button vocabulary.
//!
//! The browser names buttons with short kebab-case identifiers (`"a"`,
//! `"dpad-up"`, `"ls-click"`).  Only the identifiers in [`Button::ALL`] are
//! recognised; anything else is ignored by the translator so that newer
//! clients with extra buttons keep working against an older host.
//!
//! # Wire identifiers and XUSB bits
//!
//! Each variant's numeric value is its bit in the XUSB (Xbox 360) button
//! word, which lets a driver keep the whole button state in one `u16`.
//!
//! | Identifier   | Button          | XUSB bit |
//! |--------------|-----------------|----------|
//! | `dpad-up`    | D-pad up        | 0x0001   |
//! | `dpad-down`  | D-pad down      | 0x0002   |
//! | `dpad-left`  | D-pad left      | 0x0004   |
//! | `dpad-right` | D-pad right     | 0x0008   |
//! | `menu`       | Start           | 0x0010   |
//! | `view`       | Back            | 0x0020   |
//! | `ls-click`   | Left thumb      | 0x0040   |
//! | `rs-click`   | Right thumb     | 0x0080   |
//! | `lb`         | Left shoulder   | 0x0100   |
//! | `rb`         | Right shoulder  | 0x0200   |
//! | `home`       | Guide           | 0x0400   |
//! | `a`          | A               | 0x1000   |
//! | `b`          | B               | 0x2000   |
//! | `x`          | X               | 0x4000   |
//! | `y`          | Y               | 0x8000   |

use std::fmt;

use serde::{Deserialize, Serialize};

/// A button of the single supported controller layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u16)]
pub enum Button {
    DpadUp = 0x0001,
    DpadDown = 0x0002,
    DpadLeft = 0x0004,
    DpadRight = 0x0008,
    Menu = 0x0010,
    View = 0x0020,
    LsClick = 0x0040,
    RsClick = 0x0080,
    Lb = 0x0100,
    Rb = 0x0200,
    Home = 0x0400,
    A = 0x1000,
    B = 0x2000,
    X = 0x4000,
    Y = 0x8000,
}

/// Lookup table from wire identifier to button.
const BUTTON_IDS: &[(&str, Button)] = &[
    ("a", Button::A),
    ("b", Button::B),
    ("x", Button::X),
    ("y", Button::Y),
    ("lb", Button::Lb),
    ("rb", Button::Rb),
    ("view", Button::View),
    ("menu", Button::Menu),
    ("home", Button::Home),
    ("dpad-up", Button::DpadUp),
    ("dpad-down", Button::DpadDown),
    ("dpad-left", Button::DpadLeft),
    ("dpad-right", Button::DpadRight),
    ("ls-click", Button::LsClick),
    ("rs-click", Button::RsClick),
];

impl Button {
    /// Every button in the vocabulary, in wire-table order.
    pub const ALL: [Button; 15] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Lb,
        Button::Rb,
        Button::View,
        Button::Menu,
        Button::Home,
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::LsClick,
        Button::RsClick,
    ];

    /// Resolves a wire identifier, returning `None` for unknown identifiers.
    ///
    /// Matching is exact and case-sensitive.
    pub fn from_id(id: &str) -> Option<Button> {
        BUTTON_IDS
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, button)| *button)
    }

    /// Returns the wire identifier for this button.
    pub fn id(self) -> &'static str {
        BUTTON_IDS
            .iter()
            .find(|(_, button)| *button == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }

    /// Returns this button's bit in the XUSB button word.
    pub fn xusb_mask(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
