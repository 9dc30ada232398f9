//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (see `main.rs`) or from sensible
//! defaults (useful for local development and tests).
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the server easy to embed in
//! tests.  `main.rs` is responsible for populating it.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use webpad_core::MAX_PLAYERS;

/// Which virtual gamepad backend to create devices with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// In-memory devices that only log what they receive.
    Mock,
    /// Linux uinput devices (requires the `uinput` cargo feature).
    Uinput,
}

impl DriverKind {
    /// The best backend compiled into this binary.
    pub fn platform_default() -> Self {
        if cfg!(all(target_os = "linux", feature = "uinput")) {
            DriverKind::Uinput
        } else {
            DriverKind::Mock
        }
    }
}

impl FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(DriverKind::Mock),
            "uinput" => Ok(DriverKind::Uinput),
            other => Err(format!("unknown driver '{other}' (expected 'mock' or 'uinput')")),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Mock => f.write_str("mock"),
            DriverKind::Uinput => f.write_str("uinput"),
        }
    }
}

/// All runtime configuration for the gamepad server.
///
/// Build this once at startup and share it (it is `Clone`).
///
/// # Example
///
/// ```rust
/// use webpad_server::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 5000);
/// assert_eq!(cfg.max_players, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// `0.0.0.0` accepts connections from phones on the LAN, which is the
    /// whole point of the application.
    pub bind_addr: SocketAddr,

    /// Number of player slots.
    pub max_players: u8,

    /// Virtual gamepad backend.
    pub driver: DriverKind,
}

impl Default for ServerConfig {
    /// | Field        | Default                          |
    /// |--------------|----------------------------------|
    /// | bind_addr    | `0.0.0.0:5000`                   |
    /// | max_players  | 4                                |
    /// | driver       | [`DriverKind::platform_default`] |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_players: MAX_PLAYERS,
            driver: DriverKind::platform_default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
