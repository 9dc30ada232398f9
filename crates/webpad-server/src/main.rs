//! webpad server entry point.
//!
//! This binary lets phones and browsers act as game controllers for the host
//! machine.  Each browser that connects over WebSocket is given a player
//! number (1–4) and its own virtual gamepad; the JSON input messages it sends
//! are replayed on that gamepad.
//!
//! # Usage
//!
//! ```text
//! webpad-server [OPTIONS]
//!
//! Options:
//!   --port      <PORT>    WebSocket listener port [default: 5000]
//!   --bind      <IP>      Address to bind the listener to [default: 0.0.0.0]
//!   --driver    <DRIVER>  Virtual gamepad backend: mock | uinput
//!   --log-level <FILTER>  tracing filter, e.g. `debug` or `webpad_server=trace`
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable        | Default    | Description                       |
//! |-----------------|------------|-----------------------------------|
//! | `WEBPAD_PORT`   | `5000`     | WebSocket listener port           |
//! | `WEBPAD_BIND`   | `0.0.0.0`  | Listener bind address             |
//! | `WEBPAD_DRIVER` | platform   | Virtual gamepad backend           |
//! | `WEBPAD_LOG`    | (unset)    | Log filter; falls back to `RUST_LOG`, then `info` |
//!
//! # Architecture overview
//!
//! ```text
//! Phone browser  (JSON over WebSocket)
//!       ↕
//! webpad-server  ← this process
//!   domain/          Wire messages, ServerConfig
//!   application/     SessionManager (slots, sessions, input translation)
//!   infrastructure/
//!     ws_server/     Accept WebSocket connections
//!     gamepad/       mock or uinput virtual controllers
//!       ↕
//! Games on the host (see 1–4 standard gamepads)
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use webpad_server::application::{probe_driver, SessionManager};
use webpad_server::domain::{DriverKind, ServerConfig};
use webpad_server::infrastructure::net_info::{banner_urls, local_ip};
use webpad_server::infrastructure::{create_driver, run_server};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// webpad virtual gamepad server.
///
/// Turns browser WebSocket connections into virtual game controllers, up to
/// four players at a time.
#[derive(Debug, Parser)]
#[command(
    name = "webpad-server",
    about = "Browser-to-virtual-gamepad server for up to four players",
    version
)]
struct Cli {
    /// TCP port for the WebSocket server to listen on.
    #[arg(long, default_value_t = 5000, env = "WEBPAD_PORT")]
    port: u16,

    /// IP address to bind the WebSocket server to.
    ///
    /// Use `0.0.0.0` to accept connections from phones on the LAN, or
    /// `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "0.0.0.0", env = "WEBPAD_BIND")]
    bind: String,

    /// Virtual gamepad backend (`mock` or `uinput`).
    ///
    /// Defaults to `uinput` when compiled with the `uinput` feature on Linux,
    /// otherwise `mock`.
    #[arg(long, env = "WEBPAD_DRIVER")]
    driver: Option<DriverKind>,

    /// Log filter directive (overrides `RUST_LOG`).
    #[arg(long, env = "WEBPAD_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let bind_ip: IpAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid bind address: '{}'", self.bind))?;
        let bind_addr = SocketAddr::new(bind_ip, self.port);

        Ok(ServerConfig {
            bind_addr,
            driver: self.driver.unwrap_or_else(DriverKind::platform_default),
            ..ServerConfig::default()
        })
    }

    /// Builds the log filter: `--log-level`, then `RUST_LOG`, then `info`.
    fn env_filter(&self) -> EnvFilter {
        self.log_level
            .as_deref()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 2. `tracing_subscriber` is initialised with the chosen log filter.
/// 3. The virtual gamepad driver is created and probed.  A failed probe is
///    only a warning: the server still runs, and connects are rejected with
///    a "driver unavailable" message until the driver is fixed.
/// 4. The local and LAN URLs are logged.
/// 5. A Ctrl+C handler is spawned; it clears a shared `AtomicBool`.
/// 6. [`run_server`] accepts browsers until the flag is cleared, after which
///    every remaining virtual gamepad is reset and destroyed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(cli.env_filter())
        .init();

    let config = cli.into_server_config()?;

    // ── Gamepad driver ────────────────────────────────────────────────────────
    let driver = create_driver(config.driver)
        .with_context(|| format!("cannot use the '{}' gamepad driver", config.driver))?;
    match probe_driver(driver.as_ref()) {
        Ok(()) => info!("virtual gamepad driver '{}' is ready", driver.name()),
        Err(e) => warn!(
            "virtual gamepad driver '{}' is not usable: {e}; players will be rejected until it is",
            driver.name()
        ),
    }
    let manager = Arc::new(SessionManager::new(driver, config.max_players));

    // ── Banner ────────────────────────────────────────────────────────────────
    info!(
        "webpad server starting on {} (max {} players)",
        config.bind_addr, config.max_players
    );
    for url in banner_urls(local_ip(), config.bind_addr.port()) {
        info!("  open {url}");
    }

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // The accept loop in `run_server` checks this flag every 200 ms.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Main server loop ──────────────────────────────────────────────────────
    let result = run_server(config, Arc::clone(&manager), running).await;

    let active = manager.active_count();
    if active > 0 {
        info!("disconnecting {active} remaining player(s)");
        for player in manager.players() {
            info!(
                "  player {} (conn={}) was connected for {}s",
                player.slot,
                player.connection_id.short(),
                player.connected_for.as_secs()
            );
        }
        manager.disconnect_all();
    }
    result?;

    info!("webpad server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
