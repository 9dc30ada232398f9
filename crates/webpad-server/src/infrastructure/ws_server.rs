//! WebSocket server: accept loop and per-connection task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from browsers.
//! 3. Upgrading each connection to a WebSocket session.
//! 4. Asking the [`SessionManager`] for a player slot and telling the browser
//!    which player it is (or why it was rejected).
//! 5. Feeding every `input` frame into the session manager, in arrival order.
//! 6. Tearing the session down exactly once when the browser goes away.
//! 7. Gracefully shutting down when the `running` flag is cleared.
//!
//! # Ordering
//!
//! Each connection runs in its own Tokio task, and that task reads frames one
//! at a time and calls [`SessionManager::on_input`] before reading the next
//! one.  Inputs from one browser therefore reach its gamepad in the order
//! they were sent, while different browsers proceed independently.
//!
//! # Teardown
//!
//! The per-connection task holds a [`SessionGuard`].  Dropping it calls
//! [`SessionManager::on_disconnect`], so the session is released whether the
//! browser closed cleanly, the socket errored, or the task was cancelled
//! during runtime shutdown.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use webpad_core::ConnectionId;

use crate::application::SessionManager;
use crate::domain::config::ServerConfig;
use crate::domain::messages::{ClientMsg, ServerMsg};

/// How often the accept loop wakes up to check the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.bind_addr` and serves connections until `running` is set to
/// `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).
pub async fn run_server(
    config: ServerConfig,
    manager: Arc<SessionManager>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {}", config.bind_addr))?;

    info!("WebSocket server listening on {}", config.bind_addr);
    serve(listener, manager, running).await;
    Ok(())
}

/// Runs the accept loop on an already-bound listener.
///
/// Each accepted connection is handed to its own Tokio task so one slow
/// browser never blocks the others.  Returns once `running` is `false`;
/// connection tasks that are still alive keep running until their browser
/// disconnects or the runtime shuts down.
pub async fn serve(listener: TcpListener, manager: Arc<SessionManager>, running: Arc<AtomicBool>) {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // A short timeout on `accept()` lets the loop notice the shutdown flag
        // even when nobody is connecting.
        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                debug!("new connection from {peer_addr}");
                let manager = Arc::clone(&manager);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, manager).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g., too many open file descriptors).
                error!("accept error: {e}");
            }
            Err(_) => {
                // No new connection in the last poll interval.
            }
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Calls `on_disconnect` for its connection when dropped.
struct SessionGuard {
    manager: Arc<SessionManager>,
    connection_id: ConnectionId,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.on_disconnect(self.connection_id);
    }
}

/// Runs the complete lifecycle of one browser connection.
///
/// Handshake failures are logged and end the task before any session is
/// created.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, manager: Arc<SessionManager>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed with {peer_addr}: {e}");
            return;
        }
    };
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let connection_id = ConnectionId::new();
    let conn = connection_id.short();

    // ── Step 1: Claim a player slot ───────────────────────────────────────────
    let slot = match manager.on_connect(connection_id) {
        Ok(slot) => slot,
        Err(e) => {
            info!("conn {conn} from {peer_addr} rejected: {e}");
            let reply = ServerMsg::Error(e.client_message());
            if let Some(frame) = encode_server_msg(&reply) {
                if ws_tx.send(frame).await.is_err() {
                    debug!("conn {conn}: could not deliver rejection (browser gone)");
                }
            }
            if let Err(e) = ws_tx.close().await {
                debug!("conn {conn}: could not close rejected socket: {e}");
            }
            return;
        }
    };
    let _guard = SessionGuard {
        manager: Arc::clone(&manager),
        connection_id,
    };

    info!("conn {conn} from {peer_addr} is player {slot}");
    if let Some(frame) = encode_server_msg(&ServerMsg::PlayerId(slot)) {
        if ws_tx.send(frame).await.is_err() {
            debug!("conn {conn}: browser left before receiving its player id");
            return;
        }
    }

    // ── Step 2: Input loop ────────────────────────────────────────────────────
    loop {
        let ws_msg = match ws_rx.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("conn {conn}: WebSocket closed");
                break;
            }
            Some(Err(e)) => {
                warn!("conn {conn}: WebSocket error: {e}");
                break;
            }
            None => {
                debug!("conn {conn}: stream ended");
                break;
            }
        };

        match ws_msg {
            WsMessage::Text(text) => {
                handle_text_frame(&manager, connection_id, &text);
            }
            WsMessage::Binary(_) => {
                // The browser-facing protocol is JSON-only.
                warn!("conn {conn}: unexpected binary frame (ignored)");
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
            WsMessage::Close(_) => {
                debug!("conn {conn}: Close frame received");
                break;
            }
        }
    }
    // `_guard` drops here and releases the slot.
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parses one text frame and forwards it to the session manager.
///
/// Returns `true` if the input reached a gamepad.  Malformed frames are
/// logged and skipped; they never end the session.
fn handle_text_frame(manager: &SessionManager, connection_id: ConnectionId, text: &str) -> bool {
    match serde_json::from_str::<ClientMsg>(text) {
        Ok(ClientMsg::Input(data)) => manager.on_input(connection_id, &data),
        Err(e) => {
            warn!("conn {}: invalid frame from browser: {e}", connection_id.short());
            false
        }
    }
}

/// Serializes a server message into a WebSocket text frame.
fn encode_server_msg(msg: &ServerMsg) -> Option<WsMessage> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(WsMessage::Text(json)),
        Err(e) => {
            error!("JSON serialization error: {e}");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
