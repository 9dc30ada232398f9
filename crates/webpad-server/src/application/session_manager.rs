//! SessionManager: connect / input / disconnect orchestration.
//!
//! This is the single entry point the transport calls into.  It owns the slot
//! pool, the session registry, and the gamepad driver, and guarantees:
//!
//! - At most `capacity` sessions are active; extra connects are rejected
//!   without side effects.
//! - Every active session holds a distinct slot, always the lowest free one
//!   at the time it connected.
//! - A failed connect never leaks a slot or a device.
//! - Disconnect is idempotent, and the last write any device ever sees is
//!   its reset to neutral, even when an input message races the disconnect.
//!
//! # Per-connection lifecycle
//!
//! ```text
//! Connecting ──(slot + device + registered)──► Active ──(disconnect)──► Terminated
//!     │                                                                    ▲
//!     └──────────────(capacity / driver / duplicate error)─────────────────┘
//! ```
//!
//! # Locking
//!
//! Two levels of locks, never held at the same time:
//!
//! 1. `tables` – one coarse `Mutex` over the slot pool and registry.  Held
//!    only for the few map/set operations of each event.
//! 2. Each session's device mutex ([`SharedDevice`]).  Input application and
//!    teardown for one connection serialize on it.  Disconnect *takes* the
//!    device out of the mutex before resetting it, so any input that acquires
//!    the mutex afterwards finds `None` and does nothing.
//!
//! Ordering of inputs within one connection is provided by the caller: the
//! transport handles each connection on a single task and calls
//! [`SessionManager::on_input`] sequentially.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};
use webpad_core::{translate, ConnectionId, Slot, SlotAllocator};

use super::gamepad::{reset_and_release, GamepadDriver, VirtualGamepad};
use super::registry::{SessionRegistry, SharedDevice};

/// Reasons a connect can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Every player slot is taken.
    #[error("capacity exceeded: all {capacity} player slots are in use")]
    CapacityExceeded { capacity: u8 },

    /// The virtual gamepad driver could not create a device.
    #[error("virtual gamepad driver unavailable: {0}")]
    DriverUnavailable(String),

    /// The transport reused a connection id that already has a session.
    #[error("connection {0} already has a session")]
    DuplicateConnection(ConnectionId),
}

impl SessionError {
    /// The message shown to the rejected browser.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::CapacityExceeded { capacity } => {
                format!("Server full – max {capacity} players")
            }
            SessionError::DriverUnavailable(_) => {
                "Virtual gamepad driver unavailable on the host".to_string()
            }
            SessionError::DuplicateConnection(_) => "Internal server error".to_string(),
        }
    }
}

/// One row of the player status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub slot: Slot,
    pub connection_id: ConnectionId,
    pub connected_for: Duration,
}

/// Slot pool and registry, always mutated together under one lock.
struct Tables {
    slots: SlotAllocator,
    sessions: SessionRegistry,
}

/// Orchestrates player sessions.  Share it as `Arc<SessionManager>`.
pub struct SessionManager {
    driver: Arc<dyn GamepadDriver>,
    tables: Mutex<Tables>,
}

impl SessionManager {
    /// Creates a manager with `capacity` player slots.
    pub fn new(driver: Arc<dyn GamepadDriver>, capacity: u8) -> Self {
        Self {
            driver,
            tables: Mutex::new(Tables {
                slots: SlotAllocator::new(capacity),
                sessions: SessionRegistry::new(),
            }),
        }
    }

    /// Handles a new connection: assigns a slot and creates its gamepad.
    ///
    /// # Errors
    ///
    /// - [`SessionError::CapacityExceeded`] if all slots are taken (no state
    ///   changes).
    /// - [`SessionError::DriverUnavailable`] if the device cannot be created
    ///   (the slot is released again).
    /// - [`SessionError::DuplicateConnection`] if `connection_id` already has
    ///   a session (the new slot and device are released; the existing
    ///   session is untouched).
    pub fn on_connect(&self, connection_id: ConnectionId) -> Result<Slot, SessionError> {
        let slot = {
            let mut tables = self.lock_tables();
            if tables.sessions.contains(connection_id) {
                error!(
                    "conn {}: connect for a connection that already has a session",
                    connection_id.short()
                );
                return Err(SessionError::DuplicateConnection(connection_id));
            }
            let capacity = tables.slots.capacity();
            tables
                .slots
                .acquire()
                .map_err(|_| SessionError::CapacityExceeded { capacity })?
        };

        // Device creation happens outside the tables lock so a slow driver
        // never stalls other connections' input.
        let device = match self.driver.create(slot) {
            Ok(device) => device,
            Err(e) => {
                warn!(
                    "conn {}: {} driver could not create a gamepad: {e}",
                    connection_id.short(),
                    self.driver.name()
                );
                self.lock_tables().release_slot(slot);
                return Err(SessionError::DriverUnavailable(e.reason().to_string()));
            }
        };
        let device: SharedDevice = Arc::new(Mutex::new(Some(device)));

        let mut tables = self.lock_tables();
        match tables.sessions.create(connection_id, slot, Arc::clone(&device)) {
            Ok(_) => {
                info!(
                    "player {slot} connected (conn={}, {})",
                    connection_id.short(),
                    tables.occupancy()
                );
                Ok(slot)
            }
            Err(e) => {
                // Another connect for the same id registered first.
                drop(tables);
                error!("conn {}: invariant violation: {e}", connection_id.short());
                if let Some(gamepad) = lock_device(&device).take() {
                    reset_and_release(gamepad, slot);
                }
                self.lock_tables().release_slot(slot);
                Err(SessionError::DuplicateConnection(connection_id))
            }
        }
    }

    /// Applies one input message to the connection's gamepad.
    ///
    /// Returns `true` if the message reached a device.  Messages for unknown
    /// or already-disconnected connections are ignored and return `false`;
    /// they are never an error.
    pub fn on_input(&self, connection_id: ConnectionId, payload: &Value) -> bool {
        let session = match self.lock_tables().sessions.get(connection_id) {
            Ok(session) => session,
            Err(_) => {
                trace!("conn {}: input without a session (ignored)", connection_id.short());
                return false;
            }
        };

        let state = translate(payload);

        let mut guard = lock_device(&session.device);
        let Some(gamepad) = guard.as_mut() else {
            trace!("conn {}: input after teardown (ignored)", connection_id.short());
            return false;
        };
        if let Err(e) = gamepad.apply_state(&state) {
            // The previous state stays on the device; the next frame retries.
            warn!("player {}: failed to apply input: {e}", session.slot);
        }
        true
    }

    /// Tears down the connection's session.
    ///
    /// Order: reset and destroy the device, remove the session, release the
    /// slot.  Returns the released slot, or `None` if there was nothing to do
    /// (unknown connection, or another disconnect for the same connection is
    /// already tearing it down).  Never fails.
    pub fn on_disconnect(&self, connection_id: ConnectionId) -> Option<Slot> {
        let session = self.lock_tables().sessions.get(connection_id).ok()?;

        // Taking the device is the commit point: only one caller gets it.
        let gamepad = lock_device(&session.device).take()?;
        reset_and_release(gamepad, session.slot);

        let mut tables = self.lock_tables();
        match tables.sessions.remove(connection_id) {
            Ok(removed) => tables.release_slot(removed.slot),
            Err(e) => {
                error!("conn {}: session vanished during teardown: {e}", connection_id.short());
                return None;
            }
        }
        let occupancy = tables.occupancy();
        drop(tables);

        info!(
            "player {} disconnected (conn={}, {occupancy})",
            session.slot,
            connection_id.short()
        );
        Some(session.slot)
    }

    /// Disconnects every active session.  Returns how many were torn down.
    ///
    /// Used on server shutdown so no virtual gamepad is left holding input.
    pub fn disconnect_all(&self) -> usize {
        let ids: Vec<ConnectionId> = self
            .lock_tables()
            .sessions
            .sessions()
            .map(|s| s.connection_id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.on_disconnect(id))
            .count()
    }

    /// Snapshot of active players, ordered by slot.
    pub fn players(&self) -> Vec<PlayerInfo> {
        let tables = self.lock_tables();
        let mut players: Vec<PlayerInfo> = tables
            .sessions
            .sessions()
            .map(|s| PlayerInfo {
                slot: s.slot,
                connection_id: s.connection_id,
                connected_for: s.created_at.elapsed(),
            })
            .collect();
        players.sort_by_key(|p| p.slot);
        players
    }

    /// Number of active sessions.
    pub fn active_count(&self) -> usize {
        self.lock_tables().sessions.len()
    }

    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave the tables half-updated
        // (every mutation is a single insert/remove), so recover the guard.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tables {
    /// Status line in the form `players 2/4`.
    fn occupancy(&self) -> String {
        format!("players {}/{}", self.slots.assigned(), self.slots.capacity())
    }

    fn release_slot(&mut self, slot: Slot) {
        if let Err(e) = self.slots.release(slot) {
            error!("invariant violation while releasing player {slot}: {e}");
        } else {
            debug!("player {slot} returned to pool ({} free)", self.slots.available());
        }
    }
}

fn lock_device(device: &SharedDevice) -> MutexGuard<'_, Option<Box<dyn VirtualGamepad>>> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
