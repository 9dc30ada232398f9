//! SessionRegistry: the table of live player sessions.
//!
//! Each entry binds one connection to its player slot and its virtual
//! gamepad.  The registry only stores and hands back sessions; it knows
//! nothing about the slot pool or about tearing devices down.  Callers that
//! remove a session are responsible for releasing its device and slot.
//!
//! # Concurrency
//!
//! `SessionRegistry` takes `&mut self` for every mutation and is not
//! internally synchronized.  The session manager keeps it behind the same
//! lock as the slot pool, which makes `create` and `remove` atomic with
//! respect to each other: two concurrent `create` calls for one id cannot
//! both succeed, and two concurrent `remove` calls yield one session and one
//! `NotFound`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use thiserror::Error;
use webpad_core::{ConnectionId, Slot};

use super::gamepad::VirtualGamepad;

/// A session's device slot.
///
/// The inner `Option` is `None` once the device has been torn down, which is
/// how a late input message learns that its session has terminated.  Every
/// device operation for one session (apply, reset, destroy) happens while
/// holding this mutex, so they never interleave.
pub type SharedDevice = Arc<Mutex<Option<Box<dyn VirtualGamepad>>>>;

/// Error type for registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A session for this connection already exists.
    #[error("connection {0} already has a session")]
    DuplicateConnection(ConnectionId),

    /// No session exists for this connection.
    #[error("no session for connection {0}")]
    NotFound(ConnectionId),
}

/// The live binding between one connection and one virtual gamepad.
///
/// Cloning a `Session` clones the handle to the shared device, not the device.
#[derive(Clone)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub slot: Slot,
    pub device: SharedDevice,
    pub created_at: Instant,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connection_id", &self.connection_id)
            .field("slot", &self.slot)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// In-memory registry of active sessions keyed by connection id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateConnection`] if `connection_id` is
    /// already registered.  The existing session is left untouched and the
    /// caller still owns `device`.
    pub fn create(
        &mut self,
        connection_id: ConnectionId,
        slot: Slot,
        device: SharedDevice,
    ) -> Result<Session, RegistryError> {
        if self.sessions.contains_key(&connection_id) {
            return Err(RegistryError::DuplicateConnection(connection_id));
        }
        let session = Session {
            connection_id,
            slot,
            device,
            created_at: Instant::now(),
        };
        self.sessions.insert(connection_id, session.clone());
        Ok(session)
    }

    /// Returns the session for `connection_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if there is none.
    pub fn get(&self, connection_id: ConnectionId) -> Result<Session, RegistryError> {
        self.sessions
            .get(&connection_id)
            .cloned()
            .ok_or(RegistryError::NotFound(connection_id))
    }

    /// Removes and returns the session for `connection_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if there is none.
    pub fn remove(&mut self, connection_id: ConnectionId) -> Result<Session, RegistryError> {
        self.sessions
            .remove(&connection_id)
            .ok_or(RegistryError::NotFound(connection_id))
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.sessions.contains_key(&connection_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterates over all sessions in unspecified order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }
}
