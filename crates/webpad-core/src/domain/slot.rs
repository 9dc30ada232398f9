//! Player slots and the pool that hands them out.
//!
//! # What is a slot? (for beginners)
//!
//! Every connected player is shown a player number (1, 2, 3 or 4), the same
//! number a console would light up on the controller.  Internally this number
//! is called a *slot*.  Two players must never share a slot, and a player who
//! drops out and reconnects should get the lowest number that is free again
//! rather than "the next one in line".
//!
//! # Allocation rule
//!
//! The pool is a sorted set of free slot numbers.  [`SlotAllocator::acquire`]
//! always removes the numerically smallest entry, and
//! [`SlotAllocator::release`] puts a slot back into sorted position, so the
//! free set and the assigned set always partition `1..=capacity` exactly.
//!
//! ```text
//! free = {1,2,3,4}
//! acquire() → 1        free = {2,3,4}
//! acquire() → 2        free = {3,4}
//! release(1)           free = {1,3,4}
//! acquire() → 1        free = {3,4}
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of concurrently connected players.
pub const MAX_PLAYERS: u8 = 4;

/// A 1-based player number bound to at most one active session.
///
/// Serializes as a bare integer so the browser receives `1`, not `{"0":1}`.
/// Deserializing `0` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Slot(u8);

impl Slot {
    /// Wraps a player number; `0` is not a valid slot.
    ///
    /// This does not reserve anything.  Only [`SlotAllocator::acquire`]
    /// hands out slots that are guaranteed unique.
    pub fn new(n: u8) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    /// Returns the raw player number.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Slot {
    type Error = SlotError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Slot::new(n).ok_or(SlotError::InvalidSlot { slot: n })
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned by [`SlotAllocator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// Every slot is currently assigned.
    #[error("capacity exceeded: all {capacity} player slots are in use")]
    CapacityExceeded { capacity: u8 },

    /// The slot is outside `1..=capacity` or is already free.
    #[error("invalid slot {slot}: out of range or not currently assigned")]
    InvalidSlot { slot: u8 },
}

/// A fixed pool of player slots with lowest-first allocation.
///
/// The allocator only tracks integers; it never references sessions or
/// devices.  It is not internally synchronized: callers share it behind a
/// lock together with the session registry.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    capacity: u8,
    free: BTreeSet<u8>,
}

impl SlotAllocator {
    /// Creates a pool holding slots `1..=capacity`, all free.
    pub fn new(capacity: u8) -> Self {
        Self {
            capacity,
            free: (1..=capacity).collect(),
        }
    }

    /// Removes and returns the smallest free slot.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::CapacityExceeded`] when every slot is assigned.
    /// The pool is left untouched in that case.
    pub fn acquire(&mut self) -> Result<Slot, SlotError> {
        self.free.pop_first().map(Slot).ok_or(SlotError::CapacityExceeded {
            capacity: self.capacity,
        })
    }

    /// Returns `slot` to the free set.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidSlot`] if `slot` is out of range or is
    /// already free.  The pool is left untouched in that case, so a double
    /// release can never create a duplicate free entry.
    pub fn release(&mut self, slot: Slot) -> Result<(), SlotError> {
        let n = slot.get();
        if n == 0 || n > self.capacity || self.free.contains(&n) {
            return Err(SlotError::InvalidSlot { slot: n });
        }
        self.free.insert(n);
        Ok(())
    }

    /// Total number of slots in the pool.
    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    /// Number of slots currently free.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of slots currently assigned.
    pub fn assigned(&self) -> usize {
        usize::from(self.capacity) - self.free.len()
    }

}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new(MAX_PLAYERS)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
