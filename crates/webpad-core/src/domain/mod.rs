//! Domain layer: player slots and connection identities.
//!
//! Nothing in here performs I/O; the types are plain data plus the
//! bookkeeping rules that keep slot numbers unique.

pub mod connection;
pub mod slot;
