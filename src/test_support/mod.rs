//! Shared helpers for unit tests.

pub mod archives;
pub mod socket_guard;
