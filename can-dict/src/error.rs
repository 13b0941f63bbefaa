//! Error type shared by every dictionary operation.

use core::fmt;

/// Result alias for dictionary operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Why a dictionary operation was refused.
///
/// Nothing in this crate is fatal: the worst outcome of any of these is a variable that is not
/// exposed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Variable ID outside `1..=63`.
    InvalidId,
    /// The ID is already registered. Registrations are write-once.
    AlreadyActive,
    /// No variable is registered under this ID.
    NotFound,
    /// Remote read of a non-readable slot, or remote write of a non-writable one.
    AccessDenied,
    /// Declared length above 8 bytes, or the write-callback list is full.
    CapacityExceeded,
    /// The owned-storage pool has no free cell left.
    AllocationFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidId => write!(f, "invalid variable id"),
            Error::AlreadyActive => write!(f, "variable already registered"),
            Error::NotFound => write!(f, "variable not registered"),
            Error::AccessDenied => write!(f, "access denied"),
            Error::CapacityExceeded => write!(f, "capacity exceeded"),
            Error::AllocationFailure => write!(f, "owned storage exhausted"),
        }
    }
}
