//! Variable identifiers.

use core::fmt;

use crate::error::Error;

/// Number of slots in the dictionary table. IDs index directly into it.
pub const VARIABLE_COUNT: usize = 64;

/// A valid dictionary key in `1..=63`.
///
/// ID 0 is reserved as "nothing" and is never accepted, so a zeroed payload byte on the bus cannot
/// address a real variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u8);

impl VarId {
    /// Smallest valid ID.
    pub const MIN: VarId = VarId(1);
    /// Largest valid ID.
    pub const MAX: VarId = VarId((VARIABLE_COUNT - 1) as u8);

    /// Checked constructor, `None` when `raw` is 0 or out of range.
    #[inline]
    pub const fn new(raw: u8) -> Option<Self> {
        if raw == 0 || raw as usize >= VARIABLE_COUNT {
            None
        } else {
            Some(VarId(raw))
        }
    }

    /// Constructor for compile-time constants. Fails the build when `raw` is not a valid ID.
    pub const fn from_const(raw: u8) -> Self {
        match Self::new(raw) {
            Some(id) => id,
            None => panic!("variable id out of range"),
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for VarId {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        VarId::new(raw).ok_or(Error::InvalidId)
    }
}

impl From<VarId> for u8 {
    fn from(id: VarId) -> u8 {
        id.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}
