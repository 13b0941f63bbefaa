//! Backing storage for dictionary variables.
//!
//! A [`Variable`] is an 8-byte cell built from two `AtomicU32` words, byte order little-endian.
//! Application code declares one as a `static` (bound mode) and keeps using it through the typed
//! accessors, while the dictionary reads and writes the same cell as raw bytes.
//!
//! Values of 4 bytes or less live entirely in the first word and can never be observed torn.
//! 5..8 byte values span both words: a reader racing a writer may see the low word of one value
//! and the high word of the other. No lock is taken to prevent this.

use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum declared length of any variable, in bytes.
pub const MAX_LENGTH: usize = 8;

/// Shared, lock-free 8-byte storage cell.
#[derive(Debug, Default)]
pub struct Variable {
    words: [AtomicU32; 2],
}

impl Variable {
    /// Create a cell holding the 8 bytes of `raw` (little-endian).
    pub const fn new(raw: u64) -> Self {
        Self {
            words: [AtomicU32::new(raw as u32), AtomicU32::new((raw >> 32) as u32)],
        }
    }

    pub const fn zeroed() -> Self {
        Self::new(0)
    }

    pub const fn from_u8(v: u8) -> Self {
        Self::new(v as u64)
    }

    pub const fn from_u16(v: u16) -> Self {
        Self::new(v as u64)
    }

    pub const fn from_u32(v: u32) -> Self {
        Self::new(v as u64)
    }

    pub const fn from_f32(v: f32) -> Self {
        Self::new(v.to_bits() as u64)
    }

    pub const fn from_bool(v: bool) -> Self {
        Self::new(v as u64)
    }

    /// All 8 bytes as one integer. Two word loads; see the module docs on tearing.
    pub fn raw(&self) -> u64 {
        let lo = self.words[0].load(Ordering::Relaxed) as u64;
        let hi = self.words[1].load(Ordering::Relaxed) as u64;
        lo | (hi << 32)
    }

    pub fn set_raw(&self, raw: u64) {
        self.words[0].store(raw as u32, Ordering::Relaxed);
        self.words[1].store((raw >> 32) as u32, Ordering::Relaxed);
    }

    /// Snapshot of the full 8-byte buffer.
    #[inline]
    pub fn load_bytes(&self) -> [u8; MAX_LENGTH] {
        self.raw().to_le_bytes()
    }

    /// Overwrite the first `src.len()` bytes (at most 8), leaving the rest of the cell untouched.
    pub fn store_bytes(&self, src: &[u8]) {
        let len = src.len().min(MAX_LENGTH);

        for (w, word) in self.words.iter().enumerate() {
            let start = w * 4;
            if start >= len {
                break;
            }
            let end = (start + 4).min(len);

            let mut value = [0u8; 4];
            let mut mask = [0u8; 4];
            value[..end - start].copy_from_slice(&src[start..end]);
            mask[..end - start].fill(0xFF);
            let value = u32::from_le_bytes(value);
            let mask = u32::from_le_bytes(mask);

            if mask == u32::MAX {
                word.store(value, Ordering::Relaxed);
            } else {
                // Partial word: merge so untouched bytes keep what a concurrent writer stored.
                let _ = word.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |old| {
                    Some((old & !mask) | value)
                });
            }
        }
    }

    #[inline]
    fn low_word(&self) -> u32 {
        self.words[0].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn load_u8(&self) -> u8 {
        self.low_word() as u8
    }

    #[inline]
    pub fn store_u8(&self, v: u8) {
        self.store_bytes(&[v]);
    }

    #[inline]
    pub fn load_u16(&self) -> u16 {
        self.low_word() as u16
    }

    #[inline]
    pub fn store_u16(&self, v: u16) {
        self.store_bytes(&v.to_le_bytes());
    }

    #[inline]
    pub fn load_u32(&self) -> u32 {
        self.low_word()
    }

    #[inline]
    pub fn store_u32(&self, v: u32) {
        self.words[0].store(v, Ordering::Relaxed);
    }

    #[inline]
    pub fn load_f32(&self) -> f32 {
        f32::from_bits(self.low_word())
    }

    #[inline]
    pub fn store_f32(&self, v: f32) {
        self.store_u32(v.to_bits());
    }

    #[inline]
    pub fn load_bool(&self) -> bool {
        self.load_u8() != 0
    }

    #[inline]
    pub fn store_bool(&self, v: bool) {
        self.store_u8(v as u8);
    }
}

/// Detached copy of a variable's bytes.
///
/// Handed to write callbacks so they never hold a reference into live storage, and used as the
/// initial value of owned registrations. `len` is the declared length of the slot it came from and
/// bounds [`Value::as_bytes`]. A snapshot taken on a write keeps all 8 storage bytes, so the typed
/// accessors also see whatever sits past `len`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Value {
    bytes: [u8; MAX_LENGTH],
    len: u8,
}

impl Value {
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            bytes: raw.to_le_bytes(),
            len: MAX_LENGTH as u8,
        }
    }

    /// Copy up to 8 bytes from `src`.
    pub fn from_bytes(src: &[u8]) -> Self {
        let len = src.len().min(MAX_LENGTH);
        let mut bytes = [0u8; MAX_LENGTH];
        bytes[..len].copy_from_slice(&src[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }

    pub(crate) fn snapshot(storage: &Variable, len: u8) -> Self {
        Self {
            bytes: storage.load_bytes(),
            len,
        }
    }

    pub fn from_u8(v: u8) -> Self {
        Self::from_bytes(&[v])
    }

    pub fn from_i64(v: i64) -> Self {
        Self::from_bytes(&v.to_le_bytes())
    }

    pub fn from_f32(v: f32) -> Self {
        Self::from_bytes(&v.to_le_bytes())
    }

    pub fn from_bool(v: bool) -> Self {
        Self::from_u8(v as u8)
    }

    /// The meaningful bytes, `len()` long.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_u8(&self) -> u8 {
        self.bytes[0]
    }

    pub fn as_u16(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0], self.bytes[1]])
    }

    pub fn as_u32(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    pub fn as_f32(&self) -> f32 {
        f32::from_bits(self.as_u32())
    }

    pub fn as_bool(&self) -> bool {
        self.bytes[0] != 0
    }
}
