//! Serialization hooks: how bytes move between a wire buffer and a slot's storage.
//!
//! Every slot starts out with [`raw_setter`] / [`raw_getter`], a plain length-clamped copy in
//! storage byte order (little-endian). A module that wants a different wire encoding installs its
//! own pair with `Dictionary::set_setter` / `Dictionary::set_getter`.

use crate::id::VarId;
use crate::variable::{Value, Variable, MAX_LENGTH};

/// Copy `src` into `dest`. `length` is the slot's declared length.
pub type Setter = fn(dest: &Variable, length: usize, src: &[u8]);

/// Copy the slot's value into `dest`, returning the number of bytes written.
pub type Getter = fn(src: &Variable, length: usize, dest: &mut [u8]) -> usize;

/// Observer invoked after an accepted remote write, with a copy of the new value.
pub type WriteCallback = fn(id: VarId, value: Value);

/// Raw copy of `min(length, src.len())` bytes.
pub fn raw_setter(dest: &Variable, length: usize, src: &[u8]) {
    let n = length.min(src.len()).min(MAX_LENGTH);
    dest.store_bytes(&src[..n]);
}

/// Raw copy of `min(length, dest.len())` bytes.
pub fn raw_getter(src: &Variable, length: usize, dest: &mut [u8]) -> usize {
    let n = length.min(dest.len()).min(MAX_LENGTH);
    dest[..n].copy_from_slice(&src.load_bytes()[..n]);
    n
}

/// Big-endian wire order: the first wire byte is the most significant byte of the value.
///
/// A short payload updates only the most significant bytes.
pub fn be_setter(dest: &Variable, length: usize, src: &[u8]) {
    let length = length.min(MAX_LENGTH);
    let n = length.min(src.len());
    let mut bytes = dest.load_bytes();
    for (i, &b) in src[..n].iter().enumerate() {
        bytes[length - 1 - i] = b;
    }
    dest.store_bytes(&bytes[..length]);
}

/// Big-endian counterpart of [`raw_getter`]. Truncation drops the least significant bytes.
pub fn be_getter(src: &Variable, length: usize, dest: &mut [u8]) -> usize {
    let length = length.min(MAX_LENGTH);
    let n = length.min(dest.len());
    let bytes = src.load_bytes();
    for (i, out) in dest[..n].iter_mut().enumerate() {
        *out = bytes[length - 1 - i];
    }
    n
}
