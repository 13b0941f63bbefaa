//! Dictionary packet classes and CAN identifier layout.
//!
//! Dictionary frames use 29-bit extended IDs laid out as `(class << 8) | node_id`, the same scheme
//! the motor controller uses for its other CAN packets.

use bxcan::{Data, ExtendedId, Frame};

/// Value frame: `[var_id, value...]`. Sent by the periodic publisher and in reply to a read.
pub const DICT_VALUE: u8 = 0x40;
/// Read request: `[var_id]`.
pub const DICT_READ: u8 = 0x41;
/// Write request: `[var_id, value...]`.
pub const DICT_WRITE: u8 = 0x42;

/// Build the extended ID for `class` addressed from/to `node_id`.
pub fn packet_id(class: u8, node_id: u8) -> ExtendedId {
    let raw = ((class as u32) << 8) | node_id as u32;
    // 16 significant bits always fit in 29.
    ExtendedId::new(raw).unwrap_or(ExtendedId::MAX)
}

/// Split an extended ID into `(class, node_id)`. `None` when the upper bits do not fit a class.
pub fn split_packet_id(id: ExtendedId) -> Option<(u8, u8)> {
    let raw = id.as_raw();
    let class = u8::try_from(raw >> 8).ok()?;
    Some((class, raw as u8))
}

/// Frame carrying `payload` (at most 8 bytes; longer payloads are truncated).
pub fn packet_frame(class: u8, node_id: u8, payload: &[u8]) -> Frame {
    let n = payload.len().min(8);
    let data = Data::new(&payload[..n]).unwrap_or_else(Data::empty);
    Frame::new_data(packet_id(class, node_id), data)
}
