// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # CAN Variable Dictionary
//!
//! Exposes in-memory scalars as entries that a remote CAN node can read and write, with optional
//! autonomous periodic publishing.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`dictionary`] | Registry of up to 63 variables, registration and the read/write protocol |
//! | [`variable`] | Lock-free 8-byte storage cell and detached [`Value`] copies |
//! | [`hooks`] | Setter/getter serialization hooks and the write-callback type |
//! | [`publisher`] | Periodic publisher and the [`Transmit`] primitive |
//! | [`dispatch`] | Receive-path adapter turning request frames into handler calls |
//! | [`frame`] | Packet classes and extended CAN ID layout |
//!
//! ## Wire format
//!
//! All dictionary frames use extended IDs `(class << 8) | node_id`:
//!
//! | Class | Payload |
//! | ----- | ------- |
//! | `DICT_VALUE` (0x40) | `[var_id, value (≤7 bytes)]` |
//! | `DICT_READ` (0x41) | `[var_id]` |
//! | `DICT_WRITE` (0x42) | `[var_id, value (≤7 bytes)]` |
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod dictionary;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod hooks;
pub mod id;
pub mod publisher;
pub mod slot;
pub mod variable;

pub use clock::{Clock, ManualClock};
pub use dictionary::{Dictionary, DEFAULT_OWNED_CAPACITY};
pub use dispatch::{Dispatcher, Outcome, Request};
pub use error::{Error, Result};
pub use hooks::{Getter, Setter, WriteCallback};
pub use id::{VarId, VARIABLE_COUNT};
pub use publisher::{Publisher, PublisherConfig, Transmit};
pub use slot::{Access, SendInterval, MAX_WRITE_CALLBACKS};
pub use variable::{Value, Variable, MAX_LENGTH};
