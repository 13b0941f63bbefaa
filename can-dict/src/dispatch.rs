//! Receive-path adapter.
//!
//! Decodes dictionary request frames addressed to this node and forwards them to
//! [`Dictionary::handle_read_request`] / [`Dictionary::handle_write_request`]. The dictionary
//! itself never looks at frames; everything wire-specific on the inbound side lives here.

use bxcan::{Frame, Id};
use log::debug;

use crate::clock::Clock;
use crate::dictionary::Dictionary;
use crate::frame::{packet_frame, split_packet_id, DICT_READ, DICT_VALUE, DICT_WRITE};
use crate::publisher::{Transmit, PUBLISH_WINDOW};

/// A decoded dictionary request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Request<'a> {
    Read { id: u8 },
    Write { id: u8, payload: &'a [u8] },
}

/// What [`Dispatcher::handle`] did with a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Not a dictionary request for this node.
    Ignored,
    /// Read served; `len` value bytes were sent back.
    Read { id: u8, len: usize },
    /// Read refused (bad ID, unregistered or not readable). No reply is sent.
    ReadRefused { id: u8 },
    Written { id: u8 },
    /// Write refused (bad ID, unregistered or not writable).
    WriteRefused { id: u8 },
}

pub struct Dispatcher {
    node_id: u8,
}

impl Dispatcher {
    pub const fn new(node_id: u8) -> Self {
        Self { node_id }
    }

    #[inline]
    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    /// Decode `frame` if it is a dictionary request addressed to this node.
    pub fn decode<'f>(&self, frame: &'f Frame) -> Option<Request<'f>> {
        let Id::Extended(ext) = frame.id() else {
            return None;
        };
        let (class, node) = split_packet_id(ext)?;
        if node != self.node_id {
            return None;
        }

        let data = frame.data()?;
        let (&id, payload) = data.split_first()?;
        match class {
            DICT_READ => Some(Request::Read { id }),
            DICT_WRITE => Some(Request::Write { id, payload }),
            _ => None,
        }
    }

    /// Decode and serve `frame`, replying to reads through `tx`.
    pub fn handle<C, T, const N: usize>(
        &self,
        dict: &Dictionary<'_, C, N>,
        frame: &Frame,
        tx: &mut T,
    ) -> Outcome
    where
        C: Clock,
        T: Transmit,
    {
        match self.decode(frame) {
            None => Outcome::Ignored,
            Some(Request::Read { id }) => {
                let mut buf = [0u8; 1 + PUBLISH_WINDOW];
                buf[0] = id;
                let len = dict.handle_read_request(id, &mut buf[1..]);
                if len == 0 {
                    debug!("can-dict: read 0x{:02X} refused", id);
                    return Outcome::ReadRefused { id };
                }
                let reply = packet_frame(DICT_VALUE, self.node_id, &buf[..1 + len]);
                if let Err(e) = tx.transmit(&reply) {
                    debug!("can-dict: read reply 0x{:02X} failed: {:?}", id, e);
                }
                Outcome::Read { id, len }
            }
            Some(Request::Write { id, payload }) => {
                if dict.handle_write_request(id, payload) {
                    Outcome::Written { id }
                } else {
                    debug!("can-dict: write 0x{:02X} refused", id);
                    Outcome::WriteRefused { id }
                }
            }
        }
    }
}
