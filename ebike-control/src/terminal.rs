//! Debug terminal: line assembly and command dispatch.
//!
//! Commands:
//!
//! | Command | Action |
//! | ------- | ------ |
//! | `help` | List commands |
//! | `lights [0 or 1]` | Turn the lights on or off |
//! | `dict` | List registered dictionary variables |

use core::fmt::Write;

use can_dict::{Clock, Dictionary, SendInterval};
use heapless::{String, Vec};
use log::warn;

use crate::lights::{self, Lights};

pub const MAX_LINE: usize = 64;
pub const MAX_ARGS: usize = 4;

/// Collects received bytes into lines terminated by CR or LF.
pub struct LineBuffer {
    buf: String<MAX_LINE>,
    overflow: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            overflow: false,
        }
    }

    /// Feed one byte. Returns the completed line when `byte` ends a non-empty one.
    ///
    /// Lines longer than `MAX_LINE` are dropped whole. Non-printable bytes are ignored.
    pub fn push(&mut self, byte: u8) -> Option<String<MAX_LINE>> {
        match byte {
            b'\r' | b'\n' => {
                let line = core::mem::take(&mut self.buf);
                if core::mem::take(&mut self.overflow) {
                    warn!("terminal: line longer than {} bytes dropped", MAX_LINE);
                    return None;
                }
                (!line.is_empty()).then_some(line)
            }
            b' '..=b'~' => {
                if self.buf.push(byte as char).is_err() {
                    self.overflow = true;
                }
                None
            }
            _ => None,
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split on whitespace. Arguments past `MAX_ARGS` are dropped.
pub fn split_args(line: &str) -> Vec<&str, MAX_ARGS> {
    let mut args = Vec::new();
    for arg in line.split_whitespace() {
        if args.push(arg).is_err() {
            break;
        }
    }
    args
}

/// Run one command line.
pub fn execute<W, C, const N: usize>(
    line: &str,
    lights: &Lights<'_>,
    dict: &Dictionary<'_, C, N>,
    console: &mut W,
) where
    W: Write,
    C: Clock,
{
    let args = split_args(line);
    let Some(&name) = args.first() else {
        return;
    };

    match name {
        "help" => {
            let _ = write!(console, "help\r\n  Show this help\r\n");
            let _ = write!(
                console,
                "{} {}\r\n  {}\r\n",
                lights::COMMAND,
                lights::USAGE,
                lights::HELP
            );
            let _ = write!(console, "dict\r\n  List dictionary variables\r\n");
        }
        lights::COMMAND => lights.command(&args, console),
        "dict" => list_variables(dict, console),
        _ => {
            let _ = write!(
                console,
                "Invalid command: {}\r\ntype help to list all available commands\r\n",
                name
            );
        }
    }
}

fn list_variables<W, C, const N: usize>(dict: &Dictionary<'_, C, N>, console: &mut W)
where
    W: Write,
    C: Clock,
{
    for id in dict.active_ids() {
        let len = dict.length(id).unwrap_or(0);
        let access = dict.access(id).unwrap_or_default();
        let r = if access.readable { 'r' } else { '-' };
        let w = if access.writable { 'w' } else { '-' };
        let _ = write!(console, "{}  len {}  {}{}", id, len, r, w);
        if let Some(SendInterval::Every(ms)) = dict.send_interval(id) {
            let _ = write!(console, "  every {} ms", ms);
        }
        let _ = write!(console, "\r\n");
    }
}
