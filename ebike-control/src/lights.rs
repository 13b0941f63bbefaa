//! Lights app: drives the light output from the `LIGHTS` variable.
//!
//! The state can be changed locally ([`Lights::set_state`]), from the debug terminal
//! (`lights <0|1>`) or remotely over the dictionary.

use core::fmt::Write;

use can_dict::{Access, Clock, Dictionary, SendInterval, Value, VarId, Variable};
use embedded_hal::digital::v2::OutputPin;
use log::info;

use crate::ids;
use crate::io::Watchdog;
use crate::setup::Registrations;

/// Terminal command name.
pub const COMMAND: &str = "lights";
/// Terminal command help text.
pub const HELP: &str = "Turn the lights on or off";
pub const USAGE: &str = "[0 or 1]";

pub struct LightsState {
    pub on: Variable,
}

impl LightsState {
    pub const fn new() -> Self {
        Self {
            on: Variable::from_bool(false),
        }
    }

    pub fn register<'m, C: Clock, const N: usize>(
        &'m self,
        dict: &mut Dictionary<'m, C, N>,
        report: &mut Registrations,
    ) {
        report.record(
            ids::LIGHTS,
            dict.bind(ids::LIGHTS, &self.on, 1, Access::READ_WRITE, SendInterval::Never)
                .and_then(|()| dict.on_write(ids::LIGHTS, log_remote_change)),
        );
    }
}

impl Default for LightsState {
    fn default() -> Self {
        Self::new()
    }
}

fn log_remote_change(_id: VarId, value: Value) {
    info!("lights: switched {} over CAN", on_off(value.as_bool()));
}

#[inline]
fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

pub struct Lights<'a> {
    state: &'a LightsState,
}

impl<'a> Lights<'a> {
    pub fn new(state: &'a LightsState) -> Self {
        Self { state }
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.state.on.load_bool()
    }

    pub fn set_state<W: Write>(&self, on: bool, console: &mut W) {
        let _ = write!(console, "Turning the lights {}\r\n", on_off(on));
        self.state.on.store_bool(on);
    }

    /// Handle `lights <0|1>`. `args[0]` is the command name.
    pub fn command<W: Write>(&self, args: &[&str], console: &mut W) {
        if args.len() != 2 {
            let _ = write!(console, "This command requires one argument.\r\n");
            return;
        }
        match args[1].parse::<i32>() {
            Ok(0) => self.set_state(false, console),
            Ok(1) => self.set_state(true, console),
            _ => {
                let _ = write!(console, "Invalid lights values. Expected 0 or 1\r\n");
            }
        }
    }

    /// Mirror the state onto `output`. Call every `LIGHTS_PERIOD_MS`.
    pub fn step<O: OutputPin, W: Watchdog>(&self, output: &mut O, watchdog: &mut W) {
        watchdog.reset_timeout();
        let _ = if self.is_on() {
            output.set_high()
        } else {
            output.set_low()
        };
    }
}
