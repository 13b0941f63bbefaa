//! Pedal assist sensor (PAS).
//!
//! A disc of magnets on the crank passes a hall sensor. Every falling edge marks one magnet, so
//! the crank speed is one magnet pitch over the time since the previous edge:
//!
//! ```text
//! speed = 2π / (magnets · Δt_ms)   [rad/ms]
//! ```
//!
//! The speed decays to zero when no edge arrives for `stop_timeout` ms.

use core::f32::consts::PI;

use can_dict::{Access, Clock, Dictionary, SendInterval, Variable};
use embedded_hal::digital::v2::InputPin;

use crate::config::PedalConfig;
use crate::ids;
use crate::setup::Registrations;
use crate::utils::truncate;

/// Remotely tunable sensor parameters.
pub struct PedalParams {
    pub magnets: Variable,
    pub curve_alpha: Variable,
    pub stop_timeout_ms: Variable,
}

impl PedalParams {
    pub const fn new(config: &PedalConfig) -> Self {
        Self {
            magnets: Variable::from_u8(config.magnets),
            curve_alpha: Variable::from_f32(config.curve_alpha),
            stop_timeout_ms: Variable::from_u16(config.stop_timeout_ms),
        }
    }

    pub fn register<'m, C: Clock, const N: usize>(
        &'m self,
        dict: &mut Dictionary<'m, C, N>,
        report: &mut Registrations,
    ) {
        let rw = Access::READ_WRITE;
        let never = SendInterval::Never;

        report.record(
            ids::PEDELEC_MAGNETS,
            dict.bind(ids::PEDELEC_MAGNETS, &self.magnets, 1, rw, never),
        );
        report.record(
            ids::PEDELEC_CURVE_ALPHA,
            dict.bind(ids::PEDELEC_CURVE_ALPHA, &self.curve_alpha, 4, rw, never),
        );
        report.record(
            ids::PEDELEC_STOP_TIMEOUT,
            dict.bind(ids::PEDELEC_STOP_TIMEOUT, &self.stop_timeout_ms, 2, rw, never),
        );
    }
}

/// Edge-timing crank speed estimator.
pub struct PedalSensor<'a> {
    params: &'a PedalParams,
    prev_level: bool,
    last_edge_ms: Option<u32>,
    speed: f32,
}

impl<'a> PedalSensor<'a> {
    pub fn new(params: &'a PedalParams) -> Self {
        Self {
            params,
            prev_level: false,
            last_edge_ms: None,
            speed: 0.0,
        }
    }

    /// Sample `pin` at `now_ms`. A read error counts as an unchanged level.
    pub fn sample<I: InputPin>(&mut self, now_ms: u32, pin: &I) -> f32 {
        let level = pin.is_high().unwrap_or(self.prev_level);
        self.update(now_ms, level)
    }

    /// Feed one sensor level at `now_ms` and return the crank speed.
    pub fn update(&mut self, now_ms: u32, level: bool) -> f32 {
        if self.prev_level && !level {
            if let Some(last) = self.last_edge_ms {
                let dt = now_ms.wrapping_sub(last);
                if dt > 0 {
                    let magnets = self.params.magnets.load_u8().max(1) as f32;
                    let raw = 2.0 * PI / (magnets * dt as f32);
                    let alpha = truncate(self.params.curve_alpha.load_f32(), 0.01, 1.0);
                    self.speed = alpha * raw + (1.0 - alpha) * self.speed;
                }
            }
            self.last_edge_ms = Some(now_ms);
        }
        self.prev_level = level;

        let timeout = self.params.stop_timeout_ms.load_u16() as u32;
        match self.last_edge_ms {
            Some(last) if now_ms.wrapping_sub(last) < timeout => {}
            _ => self.speed = 0.0,
        }
        self.speed
    }
}
