//! Motor assist app.
//!
//! Every step combines the pedal sensor and the throttle into one relative current command:
//!
//! 1. Pedal assist: crank speed mapped over `[0, PEDAL_FULL_SPEED]` and clamped to `[0, 1]`.
//! 2. Throttle: ADC volts mapped over `[voltage_start, voltage_end]`, clamped, then deadbanded
//!    by `hyst`.
//! 3. The larger of the sources enabled by `CONTROL_MODE`, shaped by the throttle curve.
//! 4. Zero at or above `MAX_SPEED`; scaled down while input power exceeds `MAX_POWER`.

use can_dict::{Access, Clock, Dictionary, SendInterval, Value, VarId, Variable};
use embedded_hal::digital::v2::InputPin;
use log::info;

use crate::bike::BikeParams;
use crate::config::{AdcConfig, PEDAL_FULL_SPEED};
use crate::ids;
use crate::io::{AnalogInput, MotorControl, Plot, Watchdog};
use crate::pedelec::{PedalParams, PedalSensor};
use crate::setup::Registrations;
use crate::utils::{deadband, map, throttle_curve, truncate};

/// Plot x axis wraps after this many samples.
const PLOT_SAMPLES: u32 = 2000;

/// Which inputs drive the motor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlMode {
    Off = 0,
    Pedelec = 1,
    Throttle = 2,
    Both = 3,
}

impl ControlMode {
    /// Decode the wire value. Unknown values disable assist.
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ControlMode::Pedelec,
            2 => ControlMode::Throttle,
            3 => ControlMode::Both,
            _ => ControlMode::Off,
        }
    }

    #[inline]
    fn uses_pedal(self) -> bool {
        matches!(self, ControlMode::Pedelec | ControlMode::Both)
    }

    #[inline]
    fn uses_throttle(self) -> bool {
        matches!(self, ControlMode::Throttle | ControlMode::Both)
    }
}

pub struct AssistParams {
    pub control_mode: Variable,
}

impl AssistParams {
    pub const fn new() -> Self {
        Self {
            control_mode: Variable::from_u8(ControlMode::Both as u8),
        }
    }

    #[inline]
    pub fn control_mode(&self) -> ControlMode {
        ControlMode::from_u8(self.control_mode.load_u8())
    }

    pub fn register<'m, C: Clock, const N: usize>(
        &'m self,
        dict: &mut Dictionary<'m, C, N>,
        report: &mut Registrations,
    ) {
        report.record(
            ids::CONTROL_MODE,
            dict.bind(
                ids::CONTROL_MODE,
                &self.control_mode,
                1,
                Access::READ_WRITE,
                SendInterval::Never,
            )
            .and_then(|()| dict.on_write(ids::CONTROL_MODE, log_mode_change)),
        );
    }
}

impl Default for AssistParams {
    fn default() -> Self {
        Self::new()
    }
}

fn log_mode_change(_id: VarId, value: Value) {
    info!("assist: control mode {:?}", ControlMode::from_u8(value.as_u8()));
}

pub struct Assist<'a> {
    adc: AdcConfig,
    params: &'a AssistParams,
    bike: &'a BikeParams,
    pedal: PedalSensor<'a>,
    sample: u32,
}

impl<'a> Assist<'a> {
    pub fn new(
        adc: AdcConfig,
        params: &'a AssistParams,
        pedal: &'a PedalParams,
        bike: &'a BikeParams,
    ) -> Self {
        Self {
            adc,
            params,
            bike,
            pedal: PedalSensor::new(pedal),
            sample: 0,
        }
    }

    /// Set up the live plot. Call once before the first step.
    pub fn start<P: Plot>(&mut self, plot: &mut P) {
        plot.init_plot("Sample", "Current");
        plot.add_graph("Current");
        plot.add_graph("Pedal");
        self.sample = 0;
    }

    /// Normalized throttle command in `[0, 1]` for `volts`.
    pub fn throttle_level(&self, volts: f32) -> f32 {
        let level = map(volts, self.adc.voltage_start, self.adc.voltage_end, 0.0, 1.0);
        deadband(truncate(level, 0.0, 1.0), self.adc.hyst, 1.0)
    }

    /// Run one control step and return the current command sent to `motor`.
    pub fn step<I, A, M, W, P>(
        &mut self,
        now_ms: u32,
        pas: &I,
        throttle: &mut A,
        motor: &mut M,
        watchdog: &mut W,
        plot: &mut P,
    ) -> f32
    where
        I: InputPin,
        A: AnalogInput,
        M: MotorControl,
        W: Watchdog,
        P: Plot,
    {
        watchdog.reset_timeout();

        let crank = self.pedal.sample(now_ms, pas);
        let pedal = truncate(map(crank, 0.0, PEDAL_FULL_SPEED, 0.0, 1.0), 0.0, 1.0);
        let throttle = self.throttle_level(throttle.read_volts());

        let mode = self.params.control_mode();
        let mut current = 0.0f32;
        if mode.uses_pedal() {
            current = current.max(pedal);
        }
        if mode.uses_throttle() {
            current = current.max(throttle);
        }

        current = throttle_curve(
            current,
            self.adc.throttle_exp,
            self.adc.throttle_exp_brake,
            self.adc.throttle_exp_mode,
        );

        let max_speed = self.bike.max_speed_kmh();
        if max_speed > 0.0 && motor.speed_kmh() >= max_speed {
            current = 0.0;
        }

        let max_power = self.bike.max_power_w();
        let power = motor.power_w();
        if max_power > 0.0 && power > max_power {
            current *= max_power / power;
        }

        motor.set_current_rel(current);

        let x = (self.sample % PLOT_SAMPLES) as f32;
        plot.set_graph(0);
        plot.send_point(x, current);
        plot.set_graph(1);
        plot.send_point(x, pedal);
        self.sample = self.sample.wrapping_add(1);

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BikeConfig, PedalConfig};
    use crate::io::fakes::{FakeAdc, FakeMotor, FakePin, FakePlot, FakeWatchdog};

    struct Rig {
        params: AssistParams,
        pedal: PedalParams,
        bike: BikeParams,
    }

    impl Rig {
        fn new(mode: ControlMode) -> Self {
            let params = AssistParams::new();
            params.control_mode.store_u8(mode as u8);
            Self {
                params,
                pedal: PedalParams::new(&PedalConfig::DEFAULT),
                bike: BikeParams::new(&BikeConfig::DEFAULT),
            }
        }

        fn assist(&self) -> Assist<'_> {
            Assist::new(AdcConfig::DEFAULT, &self.params, &self.pedal, &self.bike)
        }
    }

    fn run_once(assist: &mut Assist<'_>, volts: f32, motor: &mut FakeMotor) -> f32 {
        let pin = FakePin::default();
        let mut adc = FakeAdc(volts);
        let mut wdt = FakeWatchdog::default();
        let mut plot = FakePlot::default();
        assist.step(0, &pin, &mut adc, motor, &mut wdt, &mut plot)
    }

    #[test]
    fn full_throttle_is_full_current() {
        let rig = Rig::new(ControlMode::Throttle);
        let mut assist = rig.assist();
        let mut motor = FakeMotor::default();
        let current = run_once(&mut assist, 3.0, &mut motor);
        assert!((current - 1.0).abs() < 1e-5);
        assert_eq!(motor.commands.len(), 1);
    }

    #[test]
    fn throttle_below_deadband_is_zero() {
        let rig = Rig::new(ControlMode::Throttle);
        let assist = rig.assist();
        assert_eq!(assist.throttle_level(0.5), 0.0);
        assert_eq!(assist.throttle_level(1.1), 0.0);
        assert!(assist.throttle_level(2.0) > 0.0);
    }

    #[test]
    fn modes_select_sources() {
        for (mode, expect_motion) in [
            (ControlMode::Off, false),
            (ControlMode::Pedelec, false),
            (ControlMode::Throttle, true),
            (ControlMode::Both, true),
        ] {
            let rig = Rig::new(mode);
            let mut assist = rig.assist();
            let mut motor = FakeMotor::default();
            let current = run_once(&mut assist, 3.0, &mut motor);
            assert_eq!(current > 0.0, expect_motion, "{mode:?}");
        }
    }

    #[test]
    fn pedalling_drives_pedelec_mode() {
        let rig = Rig::new(ControlMode::Pedelec);
        let mut assist = rig.assist();
        let mut motor = FakeMotor::default();
        let pin = FakePin::default();
        let mut adc = FakeAdc(0.0);
        let mut wdt = FakeWatchdog::default();
        let mut plot = FakePlot::default();

        // 12 magnets, 60 ms apart: 2π / 720 ≈ 0.0087 rad/ms.
        let mut current = 0.0;
        for t in 0..200u32 {
            pin.high.set(t % 60 < 30);
            current = assist.step(t, &pin, &mut adc, &mut motor, &mut wdt, &mut plot);
        }
        assert!(current > 0.5 && current < 1.0, "{current}");
        assert_eq!(wdt.resets, 200);
    }

    #[test]
    fn cut_off_at_max_speed() {
        let rig = Rig::new(ControlMode::Throttle);
        let mut assist = rig.assist();
        let mut motor = FakeMotor {
            speed_kmh: 25.0,
            ..Default::default()
        };
        assert_eq!(run_once(&mut assist, 3.0, &mut motor), 0.0);

        rig.bike.max_speed_kmh.store_f32(0.0);
        assert!(run_once(&mut assist, 3.0, &mut motor) > 0.0);
    }

    #[test]
    fn scaled_down_over_max_power() {
        let rig = Rig::new(ControlMode::Throttle);
        let mut assist = rig.assist();
        let mut motor = FakeMotor {
            power_w: 500.0,
            ..Default::default()
        };
        let current = run_once(&mut assist, 3.0, &mut motor);
        assert!((current - 0.5).abs() < 1e-5);
    }

    #[test]
    fn remote_mode_write_takes_effect() {
        let rig = Rig::new(ControlMode::Throttle);
        let clock = can_dict::ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);
        let mut report = Registrations::new();
        rig.params.register(&mut dict, &mut report);
        assert!(report.all_ok());

        assert!(dict.handle_write_request(ids::CONTROL_MODE.raw(), &[0]));
        let mut assist = rig.assist();
        let mut motor = FakeMotor::default();
        assert_eq!(run_once(&mut assist, 3.0, &mut motor), 0.0);
    }

    #[test]
    fn plots_every_step() {
        let rig = Rig::new(ControlMode::Throttle);
        let mut assist = rig.assist();
        let mut plot = FakePlot::default();
        assist.start(&mut plot);
        assert_eq!(plot.graphs, ["Current", "Pedal"]);

        let pin = FakePin::default();
        let mut adc = FakeAdc(3.0);
        let mut motor = FakeMotor::default();
        let mut wdt = FakeWatchdog::default();
        assist.step(0, &pin, &mut adc, &mut motor, &mut wdt, &mut plot);
        assist.step(1, &pin, &mut adc, &mut motor, &mut wdt, &mut plot);
        assert_eq!(plot.points.len(), 4);
        assert_eq!(plot.points[2], (0, 1.0, 1.0));
    }
}
