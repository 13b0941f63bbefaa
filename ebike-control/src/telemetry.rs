//! Real-time ride data published on the bus without being asked.

use can_dict::{Access, Clock, Dictionary, SendInterval, Variable};

use crate::config::{POWER_SEND_MS, SPEED_SEND_MS};
use crate::ids;
use crate::io::MotorControl;
use crate::setup::Registrations;

pub struct Telemetry {
    pub power_w: Variable,
    pub speed_kmh: Variable,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            power_w: Variable::from_f32(0.0),
            speed_kmh: Variable::from_f32(0.0),
        }
    }

    pub fn register<'m, C: Clock, const N: usize>(
        &'m self,
        dict: &mut Dictionary<'m, C, N>,
        report: &mut Registrations,
    ) {
        let ro = Access::READ_ONLY;
        report.record(
            ids::POWER,
            dict.bind(ids::POWER, &self.power_w, 4, ro, SendInterval::from_ms(POWER_SEND_MS)),
        );
        report.record(
            ids::SPEED,
            dict.bind(ids::SPEED, &self.speed_kmh, 4, ro, SendInterval::from_ms(SPEED_SEND_MS)),
        );
    }

    /// Copy the latest motor readings.
    pub fn update<M: MotorControl>(&self, motor: &M) {
        self.power_w.store_f32(motor.power_w());
        self.speed_kmh.store_f32(motor.speed_kmh());
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fakes::FakeMotor;
    use bxcan::Frame;
    use can_dict::{ManualClock, Publisher, PublisherConfig, Transmit};
    use core::convert::Infallible;
    use std::vec::Vec;

    #[derive(Default)]
    struct Bus(Vec<Frame>);

    impl Transmit for Bus {
        type Error = Infallible;
        fn transmit(&mut self, frame: &Frame) -> Result<(), Infallible> {
            self.0.push(frame.clone());
            Ok(())
        }
    }

    #[test]
    fn publishes_power_and_speed_on_their_own_schedules() {
        let telemetry = Telemetry::new();
        let clock = ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);
        let mut report = Registrations::new();
        telemetry.register(&mut dict, &mut report);
        assert!(report.all_ok());

        let motor = FakeMotor {
            power_w: 120.5,
            speed_kmh: 18.0,
            ..Default::default()
        };
        telemetry.update(&motor);

        let mut publisher = Publisher::new(PublisherConfig::new(0x01));
        let mut bus = Bus::default();
        for _ in 0..20 {
            clock.advance(10);
            publisher.poll(&dict, &mut bus);
        }

        // 200 ms: POWER at 100 and 200, SPEED at 200.
        let sent: Vec<u8> = bus.0.iter().map(|f| f.data().unwrap()[0]).collect();
        assert_eq!(sent, [ids::POWER.raw(), ids::POWER.raw(), ids::SPEED.raw()]);

        let last = bus.0[2].data().unwrap();
        assert_eq!(&last[1..5], &18.0f32.to_le_bytes());
    }

    #[test]
    fn remote_writes_are_refused() {
        let telemetry = Telemetry::new();
        let clock = ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);
        let mut report = Registrations::new();
        telemetry.register(&mut dict, &mut report);

        assert!(!dict.handle_write_request(ids::SPEED.raw(), &99.0f32.to_le_bytes()));
        assert_eq!(telemetry.speed_kmh.load_f32(), 0.0);
    }
}
