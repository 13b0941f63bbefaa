//! Remotely tunable bike parameters: wheel size and the legal limits.
//!
//! The wheel diameter is kept in metres locally but travels on the bus as a little-endian `u16`
//! in millimetres, converted by a custom setter/getter pair.

use can_dict::{Access, Clock, Dictionary, SendInterval, Variable};

use crate::config::BikeConfig;
use crate::ids;
use crate::setup::Registrations;

pub struct BikeParams {
    pub wheel_diameter_m: Variable,
    pub max_power_w: Variable,
    pub max_speed_kmh: Variable,
}

impl BikeParams {
    pub const fn new(config: &BikeConfig) -> Self {
        Self {
            wheel_diameter_m: Variable::from_f32(config.wheel_diameter_m),
            max_power_w: Variable::from_f32(config.max_power_w),
            max_speed_kmh: Variable::from_f32(config.max_speed_kmh),
        }
    }

    #[inline]
    pub fn wheel_diameter_m(&self) -> f32 {
        self.wheel_diameter_m.load_f32()
    }

    #[inline]
    pub fn max_power_w(&self) -> f32 {
        self.max_power_w.load_f32()
    }

    #[inline]
    pub fn max_speed_kmh(&self) -> f32 {
        self.max_speed_kmh.load_f32()
    }

    pub fn register<'m, C: Clock, const N: usize>(
        &'m self,
        dict: &mut Dictionary<'m, C, N>,
        report: &mut Registrations,
    ) {
        let rw = Access::READ_WRITE;
        let never = SendInterval::Never;

        report.record(
            ids::WHEEL_DIAM,
            dict.bind(ids::WHEEL_DIAM, &self.wheel_diameter_m, 2, rw, never)
                .and_then(|()| dict.set_setter(ids::WHEEL_DIAM, wheel_mm_setter))
                .and_then(|()| dict.set_getter(ids::WHEEL_DIAM, wheel_mm_getter)),
        );
        report.record(
            ids::MAX_POWER,
            dict.bind(ids::MAX_POWER, &self.max_power_w, 4, rw, never),
        );
        report.record(
            ids::MAX_SPEED,
            dict.bind(ids::MAX_SPEED, &self.max_speed_kmh, 4, rw, never),
        );
    }
}

fn wheel_mm_setter(dest: &Variable, length: usize, src: &[u8]) {
    let mut raw = [0u8; 2];
    let n = length.min(src.len()).min(raw.len());
    raw[..n].copy_from_slice(&src[..n]);
    dest.store_f32(u16::from_le_bytes(raw) as f32 / 1000.0);
}

fn wheel_mm_getter(src: &Variable, length: usize, dest: &mut [u8]) -> usize {
    // Float-to-int `as` saturates, so negative or huge values clamp to the u16 range.
    let mm = (src.load_f32() * 1000.0 + 0.5) as u16;
    let raw = mm.to_le_bytes();
    let n = length.min(dest.len()).min(raw.len());
    dest[..n].copy_from_slice(&raw[..n]);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_dict::ManualClock;

    #[test]
    fn wheel_diameter_travels_in_millimetres() {
        let params = BikeParams::new(&BikeConfig::DEFAULT);
        let clock = ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);
        let mut report = Registrations::new();
        params.register(&mut dict, &mut report);
        assert!(report.all_ok());

        let mut buf = [0u8; 8];
        assert_eq!(dict.handle_read_request(ids::WHEEL_DIAM.raw(), &mut buf), 2);
        assert_eq!(u16::from_le_bytes([buf[0], buf[1]]), 700);

        assert!(dict.handle_write_request(ids::WHEEL_DIAM.raw(), &711u16.to_le_bytes()));
        assert!((params.wheel_diameter_m() - 0.711).abs() < 1e-6);
    }

    #[test]
    fn limits_are_plain_floats() {
        let params = BikeParams::new(&BikeConfig::DEFAULT);
        let clock = ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);
        let mut report = Registrations::new();
        params.register(&mut dict, &mut report);

        assert!(dict.handle_write_request(ids::MAX_SPEED.raw(), &32.0f32.to_le_bytes()));
        assert_eq!(params.max_speed_kmh(), 32.0);
        assert_eq!(params.max_power_w(), 250.0);
    }
}
