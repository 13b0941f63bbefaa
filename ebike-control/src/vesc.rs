//! VESC power stage over CAN.
//!
//! The VESC uses the same extended ID layout as the dictionary, `(packet << 8) | controller_id`.
//! Commands are latched by [`MotorControl::set_current_rel`] and sent by [`VescMotor::flush`];
//! the VESC's periodic status broadcasts are absorbed by [`VescMotor::handle_frame`].
//!
//! | Packet | Dir | Payload (big-endian) |
//! | ------ | --- | -------------------- |
//! | `SET_CURRENT_REL` (10) | out | `i32` current ×1e5 |
//! | `STATUS` (9) | in | `i32` erpm, `i16` current ×10, `i16` duty ×1000 |
//! | `STATUS_5` (27) | in | `i32` tachometer, `i16` input voltage ×10 |

use core::f32::consts::PI;

use bxcan::{Frame, Id};
use can_dict::frame::{packet_frame, split_packet_id};
use can_dict::Transmit;
use log::trace;
use micromath::F32Ext;

use crate::bike::BikeParams;
use crate::config::BikeConfig;
use crate::io::MotorControl;
use crate::utils::truncate;

pub const SET_CURRENT_REL: u8 = 10;
pub const STATUS: u8 = 9;
pub const STATUS_5: u8 = 27;

const CURRENT_REL_SCALE: f32 = 100_000.0;
/// Tachometer steps per electrical revolution.
const TACHO_STEPS: f32 = 6.0;

/// Error type for `VescMotor` operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Status frame shorter than its packet layout.
    ShortPayload { packet: u8, len: usize },
    /// Remote frame where data was expected.
    NoData,
}

/// Latest values broadcast by the VESC.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MotorStatus {
    pub erpm: i32,
    /// Motor current, A.
    pub current_a: f32,
    /// Duty cycle, `[-1, 1]`.
    pub duty: f32,
    pub tachometer: i32,
    /// Battery voltage, V.
    pub input_voltage: f32,
}

/// Build the `SET_CURRENT_REL` frame for `controller_id`.
pub fn current_rel_frame(controller_id: u8, current: f32) -> Frame {
    let scaled = (truncate(current, -1.0, 1.0) * CURRENT_REL_SCALE).round() as i32;
    packet_frame(SET_CURRENT_REL, controller_id, &scaled.to_be_bytes())
}

pub struct VescMotor<'a> {
    controller_id: u8,
    pole_pairs: f32,
    gear_ratio: f32,
    bike: &'a BikeParams,
    pending: Option<f32>,
    status: MotorStatus,
}

impl<'a> VescMotor<'a> {
    pub fn new(controller_id: u8, config: &BikeConfig, bike: &'a BikeParams) -> Self {
        Self {
            controller_id,
            pole_pairs: config.motor_pole_pairs.max(1) as f32,
            gear_ratio: if config.gear_ratio > 0.0 {
                config.gear_ratio
            } else {
                1.0
            },
            bike,
            pending: None,
            status: MotorStatus::default(),
        }
    }

    #[inline]
    pub fn controller_id(&self) -> u8 {
        self.controller_id
    }

    #[inline]
    pub fn status(&self) -> &MotorStatus {
        &self.status
    }

    /// Send the latched current command, if any.
    ///
    /// On failure the command stays latched and is retried by the next flush.
    pub fn flush<T: Transmit>(&mut self, tx: &mut T) -> Result<(), T::Error> {
        if let Some(current) = self.pending {
            tx.transmit(&current_rel_frame(self.controller_id, current))?;
            self.pending = None;
        }
        Ok(())
    }

    /// Absorb a status frame from this VESC.
    ///
    /// Returns `Ok(false)` for frames that are not status packets from `controller_id`.
    pub fn handle_frame(&mut self, frame: &Frame) -> Result<bool, Error> {
        let Id::Extended(id) = frame.id() else {
            return Ok(false);
        };
        let Some((packet, node)) = split_packet_id(id) else {
            return Ok(false);
        };
        if node != self.controller_id || !matches!(packet, STATUS | STATUS_5) {
            return Ok(false);
        }

        let data = frame.data().ok_or(Error::NoData)?;
        let need = if packet == STATUS { 8 } else { 6 };
        if data.len() < need {
            return Err(Error::ShortPayload {
                packet,
                len: data.len(),
            });
        }

        let be_i32 =
            |at: usize| i32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
        let be_i16 = |at: usize| i16::from_be_bytes([data[at], data[at + 1]]);

        if packet == STATUS {
            self.status.erpm = be_i32(0);
            self.status.current_a = be_i16(4) as f32 / 10.0;
            self.status.duty = be_i16(6) as f32 / 1000.0;
        } else {
            self.status.tachometer = be_i32(0);
            self.status.input_voltage = be_i16(4) as f32 / 10.0;
        }
        trace!("vesc: status {} from {}", packet, node);
        Ok(true)
    }

    #[inline]
    fn wheel_circumference_m(&self) -> f32 {
        PI * self.bike.wheel_diameter_m()
    }
}

impl MotorControl for VescMotor<'_> {
    fn set_current_rel(&mut self, current: f32) {
        self.pending = Some(truncate(current, -1.0, 1.0));
    }

    fn speed_kmh(&self) -> f32 {
        let wheel_rpm = self.status.erpm as f32 / self.pole_pairs / self.gear_ratio;
        wheel_rpm * self.wheel_circumference_m() * 60.0 / 1000.0
    }

    fn power_w(&self) -> f32 {
        // Input current is motor current scaled by duty.
        self.status.input_voltage * self.status.current_a * self.status.duty
    }

    fn distance_m(&self) -> f32 {
        let steps_per_rev = TACHO_STEPS * self.pole_pairs * self.gear_ratio;
        let wheel_revs = self.status.tachometer as f32 / steps_per_rev;
        wheel_revs * self.wheel_circumference_m()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_dict::frame::packet_id;
    use core::convert::Infallible;
    use std::vec::Vec;

    #[derive(Default)]
    struct Bus {
        frames: Vec<Frame>,
        refuse: bool,
    }

    impl Transmit for Bus {
        type Error = ();
        fn transmit(&mut self, frame: &Frame) -> Result<(), ()> {
            if self.refuse {
                return Err(());
            }
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    fn status_frame(erpm: i32, current_x10: i16, duty_x1000: i16) -> Frame {
        let mut data = [0u8; 8];
        data[..4].copy_from_slice(&erpm.to_be_bytes());
        data[4..6].copy_from_slice(&current_x10.to_be_bytes());
        data[6..].copy_from_slice(&duty_x1000.to_be_bytes());
        packet_frame(STATUS, 0x00, &data)
    }

    fn status5_frame(tacho: i32, vin_x10: i16) -> Frame {
        let mut data = [0u8; 8];
        data[..4].copy_from_slice(&tacho.to_be_bytes());
        data[4..6].copy_from_slice(&vin_x10.to_be_bytes());
        packet_frame(STATUS_5, 0x00, &data)
    }

    fn params() -> BikeParams {
        BikeParams::new(&BikeConfig {
            wheel_diameter_m: 1.0 / PI,
            gear_ratio: 1.0,
            motor_pole_pairs: 5,
            ..BikeConfig::DEFAULT
        })
    }

    #[test]
    fn current_command_encoding() {
        let frame = current_rel_frame(0x07, 0.5);
        assert_eq!(frame.id(), Id::Extended(packet_id(SET_CURRENT_REL, 0x07)));
        assert_eq!(&frame.data().unwrap()[..], &50_000i32.to_be_bytes());

        let frame = current_rel_frame(0x07, -3.0);
        assert_eq!(&frame.data().unwrap()[..], &(-100_000i32).to_be_bytes());
    }

    #[test]
    fn flush_sends_latched_command_once() {
        let bike = params();
        let mut motor = VescMotor::new(0x00, &BikeConfig::DEFAULT, &bike);
        let mut bus = Bus::default();

        motor.flush(&mut bus).unwrap();
        assert!(bus.frames.is_empty());

        motor.set_current_rel(0.25);
        motor.flush(&mut bus).unwrap();
        motor.flush(&mut bus).unwrap();
        assert_eq!(bus.frames.len(), 1);
    }

    #[test]
    fn failed_flush_keeps_command() {
        let bike = params();
        let mut motor = VescMotor::new(0x00, &BikeConfig::DEFAULT, &bike);
        let mut bus = Bus {
            refuse: true,
            ..Default::default()
        };
        motor.set_current_rel(0.25);
        assert!(motor.flush(&mut bus).is_err());
        bus.refuse = false;
        motor.flush(&mut bus).unwrap();
        assert_eq!(bus.frames.len(), 1);
    }

    #[test]
    fn status_decodes_into_ride_values() {
        let bike = params();
        let config = BikeConfig {
            motor_pole_pairs: 5,
            ..BikeConfig::DEFAULT
        };
        let mut motor = VescMotor::new(0x00, &config, &bike);

        // 5000 erpm / 5 pole pairs = 1000 wheel rpm, 1 m circumference -> 60 km/h.
        assert_eq!(motor.handle_frame(&status_frame(5000, 125, 500)), Ok(true));
        assert_eq!(motor.handle_frame(&status5_frame(300, 480)), Ok(true));

        assert_eq!(motor.status().current_a, 12.5);
        assert_eq!(motor.status().duty, 0.5);
        assert_eq!(motor.status().input_voltage, 48.0);
        assert!((motor.speed_kmh() - 60.0).abs() < 1e-3);
        assert!((motor.power_w() - 300.0).abs() < 1e-3);
        // 300 steps / (6 * 5) = 10 revolutions of 1 m.
        assert!((motor.distance_m() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn foreign_and_short_frames() {
        let bike = params();
        let mut motor = VescMotor::new(0x03, &BikeConfig::DEFAULT, &bike);
        assert_eq!(motor.handle_frame(&status_frame(1, 1, 1)), Ok(false));

        let short = packet_frame(STATUS, 0x03, &[0, 0, 0]);
        assert_eq!(
            motor.handle_frame(&short),
            Err(Error::ShortPayload { packet: STATUS, len: 3 })
        );

        let other = packet_frame(SET_CURRENT_REL, 0x03, &[0, 0, 0, 0]);
        assert_eq!(motor.handle_frame(&other), Ok(false));

        let remote = Frame::new_remote(packet_id(STATUS_5, 0x03), 8);
        assert_eq!(motor.handle_frame(&remote), Err(Error::NoData));
    }

    #[test]
    fn infallible_transports_work_too() {
        struct Sink;
        impl Transmit for Sink {
            type Error = Infallible;
            fn transmit(&mut self, _frame: &Frame) -> Result<(), Infallible> {
                Ok(())
            }
        }
        let bike = params();
        let mut motor = VescMotor::new(0x00, &BikeConfig::DEFAULT, &bike);
        motor.set_current_rel(1.0);
        assert_eq!(motor.flush(&mut Sink), Ok(()));
    }
}
