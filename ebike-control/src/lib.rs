// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # E-bike Control
//!
//! Hardware-independent applications of the e-bike motor controller. Every app is generic over
//! small collaborator traits ([`io`]) and keeps its tunable parameters in dictionary variables, so
//! the whole crate runs and tests on the host.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`assist`] | Pedal/throttle assist with speed and power limits |
//! | [`pedelec`] | Pedal assist sensor crank speed estimation |
//! | [`lights`] | Light output and its terminal command |
//! | [`telemetry`] | Power and speed published on the bus |
//! | [`bike`] | Wheel size and legal limits |
//! | [`vesc`] | [`io::MotorControl`] over a VESC's CAN interface |
//! | [`setup`] | Variable storage and start-up registration |
//! | [`terminal`] | Debug terminal line editing and commands |
//! | [`utils`] | Mapping, deadband and throttle curves |
//! | [`schedule`] | Fixed-period task gating |
//! | [`config`] | Compile-time defaults |
//! | [`ids`] | Well-known variable IDs |
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod assist;
pub mod bike;
pub mod config;
pub mod ids;
pub mod io;
pub mod lights;
pub mod pedelec;
pub mod schedule;
pub mod setup;
pub mod telemetry;
pub mod terminal;
pub mod utils;
pub mod vesc;

pub use assist::{Assist, AssistParams, ControlMode};
pub use bike::BikeParams;
pub use config::AppConfig;
pub use io::{AnalogInput, MotorControl, Plot, Watchdog};
pub use lights::{Lights, LightsState};
pub use pedelec::{PedalParams, PedalSensor};
pub use schedule::Interval;
pub use setup::{register_all, Registrations, Vars};
pub use telemetry::Telemetry;
pub use vesc::VescMotor;
