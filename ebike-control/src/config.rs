//! Board and ride parameters.
//!
//! Everything here is a compile-time default. The values that riders tune at runtime are copied
//! into dictionary variables at start-up (see [`crate::setup::Vars`]) and read back from there.

use crate::utils::CurveMode;

/// Main loop period of the assist app.
pub const ASSIST_PERIOD_MS: u32 = 1;
/// Light output refresh period.
pub const LIGHTS_PERIOD_MS: u32 = 100;
/// Autonomous publish interval of `POWER`.
pub const POWER_SEND_MS: u32 = 100;
/// Autonomous publish interval of `SPEED`.
pub const SPEED_SEND_MS: u32 = 200;

/// Pedal crank speed (rad/ms) that maps to full pedal assist.
pub const PEDAL_FULL_SPEED: f32 = 0.012;

/// Throttle input shaping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdcConfig {
    /// Throttle voltage at zero command, V.
    pub voltage_start: f32,
    /// Throttle voltage at full command, V.
    pub voltage_end: f32,
    /// Deadband on the normalized throttle.
    pub hyst: f32,
    pub throttle_exp: f32,
    pub throttle_exp_brake: f32,
    pub throttle_exp_mode: CurveMode,
}

impl AdcConfig {
    pub const DEFAULT: Self = Self {
        voltage_start: 0.9,
        voltage_end: 3.0,
        hyst: 0.15,
        throttle_exp: 0.0,
        throttle_exp_brake: 0.0,
        throttle_exp_mode: CurveMode::Polynomial,
    };
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Mechanical and legal limits of the bike.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BikeConfig {
    pub wheel_diameter_m: f32,
    /// Input power limit, W. 0 disables the limit.
    pub max_power_w: f32,
    /// Assist cut-off speed, km/h. 0 disables the limit.
    pub max_speed_kmh: f32,
    pub motor_pole_pairs: u8,
    /// Motor revolutions per wheel revolution.
    pub gear_ratio: f32,
}

impl BikeConfig {
    pub const DEFAULT: Self = Self {
        wheel_diameter_m: 0.7,
        max_power_w: 250.0,
        max_speed_kmh: 25.0,
        motor_pole_pairs: 7,
        gear_ratio: 1.0,
    };
}

impl Default for BikeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Pedal assist sensor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PedalConfig {
    /// Magnets on the crank disc.
    pub magnets: u8,
    /// Crank speed drops to zero after this long without an edge.
    pub stop_timeout_ms: u16,
    /// Low-pass weight of a new speed sample, in `(0, 1]`. 1 disables filtering.
    pub curve_alpha: f32,
}

impl PedalConfig {
    pub const DEFAULT: Self = Self {
        magnets: 12,
        stop_timeout_ms: 500,
        curve_alpha: 1.0,
    };
}

impl Default for PedalConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete application configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Node ID of this board on the dictionary protocol.
    pub controller_id: u8,
    /// Node ID of the VESC power stage.
    pub motor_id: u8,
    pub adc: AdcConfig,
    pub bike: BikeConfig,
    pub pedal: PedalConfig,
}

impl AppConfig {
    pub const DEFAULT: Self = Self {
        controller_id: 0x01,
        motor_id: 0x00,
        adc: AdcConfig::DEFAULT,
        bike: BikeConfig::DEFAULT,
        pedal: PedalConfig::DEFAULT,
    };
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
