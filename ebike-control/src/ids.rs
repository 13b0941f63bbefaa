//! Well-known dictionary variable IDs.

use can_dict::VarId;

// Lights
pub const LIGHTS: VarId = VarId::from_const(0x01);

// Pedelec
pub const PEDELEC_MAGNETS: VarId = VarId::from_const(0x10);
pub const PEDELEC_CURVE_ALPHA: VarId = VarId::from_const(0x11);
pub const PEDELEC_STOP_TIMEOUT: VarId = VarId::from_const(0x12);

// Assist app
pub const CONTROL_MODE: VarId = VarId::from_const(0x21);

// Bike configuration
pub const WHEEL_DIAM: VarId = VarId::from_const(0x30);
pub const MAX_POWER: VarId = VarId::from_const(0x31);
pub const MAX_SPEED: VarId = VarId::from_const(0x32);

// Real-time info
/// Electrical input power, W.
pub const POWER: VarId = VarId::from_const(0x38);
/// Road speed, km/h.
pub const SPEED: VarId = VarId::from_const(0x39);
