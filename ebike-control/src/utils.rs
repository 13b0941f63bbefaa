//! Scalar helpers for shaping control inputs.

use micromath::F32Ext;

/// Linearly map `x` from `[in_min, in_max]` to `[out_min, out_max]`. No clamping.
#[inline]
pub fn map(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Clamp `x` to `[min, max]`.
#[inline]
pub fn truncate(x: f32, min: f32, max: f32) -> f32 {
    if x > max {
        max
    } else if x < min {
        min
    } else {
        x
    }
}

/// Zero everything below `threshold` in magnitude and rescale the rest so `max` still maps to
/// `max`.
pub fn deadband(value: f32, threshold: f32, max: f32) -> f32 {
    if value.abs() < threshold {
        return 0.0;
    }

    let k = max / (max - threshold);
    if value > 0.0 {
        k * value + max * (1.0 - k)
    } else {
        -(k * -value + max * (1.0 - k))
    }
}

/// Throttle response curve shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CurveMode {
    Exponential,
    Natural,
    Polynomial,
    Linear,
}

impl CurveMode {
    /// Decode the numeric mode used in configuration (0..=2; anything else is linear).
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => CurveMode::Exponential,
            1 => CurveMode::Natural,
            2 => CurveMode::Polynomial,
            _ => CurveMode::Linear,
        }
    }
}

/// Apply a throttle curve to `val` in `[-1, 1]`.
///
/// `curve_acc` shapes positive input and `curve_brake` negative input. A positive curve value makes
/// the response more aggressive near zero, a negative one softer; 0 is linear for every mode.
pub fn throttle_curve(val: f32, curve_acc: f32, curve_brake: f32, mode: CurveMode) -> f32 {
    let val = truncate(val, -1.0, 1.0);
    let val_a = val.abs();
    let curve = if val >= 0.0 { curve_acc } else { curve_brake };

    let ret = match mode {
        CurveMode::Exponential => {
            if curve >= 0.0 {
                1.0 - (1.0 - val_a).powf(1.0 + curve)
            } else {
                val_a.powf(1.0 - curve)
            }
        }
        CurveMode::Natural => {
            if curve.abs() < 1e-10 {
                val_a
            } else if curve >= 0.0 {
                1.0 - ((curve * (1.0 - val_a)).exp() - 1.0) / (curve.exp() - 1.0)
            } else {
                ((-curve * val_a).exp() - 1.0) / ((-curve).exp() - 1.0)
            }
        }
        CurveMode::Polynomial => {
            if curve >= 0.0 {
                1.0 - (1.0 - val_a) / (1.0 + curve * val_a)
            } else {
                val_a / (1.0 - curve * (1.0 - val_a))
            }
        }
        CurveMode::Linear => val_a,
    };

    if val < 0.0 {
        -ret
    } else {
        ret
    }
}
