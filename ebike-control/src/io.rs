//! Collaborator interfaces the apps are generic over.
//!
//! Digital pins use the `embedded-hal` 0.2 [`InputPin`](embedded_hal::digital::v2::InputPin) and
//! [`OutputPin`](embedded_hal::digital::v2::OutputPin) traits, and console text goes through
//! [`core::fmt::Write`].

/// Motor power stage.
pub trait MotorControl {
    /// Command a current relative to the configured maximum, in `[-1, 1]`.
    fn set_current_rel(&mut self, current: f32);

    /// Road speed, km/h.
    fn speed_kmh(&self) -> f32;

    /// Electrical input power, W. Negative while regenerating.
    fn power_w(&self) -> f32;

    /// Distance travelled since power-up, m.
    fn distance_m(&self) -> f32;
}

/// Independent watchdog. Every app resets it once per step.
pub trait Watchdog {
    fn reset_timeout(&mut self);
}

/// Analog input in volts (throttle).
pub trait AnalogInput {
    fn read_volts(&mut self) -> f32;
}

/// Live plot sink on the debug terminal.
pub trait Plot {
    fn init_plot(&mut self, x_label: &str, y_label: &str);
    fn add_graph(&mut self, name: &str);
    fn set_graph(&mut self, index: usize);
    fn send_point(&mut self, x: f32, y: f32);
}

/// Discards all plot output.
impl Plot for () {
    fn init_plot(&mut self, _x_label: &str, _y_label: &str) {}
    fn add_graph(&mut self, _name: &str) {}
    fn set_graph(&mut self, _index: usize) {}
    fn send_point(&mut self, _x: f32, _y: f32) {}
}
