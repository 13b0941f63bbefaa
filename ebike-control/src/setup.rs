//! Start-up registration of every application variable.
//!
//! A failed registration is logged and counted but never stops the board: the affected variable
//! simply stays invisible on the bus while the apps keep using their local copy.

use can_dict::{Clock, Dictionary, VarId};
use log::{info, warn};

use crate::assist::AssistParams;
use crate::bike::BikeParams;
use crate::config::AppConfig;
use crate::lights::LightsState;
use crate::pedelec::PedalParams;
use crate::telemetry::Telemetry;

/// AND-accumulated outcome of a batch of registrations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Registrations {
    attempted: u8,
    failed: u8,
}

impl Registrations {
    pub const fn new() -> Self {
        Self {
            attempted: 0,
            failed: 0,
        }
    }

    /// Count `result` for `id`, logging it if it failed. Returns whether it succeeded.
    pub fn record(&mut self, id: VarId, result: can_dict::Result<()>) -> bool {
        self.attempted = self.attempted.saturating_add(1);
        match result {
            Ok(()) => true,
            Err(e) => {
                self.failed = self.failed.saturating_add(1);
                warn!("ebike: registering {} failed: {}", id, e);
                false
            }
        }
    }

    #[inline]
    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }

    #[inline]
    pub fn attempted(&self) -> u8 {
        self.attempted
    }

    #[inline]
    pub fn failed(&self) -> u8 {
        self.failed
    }
}

/// Storage of every bound application variable.
///
/// Meant to live in a `static` so the dictionary can borrow it for `'static`.
pub struct Vars {
    pub lights: LightsState,
    pub pedal: PedalParams,
    pub assist: AssistParams,
    pub bike: BikeParams,
    pub telemetry: Telemetry,
}

impl Vars {
    pub const fn new(config: &AppConfig) -> Self {
        Self {
            lights: LightsState::new(),
            pedal: PedalParams::new(&config.pedal),
            assist: AssistParams::new(),
            bike: BikeParams::new(&config.bike),
            telemetry: Telemetry::new(),
        }
    }
}

/// Register all of `vars` in `dict`.
pub fn register_all<'m, C: Clock, const N: usize>(
    dict: &mut Dictionary<'m, C, N>,
    vars: &'m Vars,
) -> Registrations {
    let mut report = Registrations::new();
    vars.lights.register(dict, &mut report);
    vars.pedal.register(dict, &mut report);
    vars.assist.register(dict, &mut report);
    vars.bike.register(dict, &mut report);
    vars.telemetry.register(dict, &mut report);

    if report.all_ok() {
        info!("ebike: {} variables registered", report.attempted());
    } else {
        warn!(
            "ebike: {} of {} registrations failed",
            report.failed(),
            report.attempted()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids;
    use can_dict::{Access, Error, ManualClock, SendInterval, Variable};

    #[test]
    fn registers_every_well_known_id() {
        let vars = Vars::new(&AppConfig::DEFAULT);
        let clock = ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);

        let report = register_all(&mut dict, &vars);
        assert!(report.all_ok());
        assert_eq!(report.attempted(), 10);

        for id in [
            ids::LIGHTS,
            ids::PEDELEC_MAGNETS,
            ids::PEDELEC_CURVE_ALPHA,
            ids::PEDELEC_STOP_TIMEOUT,
            ids::CONTROL_MODE,
            ids::WHEEL_DIAM,
            ids::MAX_POWER,
            ids::MAX_SPEED,
            ids::POWER,
            ids::SPEED,
        ] {
            assert!(dict.is_active(id), "{id} missing");
        }
        assert_eq!(dict.active_ids().count(), 10);
        assert_eq!(dict.owned_in_use(), 0);
    }

    #[test]
    fn a_clash_is_reported_and_the_rest_still_register() {
        static SQUATTER: Variable = Variable::zeroed();
        let vars = Vars::new(&AppConfig::DEFAULT);
        let clock = ManualClock::new(0);
        let mut dict = Dictionary::new(&clock);
        dict.bind(ids::MAX_POWER, &SQUATTER, 1, Access::READ_ONLY, SendInterval::Never)
            .unwrap();

        let report = register_all(&mut dict, &vars);
        assert!(!report.all_ok());
        assert_eq!(report.failed(), 1);
        assert!(dict.is_active(ids::MAX_SPEED));
        assert_eq!(dict.length(ids::MAX_POWER), Some(1));
    }

    #[test]
    fn record_accumulates() {
        let mut report = Registrations::new();
        assert!(report.record(ids::LIGHTS, Ok(())));
        assert!(!report.record(ids::LIGHTS, Err(Error::AlreadyActive)));
        assert!(report.record(ids::SPEED, Ok(())));
        assert_eq!((report.attempted(), report.failed()), (3, 1));
        assert!(!report.all_ok());
    }
}
