//! A single house with its controllable assets.

use crate::assets::{AssetKind, Battery, EvInstallation, HeatPump, PvInstallation};
use crate::error::{InvariantViolation, SimError};
use crate::sim::types::SimConfig;

/// One house on the neighborhood feeder.
///
/// The fixed baseload is a given profile; the four assets contribute
/// controllable consumption on top of it. The house's net load is the sum
/// of all five at the current timestep.
#[derive(Debug, Clone)]
pub struct House {
    pub id: usize,
    /// Uncontrollable household consumption per timestep (kW).
    pub baseload: Vec<f64>,
    pub pv: PvInstallation,
    pub ev: EvInstallation,
    pub battery: Battery,
    pub heatpump: HeatPump,
}

impl House {
    /// Refreshes the feasible power range of every asset for this timestep.
    pub fn compute_bounds(&mut self, time_step: usize, ambient_k: f64, cfg: &SimConfig) {
        self.pv.compute_bounds(time_step);
        self.ev.compute_bounds(time_step, cfg.dt_hours);
        self.battery.compute_bounds(cfg.dt_hours);
        self.heatpump
            .compute_bounds(time_step, ambient_k, cfg.dt_seconds());
    }

    /// Integrates every asset's assigned consumption and returns the house's
    /// net load for the timestep.
    ///
    /// The first invariant violation aborts with the offending asset named.
    pub fn integrate_response(
        &mut self,
        time_step: usize,
        ambient_k: f64,
        cfg: &SimConfig,
    ) -> Result<f64, SimError> {
        let house = self.id;
        let tag = |kind: AssetKind| {
            move |violation: InvariantViolation| SimError::Invariant {
                house,
                kind,
                timestep: time_step,
                violation,
            }
        };

        self.pv.validate(time_step).map_err(tag(AssetKind::Pv))?;
        self.ev
            .integrate_response(time_step, cfg.dt_hours)
            .map_err(tag(AssetKind::Ev))?;
        self.heatpump
            .integrate_response(time_step, ambient_k, cfg.dt_seconds())
            .map_err(tag(AssetKind::Heatpump))?;
        self.battery
            .integrate_response(time_step, cfg.dt_hours)
            .map_err(tag(AssetKind::Battery))?;

        Ok(self.load_kw(time_step))
    }

    /// Net load of the house at a timestep: baseload plus every asset's
    /// assigned consumption (kW).
    pub fn load_kw(&self, time_step: usize) -> f64 {
        self.baseload[time_step]
            + self.pv.consumption[time_step]
            + self.ev.consumption[time_step]
            + self.battery.consumption[time_step]
            + self.heatpump.consumption[time_step]
    }
}
