//! Control policy contract and the phases it is invoked in.

use std::fmt;
use std::str::FromStr;

use crate::assets::{Battery, EvInstallation, HeatPump, PvInstallation};
use crate::error::SimError;
use crate::sim::house::House;

/// The three control scopes a policy can act at within one timestep.
///
/// The engine runs the configured phases in order; a later phase sees, and
/// may overwrite, the consumption assignments of earlier ones. The last
/// write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPhase {
    /// One asset at a time, no view of the rest of the house.
    Individual,
    /// One house at a time, all of its assets together.
    Household,
    /// All houses at once.
    Neighborhood,
}

impl fmt::Display for ControlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlPhase::Individual => "individual",
            ControlPhase::Household => "household",
            ControlPhase::Neighborhood => "neighborhood",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ControlPhase {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(ControlPhase::Individual),
            "household" => Ok(ControlPhase::Household),
            "neighborhood" => Ok(ControlPhase::Neighborhood),
            other => Err(SimError::config(
                "simulation.control_order",
                format!("unknown control phase '{other}'"),
            )),
        }
    }
}

/// Read-only external signals handed to every policy hook.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    /// Outdoor air temperature per timestep (K).
    pub ambient_temperature: &'a [f64],
    /// Share of renewable generation in the grid mix per timestep, in
    /// `[0, 1]`.
    pub renewable_share: &'a [f64],
}

/// A control strategy plugged into the engine.
///
/// Every hook has a no-op default, so a policy implements only the scopes
/// it cares about. Hooks run after the bound phase: each asset's `min` and
/// `max` are current, and any consumption a hook writes must stay inside
/// them or the response phase aborts the run.
pub trait ControlPolicy {
    /// Name used in logs and reports.
    fn name(&self) -> &'static str;

    fn individual_pv(&mut self, _t: usize, _ctx: &PolicyContext<'_>, _pv: &mut PvInstallation) {}

    fn individual_ev(&mut self, _t: usize, _ctx: &PolicyContext<'_>, _ev: &mut EvInstallation) {}

    fn individual_heatpump(&mut self, _t: usize, _ctx: &PolicyContext<'_>, _hp: &mut HeatPump) {}

    fn individual_battery(&mut self, _t: usize, _ctx: &PolicyContext<'_>, _battery: &mut Battery) {}

    fn household(&mut self, _t: usize, _ctx: &PolicyContext<'_>, _house: &mut House) {}

    fn neighborhood(&mut self, _t: usize, _ctx: &PolicyContext<'_>, _houses: &mut [House]) {}
}
