//! Built-in control policies.

use crate::assets::{Battery, EvInstallation, HeatPump, PvInstallation};
use crate::sim::house::House;
use crate::sim::policy::{ControlPolicy, PolicyContext};

/// Per-house greedy flattening.
///
/// Generates all available PV power, charges the EV as fast as possible,
/// runs the heat pump at its minimum, and then uses the battery to push the
/// house's net load as close to zero as its bounds allow. No coordination
/// between houses.
#[derive(Debug, Default)]
pub struct GreedyHousehold;

impl ControlPolicy for GreedyHousehold {
    fn name(&self) -> &'static str {
        "greedy_household"
    }

    fn household(&mut self, t: usize, _ctx: &PolicyContext<'_>, house: &mut House) {
        house.pv.consumption[t] = house.pv.max;
        house.ev.consumption[t] = house.ev.max;
        house.heatpump.consumption[t] = house.heatpump.min;

        let residual = house.baseload[t]
            + house.pv.consumption[t]
            + house.ev.consumption[t]
            + house.heatpump.consumption[t];
        house.battery.consumption[t] =
            (-residual).clamp(house.battery.min, house.battery.max);
    }
}

/// Baseline with no coordination at all.
///
/// Every asset follows its own default behavior: PV generates whatever
/// irradiance allows, the EV charges at the slowest rate that still fills
/// it by departure, the heat pump covers only its minimum, and the battery
/// sits idle. Useful as the reference case flexible policies are compared
/// against.
#[derive(Debug, Default)]
pub struct Uncontrolled;

impl ControlPolicy for Uncontrolled {
    fn name(&self) -> &'static str {
        "uncontrolled"
    }

    fn individual_pv(&mut self, t: usize, _ctx: &PolicyContext<'_>, pv: &mut PvInstallation) {
        pv.consumption[t] = pv.max;
    }

    fn individual_ev(&mut self, t: usize, _ctx: &PolicyContext<'_>, ev: &mut EvInstallation) {
        ev.consumption[t] = ev.min;
    }

    fn individual_heatpump(&mut self, t: usize, _ctx: &PolicyContext<'_>, hp: &mut HeatPump) {
        hp.consumption[t] = hp.min;
    }

    fn individual_battery(&mut self, t: usize, _ctx: &PolicyContext<'_>, battery: &mut Battery) {
        battery.consumption[t] = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    use crate::assets::thermal::{ThermalModelData, ThermalNetwork};
    use crate::assets::{EvSessionData, HeatPumpParams};
    use crate::sim::types::SimConfig;

    use super::*;

    fn house(steps: usize) -> House {
        let free = DVector::from_vec(vec![293.0, 293.0, 293.0]);
        let thermal = ThermalNetwork::new(ThermalModelData {
            initial_temperatures: DVector::from_element(3, 293.0),
            transition: DMatrix::zeros(3, 3),
            heat_response: DMatrix::identity(3, 3),
            injection: DVector::from_vec(vec![0.0, 1.0, 0.0]),
            conductance_inv: DMatrix::identity(3, 3),
            ambient_offset: vec![free.clone(); steps],
            free_forcing: vec![free; steps],
            gain_drift: vec![DVector::zeros(3); steps],
        });
        House {
            id: 0,
            baseload: vec![0.8; steps],
            pv: PvInstallation::new(0, vec![-0.3; steps]),
            ev: EvInstallation::new(
                0,
                EvSessionData {
                    charge_cap: 7.4,
                    size: 60.0,
                    min_charge: 12.0,
                    start_energy: 59.0,
                    session: vec![-1; steps],
                    trip_energy: vec![],
                    arrival: vec![],
                    departure: vec![],
                },
            ),
            battery: Battery::new(0, 5.0, 13.5, 6.25, steps),
            heatpump: HeatPump::new(0, HeatPumpParams::default(), thermal, steps),
        }
    }

    fn ctx<'a>(ambient: &'a [f64], share: &'a [f64]) -> PolicyContext<'a> {
        PolicyContext {
            ambient_temperature: ambient,
            renewable_share: share,
        }
    }

    #[test]
    fn greedy_battery_flattens_the_house_to_zero() {
        let cfg = SimConfig::new(24, 1, 42);
        let ambient = vec![278.0; 24];
        let share = vec![0.3; 24];
        let mut h = house(24);
        h.compute_bounds(0, ambient[0], &cfg);

        GreedyHousehold.household(0, &ctx(&ambient, &share), &mut h);
        // Residual is 0.8 baseload minus 0.3 PV; the battery discharges the
        // difference and the net load vanishes.
        assert_relative_eq!(h.battery.consumption[0], -0.5, epsilon = 1e-12);
        assert_relative_eq!(h.load_kw(0), 0.0, epsilon = 1e-12);

        let load = h.integrate_response(0, ambient[0], &cfg).unwrap();
        assert_relative_eq!(load, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn greedy_battery_respects_its_discharge_bound() {
        let cfg = SimConfig::new(24, 1, 42);
        let ambient = vec![278.0; 24];
        let share = vec![0.3; 24];
        let mut h = house(24);
        h.baseload[0] = 9.0;
        h.battery.energy = 0.0;
        h.compute_bounds(0, ambient[0], &cfg);

        GreedyHousehold.household(0, &ctx(&ambient, &share), &mut h);
        // Empty battery cannot discharge, so the assignment clamps to zero
        // and stays valid.
        assert_eq!(h.battery.consumption[0], 0.0);
        assert!(h.integrate_response(0, ambient[0], &cfg).is_ok());
    }

    #[test]
    fn uncontrolled_assignments_are_always_in_bounds() {
        let cfg = SimConfig::new(24, 1, 42);
        let ambient = vec![278.0; 24];
        let share = vec![0.3; 24];
        let mut h = house(24);
        h.compute_bounds(0, ambient[0], &cfg);

        let mut policy = Uncontrolled;
        let c = ctx(&ambient, &share);
        policy.individual_pv(0, &c, &mut h.pv);
        policy.individual_ev(0, &c, &mut h.ev);
        policy.individual_heatpump(0, &c, &mut h.heatpump);
        policy.individual_battery(0, &c, &mut h.battery);

        assert!(h.integrate_response(0, ambient[0], &cfg).is_ok());
        assert_relative_eq!(h.load_kw(0), 0.5, epsilon = 1e-12);
    }
}
