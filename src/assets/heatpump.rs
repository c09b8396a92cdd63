//! Air-to-water heat pump with a hot-water buffer tank.

use crate::assets::thermal::ThermalNetwork;
use crate::assets::types::BOUND_TOLERANCE;
use crate::error::InvariantViolation;

/// Specific heat capacity of water, J/(kg K).
pub const WATER_HEAT_CAPACITY: f64 = 4182.0;

/// Coefficient of performance of the heat pump as a quadratic in the lift
/// between the tank setpoint and the outdoor air, both in Kelvin.
///
/// Fitted to manufacturer data for a generic air-to-water unit; at zero
/// lift the COP is the fit's intercept, around 8.74.
pub fn cop(tank_setpoint_k: f64, ambient_k: f64) -> f64 {
    let lift = tank_setpoint_k - ambient_k;
    8.736555867367798 - 0.18997851 * lift + 0.00125921 * lift * lift
}

/// Sizing and comfort parameters of a heat pump installation.
#[derive(Debug, Clone, Copy)]
pub struct HeatPumpParams {
    /// Maximum thermal output of the unit (W).
    pub nominal_power_w: f64,
    /// Water mass of the buffer tank (kg).
    pub tank_mass_kg: f64,
    /// Lowest allowed tank temperature (K).
    pub tank_floor_k: f64,
    /// Highest allowed tank temperature (K).
    pub tank_ceiling_k: f64,
    /// Supply temperature the unit condenses against (K).
    pub tank_setpoint_k: f64,
    /// Zone temperature the heating control targets (K).
    pub zone_setpoint_k: f64,
    /// Comfort minimum for the zone temperature (K).
    pub zone_min_k: f64,
}

impl Default for HeatPumpParams {
    fn default() -> Self {
        Self {
            nominal_power_w: 8000.0,
            tank_mass_kg: 120.0,
            tank_floor_k: 298.0,
            tank_ceiling_k: 348.0,
            tank_setpoint_k: 313.0,
            zone_setpoint_k: 293.0,
            zone_min_k: 291.0,
        }
    }
}

/// A heat pump feeding a buffer tank, with space heating drawn from the tank.
///
/// Bounds are electrical (kW input); the bound computation converts tank
/// temperature limits through the current COP. The tank absorbs the
/// difference between what the unit produces and what the house draws, so
/// any in-range electrical input keeps the tank between floor and ceiling.
///
/// # Power Flow Convention
/// Consumption is **positive** (load); the unit never feeds power back.
#[derive(Debug, Clone)]
pub struct HeatPump {
    /// Identifier of the owning house.
    pub id: usize,

    /// Thermal network of the house the tank supplies.
    pub thermal: ThermalNetwork,

    pub params: HeatPumpParams,

    /// Current buffer tank temperature (K).
    pub tank_temperature: f64,

    /// Space-heating demand predicted per timestep (J), cached by the bound
    /// computation and consumed by the response integration.
    pub heat_demand: Vec<f64>,

    /// Tank temperature at the end of each timestep (K).
    pub tank_history: Vec<f64>,

    /// Zone temperature at the end of each timestep (K).
    pub zone_history: Vec<f64>,

    /// Lower electrical bound for the current timestep (kW).
    pub min: f64,

    /// Upper electrical bound for the current timestep (kW).
    pub max: f64,

    /// Assigned electrical power per timestep (kW), written by policies.
    pub consumption: Vec<f64>,
}

impl HeatPump {
    /// Creates a heat pump with its tank initially at the supply setpoint.
    ///
    /// # Panics
    ///
    /// Panics if the tank limits are inverted or a rating is non-positive.
    pub fn new(
        id: usize,
        params: HeatPumpParams,
        thermal: ThermalNetwork,
        sim_length: usize,
    ) -> Self {
        assert!(params.nominal_power_w > 0.0 && params.tank_mass_kg > 0.0);
        assert!(params.tank_floor_k < params.tank_ceiling_k);
        assert!(
            (params.tank_floor_k..=params.tank_ceiling_k)
                .contains(&params.tank_setpoint_k)
        );
        Self {
            id,
            thermal,
            params,
            tank_temperature: params.tank_setpoint_k,
            heat_demand: vec![0.0; sim_length],
            tank_history: vec![0.0; sim_length],
            zone_history: vec![0.0; sim_length],
            min: 0.0,
            max: 0.0,
            consumption: vec![0.0; sim_length],
        }
    }

    /// Thermal capacity of the buffer tank (J/K).
    fn tank_capacity(&self) -> f64 {
        self.params.tank_mass_kg * WATER_HEAT_CAPACITY
    }

    /// Computes the feasible electrical range for this timestep.
    ///
    /// Predicts the space-heating demand, projects the tank temperature
    /// after serving it with the unit off, then sets the minimum to whatever
    /// input keeps the tank above its floor and the maximum to whatever
    /// fills it to the ceiling, both capped at nominal power and converted
    /// to electrical kW through the COP. The predicted demand is cached for
    /// the response phase.
    pub fn compute_bounds(&mut self, time_step: usize, ambient_k: f64, dt_seconds: f64) {
        let demand_j =
            self.thermal
                .heat_demand_j(time_step, self.params.zone_setpoint_k, dt_seconds);
        self.heat_demand[time_step] = demand_j;

        let tank_unheated = self.tank_temperature - demand_j / self.tank_capacity();
        let to_floor_w =
            self.tank_capacity() * (self.params.tank_floor_k - tank_unheated) / dt_seconds;
        let to_ceiling_w =
            self.tank_capacity() * (self.params.tank_ceiling_k - tank_unheated) / dt_seconds;

        let max_heat_w = to_ceiling_w.clamp(0.0, self.params.nominal_power_w);
        let min_heat_w = to_floor_w.clamp(0.0, max_heat_w);

        let cop = cop(self.params.tank_setpoint_k, ambient_k);
        self.min = min_heat_w / cop / 1000.0;
        self.max = max_heat_w / cop / 1000.0;
    }

    /// Advances tank and zone one timestep under the assigned electrical
    /// input, then validates the result.
    ///
    /// The unit's thermal output goes into the tank; the cached demand is
    /// drawn out to heat the house. When serving the demand would pull the
    /// tank below its floor the delivery is zeroed for the step, all
    /// produced heat warms the tank, and the zone undershoots instead,
    /// which the comfort check then reports if it goes too far.
    pub fn integrate_response(
        &mut self,
        time_step: usize,
        ambient_k: f64,
        dt_seconds: f64,
    ) -> Result<(), InvariantViolation> {
        let cop = cop(self.params.tank_setpoint_k, ambient_k);
        let produced_j = self.consumption[time_step] * 1000.0 * dt_seconds * cop;
        let demand_j = self.heat_demand[time_step];

        let tank_served =
            self.tank_temperature + (produced_j - demand_j) / self.tank_capacity();
        let delivered_j = if tank_served < self.params.tank_floor_k - BOUND_TOLERANCE {
            0.0
        } else {
            demand_j
        };

        self.tank_temperature += (produced_j - delivered_j) / self.tank_capacity();
        self.thermal
            .apply_heat(time_step, delivered_j / dt_seconds, dt_seconds);

        self.tank_history[time_step] = self.tank_temperature;
        self.zone_history[time_step] = self.thermal.zone_temperature();

        self.validate(time_step)
    }

    /// Checks the electrical input against this step's bounds and the tank
    /// and zone temperatures against their limits.
    pub fn validate(&self, time_step: usize) -> Result<(), InvariantViolation> {
        let value = self.consumption[time_step];
        if value < self.min - BOUND_TOLERANCE {
            return Err(InvariantViolation::ConsumptionBelowMin {
                value,
                min: self.min,
            });
        }
        if value > self.max + BOUND_TOLERANCE {
            return Err(InvariantViolation::ConsumptionAboveMax {
                value,
                max: self.max,
            });
        }
        if self.tank_temperature < self.params.tank_floor_k - BOUND_TOLERANCE {
            return Err(InvariantViolation::TankBelowFloor {
                temperature: self.tank_temperature,
                floor: self.params.tank_floor_k,
            });
        }
        if self.tank_temperature > self.params.tank_ceiling_k + BOUND_TOLERANCE {
            return Err(InvariantViolation::TankAboveCeiling {
                temperature: self.tank_temperature,
                ceiling: self.params.tank_ceiling_k,
            });
        }
        let zone = self.thermal.zone_temperature();
        if zone < self.params.zone_min_k - BOUND_TOLERANCE {
            return Err(InvariantViolation::ZoneTooCold {
                temperature: zone,
                minimum: self.params.zone_min_k,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    use crate::assets::thermal::ThermalModelData;

    use super::*;

    const DT: f64 = 900.0;

    /// Fast network: the transition is zero, so every step lands on the
    /// free temperature plus one kelvin per watt of flat heat input. The
    /// free forcing equals the ambient offset, keeping the demand
    /// prediction and the integration consistent with each other.
    fn network(zone_free_k: f64, steps: usize) -> ThermalNetwork {
        let free = DVector::from_vec(vec![293.0, zone_free_k, 293.0]);
        ThermalNetwork::new(ThermalModelData {
            initial_temperatures: DVector::from_element(3, 293.0),
            transition: DMatrix::zeros(3, 3),
            heat_response: DMatrix::identity(3, 3),
            injection: DVector::from_vec(vec![0.0, 1.0, 0.0]),
            conductance_inv: DMatrix::identity(3, 3),
            ambient_offset: vec![free.clone(); steps],
            free_forcing: vec![free; steps],
            gain_drift: vec![DVector::zeros(3); steps],
        })
    }

    fn pump(zone_free_k: f64) -> HeatPump {
        HeatPump::new(0, HeatPumpParams::default(), network(zone_free_k, 8), 8)
    }

    #[test]
    fn cop_drops_with_temperature_lift() {
        assert_relative_eq!(cop(313.0, 313.0), 8.736555867367798, epsilon = 1e-12);
        assert!(cop(313.0, 278.0) < cop(313.0, 288.0));
        assert!(cop(313.0, 258.0) > 0.0);
    }

    #[test]
    fn warm_tank_and_satisfied_zone_allow_idling() {
        let mut hp = pump(293.0);
        hp.compute_bounds(0, 278.0, DT);
        assert_eq!(hp.min, 0.0);
        assert!(hp.max > 0.0);
        assert_eq!(hp.heat_demand[0], 0.0);
    }

    #[test]
    fn max_is_nominal_power_over_cop() {
        let mut hp = pump(293.0);
        hp.compute_bounds(0, 278.0, DT);
        // Tank headroom (35 K worth) exceeds what nominal power can add in
        // one step, so the cap binds.
        let expected = 8000.0 / cop(313.0, 278.0) / 1000.0;
        assert_relative_eq!(hp.max, expected, epsilon = 1e-9);
    }

    #[test]
    fn min_covers_demand_once_tank_is_at_floor() {
        let mut hp = pump(291.0);
        hp.tank_temperature = 298.0;
        hp.compute_bounds(0, 278.0, DT);
        // 2 K zone deficit at unit response over 900 s is 1800 J; with no
        // tank buffer left the unit must produce all of it.
        let expected = (1800.0 / DT) / cop(313.0, 278.0) / 1000.0;
        assert_relative_eq!(hp.min, expected, epsilon = 1e-9);
    }

    #[test]
    fn tank_buffer_covers_demand_when_warm() {
        let mut hp = pump(291.0);
        hp.compute_bounds(0, 278.0, DT);
        // The 15 K of tank buffer dwarfs the 1800 J demand.
        assert_eq!(hp.min, 0.0);
    }

    #[test]
    fn response_moves_demand_from_tank_to_zone() {
        let mut hp = pump(291.0);
        hp.compute_bounds(0, 278.0, DT);
        hp.consumption[0] = 0.0;
        hp.integrate_response(0, 278.0, DT).unwrap();
        // Zone lands exactly on its setpoint, paid for by the tank.
        assert_relative_eq!(hp.thermal.zone_temperature(), 293.0, epsilon = 1e-9);
        assert_relative_eq!(
            hp.tank_temperature,
            313.0 - 1800.0 / (120.0 * WATER_HEAT_CAPACITY),
            epsilon = 1e-9
        );
        assert_eq!(hp.tank_history[0], hp.tank_temperature);
    }

    #[test]
    fn production_beyond_demand_warms_the_tank() {
        let mut hp = pump(293.0);
        hp.compute_bounds(0, 278.0, DT);
        hp.consumption[0] = hp.max;
        hp.integrate_response(0, 278.0, DT).unwrap();
        // Nominal output for one step with no demand goes entirely to the tank.
        let rise = 8000.0 * DT / (120.0 * WATER_HEAT_CAPACITY);
        assert_relative_eq!(hp.tank_temperature, 313.0 + rise, epsilon = 1e-6);
    }

    #[test]
    fn delivery_is_zeroed_when_serving_would_breach_the_tank_floor() {
        // An absurd free-temperature deficit forces demand far past what
        // nominal power plus the tank buffer can deliver together.
        let mut hp = pump(293.0 - 10_000.0);
        hp.tank_temperature = 298.0;
        hp.compute_bounds(0, 278.0, DT);
        hp.consumption[0] = hp.min;
        let result = hp.integrate_response(0, 278.0, DT);
        // Nothing is delivered, so the whole production warms the tank
        // instead of a partial draw pinning it to the floor.
        let rise = 8000.0 * DT / (120.0 * WATER_HEAT_CAPACITY);
        assert_relative_eq!(hp.tank_temperature, 298.0 + rise, epsilon = 1e-6);
        // The zone gets no heat at all, so the comfort check fires.
        assert!(matches!(
            result,
            Err(InvariantViolation::ZoneTooCold { .. })
        ));
    }

    #[test]
    fn overheating_the_tank_is_rejected() {
        let mut hp = pump(293.0);
        hp.tank_temperature = 347.9;
        hp.compute_bounds(0, 278.0, DT);
        hp.consumption[0] = hp.max + 1.0;
        assert!(matches!(
            hp.validate(0),
            Err(InvariantViolation::ConsumptionAboveMax { .. })
        ));
    }

    #[test]
    fn bounds_collapse_when_tank_is_already_at_ceiling() {
        let mut hp = pump(293.0);
        hp.tank_temperature = 348.0;
        hp.compute_bounds(0, 278.0, DT);
        assert_eq!(hp.min, 0.0);
        assert_eq!(hp.max, 0.0);
    }

    #[test]
    #[should_panic]
    fn inverted_tank_limits_panic() {
        let params = HeatPumpParams {
            tank_floor_k: 350.0,
            ..HeatPumpParams::default()
        };
        HeatPump::new(0, params, network(293.0, 8), 8);
    }
}
