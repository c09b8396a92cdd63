//! Stationary home battery model.

use crate::assets::types::BOUND_TOLERANCE;
use crate::error::InvariantViolation;

/// A stationary battery behind the house meter.
///
/// # Power Flow Convention
/// Charging is **positive** (load), discharging is **negative** (supply).
/// Bounds guarantee that integrating any in-range power for one timestep
/// keeps the stored energy within `[0, size]`.
#[derive(Debug, Clone)]
pub struct Battery {
    /// Identifier of the owning house.
    pub id: usize,

    /// Inverter power limit in either direction (kW).
    pub power_max: f64,

    /// Usable capacity (kWh).
    pub size: f64,

    /// Current stored energy (kWh), always in `[0, size]`.
    pub energy: f64,

    /// Stored energy at the start of each timestep.
    pub energy_history: Vec<f64>,

    /// Lower power bound for the current timestep (kW, non-positive).
    pub min: f64,

    /// Upper power bound for the current timestep (kW, non-negative).
    pub max: f64,

    /// Assigned power per timestep (kW), written by policies.
    pub consumption: Vec<f64>,
}

impl Battery {
    /// Creates a battery with the given ratings and initial state of charge.
    ///
    /// # Panics
    ///
    /// Panics if a rating is non-positive or the initial energy is outside
    /// `[0, size]`.
    pub fn new(
        id: usize,
        power_max: f64,
        size: f64,
        initial_energy: f64,
        sim_length: usize,
    ) -> Self {
        assert!(power_max > 0.0 && size > 0.0);
        assert!((0.0..=size).contains(&initial_energy));
        Self {
            id,
            power_max,
            size,
            energy: initial_energy,
            energy_history: vec![0.0; sim_length],
            min: 0.0,
            max: 0.0,
            consumption: vec![0.0; sim_length],
        }
    }

    /// Computes the feasible power range for this timestep.
    ///
    /// Discharge is limited by the stored energy, charge by the remaining
    /// headroom, both clipped to the inverter rating.
    pub fn compute_bounds(&mut self, dt_hours: f64) {
        self.min = (-self.energy / dt_hours).max(-self.power_max);
        self.max = ((self.size - self.energy) / dt_hours).min(self.power_max);
    }

    /// Advances the state of charge one timestep and validates the result.
    pub fn integrate_response(
        &mut self,
        time_step: usize,
        dt_hours: f64,
    ) -> Result<(), InvariantViolation> {
        self.energy_history[time_step] = self.energy;
        self.energy += self.consumption[time_step] * dt_hours;
        self.validate(time_step)
    }

    /// Checks the assigned power against this step's bounds and the stored
    /// energy against `[0, size]`.
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
        if self.energy < -BOUND_TOLERANCE {
            return Err(InvariantViolation::EnergyBelowZero {
                energy: self.energy,
            });
        }
        if self.energy > self.size + BOUND_TOLERANCE {
            return Err(InvariantViolation::EnergyAboveCapacity {
                energy: self.energy,
                capacity: self.size,
            });
        }
        Ok(())
    }
}
