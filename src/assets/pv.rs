//! Rooftop solar PV installation model.

use crate::assets::types::BOUND_TOLERANCE;
use crate::error::InvariantViolation;

/// A rooftop PV installation with an irradiance-limited generation profile.
///
/// # Power Flow Convention
/// Generation is **negative** (export reduces house load); `generation_max`
/// holds the most-negative feasible consumption per timestep. A policy may
/// curtail anywhere in `[generation_max[t], 0]`.
#[derive(Debug, Clone)]
pub struct PvInstallation {
    /// Identifier of the owning house.
    pub id: usize,

    /// Irradiance-limited generation per timestep (kW, non-positive).
    pub generation_max: Vec<f64>,

    /// Lower bound for the current timestep (kW); always `0.0` for PV,
    /// representing full curtailment.
    pub min: f64,

    /// Upper generation bound for the current timestep (kW, non-positive);
    /// the most-negative feasible value.
    pub max: f64,

    /// Assigned power per timestep (kW), written by policies.
    pub consumption: Vec<f64>,
}

impl PvInstallation {
    /// Creates a PV installation from its per-timestep generation profile.
    ///
    /// # Panics
    ///
    /// Panics if any profile value is positive.
    pub fn new(id: usize, generation_max: Vec<f64>) -> Self {
        assert!(
            generation_max.iter().all(|&g| g <= 0.0),
            "PV generation profile must be non-positive"
        );
        let sim_length = generation_max.len();
        Self {
            id,
            generation_max,
            min: 0.0,
            max: 0.0,
            consumption: vec![0.0; sim_length],
        }
    }

    /// Computes the feasible range for this timestep: full curtailment up to
    /// the irradiance-limited maximum. Writes only `min` and `max`.
    pub fn compute_bounds(&mut self, time_step: usize) {
        self.min = 0.0;
        self.max = self.generation_max[time_step];
    }

    /// Checks that the assigned consumption lies in `[max, 0]`.
    ///
    /// PV is stateless, so the response phase is validation only.
    pub fn validate(&self, time_step: usize) -> Result<(), InvariantViolation> {
        let value = self.consumption[time_step];
        if value > BOUND_TOLERANCE {
            return Err(InvariantViolation::ConsumptionAboveMax { value, max: 0.0 });
        }
        if value < self.max - BOUND_TOLERANCE {
            return Err(InvariantViolation::ConsumptionBelowMin {
                value,
                min: self.max,
            });
        }
        Ok(())
    }
}
