//! Electric vehicle charging model with home/away sessions.

use crate::assets::types::BOUND_TOLERANCE;
use crate::error::InvariantViolation;

/// Scenario input describing one house's EV and its session timeline.
#[derive(Debug, Clone)]
pub struct EvSessionData {
    /// Installed charging power (kW).
    pub charge_cap: f64,
    /// Usable battery capacity (kWh).
    pub size: f64,
    /// Minimum charge floor the owner wants to keep (kWh); passed through
    /// to policies, not enforced by the engine.
    pub min_charge: f64,
    /// State of charge at the start of the simulation (kWh).
    pub start_energy: f64,
    /// Per-timestep session id: `-1` when the vehicle is away, `n >= 0`
    /// while it is home in session `n`.
    pub session: Vec<i32>,
    /// Energy consumed driving during the trip that ends session `n` (kWh).
    pub trip_energy: Vec<f64>,
    /// Arrival timestep of each session.
    pub arrival: Vec<usize>,
    /// Departure timestep of each session (first away step).
    pub departure: Vec<usize>,
}

/// An EV charging point plus the vehicle battery behind it.
///
/// While the vehicle is home the feasible charging range is computed each
/// step; while it is away both bounds are zero. Leaving for a trip deducts
/// that session's trip energy from the battery, floored at zero.
///
/// # Power Flow Convention
/// Charging is **positive** (load on the house). The model never discharges.
#[derive(Debug, Clone)]
pub struct EvInstallation {
    /// Identifier of the owning house.
    pub id: usize,

    /// Installed charging power (kW).
    pub charge_cap: f64,

    /// Usable battery capacity (kWh).
    pub size: f64,

    /// Minimum charge floor for policies (kWh).
    pub min_charge: f64,

    /// Current stored energy (kWh), always in `[0, size]`.
    pub energy: f64,

    /// Stored energy at the start of each timestep, for post-hoc analysis.
    pub energy_history: Vec<f64>,

    /// Per-timestep session id (`-1` = away).
    pub session: Vec<i32>,

    /// Per-session trip energy cost (kWh).
    pub trip_energy: Vec<f64>,

    /// Per-session arrival timestep.
    pub arrival: Vec<usize>,

    /// Per-session departure timestep.
    pub departure: Vec<usize>,

    /// Lower charging bound for the current timestep (kW).
    pub min: f64,

    /// Upper charging bound for the current timestep (kW).
    pub max: f64,

    /// Assigned charging power per timestep (kW), written by policies.
    pub consumption: Vec<f64>,
}

impl EvInstallation {
    /// Creates an EV from scenario session data.
    ///
    /// # Panics
    ///
    /// Panics if the session arrays are inconsistent with each other or if
    /// the initial state of charge is outside `[0, size]`.
    pub fn new(id: usize, data: EvSessionData) -> Self {
        assert!(data.charge_cap > 0.0 && data.size > 0.0);
        assert!((0.0..=data.size).contains(&data.start_energy));
        assert_eq!(data.trip_energy.len(), data.departure.len());
        assert_eq!(data.arrival.len(), data.departure.len());
        let sim_length = data.session.len();
        Self {
            id,
            charge_cap: data.charge_cap,
            size: data.size,
            min_charge: data.min_charge,
            energy: data.start_energy,
            energy_history: vec![0.0; sim_length],
            session: data.session,
            trip_energy: data.trip_energy,
            arrival: data.arrival,
            departure: data.departure,
            min: 0.0,
            max: 0.0,
            consumption: vec![0.0; sim_length],
        }
    }

    /// Whether the vehicle is home at the given timestep.
    pub fn is_home(&self, time_step: usize) -> bool {
        self.session[time_step] >= 0
    }

    /// Computes the feasible charging range for this timestep.
    ///
    /// Away: `[0, 0]`. Home: `min` spreads the remaining energy-to-full
    /// evenly over the rest of the session, so charging at `min` just
    /// completes by departure; `max` delivers the remaining energy-to-full
    /// as fast as the installed power allows.
    pub fn compute_bounds(&mut self, time_step: usize, dt_hours: f64) {
        if !self.is_home(time_step) {
            self.min = 0.0;
            self.max = 0.0;
            return;
        }

        let session = self.session[time_step] as usize;
        let to_full = (self.size - self.energy).max(0.0);
        self.max = self.charge_cap.min(to_full / dt_hours);

        let steps_left = self.departure[session].saturating_sub(time_step);
        if steps_left == 0 {
            // Clamped final session: no future to spread over.
            self.min = self.max;
        } else {
            let hours_left = steps_left as f64 * dt_hours;
            self.min = self.charge_cap.min(to_full / hours_left);
        }
    }

    /// Advances the battery one timestep and validates the result.
    ///
    /// Applies the departure deduction first when the vehicle left this
    /// step, records the pre-update energy to history, then integrates the
    /// assigned charging power.
    pub fn integrate_response(
        &mut self,
        time_step: usize,
        dt_hours: f64,
    ) -> Result<(), InvariantViolation> {
        if time_step > 0
            && self.session[time_step] == -1
            && self.session[time_step - 1] != -1
        {
            let ended = self.session[time_step - 1] as usize;
            self.energy = (self.energy - self.trip_energy[ended]).max(0.0);
        }

        self.energy_history[time_step] = self.energy;
        self.energy += self.consumption[time_step] * dt_hours;

        self.validate(time_step)
    }

    /// Checks the charging power against this step's bounds and the stored
    /// energy against the battery capacity.
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
