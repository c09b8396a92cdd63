//! Lumped-parameter thermal network of a house.
//!
//! The building envelope is modeled as a small RC network discretized to the
//! simulation timestep. Each step maps the node temperature vector through
//! the exact discrete transition together with precomputed forcing terms for
//! ambient temperature and internal gains.

use nalgebra::{DMatrix, DVector};

/// Index of the heated-zone air node in the temperature vector.
pub const ZONE_NODE: usize = 1;

/// Precomputed discrete-time thermal model for one house.
///
/// All per-timestep vectors must cover the full simulation horizon. The
/// transition matrix and forcing terms are consistent with each other by
/// construction in the scenario builder: the free response used for the
/// heat-demand prediction is the same map applied during integration.
#[derive(Debug, Clone)]
pub struct ThermalModelData {
    /// Node temperatures at the start of the simulation (K).
    pub initial_temperatures: DVector<f64>,
    /// Discrete state transition over one timestep.
    pub transition: DMatrix<f64>,
    /// Response of node temperatures to one timestep of unit heat input.
    pub heat_response: DMatrix<f64>,
    /// Distribution of heating power over the nodes (fractions, sums to 1).
    pub injection: DVector<f64>,
    /// Inverse of the conductance matrix of the network (K/W).
    pub conductance_inv: DMatrix<f64>,
    /// Per-timestep equilibrium offset from the ambient temperature (K).
    pub ambient_offset: Vec<DVector<f64>>,
    /// Per-timestep free response forcing used for demand prediction (K).
    pub free_forcing: Vec<DVector<f64>>,
    /// Per-timestep temperature drift from solar and internal gains (K/s).
    pub gain_drift: Vec<DVector<f64>>,
}

/// A thermal network instance carrying its evolving node temperatures.
#[derive(Debug, Clone)]
pub struct ThermalNetwork {
    /// Current node temperatures (K).
    pub temperatures: DVector<f64>,
    data: ThermalModelData,
}

impl ThermalNetwork {
    /// # Panics
    ///
    /// Panics if the matrix and vector dimensions are inconsistent.
    pub fn new(data: ThermalModelData) -> Self {
        let n = data.initial_temperatures.len();
        assert_eq!(data.transition.shape(), (n, n));
        assert_eq!(data.heat_response.shape(), (n, n));
        assert_eq!(data.conductance_inv.shape(), (n, n));
        assert_eq!(data.injection.len(), n);
        assert_eq!(data.free_forcing.len(), data.ambient_offset.len());
        assert_eq!(data.gain_drift.len(), data.ambient_offset.len());
        Self {
            temperatures: data.initial_temperatures.clone(),
            data,
        }
    }

    /// Current heated-zone air temperature (K).
    pub fn zone_temperature(&self) -> f64 {
        self.temperatures[ZONE_NODE]
    }

    /// Heat energy (J) needed this timestep to land the zone exactly on
    /// `target_k`, zero when the free response already overshoots it.
    ///
    /// The free response is the zone temperature the network would reach
    /// with no heating; the per-unit response scales a flat heat input over
    /// the timestep into a zone temperature rise.
    pub fn heat_demand_j(&self, time_step: usize, target_k: f64, dt_seconds: f64) -> f64 {
        let free = &self.data.transition * &self.temperatures
            + &self.data.free_forcing[time_step];
        let response =
            (&self.data.heat_response * &self.data.injection)[ZONE_NODE];
        ((target_k - free[ZONE_NODE]) / response * dt_seconds).max(0.0)
    }

    /// Advances the node temperatures one timestep under a flat heat input.
    ///
    /// `heat_power_w` is the heating power delivered to the network over the
    /// whole step, split over the nodes by the injection fractions. The
    /// update shifts to equilibrium coordinates, applies the transition, and
    /// adds the gain drift.
    pub fn apply_heat(&mut self, time_step: usize, heat_power_w: f64, dt_seconds: f64) {
        let q = &self.data.injection * heat_power_w;
        let equilibrium =
            &self.data.conductance_inv * q + &self.data.ambient_offset[time_step];
        self.temperatures = &self.data.transition
            * (&self.temperatures - &equilibrium)
            + &self.data.gain_drift[time_step] * dt_seconds
            + equilibrium;
    }
}
