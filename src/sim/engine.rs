//! The three-phase simulation engine.

use tracing::{debug, info};

use crate::error::SimError;
use crate::sim::house::House;
use crate::sim::policy::{ControlPhase, ControlPolicy, PolicyContext};
use crate::sim::types::SimConfig;

/// Drives a neighborhood of houses through the simulation horizon.
///
/// Generic over `P: ControlPolicy` for static dispatch. Each timestep runs
/// three phases in order: every asset publishes its feasible power range,
/// the policy assigns consumptions within those ranges at each configured
/// control scope, and every asset integrates its assignment forward with
/// validation. An invariant violation aborts the run at the offending step.
#[derive(Debug)]
pub struct Simulator<P: ControlPolicy> {
    config: SimConfig,
    houses: Vec<House>,
    ambient_temperature: Vec<f64>,
    renewable_share: Vec<f64>,
    control_order: Vec<ControlPhase>,
    policy: P,
    total_load: Vec<f64>,
}

impl<P: ControlPolicy> Simulator<P> {
    /// Assembles a simulator and checks every input series against the
    /// simulation horizon.
    pub fn new(
        config: SimConfig,
        houses: Vec<House>,
        ambient_temperature: Vec<f64>,
        renewable_share: Vec<f64>,
        control_order: Vec<ControlPhase>,
        policy: P,
    ) -> Result<Self, SimError> {
        let steps = config.total_steps();
        if houses.is_empty() {
            return Err(SimError::config("simulation.houses", "must be > 0"));
        }
        if ambient_temperature.len() < steps {
            return Err(SimError::Scenario(format!(
                "ambient temperature series has {} steps, run needs {steps}",
                ambient_temperature.len()
            )));
        }
        if renewable_share.len() < steps {
            return Err(SimError::Scenario(format!(
                "renewable share series has {} steps, run needs {steps}",
                renewable_share.len()
            )));
        }
        for house in &houses {
            if house.baseload.len() < steps {
                return Err(SimError::Scenario(format!(
                    "house {} baseload has {} steps, run needs {steps}",
                    house.id,
                    house.baseload.len()
                )));
            }
        }
        Ok(Self {
            config,
            houses,
            ambient_temperature,
            renewable_share,
            control_order,
            policy,
            total_load: vec![0.0; steps],
        })
    }

    /// Phase one: refresh every asset's feasible range for this timestep.
    fn limit_phase(&mut self, t: usize) {
        let ambient = self.ambient_temperature[t];
        for house in &mut self.houses {
            house.compute_bounds(t, ambient, &self.config);
        }
    }

    /// Phase two: invoke the policy at each configured scope, in order.
    ///
    /// Scopes later in the order overwrite assignments made by earlier
    /// ones; the last write wins.
    fn control_phase(&mut self, t: usize) {
        let ctx = PolicyContext {
            ambient_temperature: &self.ambient_temperature,
            renewable_share: &self.renewable_share,
        };
        for phase in &self.control_order {
            match phase {
                ControlPhase::Individual => {
                    for house in &mut self.houses {
                        self.policy.individual_pv(t, &ctx, &mut house.pv);
                        self.policy.individual_ev(t, &ctx, &mut house.ev);
                        self.policy.individual_heatpump(t, &ctx, &mut house.heatpump);
                        self.policy.individual_battery(t, &ctx, &mut house.battery);
                    }
                }
                ControlPhase::Household => {
                    for house in &mut self.houses {
                        self.policy.household(t, &ctx, house);
                    }
                }
                ControlPhase::Neighborhood => {
                    self.policy.neighborhood(t, &ctx, &mut self.houses);
                }
            }
        }
    }

    /// Phase three: integrate every assignment and accumulate the feeder
    /// load.
    fn response_phase(&mut self, t: usize) -> Result<(), SimError> {
        let ambient = self.ambient_temperature[t];
        let mut total = 0.0;
        for house in &mut self.houses {
            total += house.integrate_response(t, ambient, &self.config)?;
        }
        self.total_load[t] = total;
        Ok(())
    }

    /// Runs one timestep through all three phases.
    pub fn step(&mut self, t: usize) -> Result<(), SimError> {
        self.limit_phase(t);
        self.control_phase(t);
        self.response_phase(t)
    }

    /// Runs the full horizon.
    pub fn run(&mut self) -> Result<(), SimError> {
        let steps = self.config.total_steps();
        info!(
            houses = self.houses.len(),
            steps,
            policy = self.policy.name(),
            "starting simulation"
        );
        let report_every = (steps / 100).max(1);
        for t in 0..steps {
            self.step(t)?;
            if (t + 1) % report_every == 0 {
                debug!(step = t + 1, total_load_kw = self.total_load[t], "progress");
            }
        }
        info!("simulation finished");
        Ok(())
    }

    /// Aggregate feeder load per timestep (kW), filled as the run advances.
    pub fn total_load(&self) -> &[f64] {
        &self.total_load
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Consumes the simulator, handing the houses back for inspection.
    pub fn into_houses(self) -> Vec<House> {
        self.houses
    }
}
