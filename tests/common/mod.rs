//! Shared test fixtures for integration tests.

// Not every integration target uses every fixture.
#![allow(dead_code)]

use nalgebra::{DMatrix, DVector};

use der_sim::assets::thermal::{ThermalModelData, ThermalNetwork};
use der_sim::assets::{
    Battery, EvInstallation, EvSessionData, HeatPump, HeatPumpParams, PvInstallation,
};
use der_sim::config::ScenarioConfig;
use der_sim::sim::house::House;

/// Small synthetic scenario: 3 houses, 2 days at hourly resolution, seed 7.
pub fn small_scenario() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.houses = 3;
    cfg.simulation.days = 2;
    cfg.simulation.steps_per_day = 24;
    cfg.simulation.seed = 7;
    cfg.pv.sunrise_idx = 7;
    cfg.pv.sunset_idx = 19;
    cfg.ev.depart_idx = 8;
    cfg.ev.return_idx = 17;
    cfg.ev.jitter_steps = 2;
    assert!(cfg.validate().is_empty(), "fixture config must be valid");
    cfg
}

/// Degenerate thermal network that forgets its state every step: the nodes
/// land on the free temperature plus one kelvin per watt of flat heat
/// input. Free forcing and ambient offset are the same vector, so demand
/// prediction and integration agree exactly.
pub fn flat_network(zone_free_k: f64, steps: usize) -> ThermalNetwork {
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

/// Hand-built house with flat profiles and a vehicle that never comes
/// home, for tests that need exact arithmetic rather than realism.
pub fn probe_house(id: usize, zone_free_k: f64, steps: usize) -> House {
    House {
        id,
        baseload: vec![1.0; steps],
        pv: PvInstallation::new(id, vec![-0.5; steps]),
        ev: EvInstallation::new(
            id,
            EvSessionData {
                charge_cap: 7.4,
                size: 60.0,
                min_charge: 12.0,
                start_energy: 30.0,
                session: vec![-1; steps],
                trip_energy: vec![],
                arrival: vec![],
                departure: vec![],
            },
        ),
        battery: Battery::new(id, 5.0, 13.5, 6.25, steps),
        heatpump: HeatPump::new(
            id,
            HeatPumpParams::default(),
            flat_network(zone_free_k, steps),
            steps,
        ),
    }
}
