//! Integration tests for full simulation runs on synthesized scenarios.

mod common;

use der_sim::assets::{AssetKind, BOUND_TOLERANCE};
use der_sim::error::SimError;
use der_sim::scenario;
use der_sim::sim::engine::Simulator;
use der_sim::sim::house::House;
use der_sim::sim::policy::{ControlPolicy, PolicyContext};
use der_sim::sim::report::RunReport;
use der_sim::sim::strategies::{GreedyHousehold, Uncontrolled};

/// Builds and runs the small greedy scenario, returning the simulator in
/// its finished state.
fn run_greedy() -> Simulator<GreedyHousehold> {
    let cfg = common::small_scenario();
    let data = scenario::synthesize(&cfg).unwrap();
    let houses = scenario::build_houses(&cfg, &data).unwrap();
    let mut sim = Simulator::new(
        cfg.sim_config(),
        houses,
        data.ambient_temperature,
        data.renewable_share,
        cfg.control_order().unwrap(),
        GreedyHousehold,
    )
    .unwrap();
    sim.run().unwrap();
    sim
}

#[test]
fn greedy_run_covers_the_full_horizon() {
    let sim = run_greedy();
    assert_eq!(sim.total_load().len(), 48);
    assert!(sim.total_load().iter().all(|l| l.is_finite()));
}

#[test]
fn runs_are_deterministic_for_a_seed() {
    let a = run_greedy();
    let b = run_greedy();
    assert_eq!(a.total_load(), b.total_load());
    for (x, y) in a.houses().iter().zip(b.houses()) {
        assert_eq!(x.battery.energy_history, y.battery.energy_history);
        assert_eq!(x.heatpump.tank_history, y.heatpump.tank_history);
    }
}

#[test]
fn feeder_load_is_the_sum_of_house_loads() {
    let sim = run_greedy();
    for t in 0..sim.total_load().len() {
        let sum: f64 = sim.houses().iter().map(|h| h.load_kw(t)).sum();
        assert!(
            (sim.total_load()[t] - sum).abs() < 1e-9,
            "mismatch at step {t}"
        );
    }
}

#[test]
fn state_histories_stay_within_physical_limits() {
    let cfg = common::small_scenario();
    let sim = run_greedy();
    for house in sim.houses() {
        for &e in &house.battery.energy_history {
            assert!((-BOUND_TOLERANCE..=cfg.battery.size_kwh + BOUND_TOLERANCE).contains(&e));
        }
        for &e in &house.ev.energy_history {
            assert!((-BOUND_TOLERANCE..=cfg.ev.size_kwh + BOUND_TOLERANCE).contains(&e));
        }
        for &t in &house.heatpump.tank_history {
            assert!(t >= cfg.heatpump.tank_floor_k - BOUND_TOLERANCE);
            assert!(t <= cfg.heatpump.tank_ceiling_k + BOUND_TOLERANCE);
        }
        for &z in &house.heatpump.zone_history {
            assert!(z >= cfg.heatpump.zone_min_k - BOUND_TOLERANCE);
        }
    }
}

#[test]
fn uncontrolled_run_completes() {
    let mut cfg = common::small_scenario();
    cfg.simulation.policy = "uncontrolled".to_string();
    let data = scenario::synthesize(&cfg).unwrap();
    let houses = scenario::build_houses(&cfg, &data).unwrap();
    let mut sim = Simulator::new(
        cfg.sim_config(),
        houses,
        data.ambient_temperature,
        data.renewable_share,
        cfg.control_order().unwrap(),
        Uncontrolled,
    )
    .unwrap();
    assert!(sim.run().is_ok());
    assert_eq!(sim.total_load().len(), 48);
}

#[test]
fn report_values_are_finite_and_consistent() {
    let sim = run_greedy();
    let report = RunReport::from_total_load(sim.total_load(), sim.config().dt_hours);
    assert_eq!(report.steps, 48);
    assert!(report.peak_load_kw.is_finite());
    assert!(report.min_load_kw <= report.mean_load_kw);
    assert!(report.mean_load_kw <= report.peak_load_kw);
    assert!(report.peak_ramp_kw >= 0.0);
}

/// Follows every minimum except the battery, which it pushes past its
/// charge bound.
struct RogueBattery;

impl ControlPolicy for RogueBattery {
    fn name(&self) -> &'static str {
        "rogue_battery"
    }

    fn household(&mut self, t: usize, _ctx: &PolicyContext<'_>, house: &mut House) {
        house.pv.consumption[t] = house.pv.max;
        house.ev.consumption[t] = house.ev.min;
        house.heatpump.consumption[t] = house.heatpump.min;
        house.battery.consumption[t] = house.battery.max + 1.0;
    }
}

#[test]
fn out_of_bounds_assignment_aborts_with_asset_identity() {
    let cfg = common::small_scenario();
    let data = scenario::synthesize(&cfg).unwrap();
    let houses = scenario::build_houses(&cfg, &data).unwrap();
    let mut sim = Simulator::new(
        cfg.sim_config(),
        houses,
        data.ambient_temperature,
        data.renewable_share,
        cfg.control_order().unwrap(),
        RogueBattery,
    )
    .unwrap();

    let err = sim.run().unwrap_err();
    match err {
        SimError::Invariant {
            house,
            kind,
            timestep,
            ..
        } => {
            assert_eq!(house, 0);
            assert_eq!(kind, AssetKind::Battery);
            assert_eq!(timestep, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_neighborhood_is_rejected() {
    let cfg = common::small_scenario();
    let data = scenario::synthesize(&cfg).unwrap();
    let err = Simulator::new(
        cfg.sim_config(),
        Vec::new(),
        data.ambient_temperature,
        data.renewable_share,
        cfg.control_order().unwrap(),
        GreedyHousehold,
    )
    .unwrap_err();
    assert!(matches!(err, SimError::Config { .. }));
}

#[test]
fn short_signal_series_is_rejected() {
    let cfg = common::small_scenario();
    let data = scenario::synthesize(&cfg).unwrap();
    let houses = scenario::build_houses(&cfg, &data).unwrap();
    let err = Simulator::new(
        cfg.sim_config(),
        houses,
        vec![281.0; 10],
        data.renewable_share,
        cfg.control_order().unwrap(),
        GreedyHousehold,
    )
    .unwrap_err();
    assert!(matches!(err, SimError::Scenario(_)));
}
