//! Synthetic scenario generation: profiles, EV sessions, thermal models.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::assets::thermal::ThermalModelData;
use crate::assets::{
    Battery, EvInstallation, EvSessionData, HeatPump, HeatPumpParams, PvInstallation,
    ThermalNetwork,
};
use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::sim::house::House;

/// Everything a run needs that is data rather than behavior: per-house
/// profiles, EV session timelines, thermal models, and the shared external
/// signals.
#[derive(Debug, Clone)]
pub struct ScenarioData {
    /// Per-house baseload profile (kW).
    pub baseloads: Vec<Vec<f64>>,
    /// Per-house PV generation limit (kW, non-positive).
    pub pv_generation: Vec<Vec<f64>>,
    /// Per-house EV session data.
    pub ev: Vec<EvSessionData>,
    /// Per-house discretized thermal model.
    pub thermal: Vec<ThermalModelData>,
    /// Outdoor air temperature (K).
    pub ambient_temperature: Vec<f64>,
    /// Share of renewables in the grid mix, in `[0, 1]`.
    pub renewable_share: Vec<f64>,
}

impl ScenarioData {
    /// Number of houses this data set can populate.
    pub fn houses_available(&self) -> usize {
        self.baseloads.len()
    }

    /// Number of timesteps the shared signals cover.
    pub fn steps_available(&self) -> usize {
        self.ambient_temperature.len()
    }
}

/// Zero-mean gaussian sample via Box-Muller.
fn gaussian(rng: &mut StdRng, std: f64) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().max(1e-12);
    let u2: f64 = rng.random::<f64>();
    std * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Matrix exponential by scaling and squaring with a Taylor series.
///
/// The RC network matrices here are tiny (a handful of nodes) and well
/// scaled after the halving steps, so a fixed-order series is accurate to
/// machine precision.
fn matrix_exponential(m: &DMatrix<f64>) -> DMatrix<f64> {
    let n = m.nrows();
    let norm = m
        .row_iter()
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0, f64::max);
    let squarings = if norm > 0.5 {
        (norm / 0.5).log2().ceil() as u32
    } else {
        0
    };
    let scaled = m / 2f64.powi(squarings as i32);

    let mut result = DMatrix::identity(n, n);
    let mut term = DMatrix::identity(n, n);
    for k in 1..=16 {
        term = &term * &scaled / k as f64;
        result += &term;
    }
    for _ in 0..squarings {
        result = &result * &result;
    }
    result
}

/// Daylight shape in `[0, 1]`: a half sine between sunrise and sunset,
/// zero outside.
fn daylight(idx_in_day: usize, sunrise: usize, sunset: usize) -> f64 {
    if idx_in_day < sunrise || idx_in_day >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f64;
    (PI * (idx_in_day - sunrise) as f64 / span).sin()
}

fn synthesize_baseload(cfg: &ScenarioConfig, rng: &mut StdRng, steps: usize) -> Vec<f64> {
    let b = &cfg.baseload;
    let spd = cfg.simulation.steps_per_day as f64;
    (0..steps)
        .map(|t| {
            let angle =
                2.0 * PI * (t % cfg.simulation.steps_per_day) as f64 / spd + b.phase_rad;
            (b.base_kw + b.amp_kw * angle.sin() + gaussian(rng, b.noise_std)).max(0.05)
        })
        .collect()
}

fn synthesize_pv(cfg: &ScenarioConfig, rng: &mut StdRng, steps: usize) -> Vec<f64> {
    let pv = &cfg.pv;
    let scale = pv.kw_peak * (1.0 + pv.size_jitter * rng.random_range(-1.0..=1.0));
    (0..steps)
        .map(|t| {
            let shape = daylight(
                t % cfg.simulation.steps_per_day,
                pv.sunrise_idx,
                pv.sunset_idx,
            );
            if shape == 0.0 {
                0.0
            } else {
                -(scale * shape + gaussian(rng, pv.noise_std)).max(0.0)
            }
        })
        .collect()
}

/// Builds one house's EV session timeline: home overnight, one trip per
/// day with jittered departure and return, and a final session that stays
/// open to the end of the horizon.
fn synthesize_ev(cfg: &ScenarioConfig, rng: &mut StdRng, steps: usize) -> EvSessionData {
    let ev = &cfg.ev;
    let spd = cfg.simulation.steps_per_day;
    let jitter = ev.jitter_steps as i64;

    let mut session = vec![0i32; steps];
    let mut arrival = vec![0usize];
    let mut departure = Vec::new();
    let mut trip_energy = Vec::new();

    let mut session_id = 0i32;
    let mut last_arrival = 0usize;
    for day in 0..cfg.simulation.days {
        let base = (day * spd) as i64;
        let depart =
            (base + ev.depart_idx as i64 + rng.random_range(-jitter..=jitter)) as usize;
        let ret = (base + ev.return_idx as i64 + rng.random_range(-jitter..=jitter)) as usize;

        departure.push(depart);
        trip_energy.push(rng.random_range(ev.trip_kwh_min..=ev.trip_kwh_max));
        for t in last_arrival..depart {
            session[t] = session_id;
        }
        for t in depart..ret {
            session[t] = -1;
        }
        session_id += 1;
        arrival.push(ret);
        last_arrival = ret;
    }
    // The final home session has no trip after it; its departure is the end
    // of the horizon so the spread-charging bound stays defined.
    departure.push(steps);
    trip_energy.push(0.0);
    for t in last_arrival..steps {
        session[t] = session_id;
    }

    EvSessionData {
        charge_cap: ev.charge_cap_kw,
        size: ev.size_kwh,
        min_charge: ev.min_charge_kwh,
        start_energy: ev.start_energy_kwh,
        session,
        trip_energy,
        arrival,
        departure,
    }
}

/// Discretizes a three-node RC envelope model (envelope, zone air, floor
/// slab) to the simulation timestep.
///
/// The continuous model is `C dT/dt = -K T + g_amb T_amb + q`, with the
/// ambient tie entering through the envelope node. All forcing terms are
/// precomputed so the per-step update is a handful of small mat-vecs, and
/// the free-response forcing used for demand prediction is derived from
/// the same matrices, keeping prediction and integration consistent.
fn synthesize_thermal(
    cfg: &ScenarioConfig,
    rng: &mut StdRng,
    ambient: &[f64],
    steps: usize,
) -> Result<ThermalModelData, SimError> {
    let dt = cfg.sim_config().dt_seconds();
    let spd = cfg.simulation.steps_per_day;
    let zs = cfg.heatpump.zone_setpoint_k;
    let jitter = |rng: &mut StdRng| 1.0 + 0.1 * rng.random_range(-1.0..=1.0);

    // Node order: envelope, zone air, floor slab.
    let c_env = 1.2e7 * jitter(rng);
    let c_air = 8.0e5 * jitter(rng);
    let c_floor = 6.0e6 * jitter(rng);

    let g_amb_env = 180.0 * jitter(rng);
    let g_env_air = 520.0 * jitter(rng);
    let g_air_floor = 320.0 * jitter(rng);

    let conductance = DMatrix::from_row_slice(
        3,
        3,
        &[
            g_amb_env + g_env_air,
            -g_env_air,
            0.0,
            -g_env_air,
            g_env_air + g_air_floor,
            -g_air_floor,
            0.0,
            -g_air_floor,
            g_air_floor,
        ],
    );
    let ambient_coupling = DVector::from_vec(vec![g_amb_env, 0.0, 0.0]);

    let conductance_inv = conductance.clone().try_inverse().ok_or_else(|| {
        SimError::Scenario("thermal conductance matrix is singular".to_string())
    })?;

    let capacitance_inv = DMatrix::from_diagonal(&DVector::from_vec(vec![
        1.0 / c_env,
        1.0 / c_air,
        1.0 / c_floor,
    ]));
    let continuous = -&capacitance_inv * &conductance;
    let transition = matrix_exponential(&(&continuous * dt));
    let heat_response = (DMatrix::identity(3, 3) - &transition) * &conductance_inv;
    let injection = DVector::from_vec(vec![0.0, 0.7, 0.3]);

    let mut ambient_offset = Vec::with_capacity(steps);
    let mut free_forcing = Vec::with_capacity(steps);
    let mut gain_drift = Vec::with_capacity(steps);
    let identity_minus_s = DMatrix::identity(3, 3) - &transition;
    for t in 0..steps {
        let offset = &conductance_inv * (&ambient_coupling * ambient[t]);

        // Solar and internal gains land on the air node.
        let sun = daylight(t % spd, cfg.pv.sunrise_idx, cfg.pv.sunset_idx);
        let gains_w = 150.0 + 400.0 * sun;
        let drift = &capacitance_inv * DVector::from_vec(vec![0.0, gains_w, 0.0]);

        free_forcing.push(&identity_minus_s * &offset + &drift * dt);
        ambient_offset.push(offset);
        gain_drift.push(drift);
    }

    Ok(ThermalModelData {
        initial_temperatures: DVector::from_vec(vec![zs - 2.0, zs, zs - 1.0]),
        transition,
        heat_response,
        injection,
        conductance_inv,
        ambient_offset,
        free_forcing,
        gain_drift,
    })
}

/// Generates a complete synthetic scenario from the configuration.
///
/// Deterministic for a given seed: profiles, sessions, and thermal
/// parameters are all drawn from one seeded generator in a fixed order.
pub fn synthesize(cfg: &ScenarioConfig) -> Result<ScenarioData, SimError> {
    let sim = cfg.sim_config();
    let steps = sim.total_steps();
    let houses = cfg.simulation.houses;
    let mut rng = StdRng::seed_from_u64(sim.seed);

    let spd = cfg.simulation.steps_per_day as f64;
    let ambient_temperature: Vec<f64> = (0..steps)
        .map(|t| {
            let angle = 2.0 * PI * (t % cfg.simulation.steps_per_day) as f64 / spd;
            // Coldest in the early morning, warmest mid-afternoon.
            cfg.ambient.mean_k - cfg.ambient.amp_k * (angle + PI / 3.0).cos()
                + gaussian(&mut rng, cfg.ambient.noise_std)
        })
        .collect();

    let renewable_share: Vec<f64> = (0..steps)
        .map(|t| {
            let angle = 2.0 * PI * (t % cfg.simulation.steps_per_day) as f64 / spd;
            (cfg.renewables.base_share
                + cfg.renewables.amp_share * angle.sin()
                + gaussian(&mut rng, cfg.renewables.noise_std))
            .clamp(0.0, 1.0)
        })
        .collect();

    let mut baseloads = Vec::with_capacity(houses);
    let mut pv_generation = Vec::with_capacity(houses);
    let mut ev = Vec::with_capacity(houses);
    let mut thermal = Vec::with_capacity(houses);
    for _ in 0..houses {
        baseloads.push(synthesize_baseload(cfg, &mut rng, steps));
        pv_generation.push(synthesize_pv(cfg, &mut rng, steps));
        ev.push(synthesize_ev(cfg, &mut rng, steps));
        thermal.push(synthesize_thermal(cfg, &mut rng, &ambient_temperature, steps)?);
    }

    debug!(houses, steps, "scenario synthesized");
    Ok(ScenarioData {
        baseloads,
        pv_generation,
        ev,
        thermal,
        ambient_temperature,
        renewable_share,
    })
}

/// Assembles houses from scenario data, assigning profiles in a seeded
/// random order.
///
/// # Errors
///
/// Returns a [`SimError::Scenario`] when the data set holds fewer houses
/// than the configuration asks for.
pub fn build_houses(cfg: &ScenarioConfig, data: &ScenarioData) -> Result<Vec<House>, SimError> {
    let wanted = cfg.simulation.houses;
    if data.houses_available() < wanted {
        return Err(SimError::Scenario(format!(
            "scenario data holds {} houses, configuration asks for {wanted}",
            data.houses_available()
        )));
    }

    let steps = data.steps_available();
    let mut order: Vec<usize> = (0..data.houses_available()).collect();
    let mut rng = StdRng::seed_from_u64(cfg.simulation.seed.wrapping_add(1));
    order.shuffle(&mut rng);

    let hp_params = HeatPumpParams {
        nominal_power_w: cfg.heatpump.nominal_power_w,
        tank_mass_kg: cfg.heatpump.tank_mass_kg,
        tank_floor_k: cfg.heatpump.tank_floor_k,
        tank_ceiling_k: cfg.heatpump.tank_ceiling_k,
        tank_setpoint_k: cfg.heatpump.tank_setpoint_k,
        zone_setpoint_k: cfg.heatpump.zone_setpoint_k,
        zone_min_k: cfg.heatpump.zone_min_k,
    };

    let mut houses = Vec::with_capacity(wanted);
    for (id, &source) in order.iter().take(wanted).enumerate() {
        houses.push(House {
            id,
            baseload: data.baseloads[source].clone(),
            pv: PvInstallation::new(id, data.pv_generation[source].clone()),
            ev: EvInstallation::new(id, data.ev[source].clone()),
            battery: Battery::new(
                id,
                cfg.battery.power_max_kw,
                cfg.battery.size_kwh,
                cfg.battery.initial_energy_kwh,
                steps,
            ),
            heatpump: HeatPump::new(
                id,
                hp_params,
                ThermalNetwork::new(data.thermal[source].clone()),
                steps,
            ),
        });
    }
    Ok(houses)
}
