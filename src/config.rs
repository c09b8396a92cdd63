//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SimError;
use crate::sim::policy::ControlPhase;
use crate::sim::types::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Household baseload profile parameters.
    #[serde(default)]
    pub baseload: BaseloadConfig,
    /// Rooftop PV parameters.
    #[serde(default)]
    pub pv: PvConfig,
    /// EV and charging point parameters.
    #[serde(default)]
    pub ev: EvConfig,
    /// Home battery parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Heat pump and buffer tank parameters.
    #[serde(default)]
    pub heatpump: HeatpumpConfig,
    /// Outdoor temperature profile parameters.
    #[serde(default)]
    pub ambient: AmbientConfig,
    /// Grid renewable-share signal parameters.
    #[serde(default)]
    pub renewables: RenewablesConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of timesteps per simulated day (must be > 0).
    pub steps_per_day: usize,
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Number of houses in the neighborhood (must be > 0).
    pub houses: usize,
    /// Master random seed.
    pub seed: u64,
    /// Control phases to run each timestep, in order. Later phases
    /// overwrite assignments made by earlier ones.
    pub control_order: Vec<String>,
    /// Policy name: `"greedy_household"` or `"uncontrolled"`.
    pub policy: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 96,
            days: 7,
            houses: 20,
            seed: 42,
            control_order: vec!["individual".to_string(), "household".to_string()],
            policy: "greedy_household".to_string(),
        }
    }
}

/// Household baseload profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseloadConfig {
    /// Baseline consumption (kW).
    pub base_kw: f64,
    /// Sinusoidal amplitude (kW).
    pub amp_kw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f64,
}

impl Default for BaseloadConfig {
    fn default() -> Self {
        Self {
            base_kw: 0.35,
            amp_kw: 0.25,
            phase_rad: 1.2,
            noise_std: 0.05,
        }
    }
}

/// Rooftop PV parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvConfig {
    /// Peak generation per house (kW).
    pub kw_peak: f64,
    /// Sunrise timestep index within the day (inclusive).
    pub sunrise_idx: usize,
    /// Sunset timestep index within the day (exclusive).
    pub sunset_idx: usize,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f64,
    /// Per-house fractional spread on the installed peak (0.0-1.0).
    pub size_jitter: f64,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            kw_peak: 4.0,
            sunrise_idx: 28,
            sunset_idx: 76,
            noise_std: 0.05,
            size_jitter: 0.2,
        }
    }
}

/// EV and charging point parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvConfig {
    /// Charging point power (kW).
    pub charge_cap_kw: f64,
    /// Vehicle battery capacity (kWh).
    pub size_kwh: f64,
    /// Charge floor the owner wants to keep (kWh).
    pub min_charge_kwh: f64,
    /// State of charge at the start of the run (kWh).
    pub start_energy_kwh: f64,
    /// Minimum trip consumption (kWh).
    pub trip_kwh_min: f64,
    /// Maximum trip consumption (kWh).
    pub trip_kwh_max: f64,
    /// Typical departure timestep within the day.
    pub depart_idx: usize,
    /// Typical return timestep within the day.
    pub return_idx: usize,
    /// Uniform jitter on departure and return (timesteps).
    pub jitter_steps: usize,
}

impl Default for EvConfig {
    fn default() -> Self {
        Self {
            charge_cap_kw: 7.4,
            size_kwh: 60.0,
            min_charge_kwh: 12.0,
            start_energy_kwh: 30.0,
            trip_kwh_min: 2.0,
            trip_kwh_max: 10.0,
            depart_idx: 32,
            return_idx: 68,
            jitter_steps: 8,
        }
    }
}

/// Home battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Inverter power limit (kW).
    pub power_max_kw: f64,
    /// Usable capacity (kWh).
    pub size_kwh: f64,
    /// Stored energy at the start of the run (kWh).
    pub initial_energy_kwh: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            power_max_kw: 5.0,
            size_kwh: 13.5,
            initial_energy_kwh: 6.25,
        }
    }
}

/// Heat pump and buffer tank parameters. Temperatures are in Kelvin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatpumpConfig {
    /// Maximum thermal output (W).
    pub nominal_power_w: f64,
    /// Buffer tank water mass (kg).
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

impl Default for HeatpumpConfig {
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

/// Outdoor temperature profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmbientConfig {
    /// Daily mean outdoor temperature (K).
    pub mean_k: f64,
    /// Diurnal swing amplitude (K).
    pub amp_k: f64,
    /// Gaussian noise standard deviation (K).
    pub noise_std: f64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            mean_k: 281.0,
            amp_k: 4.0,
            noise_std: 0.5,
        }
    }
}

/// Grid renewable-share signal parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenewablesConfig {
    /// Mean share of renewables in the grid mix (0.0-1.0).
    pub base_share: f64,
    /// Diurnal swing amplitude of the share.
    pub amp_share: f64,
    /// Gaussian noise standard deviation.
    pub noise_std: f64,
}

impl Default for RenewablesConfig {
    fn default() -> Self {
        Self {
            base_share: 0.35,
            amp_share: 0.25,
            noise_std: 0.03,
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: a winter week for a 20-house feeder.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            baseload: BaseloadConfig::default(),
            pv: PvConfig::default(),
            ev: EvConfig::default(),
            battery: BatteryConfig::default(),
            heatpump: HeatpumpConfig::default(),
            ambient: AmbientConfig::default(),
            renewables: RenewablesConfig::default(),
        }
    }

    /// Returns the cold-snap preset: hard frost, short days, heavy heating.
    pub fn cold_snap() -> Self {
        Self {
            ambient: AmbientConfig {
                mean_k: 268.0,
                amp_k: 3.0,
                noise_std: 0.8,
            },
            pv: PvConfig {
                kw_peak: 2.5,
                sunrise_idx: 34,
                sunset_idx: 64,
                ..PvConfig::default()
            },
            baseload: BaseloadConfig {
                base_kw: 0.45,
                amp_kw: 0.3,
                ..BaseloadConfig::default()
            },
            renewables: RenewablesConfig {
                base_share: 0.2,
                amp_share: 0.1,
                ..RenewablesConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the sunny-week preset: mild shoulder season with large PV.
    pub fn sunny_week() -> Self {
        Self {
            ambient: AmbientConfig {
                mean_k: 288.0,
                amp_k: 6.0,
                ..AmbientConfig::default()
            },
            pv: PvConfig {
                kw_peak: 6.0,
                sunrise_idx: 24,
                sunset_idx: 80,
                ..PvConfig::default()
            },
            renewables: RenewablesConfig {
                base_share: 0.5,
                amp_share: 0.3,
                ..RenewablesConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "cold_snap", "sunny_week"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError::Config`] if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, SimError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "cold_snap" => Ok(Self::cold_snap()),
            "sunny_week" => Ok(Self::sunny_week()),
            _ => Err(SimError::config(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError::Config`] if the file cannot be read or the
    /// TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, SimError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::config("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError::Config`] if the TOML is invalid or contains
    /// unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        toml::from_str(s).map_err(|e| SimError::config("toml", e.to_string()))
    }

    /// Timing parameters for the engine.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(
            self.simulation.steps_per_day,
            self.simulation.days,
            self.simulation.seed,
        )
    }

    /// Parses the configured control phase order.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError::Config`] on an unknown phase name.
    pub fn control_order(&self) -> Result<Vec<ControlPhase>, SimError> {
        self.simulation
            .control_order
            .iter()
            .map(|s| s.parse())
            .collect()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<SimError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.steps_per_day == 0 {
            errors.push(SimError::config("simulation.steps_per_day", "must be > 0"));
        }
        if s.days == 0 {
            errors.push(SimError::config("simulation.days", "must be > 0"));
        }
        if s.houses == 0 {
            errors.push(SimError::config("simulation.houses", "must be > 0"));
        }
        if s.control_order.is_empty() {
            errors.push(SimError::config(
                "simulation.control_order",
                "must name at least one phase",
            ));
        }
        if let Err(e) = self.control_order() {
            errors.push(e);
        }
        if s.policy != "greedy_household" && s.policy != "uncontrolled" {
            errors.push(SimError::config(
                "simulation.policy",
                format!(
                    "must be \"greedy_household\" or \"uncontrolled\", got \"{}\"",
                    s.policy
                ),
            ));
        }

        let pv = &self.pv;
        if pv.sunrise_idx >= pv.sunset_idx {
            errors.push(SimError::config("pv.sunrise_idx", "must be < pv.sunset_idx"));
        }
        if s.steps_per_day > 0 && pv.sunset_idx > s.steps_per_day {
            errors.push(SimError::config(
                "pv.sunset_idx",
                "must be <= simulation.steps_per_day",
            ));
        }
        if !(0.0..1.0).contains(&pv.size_jitter) {
            errors.push(SimError::config("pv.size_jitter", "must be in [0.0, 1.0)"));
        }

        let ev = &self.ev;
        if ev.charge_cap_kw <= 0.0 {
            errors.push(SimError::config("ev.charge_cap_kw", "must be > 0"));
        }
        if ev.size_kwh <= 0.0 {
            errors.push(SimError::config("ev.size_kwh", "must be > 0"));
        }
        if !(0.0..=ev.size_kwh).contains(&ev.start_energy_kwh) {
            errors.push(SimError::config(
                "ev.start_energy_kwh",
                "must be in [0, ev.size_kwh]",
            ));
        }
        if ev.trip_kwh_min > ev.trip_kwh_max {
            errors.push(SimError::config(
                "ev.trip_kwh_min",
                "must be <= ev.trip_kwh_max",
            ));
        }
        if ev.depart_idx >= ev.return_idx {
            errors.push(SimError::config("ev.depart_idx", "must be < ev.return_idx"));
        }
        if s.steps_per_day > 0 && ev.return_idx + ev.jitter_steps >= s.steps_per_day {
            errors.push(SimError::config(
                "ev.return_idx",
                "return plus jitter must leave a home stretch before midnight",
            ));
        }
        if ev.jitter_steps * 2 >= ev.return_idx.saturating_sub(ev.depart_idx)
            || ev.jitter_steps * 2 >= ev.depart_idx
        {
            errors.push(SimError::config(
                "ev.jitter_steps",
                "too large for the departure/return window",
            ));
        }

        let bat = &self.battery;
        if bat.power_max_kw <= 0.0 {
            errors.push(SimError::config("battery.power_max_kw", "must be > 0"));
        }
        if bat.size_kwh <= 0.0 {
            errors.push(SimError::config("battery.size_kwh", "must be > 0"));
        }
        if !(0.0..=bat.size_kwh).contains(&bat.initial_energy_kwh) {
            errors.push(SimError::config(
                "battery.initial_energy_kwh",
                "must be in [0, battery.size_kwh]",
            ));
        }

        let hp = &self.heatpump;
        if hp.nominal_power_w <= 0.0 {
            errors.push(SimError::config("heatpump.nominal_power_w", "must be > 0"));
        }
        if hp.tank_mass_kg <= 0.0 {
            errors.push(SimError::config("heatpump.tank_mass_kg", "must be > 0"));
        }
        if hp.tank_floor_k >= hp.tank_ceiling_k {
            errors.push(SimError::config(
                "heatpump.tank_floor_k",
                "must be < heatpump.tank_ceiling_k",
            ));
        }
        if !(hp.tank_floor_k..=hp.tank_ceiling_k).contains(&hp.tank_setpoint_k) {
            errors.push(SimError::config(
                "heatpump.tank_setpoint_k",
                "must be between tank floor and ceiling",
            ));
        }
        if hp.zone_min_k > hp.zone_setpoint_k {
            errors.push(SimError::config(
                "heatpump.zone_min_k",
                "must be <= heatpump.zone_setpoint_k",
            ));
        }

        if self.ambient.mean_k <= 0.0 {
            errors.push(SimError::config("ambient.mean_k", "must be > 0 (Kelvin)"));
        }

        let re = &self.renewables;
        if !(0.0..=1.0).contains(&re.base_share) {
            errors.push(SimError::config(
                "renewables.base_share",
                "must be in [0.0, 1.0]",
            ));
        }

        errors
    }
}
