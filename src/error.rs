//! Fatal error taxonomy for scenario setup and simulation runs.

use thiserror::Error;

use crate::assets::AssetKind;

/// A physical bound or state constraint that an asset violated.
///
/// Carried inside [`SimError::Invariant`] together with the asset identity;
/// values are reported as observed, before any rounding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("consumption {value:.4} kW below lower bound {min:.4} kW")]
    ConsumptionBelowMin { value: f64, min: f64 },
    #[error("consumption {value:.4} kW above upper bound {max:.4} kW")]
    ConsumptionAboveMax { value: f64, max: f64 },
    #[error("stored energy {energy:.4} kWh below zero")]
    EnergyBelowZero { energy: f64 },
    #[error("stored energy {energy:.4} kWh above capacity {capacity:.4} kWh")]
    EnergyAboveCapacity { energy: f64, capacity: f64 },
    #[error("zone temperature {temperature:.2} K below minimum {minimum:.2} K")]
    ZoneTooCold { temperature: f64, minimum: f64 },
    #[error("tank temperature {temperature:.2} K below floor limit {floor:.2} K")]
    TankBelowFloor { temperature: f64, floor: f64 },
    #[error("tank temperature {temperature:.2} K above ceiling limit {ceiling:.2} K")]
    TankAboveCeiling { temperature: f64, ceiling: f64 },
}

/// Top-level error type; every variant is fatal for the run that raised it.
///
/// Configuration and scenario-data errors surface before any stepping; an
/// invariant violation aborts the run at the offending timestep. The
/// simulation never clamps an out-of-range value, since silently correcting
/// it would desynchronize the declared bound contract from actual behavior.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Invalid configuration, detected at initialization.
    #[error("config error: {field}: {message}")]
    Config { field: String, message: String },

    /// Missing or malformed scenario data, detected at initialization.
    #[error("scenario data error: {0}")]
    Scenario(String),

    /// A policy or integration step broke a physical invariant.
    #[error("{kind} in house {house} at step {timestep}: {violation}")]
    Invariant {
        house: usize,
        kind: AssetKind,
        timestep: usize,
        violation: InvariantViolation,
    },
}

impl SimError {
    /// Convenience constructor for configuration errors.
    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_error_names_asset_house_and_step() {
        let err = SimError::Invariant {
            house: 3,
            kind: AssetKind::Battery,
            timestep: 17,
            violation: InvariantViolation::EnergyAboveCapacity {
                energy: 13.6,
                capacity: 13.5,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("battery"));
        assert!(msg.contains("house 3"));
        assert!(msg.contains("step 17"));
        assert!(msg.contains("13.5"));
    }

    #[test]
    fn config_error_includes_field_path() {
        let err = SimError::config("simulation.houses", "must be > 0");
        assert!(err.to_string().contains("simulation.houses"));
    }
}
