//! Core simulation timing parameters.

/// Centralized simulation configuration.
///
/// All assets and the engine reference this struct for timing parameters,
/// eliminating duplicated `dt_hours` computations.
///
/// # Examples
///
/// ```
/// use der_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(24, 1, 42);
/// assert_eq!(cfg.dt_hours, 1.0);
/// assert_eq!(cfg.total_steps(), 24);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Number of simulation steps per day.
    pub steps_per_day: usize,
    /// Number of days to simulate.
    pub days: usize,
    /// Duration of one timestep in hours, derived as `24.0 / steps_per_day`.
    pub dt_hours: f64,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Panics
    ///
    /// Panics if `steps_per_day` or `days` is zero.
    pub fn new(steps_per_day: usize, days: usize, seed: u64) -> Self {
        assert!(steps_per_day > 0, "steps_per_day must be > 0");
        assert!(days > 0, "days must be > 0");
        Self {
            steps_per_day,
            days,
            dt_hours: 24.0 / steps_per_day as f64,
            seed,
        }
    }

    /// Total number of simulation steps across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days
    }

    /// Duration of one timestep in seconds, for the thermal models.
    pub fn dt_seconds(&self) -> f64 {
        self.dt_hours * 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_hour_resolution() {
        let cfg = SimConfig::new(96, 7, 42);
        assert_eq!(cfg.total_steps(), 672);
        assert_eq!(cfg.dt_hours, 0.25);
        assert_eq!(cfg.dt_seconds(), 900.0);
    }

    #[test]
    #[should_panic(expected = "days must be > 0")]
    fn zero_days_panics() {
        SimConfig::new(96, 0, 42);
    }
}
