//! Post-hoc summary statistics from a completed run.

use std::fmt;

/// Aggregate indicators derived from the feeder load series.
///
/// Computed post-hoc from the recorded total load to ensure consistency
/// between step data and reported metrics.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Highest feeder load over the run (kW).
    pub peak_load_kw: f64,
    /// Lowest feeder load over the run (kW, negative when exporting).
    pub min_load_kw: f64,
    /// Mean feeder load (kW).
    pub mean_load_kw: f64,
    /// Net energy drawn from the grid over the run (kWh).
    pub energy_kwh: f64,
    /// Largest step-to-step load change (kW).
    pub peak_ramp_kw: f64,
    /// Number of timesteps covered.
    pub steps: usize,
}

impl RunReport {
    /// Computes all indicators from the complete feeder load series.
    pub fn from_total_load(total_load: &[f64], dt_hours: f64) -> Self {
        if total_load.is_empty() {
            return Self {
                peak_load_kw: 0.0,
                min_load_kw: 0.0,
                mean_load_kw: 0.0,
                energy_kwh: 0.0,
                peak_ramp_kw: 0.0,
                steps: 0,
            };
        }

        let mut peak = f64::MIN;
        let mut min = f64::MAX;
        let mut sum = 0.0;
        let mut peak_ramp = 0.0_f64;

        for (t, &load) in total_load.iter().enumerate() {
            peak = peak.max(load);
            min = min.min(load);
            sum += load;
            if t > 0 {
                peak_ramp = peak_ramp.max((load - total_load[t - 1]).abs());
            }
        }

        let n = total_load.len();
        Self {
            peak_load_kw: peak,
            min_load_kw: min,
            mean_load_kw: sum / n as f64,
            energy_kwh: sum * dt_hours,
            peak_ramp_kw: peak_ramp,
            steps: n,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Report ---")?;
        writeln!(f, "Steps simulated:  {}", self.steps)?;
        writeln!(f, "Peak load:        {:.3} kW", self.peak_load_kw)?;
        writeln!(f, "Minimum load:     {:.3} kW", self.min_load_kw)?;
        writeln!(f, "Mean load:        {:.3} kW", self.mean_load_kw)?;
        writeln!(f, "Net grid energy:  {:.2} kWh", self.energy_kwh)?;
        write!(f, "Peak ramp:        {:.3} kW", self.peak_ramp_kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicators_from_a_short_series() {
        // loads: [1.0, -2.0, 4.0], dt = 0.5 h
        let report = RunReport::from_total_load(&[1.0, -2.0, 4.0], 0.5);
        assert_eq!(report.peak_load_kw, 4.0);
        assert_eq!(report.min_load_kw, -2.0);
        assert!((report.mean_load_kw - 1.0).abs() < 1e-12);
        assert!((report.energy_kwh - 1.5).abs() < 1e-12);
        // ramps: |-3.0| then |6.0|
        assert_eq!(report.peak_ramp_kw, 6.0);
        assert_eq!(report.steps, 3);
    }

    #[test]
    fn empty_series() {
        let report = RunReport::from_total_load(&[], 0.25);
        assert_eq!(report.steps, 0);
        assert_eq!(report.energy_kwh, 0.0);
    }
}
