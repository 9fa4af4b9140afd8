//! Runtime diagnostics for oil transport.
//!
//! Provides:
//! - Oil mass over the domain and in the fishing ground
//! - Bounds of the triangle values
//! - Courant number of the time step
//! - Progress reporting through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! let diag = TransportDiagnostics::compute(&sim)?;
//! log::info!("{}", diag.summary_line());
//! ```

use std::time::Instant;

use log::info;

use crate::error::Result;
use crate::simulation::Simulation;

/// Diagnostic quantities of the current state.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportDiagnostics {
    /// Simulation time
    pub time: f64,
    /// Steps taken
    pub step: usize,
    /// Σ u × area over all triangles
    pub total_mass: f64,
    /// Σ u × area over the fishing ground
    pub fishing_ground_oil: f64,
    /// Smallest triangle value
    pub min_value: f64,
    /// Largest triangle value
    pub max_value: f64,
    /// dt × largest outflow rate
    pub courant_number: f64,
}

impl TransportDiagnostics {
    /// Compute all diagnostics from the current state.
    ///
    /// # Errors
    ///
    /// `UninitializedState` before an initial state is set.
    pub fn compute(sim: &Simulation) -> Result<Self> {
        let total_mass = sim.total_mass()?;
        let fishing_ground_oil = sim.oil_in_fishing_ground()?;

        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        for tri in sim.mesh().triangles() {
            let u = sim.state()[tri.index().get()];
            min_value = min_value.min(u);
            max_value = max_value.max(u);
        }

        Ok(Self {
            time: sim.time(),
            step: sim.steps(),
            total_mass,
            fishing_ground_oil,
            min_value,
            max_value,
            courant_number: sim.courant_number(),
        })
    }

    /// Check that no value is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.total_mass.is_finite() && self.min_value.is_finite() && self.max_value.is_finite()
    }

    /// One-line summary for logs.
    pub fn summary_line(&self) -> String {
        format!(
            "M={:.4e} fish={:.4e} u=[{:.3e},{:.3e}] CFL={:.3}",
            self.total_mass,
            self.fishing_ground_oil,
            self.min_value,
            self.max_value,
            self.courant_number
        )
    }
}

/// Logs progress of a long run at fixed percentage intervals.
pub struct ProgressReporter {
    /// Start time of the run (wall clock)
    start_instant: Instant,
    /// Simulation time at which the run ends
    total_sim_time: f64,
    /// Last reported progress percentage
    last_reported_pct: u32,
    /// Report interval in percentage points
    report_interval_pct: u32,
    /// Number of timesteps taken
    n_steps: usize,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    /// * `total_sim_time` - Simulation time at which the run ends
    /// * `report_interval_pct` - Report every N percent (e.g., 10 for 10%, 20%, ...)
    pub fn new(total_sim_time: f64, report_interval_pct: u32) -> Self {
        Self {
            start_instant: Instant::now(),
            total_sim_time,
            last_reported_pct: 0,
            report_interval_pct: report_interval_pct.max(1),
            n_steps: 0,
        }
    }

    /// Record a timestep.
    pub fn step(&mut self) {
        self.n_steps += 1;
    }

    fn percent(&self, current_time: f64) -> u32 {
        if self.total_sim_time > 0.0 {
            ((current_time / self.total_sim_time) * 100.0).clamp(0.0, 100.0) as u32
        } else {
            100
        }
    }

    /// True if the next threshold has been reached.
    pub fn is_due(&self, current_time: f64) -> bool {
        let pct = self.percent(current_time);
        pct >= self.last_reported_pct + self.report_interval_pct
            || (pct == 100 && self.last_reported_pct < 100)
    }

    /// Report progress if the threshold is reached.
    ///
    /// Returns true if progress was reported.
    pub fn maybe_report(&mut self, current_time: f64, diag: Option<&TransportDiagnostics>) -> bool {
        if !self.is_due(current_time) {
            return false;
        }
        self.report(current_time, diag);
        let pct = self.percent(current_time);
        self.last_reported_pct = (pct / self.report_interval_pct) * self.report_interval_pct;
        if pct == 100 {
            self.last_reported_pct = 100;
        }
        true
    }

    /// Force a progress report.
    pub fn report(&self, current_time: f64, diag: Option<&TransportDiagnostics>) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let pct = f64::from(self.percent(current_time));

        let eta = if pct > 0.1 {
            format_duration(elapsed * 100.0 / pct - elapsed)
        } else {
            "calculating...".to_string()
        };

        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };

        let summary = diag.map(|d| format!(" | {}", d.summary_line())).unwrap_or_default();
        info!(
            "[{:>5.1}%] t={:.4} | elapsed={} | ETA={} | {:.0} steps/s{}",
            pct,
            current_time,
            format_duration(elapsed),
            eta,
            steps_per_sec,
            summary
        );
    }
}

/// Format a duration in seconds as a human-readable string.
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = secs - mins * 60.0;
        format!("{:.0}m{:.0}s", mins, s)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{:.0}h{:.0}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::velocity::BayCurrent;
    use std::sync::Arc;

    fn bay_simulation() -> Simulation {
        let mesh = Mesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 6, 6, &BayCurrent).unwrap();
        let mut sim = Simulation::new(Arc::new(mesh), 0.01).unwrap();
        sim.set_default_initial_state().unwrap();
        sim
    }

    #[test]
    fn test_compute() {
        let sim = bay_simulation();
        let diag = TransportDiagnostics::compute(&sim).unwrap();

        assert_eq!(diag.step, 0);
        assert!(diag.total_mass > 0.0);
        assert!(diag.fishing_ground_oil <= diag.total_mass);
        assert!(diag.min_value >= 0.0);
        assert!(diag.max_value <= 1.0);
        assert!(diag.is_finite());
        assert_eq!(diag.courant_number, sim.courant_number());
    }

    #[test]
    fn test_summary_line() {
        let diag = TransportDiagnostics::compute(&bay_simulation()).unwrap();
        let summary = diag.summary_line();

        assert!(summary.contains("M="));
        assert!(summary.contains("fish="));
        assert!(summary.contains("CFL="));
    }

    #[test]
    fn test_progress_thresholds() {
        let mut reporter = ProgressReporter::new(10.0, 25);
        assert!(!reporter.is_due(1.0));
        assert!(reporter.maybe_report(2.5, None));
        assert!(!reporter.maybe_report(3.0, None));
        assert!(reporter.maybe_report(5.5, None));
        assert!(reporter.maybe_report(10.0, None));
        assert!(!reporter.is_due(10.0));
    }

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = ProgressReporter::new(3600.0, 10);
        assert_eq!(reporter.n_steps, 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30.0s");
        assert_eq!(format_duration(90.0), "1m30s");
        assert_eq!(format_duration(3700.0), "1h1m");
    }
}
