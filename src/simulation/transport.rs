//! Explicit finite-volume transport on a triangle mesh.
//!
//! One step computes every triangle's new value from the old state into a
//! scratch buffer, swaps the buffers, and then clamps the boundary lines to
//! zero. Elapsed time is `steps × dt`, so repeated runs never drift.

use std::cell::OnceCell;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::error::{MeshDefect, Result, TransportError};
use crate::flux::{edge_velocity, flux_contribution};
use crate::mesh::geometry::{Point2, dot, sub};
use crate::mesh::{Cell, Mesh, Triangle};
use crate::simulation::diagnostics::{ProgressReporter, TransportDiagnostics};
use crate::types::{Bounds2D, CellIndex};

/// Default centre of the initial oil slick.
pub const DEFAULT_X_START: Point2 = [0.35, 0.45];

/// Default spread of the initial oil slick.
pub const DEFAULT_SIGMA2: f64 = 0.01;

/// Slack when converting `t_end / dt` to a step count, so that an end time
/// which is a multiple of dt up to rounding does not get an extra step.
const STEP_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Run output
// =============================================================================

/// State handed to the output callback.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Steps taken since the state was initialized (the first step is 1)
    pub step: usize,
    pub time: f64,
    /// One value per cell
    pub state: &'a [f64],
}

/// Result of a call to [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps taken by this call.
    pub steps: usize,
    /// Simulation time after the call.
    pub final_time: f64,
    /// Wall-clock time in seconds.
    pub wall_time: f64,
}

// =============================================================================
// Simulation
// =============================================================================

/// Oil transport over a shared, immutable mesh.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use oil_spill::mesh::Mesh;
/// use oil_spill::simulation::Simulation;
/// use oil_spill::velocity::BayCurrent;
///
/// let mesh = Arc::new(Mesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 8, 8, &BayCurrent).unwrap());
/// let mut sim = Simulation::new(mesh, 0.005).unwrap();
/// sim.set_default_initial_state().unwrap();
///
/// let summary = sim.run(0.05).unwrap();
/// assert_eq!(summary.steps, 10);
/// assert!(sim.oil_in_fishing_ground().unwrap() >= 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Simulation {
    mesh: Arc<Mesh>,
    dt: f64,
    u: Vec<f64>,
    u_new: Vec<f64>,
    steps: usize,
    initialized: bool,
    fishing_ground: Bounds2D,
    fishing_cells: OnceCell<Vec<CellIndex>>,
    /// max over triangles of Σ max(0, n · v_edge) / area
    max_outflow_rate: f64,
    report_interval_pct: u32,
}

impl Simulation {
    /// Create a simulation with all values zero.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `dt` is not a positive finite number
    /// - `MalformedMesh(NoTriangles)` if the mesh has no triangles
    pub fn new(mesh: Arc<Mesh>, dt: f64) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(TransportError::InvalidConfiguration(format!(
                "dt must be positive, got {}",
                dt
            )));
        }
        if mesh.n_triangles() == 0 {
            return Err(MeshDefect::NoTriangles.into());
        }

        let max_outflow_rate = max_outflow_rate(&mesh)?;
        let n = mesh.n_cells();

        Ok(Self {
            mesh,
            dt,
            u: vec![0.0; n],
            u_new: vec![0.0; n],
            steps: 0,
            initialized: false,
            fishing_ground: Bounds2D::fishing_ground(),
            fishing_cells: OnceCell::new(),
            max_outflow_rate,
            report_interval_pct: 10,
        })
    }

    /// Use a different fishing ground.
    pub fn with_fishing_ground(mut self, bounds: Bounds2D) -> Self {
        self.fishing_ground = bounds;
        self.fishing_cells = OnceCell::new();
        self
    }

    /// Log progress every `pct` percent of a run (0 disables).
    pub fn with_progress_interval(mut self, pct: u32) -> Self {
        self.report_interval_pct = pct;
        self
    }

    // =========================================================================
    // Initial state
    // =========================================================================

    /// Gaussian slick: u = exp(-|c - x_start|² / sigma2) at each triangle
    /// centroid c, zero on lines. Resets the step count.
    pub fn set_initial_state(&mut self, x_start: Point2, sigma2: f64) -> Result<()> {
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(TransportError::InvalidConfiguration(format!(
                "sigma2 must be positive, got {}",
                sigma2
            )));
        }

        for cell in self.mesh.cells() {
            let i = cell.index();
            self.u[i] = match cell {
                Cell::Triangle(tri) => {
                    let d = sub(tri.centroid()?, x_start);
                    (-dot(d, d) / sigma2).exp()
                }
                Cell::Line(_) => 0.0,
            };
        }

        self.steps = 0;
        self.initialized = true;
        debug!(
            "Initial slick at ({}, {}), sigma2 = {}",
            x_start[0], x_start[1], sigma2
        );
        Ok(())
    }

    /// [`set_initial_state`](Self::set_initial_state) with the default slick.
    pub fn set_default_initial_state(&mut self) -> Result<()> {
        self.set_initial_state(DEFAULT_X_START, DEFAULT_SIGMA2)
    }

    /// Install an arbitrary state, one value per cell. The step count is
    /// kept, so a run can be continued from saved values.
    pub fn set_state(&mut self, values: Vec<f64>) -> Result<()> {
        if values.len() != self.mesh.n_cells() {
            return Err(TransportError::InvalidConfiguration(format!(
                "state has {} values, mesh has {} cells",
                values.len(),
                self.mesh.n_cells()
            )));
        }
        self.u = values;
        self.initialized = true;
        Ok(())
    }

    // =========================================================================
    // Time stepping
    // =========================================================================

    /// Advance one step of size dt.
    ///
    /// Edges without a neighbor carry no flux. A line neighbor acts as a
    /// zero-valued, motionless cell, so oil flowing into it leaves the domain.
    pub fn step(&mut self) -> Result<()> {
        self.ensure_initialized()?;

        let mesh = &*self.mesh;
        for tri in mesh.triangles() {
            let geom = tri.geometry()?;
            let i = tri.index();
            let u_i = self.u[i];

            let mut update = 0.0;
            for (k, neighbor) in tri.edge_to_neighbor().iter().enumerate() {
                let Some(j) = *neighbor else {
                    continue;
                };
                let (u_j, v_j) = match mesh.cell(j) {
                    Cell::Triangle(ngh) => (self.u[j], ngh.velocity()?),
                    Cell::Line(_) => (0.0, [0.0, 0.0]),
                };
                update += flux_contribution(
                    u_i,
                    u_j,
                    geom.area,
                    geom.normals[k],
                    geom.velocity,
                    v_j,
                    self.dt,
                );
            }

            self.u_new[i] = u_i + update;
        }

        std::mem::swap(&mut self.u, &mut self.u_new);

        for line in mesh.lines() {
            self.u[line.index()] = 0.0;
        }

        self.steps += 1;
        Ok(())
    }

    /// Step until the simulation time reaches `t_end`.
    ///
    /// See [`run_with_callback`](Self::run_with_callback).
    pub fn run(&mut self, t_end: f64) -> Result<RunSummary> {
        self.run_with_callback(t_end, None, |_| Ok::<(), TransportError>(()))
    }

    /// Step until the simulation time reaches `t_end`, calling `callback`
    /// every `write_frequency` steps.
    ///
    /// The number of steps is the smallest n with n × dt ≥ t_end, so the
    /// final time overshoots `t_end` by less than one dt. Time is never reset
    /// by a run: calling this again with the same `t_end` takes no steps.
    /// `None` or `Some(0)` disables the callback.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `t_end` is negative or not finite
    /// - `UninitializedState` before an initial state is set
    /// - any error returned by `callback`
    pub fn run_with_callback<F, E>(
        &mut self,
        t_end: f64,
        write_frequency: Option<usize>,
        mut callback: F,
    ) -> std::result::Result<RunSummary, E>
    where
        F: FnMut(&Frame<'_>) -> std::result::Result<(), E>,
        E: From<TransportError>,
    {
        if !t_end.is_finite() || t_end < 0.0 {
            return Err(TransportError::InvalidConfiguration(format!(
                "t_end must be non-negative, got {}",
                t_end
            ))
            .into());
        }
        self.ensure_initialized()?;

        let start_wall = Instant::now();
        let start_steps = self.steps;
        let target = self.target_steps(t_end);
        let write_frequency = write_frequency.filter(|&f| f > 0);

        if target > self.steps {
            info!(
                "Running {} steps: t = {:.4} -> {:.4}, dt = {:.3e}",
                target - self.steps,
                self.time(),
                target as f64 * self.dt,
                self.dt
            );
        }

        let mut reporter = (self.report_interval_pct > 0 && target > self.steps)
            .then(|| ProgressReporter::new(target as f64 * self.dt, self.report_interval_pct));

        while self.steps < target {
            self.step()?;

            if let Some(freq) = write_frequency
                && self.steps % freq == 0
            {
                callback(&Frame {
                    step: self.steps,
                    time: self.time(),
                    state: &self.u,
                })?;
            }

            if let Some(reporter) = reporter.as_mut() {
                reporter.step();
                if reporter.is_due(self.time()) {
                    let diag = TransportDiagnostics::compute(self)?;
                    reporter.maybe_report(self.time(), Some(&diag));
                }
            }
        }

        let summary = RunSummary {
            steps: self.steps - start_steps,
            final_time: self.time(),
            wall_time: start_wall.elapsed().as_secs_f64(),
        };
        if summary.steps > 0 {
            info!(
                "Run complete: {} steps in {:.2}s, t = {:.4}",
                summary.steps, summary.wall_time, summary.final_time
            );
        }
        Ok(summary)
    }

    fn target_steps(&self, t_end: f64) -> usize {
        (t_end / self.dt - STEP_TOLERANCE).ceil().max(0.0) as usize
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(TransportError::UninitializedState)
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Triangles whose centroid lies in the fishing ground (inclusive).
    ///
    /// Computed on first use.
    pub fn find_fishing_ground_cells(&self) -> &[CellIndex] {
        self.fishing_cells.get_or_init(|| {
            let cells: Vec<CellIndex> = self
                .mesh
                .triangles()
                .filter(|t| {
                    t.centroid()
                        .is_ok_and(|c| self.fishing_ground.contains_point(c))
                })
                .map(Triangle::index)
                .collect();
            debug!(
                "Fishing ground {} contains {} cells",
                self.fishing_ground,
                cells.len()
            );
            cells
        })
    }

    /// Oil mass in the fishing ground: Σ u × area over its cells.
    pub fn oil_in_fishing_ground(&self) -> Result<f64> {
        self.ensure_initialized()?;
        self.find_fishing_ground_cells()
            .iter()
            .map(|&c| self.mass_of(c))
            .sum()
    }

    /// Oil mass over all triangles.
    pub fn total_mass(&self) -> Result<f64> {
        self.ensure_initialized()?;
        self.mesh.triangles().map(|t| self.mass_of(t.index())).sum()
    }

    fn mass_of(&self, cell: CellIndex) -> Result<f64> {
        let area = match self.mesh.cell(cell) {
            Cell::Triangle(t) => t.area()?,
            Cell::Line(_) => 0.0,
        };
        Ok(self.u[cell] * area)
    }

    /// Courant number of the current dt.
    pub fn courant_number(&self) -> f64 {
        self.dt * self.max_outflow_rate
    }

    /// Largest dt with a Courant number of at most one.
    ///
    /// Infinite when no oil leaves any cell.
    pub fn max_stable_dt(&self) -> f64 {
        if self.max_outflow_rate > 0.0 {
            1.0 / self.max_outflow_rate
        } else {
            f64::INFINITY
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current value per cell.
    pub fn state(&self) -> &[f64] {
        &self.u
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Elapsed simulation time.
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.dt
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn fishing_ground(&self) -> Bounds2D {
        self.fishing_ground
    }
}

/// Largest rate at which a triangle drains through edges with a neighbor.
fn max_outflow_rate(mesh: &Mesh) -> Result<f64> {
    let mut max_rate: f64 = 0.0;
    for tri in mesh.triangles() {
        let geom = tri.geometry()?;
        let mut outflow = 0.0;
        for (k, neighbor) in tri.edge_to_neighbor().iter().enumerate() {
            let Some(j) = *neighbor else {
                continue;
            };
            let v_j = match mesh.cell(j) {
                Cell::Triangle(ngh) => ngh.velocity()?,
                Cell::Line(_) => [0.0, 0.0],
            };
            let a_n = dot(geom.normals[k], edge_velocity(geom.velocity, v_j));
            outflow += a_n.max(0.0);
        }
        max_rate = max_rate.max(outflow / geom.area);
    }
    Ok(max_rate)
}
