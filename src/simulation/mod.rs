//! Time stepping of the oil concentration.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use oil_spill::mesh::Mesh;
//! use oil_spill::simulation::{Simulation, TransportDiagnostics};
//! use oil_spill::velocity::BayCurrent;
//!
//! let mesh = Mesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4, &BayCurrent).unwrap();
//! let mut sim = Simulation::new(Arc::new(mesh), 0.01).unwrap();
//! sim.set_default_initial_state().unwrap();
//!
//! sim.run_with_callback(0.1, Some(5), |frame| {
//!     println!("step {} t = {:.2}", frame.step, frame.time);
//!     Ok::<(), oil_spill::TransportError>(())
//! })
//! .unwrap();
//!
//! let diag = TransportDiagnostics::compute(&sim).unwrap();
//! println!("{}", diag.summary_line());
//! ```

mod diagnostics;
mod transport;

pub use diagnostics::{ProgressReporter, TransportDiagnostics};
pub use transport::{DEFAULT_SIGMA2, DEFAULT_X_START, Frame, RunSummary, Simulation};
