//! # oil-spill
//!
//! Finite-volume transport of an oil slick over a 2D unstructured triangle
//! mesh.
//!
//! The crate provides:
//! - Triangle geometry (area, centroid, outward edge normals)
//! - A mesh of triangles and boundary lines with edge adjacency
//! - A Gmsh `.msh` reader (ASCII v2.2 and v4.1)
//! - The first-order upwind flux
//! - An explicit time-stepping simulation with a fishing-ground diagnostic
//! - VTU output for ParaView
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use oil_spill::{BayCurrent, Mesh, Simulation, TransportError};
//!
//! fn main() -> Result<(), TransportError> {
//!     let mesh = Arc::new(Mesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 10, 10, &BayCurrent)?);
//!     let mut sim = Simulation::new(mesh, 0.005)?;
//!     sim.set_default_initial_state()?;
//!     sim.run(0.1)?;
//!     println!("oil in fishing ground: {:.4}", sim.oil_in_fishing_ground()?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod flux;
pub mod io;
pub mod logging;
pub mod mesh;
pub mod simulation;
pub mod types;
pub mod velocity;

// Re-export main types for convenience
pub use config::{Config, ConfigError};
pub use error::{MeshDefect, Result, TransportError};
pub use flux::{edge_velocity, flux_contribution, upwind_flux};
pub use io::{VtkError, write_vtk_frame, write_vtk_series};
pub use mesh::{Cell, CellKind, GmshError, Line, Mesh, Point2, Triangle, Vector2, load_mesh};
pub use simulation::{Frame, RunSummary, Simulation, TransportDiagnostics};
pub use types::{Bounds2D, CellIndex};
pub use velocity::{BayCurrent, UniformVelocity, VelocityField};
