//! Output of simulation results.
//!
//! Frames are written as VTU (XML UnstructuredGrid) files that ParaView
//! opens directly. A numbered series `oil_0000.vtu`, `oil_0005.vtu`, ...
//! can be loaded as one time-dependent dataset.

pub mod vtk;

pub use vtk::{VtkError, write_vtk_frame, write_vtk_series, write_vtu};
