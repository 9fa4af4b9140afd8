//! Numerical fluxes.
//!
//! The transport uses the first-order upwind flux with edge-length-scaled
//! normals, so a single dot product gives the flux integrated over an edge.

mod upwind;

pub use upwind::{edge_velocity, flux_contribution, upwind_flux};
