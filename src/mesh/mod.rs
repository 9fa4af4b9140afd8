//! Mesh representation.
//!
//! Provides the finite-volume mesh:
//! - Pure triangle geometry (area, centroid, scaled outward normals)
//! - Line and triangle cells with neighbor links
//! - Mesh assembly from element blocks with shared-edge adjacency
//! - Gmsh mesh file input

pub mod cell;
pub mod geometry;
pub mod gmsh;
mod topology;

pub use cell::{Cell, CellKind, CellTopology, Line, Triangle, TriangleGeometry};
pub use geometry::{Point2, Vector2};
pub use gmsh::{GmshError, MeshData, load_mesh, read_gmsh};
pub use topology::{ElementBlock, ElementKind, Mesh};
