//! Error types for mesh construction and transport.

use crate::mesh::CellKind;
use crate::types::CellIndex;
use thiserror::Error;

/// Errors raised by the transport engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The mesh data cannot form a valid finite-volume mesh.
    #[error("malformed mesh: {0}")]
    MalformedMesh(#[from] MeshDefect),

    /// A triangle built without point coordinates was asked for geometry.
    #[error("geometry unavailable for cell {cell}: constructed without point coordinates")]
    GeometryUnavailable { cell: CellIndex },

    /// Stepping or a state query was attempted before an initial state was set.
    #[error("simulation state is not initialized")]
    UninitializedState,

    /// A run parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// The specific way a mesh is malformed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshDefect {
    #[error("cell {cell} is degenerate (area {area:e})")]
    DegenerateTriangle { cell: CellIndex, area: f64 },

    #[error("edge ({v0}, {v1}) is shared by {n_cells} cells")]
    NonManifoldEdge { v0: usize, v1: usize, n_cells: usize },

    #[error("cell {cell} references point {point}, but the mesh has {n_points} points")]
    InvalidPointIndex {
        cell: CellIndex,
        point: usize,
        n_points: usize,
    },

    #[error("{kind} cell {cell} needs {expected} points, got {found}")]
    WrongArity {
        cell: CellIndex,
        kind: CellKind,
        expected: usize,
        found: usize,
    },

    #[error("cells {a} and {b} cover the same points")]
    DuplicateCell { a: CellIndex, b: CellIndex },

    #[error("mesh contains no triangles")]
    NoTriangles,
}

pub type Result<T> = std::result::Result<T, TransportError>;
