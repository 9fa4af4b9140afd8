//! Cells of a finite-volume mesh.
//!
//! A mesh is made of two kinds of cells:
//! - [`Line`]: a boundary edge with two points and no interior
//! - [`Triangle`]: an interior control volume with three points
//!
//! Both share a [`CellTopology`] record (index, point ids, neighbors).
//! Triangles additionally carry derived geometry when they are built from
//! point coordinates.

use std::fmt;

use crate::error::{MeshDefect, Result, TransportError};
use crate::mesh::geometry::{self, Point2, Vector2};
use crate::types::CellIndex;
use crate::velocity::VelocityField;

/// The kind of a cell, without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Line,
    Triangle,
}

impl CellKind {
    /// Number of points defining a cell of this kind.
    pub const fn n_points(self) -> usize {
        match self {
            CellKind::Line => 2,
            CellKind::Triangle => 3,
        }
    }

    /// Number of edges a cell of this kind exposes to its neighbors.
    pub const fn n_edges(self) -> usize {
        match self {
            CellKind::Line => 1,
            CellKind::Triangle => 3,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Line => write!(f, "Line"),
            CellKind::Triangle => write!(f, "Triangle"),
        }
    }
}

// =============================================================================
// Topology
// =============================================================================

/// Connectivity shared by every cell kind.
#[derive(Clone, Debug, PartialEq)]
pub struct CellTopology {
    pub index: CellIndex,
    pub point_ids: Vec<usize>,
    pub neighbors: Vec<CellIndex>,
}

impl CellTopology {
    fn new(index: CellIndex, kind: CellKind, point_ids: Vec<usize>) -> Result<Self> {
        if point_ids.len() != kind.n_points() {
            return Err(MeshDefect::WrongArity {
                cell: index,
                kind,
                expected: kind.n_points(),
                found: point_ids.len(),
            }
            .into());
        }
        Ok(Self {
            index,
            point_ids,
            neighbors: Vec::new(),
        })
    }

    /// Point-id pair of local edge `k`: (p0, p1), (p1, p2), (p2, p0) for a
    /// triangle; (p0, p1) for a line.
    #[inline]
    fn edge(&self, k: usize) -> [usize; 2] {
        let n = self.point_ids.len();
        [self.point_ids[k], self.point_ids[(k + 1) % n]]
    }

    fn n_shared_points(&self, other: &CellTopology) -> usize {
        self.point_ids
            .iter()
            .filter(|p| other.point_ids.contains(p))
            .count()
    }

    fn add_neighbor(&mut self, other: CellIndex) {
        if other != self.index && !self.neighbors.contains(&other) {
            self.neighbors.push(other);
        }
    }
}

// =============================================================================
// Line
// =============================================================================

/// A boundary edge. Its value is held at zero during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    topology: CellTopology,
}

impl Line {
    /// # Errors
    ///
    /// `MalformedMesh(WrongArity)` unless exactly two point ids are given.
    pub fn new(index: CellIndex, point_ids: Vec<usize>) -> Result<Self> {
        Ok(Self {
            topology: CellTopology::new(index, CellKind::Line, point_ids)?,
        })
    }
}

// =============================================================================
// Triangle
// =============================================================================

/// Geometry derived from a triangle's point coordinates.
///
/// Every per-edge array is in edge order (p0, p1), (p1, p2), (p2, p0).
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleGeometry {
    pub centroid: Point2,
    /// Unsigned area, always > 0
    pub area: f64,
    pub edge_points: [[Point2; 2]; 3],
    /// Outward normals scaled by edge length
    pub normals: [Vector2; 3],
    pub edge_midpoints: [Point2; 3],
    /// Prescribed velocity sampled at the centroid
    pub velocity: Vector2,
}

impl TriangleGeometry {
    fn compute(
        cell: CellIndex,
        corners: [Point2; 3],
        velocity: &dyn VelocityField,
    ) -> Result<Self> {
        let [p0, p1, p2] = corners;
        let area = geometry::checked_area(cell, p0, p1, p2)?;
        let centroid = geometry::centroid(p0, p1, p2);

        let edge_points = [[p0, p1], [p1, p2], [p2, p0]];
        let normals = edge_points.map(|[a, b]| geometry::edge_normal(a, b, centroid));
        let edge_midpoints = edge_points.map(|[a, b]| geometry::edge_midpoint(a, b));

        Ok(Self {
            centroid,
            area,
            edge_points,
            normals,
            edge_midpoints,
            velocity: velocity.velocity(centroid),
        })
    }
}

/// An interior control volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    topology: CellTopology,
    edge_neighbors: [Option<CellIndex>; 3],
    geometry: Option<TriangleGeometry>,
}

impl Triangle {
    /// Create a topology-only triangle. Geometric accessors on it fail with
    /// `GeometryUnavailable`.
    pub fn new(index: CellIndex, point_ids: Vec<usize>) -> Result<Self> {
        Ok(Self {
            topology: CellTopology::new(index, CellKind::Triangle, point_ids)?,
            edge_neighbors: [None; 3],
            geometry: None,
        })
    }

    /// Create a triangle and compute its geometry from `points`.
    ///
    /// # Errors
    ///
    /// - `WrongArity` unless exactly three point ids are given
    /// - `InvalidPointIndex` if an id is outside `points`
    /// - `DegenerateTriangle` if the vertices are (nearly) collinear
    pub fn with_geometry(
        index: CellIndex,
        point_ids: Vec<usize>,
        points: &[Point2],
        velocity: &dyn VelocityField,
    ) -> Result<Self> {
        let mut tri = Self::new(index, point_ids)?;

        let mut corners = [[0.0; 2]; 3];
        for (corner, &p) in corners.iter_mut().zip(&tri.topology.point_ids) {
            *corner = *points.get(p).ok_or(MeshDefect::InvalidPointIndex {
                cell: index,
                point: p,
                n_points: points.len(),
            })?;
        }

        tri.geometry = Some(TriangleGeometry::compute(index, corners, velocity)?);
        Ok(tri)
    }

    #[inline]
    pub fn index(&self) -> CellIndex {
        self.topology.index
    }

    pub fn point_ids(&self) -> &[usize] {
        &self.topology.point_ids
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// The full geometry record.
    pub fn geometry(&self) -> Result<&TriangleGeometry> {
        self.geometry
            .as_ref()
            .ok_or(TransportError::GeometryUnavailable {
                cell: self.topology.index,
            })
    }

    pub fn centroid(&self) -> Result<Point2> {
        self.geometry().map(|g| g.centroid)
    }

    pub fn area(&self) -> Result<f64> {
        self.geometry().map(|g| g.area)
    }

    pub fn normals(&self) -> Result<[Vector2; 3]> {
        self.geometry().map(|g| g.normals)
    }

    pub fn edge_points(&self) -> Result<[[Point2; 2]; 3]> {
        self.geometry().map(|g| g.edge_points)
    }

    /// Edge vectors pb - pa in edge order.
    pub fn edge_vectors(&self) -> Result<[Vector2; 3]> {
        self.geometry()
            .map(|g| g.edge_points.map(|[a, b]| geometry::sub(b, a)))
    }

    pub fn edge_midpoints(&self) -> Result<[Point2; 3]> {
        self.geometry().map(|g| g.edge_midpoints)
    }

    pub fn velocity(&self) -> Result<Vector2> {
        self.geometry().map(|g| g.velocity)
    }

    /// Neighbor across each edge, `None` for edges on the domain boundary.
    pub fn edge_to_neighbor(&self) -> &[Option<CellIndex>; 3] {
        &self.edge_neighbors
    }

    pub(crate) fn set_edge_neighbor(&mut self, edge: usize, neighbor: CellIndex) {
        self.edge_neighbors[edge] = Some(neighbor);
    }
}

// =============================================================================
// Cell
// =============================================================================

/// A mesh cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Line(Line),
    Triangle(Triangle),
}

impl Cell {
    fn topology(&self) -> &CellTopology {
        match self {
            Cell::Line(l) => &l.topology,
            Cell::Triangle(t) => &t.topology,
        }
    }

    fn topology_mut(&mut self) -> &mut CellTopology {
        match self {
            Cell::Line(l) => &mut l.topology,
            Cell::Triangle(t) => &mut t.topology,
        }
    }

    #[inline]
    pub fn index(&self) -> CellIndex {
        self.topology().index
    }

    #[inline]
    pub fn point_ids(&self) -> &[usize] {
        &self.topology().point_ids
    }

    #[inline]
    pub fn neighbors(&self) -> &[CellIndex] {
        &self.topology().neighbors
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Line(_) => CellKind::Line,
            Cell::Triangle(_) => CellKind::Triangle,
        }
    }

    pub fn is_triangle(&self) -> bool {
        matches!(self, Cell::Triangle(_))
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Cell::Line(_))
    }

    pub fn as_triangle(&self) -> Option<&Triangle> {
        match self {
            Cell::Triangle(t) => Some(t),
            Cell::Line(_) => None,
        }
    }

    /// Point-id pairs of the edges this cell exposes, in local edge order.
    pub fn edges(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        let topology = self.topology();
        (0..self.kind().n_edges()).map(move |k| topology.edge(k))
    }

    /// True if the two cells share exactly two points, i.e. one edge.
    pub fn shares_edge_with(&self, other: &Cell) -> bool {
        self.index() != other.index() && self.topology().n_shared_points(other.topology()) == 2
    }

    /// Record every cell in `all_cells` that shares an edge (exactly two
    /// points) with this one as a neighbor.
    ///
    /// Cells sharing a single point are not neighbors, and neither are
    /// duplicates sharing all of their points. For triangles the edge-to-
    /// neighbor map is filled in as well.
    ///
    /// This is a quadratic scan; [`Mesh::build`](crate::mesh::Mesh::build)
    /// uses an edge map instead, which gives the same relation and rejects
    /// duplicated cells.
    pub fn compute_neighbors(&mut self, all_cells: &[Cell]) {
        for other in all_cells {
            if !self.shares_edge_with(other) {
                continue;
            }
            let shared = self.edges().position(|[a, b]| {
                other.point_ids().contains(&a) && other.point_ids().contains(&b)
            });
            if let Some(edge) = shared {
                self.connect(edge, other.index());
            }
        }
    }

    pub(crate) fn sort_neighbors(&mut self) {
        self.topology_mut().neighbors.sort_unstable();
    }

    /// Record `other` as the neighbor across local edge `edge`.
    pub(crate) fn connect(&mut self, edge: usize, other: CellIndex) {
        self.topology_mut().add_neighbor(other);
        if let Cell::Triangle(tri) = self {
            tri.set_edge_neighbor(edge, other);
        }
    }
}

impl From<Line> for Cell {
    fn from(line: Line) -> Self {
        Cell::Line(line)
    }
}

impl From<Triangle> for Cell {
    fn from(tri: Triangle) -> Self {
        Cell::Triangle(tri)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: points={:?}",
            self.kind(),
            self.index().get(),
            self.point_ids()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::velocity::UniformVelocity;

    const TOL: f64 = 1e-14;

    fn reference_points() -> Vec<Point2> {
        vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
    }

    fn line(i: usize, p: [usize; 2]) -> Cell {
        Line::new(CellIndex::new(i), p.to_vec()).unwrap().into()
    }

    fn tri(i: usize, p: [usize; 3]) -> Cell {
        Triangle::new(CellIndex::new(i), p.to_vec()).unwrap().into()
    }

    #[test]
    fn test_display() {
        assert_eq!(line(2, [0, 1]).to_string(), "Line 2: points=[0, 1]");
        assert_eq!(tri(3, [1, 2, 3]).to_string(), "Triangle 3: points=[1, 2, 3]");
    }

    #[test]
    fn test_wrong_arity() {
        let err = Triangle::new(CellIndex::new(0), vec![0, 1]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::MalformedMesh(MeshDefect::WrongArity {
                expected: 3,
                found: 2,
                ..
            })
        ));
        assert!(Line::new(CellIndex::new(0), vec![0, 1, 2]).is_err());
    }

    #[test]
    fn test_geometry_of_reference_triangle() {
        let points = reference_points();
        let t = Triangle::with_geometry(
            CellIndex::new(0),
            vec![0, 1, 2],
            &points,
            &UniformVelocity::new(1.0, 2.0),
        )
        .unwrap();

        let c = t.centroid().unwrap();
        assert!((c[0] - 1.0 / 3.0).abs() < TOL);
        assert!((c[1] - 1.0 / 3.0).abs() < TOL);
        assert!((t.area().unwrap() - 0.5).abs() < TOL);
        assert_eq!(t.velocity().unwrap(), [1.0, 2.0]);

        let lengths = [1.0, 2.0_f64.sqrt(), 1.0];
        let normals = t.normals().unwrap();
        let edges = t.edge_vectors().unwrap();
        let mids = t.edge_midpoints().unwrap();
        for k in 0..3 {
            assert!((geometry::length(normals[k]) - lengths[k]).abs() < TOL);
            assert!(geometry::dot(normals[k], edges[k]).abs() < TOL);
            assert!(geometry::dot(normals[k], geometry::sub(mids[k], c)) > 0.0);
        }
        assert_eq!(t.edge_points().unwrap()[1], [[1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_velocity_sampled_at_centroid() {
        let points = reference_points();
        let field = |p: Point2| [p[0], p[1]];
        let t = Triangle::with_geometry(CellIndex::new(0), vec![1, 3, 2], &points, &field)
            .unwrap();
        let c = t.centroid().unwrap();
        assert_eq!(t.velocity().unwrap(), c);
    }

    #[test]
    fn test_geometry_unavailable_without_points() {
        let t = Triangle::new(CellIndex::new(4), vec![0, 1, 2]).unwrap();
        assert!(!t.has_geometry());

        let expected = TransportError::GeometryUnavailable {
            cell: CellIndex::new(4),
        };
        assert_eq!(t.area().unwrap_err(), expected);
        assert_eq!(t.centroid().unwrap_err(), expected);
        assert_eq!(t.normals().unwrap_err(), expected);
        assert_eq!(t.edge_points().unwrap_err(), expected);
        assert_eq!(t.edge_midpoints().unwrap_err(), expected);
        assert_eq!(t.velocity().unwrap_err(), expected);
    }

    #[test]
    fn test_invalid_point_index() {
        let points = reference_points();
        let err = Triangle::with_geometry(
            CellIndex::new(1),
            vec![0, 1, 9],
            &points,
            &UniformVelocity::zero(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransportError::MalformedMesh(MeshDefect::InvalidPointIndex {
                cell: CellIndex::new(1),
                point: 9,
                n_points: 4,
            })
        );
    }

    #[test]
    fn test_neighbors_share_an_edge() {
        let cells = vec![
            tri(0, [0, 1, 2]),
            tri(1, [1, 3, 2]),
            line(2, [0, 1]),
            tri(3, [2, 3, 4]),
        ];

        let mut first = cells[0].clone();
        first.compute_neighbors(&cells);
        assert_eq!(first.neighbors(), &[CellIndex::new(1), CellIndex::new(2)]);

        // Edge (p1, p2) is local edge 1, (p0, p1) is local edge 0
        let t = first.as_triangle().unwrap();
        assert_eq!(
            t.edge_to_neighbor(),
            &[Some(CellIndex::new(2)), Some(CellIndex::new(1)), None]
        );
    }

    #[test]
    fn test_single_shared_point_is_not_a_neighbor() {
        let cells = vec![tri(0, [0, 1, 2]), tri(1, [2, 3, 4])];
        let mut first = cells[0].clone();
        first.compute_neighbors(&cells);
        assert!(first.neighbors().is_empty());
    }

    #[test]
    fn test_identical_cells_are_not_neighbors() {
        let cells = vec![tri(0, [0, 1, 2]), tri(1, [2, 0, 1])];
        let mut first = cells[0].clone();
        first.compute_neighbors(&cells);
        assert!(first.neighbors().is_empty());
    }

    #[test]
    fn test_never_own_neighbor() {
        let cells = vec![line(0, [0, 1]), tri(1, [0, 1, 2])];
        let mut l = cells[0].clone();
        l.compute_neighbors(&cells);
        assert_eq!(l.neighbors(), &[CellIndex::new(1)]);
    }

    #[test]
    fn test_edges() {
        let t = tri(0, [4, 7, 9]);
        let edges: Vec<_> = t.edges().collect();
        assert_eq!(edges, vec![[4, 7], [7, 9], [9, 4]]);

        let l = line(1, [3, 5]);
        assert_eq!(l.edges().collect::<Vec<_>>(), vec![[3, 5]]);
    }
}
