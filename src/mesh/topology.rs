//! Mesh assembly and shared-edge adjacency.
//!
//! A [`Mesh`] is built once from raw point coordinates and element blocks and
//! is immutable afterwards. Neighbors are found with a single pass over an
//! edge map keyed by the sorted point-id pair, so the cost is linear in the
//! number of cells.

use std::collections::HashMap;

use log::debug;

use crate::error::{MeshDefect, Result, TransportError};
use crate::mesh::cell::{Cell, CellKind, Line, Triangle};
use crate::mesh::geometry::Point2;
use crate::types::{Bounds2D, CellIndex};
use crate::velocity::VelocityField;

// =============================================================================
// Raw element data
// =============================================================================

/// Element kind tag as delivered by a mesh reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Vertex,
    Line,
    Triangle,
    Quad,
    /// Any other element, tagged with the reader's type code.
    Other(i32),
}

impl ElementKind {
    /// The cell kind this element becomes, or `None` if it is skipped.
    pub fn cell_kind(self) -> Option<CellKind> {
        match self {
            ElementKind::Line => Some(CellKind::Line),
            ElementKind::Triangle => Some(CellKind::Triangle),
            ElementKind::Vertex | ElementKind::Quad | ElementKind::Other(_) => None,
        }
    }
}

/// Connectivity of all elements of one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementBlock {
    pub kind: ElementKind,
    /// One entry of 0-based point ids per element
    pub connectivity: Vec<Vec<usize>>,
}

impl ElementBlock {
    pub fn new(kind: ElementKind, connectivity: Vec<Vec<usize>>) -> Self {
        Self { kind, connectivity }
    }

    pub fn triangles(triangles: &[[usize; 3]]) -> Self {
        Self::new(
            ElementKind::Triangle,
            triangles.iter().map(|t| t.to_vec()).collect(),
        )
    }

    pub fn lines(lines: &[[usize; 2]]) -> Self {
        Self::new(ElementKind::Line, lines.iter().map(|l| l.to_vec()).collect())
    }
}

// =============================================================================
// Mesh
// =============================================================================

/// An unstructured mesh of boundary lines and triangles.
#[derive(Clone, Debug)]
pub struct Mesh {
    points: Vec<Point2>,
    cells: Vec<Cell>,
    n_triangles: usize,
    n_lines: usize,
}

impl Mesh {
    /// Build a mesh from points and element blocks.
    ///
    /// Cells are numbered in block order, then element order. Elements of
    /// unsupported kinds are skipped without consuming an index. Triangle
    /// velocities are sampled from `velocity` at each centroid.
    ///
    /// # Errors
    ///
    /// `MalformedMesh` if an element (skipped kinds included) references a
    /// point that does not exist, an element has the wrong number of points,
    /// a triangle is degenerate, two cells cover the same points, or an edge
    /// is shared by more than two cells.
    pub fn build(
        points: Vec<Point2>,
        blocks: &[ElementBlock],
        velocity: &dyn VelocityField,
    ) -> Result<Self> {
        let mut cells = Vec::new();
        let mut n_skipped = 0;

        for block in blocks {
            let Some(kind) = block.kind.cell_kind() else {
                // Skipped elements take no index; report at the next free one
                let next = CellIndex::new(cells.len());
                for point_ids in &block.connectivity {
                    check_point_ids(next, point_ids, points.len())?;
                }
                n_skipped += block.connectivity.len();
                continue;
            };

            for point_ids in &block.connectivity {
                let index = CellIndex::new(cells.len());
                let cell: Cell = match kind {
                    CellKind::Line => {
                        let line = Line::new(index, point_ids.clone())?;
                        check_point_ids(index, point_ids, points.len())?;
                        line.into()
                    }
                    CellKind::Triangle => {
                        Triangle::with_geometry(index, point_ids.clone(), &points, velocity)?
                            .into()
                    }
                };
                cells.push(cell);
            }
        }

        let n_triangles = cells.iter().filter(|c| c.is_triangle()).count();
        let n_lines = cells.len() - n_triangles;

        let mut mesh = Self {
            points,
            cells,
            n_triangles,
            n_lines,
        };
        mesh.connect()?;

        debug!(
            "Built mesh: {} points, {} triangles, {} lines ({} elements skipped), velocity: {}",
            mesh.points.len(),
            mesh.n_triangles,
            mesh.n_lines,
            n_skipped,
            velocity.name()
        );

        Ok(mesh)
    }

    /// Build a mesh from triangles and boundary lines given as fixed-size ids.
    pub fn from_triangles(
        points: Vec<Point2>,
        triangles: &[[usize; 3]],
        lines: &[[usize; 2]],
        velocity: &dyn VelocityField,
    ) -> Result<Self> {
        let blocks = [ElementBlock::lines(lines), ElementBlock::triangles(triangles)];
        Self::build(points, &blocks, velocity)
    }

    /// Create a structured triangulation of a rectangle.
    ///
    /// Each of the `nx × ny` quads is split along its (v0, v2) diagonal into
    /// two counter-clockwise triangles. Boundary lines are placed on the
    /// perimeter and numbered before the triangles, as mesh generators do.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `nx` or `ny` is zero or the bounds are empty.
    pub fn uniform_rectangle(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        velocity: &dyn VelocityField,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(TransportError::InvalidConfiguration(format!(
                "need at least one element in each direction, got {} × {}",
                nx, ny
            )));
        }
        if !(x1 > x0 && y1 > y0) || ![x0, x1, y0, y1].iter().all(|v| v.is_finite()) {
            return Err(TransportError::InvalidConfiguration(format!(
                "invalid domain bounds [{}, {}] × [{}, {}]",
                x0, x1, y0, y1
            )));
        }

        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        // (nx+1) × (ny+1) grid
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                points.push([x0 + i as f64 * dx, y0 + j as f64 * dy]);
            }
        }

        let vertex = |i: usize, j: usize| j * (nx + 1) + i;

        let mut triangles = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = vertex(i, j); // bottom-left
                let v1 = vertex(i + 1, j); // bottom-right
                let v2 = vertex(i + 1, j + 1); // top-right
                let v3 = vertex(i, j + 1); // top-left
                triangles.push([v0, v1, v2]);
                triangles.push([v0, v2, v3]);
            }
        }

        // South, east, north, west
        let mut lines = Vec::with_capacity(2 * (nx + ny));
        lines.extend((0..nx).map(|i| [vertex(i, 0), vertex(i + 1, 0)]));
        lines.extend((0..ny).map(|j| [vertex(nx, j), vertex(nx, j + 1)]));
        lines.extend((0..nx).rev().map(|i| [vertex(i + 1, ny), vertex(i, ny)]));
        lines.extend((0..ny).rev().map(|j| [vertex(0, j + 1), vertex(0, j)]));

        Self::from_triangles(points, &triangles, &lines, velocity)
    }

    /// Single adjacency pass over the edge map.
    fn connect(&mut self) -> Result<()> {
        let mut edge_map: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();

        for (k, cell) in self.cells.iter().enumerate() {
            for (edge, [v0, v1]) in cell.edges().enumerate() {
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                edge_map.entry(key).or_default().push((k, edge));
            }
        }

        for (&(v0, v1), cell_edges) in &edge_map {
            match cell_edges.as_slice() {
                [_] => {}
                &[(a, edge_a), (b, edge_b)] => {
                    // Two cells on one edge sharing more than that edge overlap
                    if !self.cells[a].shares_edge_with(&self.cells[b]) {
                        return Err(MeshDefect::DuplicateCell {
                            a: self.cells[a].index(),
                            b: self.cells[b].index(),
                        }
                        .into());
                    }
                    let (index_a, index_b) = (self.cells[a].index(), self.cells[b].index());
                    self.cells[a].connect(edge_a, index_b);
                    self.cells[b].connect(edge_b, index_a);
                }
                _ => {
                    return Err(MeshDefect::NonManifoldEdge {
                        v0,
                        v1,
                        n_cells: cell_edges.len(),
                    }
                    .into());
                }
            }
        }

        // HashMap iteration order is arbitrary
        for cell in &mut self.cells {
            cell.sort_neighbors();
        }

        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[index]
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn n_triangles(&self) -> usize {
        self.n_triangles
    }

    pub fn n_lines(&self) -> usize {
        self.n_lines
    }

    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> + '_ {
        self.cells.iter().filter_map(Cell::as_triangle)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(|c| c.is_line())
    }

    /// Sum of triangle areas.
    pub fn total_area(&self) -> f64 {
        self.triangles()
            .filter_map(|t| t.area().ok())
            .sum()
    }

    /// Triangle edges without a neighbor (no-flux boundary).
    pub fn n_boundary_edges(&self) -> usize {
        self.triangles()
            .map(|t| t.edge_to_neighbor().iter().filter(|n| n.is_none()).count())
            .sum()
    }

    /// Smallest rectangle enclosing the mesh points.
    pub fn bounds(&self) -> Option<Bounds2D> {
        Bounds2D::enclosing(&self.points)
    }
}

fn check_point_ids(cell: CellIndex, point_ids: &[usize], n_points: usize) -> Result<()> {
    match point_ids.iter().find(|&&p| p >= n_points) {
        Some(&point) => Err(MeshDefect::InvalidPointIndex {
            cell,
            point,
            n_points,
        }
        .into()),
        None => Ok(()),
    }
}
