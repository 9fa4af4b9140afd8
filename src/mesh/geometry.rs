//! Planar triangle geometry.
//!
//! All functions are pure and work on raw coordinates, so the same code serves
//! mesh construction and tests. Edge normals are scaled by edge length:
//!
//! n = (dy, -dx)   for the edge pa → pb with (dx, dy) = pb - pa
//!
//! flipped if needed so that n · (midpoint - centroid) > 0. The flux across an
//! edge is then simply `n · v` without a separate length factor.

use crate::error::{MeshDefect, Result};
use crate::types::CellIndex;

/// A point in the model plane.
pub type Point2 = [f64; 2];

/// A vector in the model plane (velocities, normals).
pub type Vector2 = [f64; 2];

/// Relative area tolerance. A triangle whose area is at most
/// `AREA_TOLERANCE * longest_edge²` is treated as degenerate.
pub const AREA_TOLERANCE: f64 = 1e-14;

#[inline]
pub fn sub(a: Point2, b: Point2) -> Vector2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub fn dot(a: Vector2, b: Vector2) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline]
pub fn length(a: Vector2) -> f64 {
    a[0].hypot(a[1])
}

/// Half the cross product of (p1 - p0) and (p2 - p0).
///
/// Positive for counter-clockwise vertices, negative for clockwise.
#[inline]
pub fn signed_area(p0: Point2, p1: Point2, p2: Point2) -> f64 {
    let a = sub(p1, p0);
    let b = sub(p2, p0);
    0.5 * (a[0] * b[1] - a[1] * b[0])
}

/// Unsigned triangle area. Vertex order does not matter.
#[inline]
pub fn area(p0: Point2, p1: Point2, p2: Point2) -> f64 {
    signed_area(p0, p1, p2).abs()
}

/// Triangle area, rejecting degenerate (collinear or repeated) vertices.
///
/// # Errors
///
/// `MalformedMesh(DegenerateTriangle)` if the area is zero or negligible
/// relative to the longest edge.
pub fn checked_area(cell: CellIndex, p0: Point2, p1: Point2, p2: Point2) -> Result<f64> {
    let a = area(p0, p1, p2);
    let longest = [sub(p1, p0), sub(p2, p1), sub(p0, p2)]
        .into_iter()
        .map(length)
        .fold(0.0_f64, f64::max);

    if !a.is_finite() || a <= AREA_TOLERANCE * longest * longest {
        return Err(MeshDefect::DegenerateTriangle { cell, area: a }.into());
    }
    Ok(a)
}

/// Arithmetic mean of the three vertices.
#[inline]
pub fn centroid(p0: Point2, p1: Point2, p2: Point2) -> Point2 {
    [(p0[0] + p1[0] + p2[0]) / 3.0, (p0[1] + p1[1] + p2[1]) / 3.0]
}

#[inline]
pub fn edge_midpoint(pa: Point2, pb: Point2) -> Point2 {
    [0.5 * (pa[0] + pb[0]), 0.5 * (pa[1] + pb[1])]
}

/// Outward normal of the edge pa → pb, with magnitude equal to the edge length.
///
/// "Outward" is decided against `centroid`: the returned vector has a positive
/// dot product with `edge_midpoint(pa, pb) - centroid`, whatever the winding.
pub fn edge_normal(pa: Point2, pb: Point2, centroid: Point2) -> Vector2 {
    let d = sub(pb, pa);
    let n = [d[1], -d[0]];
    let outward = sub(edge_midpoint(pa, pb), centroid);
    if dot(n, outward) < 0.0 { [-n[0], -n[1]] } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-14;

    const P0: Point2 = [0.0, 0.0];
    const P1: Point2 = [1.0, 0.0];
    const P2: Point2 = [0.0, 1.0];

    #[test]
    fn test_reference_triangle() {
        let c = centroid(P0, P1, P2);
        assert!((c[0] - 1.0 / 3.0).abs() < TOL);
        assert!((c[1] - 1.0 / 3.0).abs() < TOL);
        assert!((area(P0, P1, P2) - 0.5).abs() < TOL);
    }

    #[test]
    fn test_area_ignores_orientation() {
        assert!(signed_area(P0, P1, P2) > 0.0);
        assert!(signed_area(P0, P2, P1) < 0.0);
        assert_eq!(area(P0, P1, P2), area(P0, P2, P1));
    }

    #[test]
    fn test_degenerate_rejected() {
        let cell = CellIndex::new(3);
        // Collinear
        let err = checked_area(cell, [0.0, 0.0], [1.0, 1.0], [2.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::TransportError::MalformedMesh(MeshDefect::DegenerateTriangle { .. })
        ));
        // Repeated vertex
        assert!(checked_area(cell, P0, P0, P1).is_err());
        // Tiny but well-shaped triangles are fine
        assert!(checked_area(cell, [0.0, 0.0], [1e-6, 0.0], [0.0, 1e-6]).is_ok());
    }

    #[test]
    fn test_normals_outward_with_edge_length() {
        for (a, b, c) in [(P0, P1, P2), (P0, P2, P1)] {
            let ctr = centroid(a, b, c);
            for (pa, pb) in [(a, b), (b, c), (c, a)] {
                let n = edge_normal(pa, pb, ctr);
                let edge = sub(pb, pa);

                assert!((length(n) - length(edge)).abs() < TOL);
                assert!(dot(n, edge).abs() < TOL);
                assert!(dot(n, sub(edge_midpoint(pa, pb), ctr)) > 0.0);
            }
        }
    }

    #[test]
    fn test_hypotenuse_normal() {
        let ctr = centroid(P0, P1, P2);
        let n = edge_normal(P1, P2, ctr);
        // Points away from the origin, length √2
        assert!((n[0] - 1.0).abs() < TOL);
        assert!((n[1] - 1.0).abs() < TOL);
    }
}
