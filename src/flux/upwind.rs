//! First-order upwind flux across a triangle edge.
//!
//! With an outward normal n scaled by the edge length and an edge velocity v:
//! F^* = (v · n) u_here      if v · n ≥ 0  (outflow)
//! F^* = (v · n) u_neighbor  if v · n < 0  (inflow)
//!
//! The cell update for one edge is then -dt / A_i * F^*.

use crate::mesh::geometry::{Vector2, dot};

/// Compute the upwind numerical flux across an edge.
///
/// # Arguments
/// * `u_here` - Value in the cell the normal points out of
/// * `u_neighbor` - Value in the cell across the edge
/// * `normal` - Outward normal, scaled by edge length
/// * `velocity` - Velocity at the edge
///
/// # Returns
/// The flux F^* integrated over the edge; positive means outflow.
#[inline]
pub fn upwind_flux(u_here: f64, u_neighbor: f64, normal: Vector2, velocity: Vector2) -> f64 {
    let a_n = dot(normal, velocity);

    if a_n >= 0.0 {
        // Outflow: carried out of this cell
        a_n * u_here
    } else {
        // Inflow: carried in from the neighbor
        a_n * u_neighbor
    }
}

/// Edge velocity as the average of the two centroid velocities.
#[inline]
pub fn edge_velocity(v_here: Vector2, v_neighbor: Vector2) -> Vector2 {
    [0.5 * (v_here[0] + v_neighbor[0]), 0.5 * (v_here[1] + v_neighbor[1])]
}

/// Change of `u_i` over one step due to the exchange across one edge.
///
/// # Arguments
/// * `u_i`, `u_neighbor` - Cell values on both sides
/// * `area_i` - Area of cell i
/// * `normal` - Outward normal of the edge seen from cell i
/// * `v_i`, `v_neighbor` - Centroid velocities on both sides
/// * `dt` - Time step
///
/// # Returns
/// `-dt / area_i * F^*`, to be added to `u_i`.
#[inline]
pub fn flux_contribution(
    u_i: f64,
    u_neighbor: f64,
    area_i: f64,
    normal: Vector2,
    v_i: Vector2,
    v_neighbor: Vector2,
    dt: f64,
) -> f64 {
    let v_edge = edge_velocity(v_i, v_neighbor);
    -dt / area_i * upwind_flux(u_i, u_neighbor, normal, v_edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-14;

    #[test]
    fn test_upwind_outflow() {
        // v · n = 2 > 0 → use u_here
        let flux = upwind_flux(3.0, 7.0, [1.0, 0.0], [2.0, 5.0]);
        assert!((flux - 6.0).abs() < TOL);
    }

    #[test]
    fn test_upwind_inflow() {
        // v · n = -2 < 0 → use u_neighbor
        let flux = upwind_flux(3.0, 7.0, [1.0, 0.0], [-2.0, 5.0]);
        assert!((flux - (-14.0)).abs() < TOL);
    }

    #[test]
    fn test_upwind_tangential_flow() {
        // Velocity along the edge: no exchange, whatever the values
        let flux = upwind_flux(3.0, 7.0, [0.0, 2.0], [4.0, 0.0]);
        assert_eq!(flux, 0.0);
        assert_eq!(upwind_flux(1e6, -1e6, [1.0, 1.0], [0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_normal_length_scales_flux() {
        let short = upwind_flux(1.0, 0.0, [1.0, 0.0], [1.0, 0.0]);
        let long = upwind_flux(1.0, 0.0, [3.0, 0.0], [1.0, 0.0]);
        assert!((long - 3.0 * short).abs() < TOL);
    }

    #[test]
    fn test_contribution_sign() {
        // Outflow lowers the cell value
        let du = flux_contribution(1.0, 0.0, 0.5, [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], 0.1);
        // -0.1 / 0.5 * (1 * 1) = -0.2
        assert!((du - (-0.2)).abs() < TOL);

        // Inflow raises it
        let du = flux_contribution(0.0, 1.0, 0.5, [-1.0, 0.0], [1.0, 0.0], [1.0, 0.0], 0.1);
        assert!((du - 0.2).abs() < TOL);
    }

    #[test]
    fn test_edge_velocity_is_average() {
        let du = flux_contribution(1.0, 0.0, 1.0, [1.0, 0.0], [2.0, 0.0], [0.0, 0.0], 1.0);
        // Average velocity (1, 0)
        assert!((du - (-1.0)).abs() < TOL);
        assert_eq!(edge_velocity([2.0, -1.0], [0.0, 3.0]), [1.0, 1.0]);
    }

    #[test]
    fn test_conservative_exchange() {
        let (u_i, u_j) = (0.8, 0.3);
        let (area_i, area_j) = (0.5, 0.25);
        let n_ij = [0.6, -0.2];
        let n_ji = [-0.6, 0.2];
        let (v_i, v_j) = ([1.0, 0.4], [0.2, -0.3]);
        let dt = 0.01;

        for (vi, vj) in [(v_i, v_j), ([-1.0, 0.0], [-0.5, 0.1])] {
            let from_i = flux_contribution(u_i, u_j, area_i, n_ij, vi, vj, dt) * area_i;
            let from_j = flux_contribution(u_j, u_i, area_j, n_ji, vj, vi, dt) * area_j;
            assert!((from_i + from_j).abs() < TOL);
        }
    }
}
