//! Prescribed velocity fields.
//!
//! The transport is driven by a steady flow that is sampled once per triangle
//! at its centroid while the mesh is built. Any `Fn(Point2) -> Vector2` is a
//! velocity field, so ad-hoc flows in tests need no wrapper type.
//!
//! # Example
//! ```
//! use oil_spill::velocity::{BayCurrent, UniformVelocity, VelocityField};
//!
//! let bay = BayCurrent;
//! assert_eq!(bay.velocity([1.0, 0.0]), [-0.2, -1.0]);
//!
//! let east = UniformVelocity::new(1.0, 0.0);
//! assert_eq!(east.velocity([0.2, 0.7]), [1.0, 0.0]);
//!
//! let swirl = |p: [f64; 2]| [-p[1], p[0]];
//! let field: &dyn VelocityField = &swirl;
//! assert_eq!(field.velocity([1.0, 0.0]), [0.0, 1.0]);
//! ```

use crate::mesh::geometry::{Point2, Vector2};

// =============================================================================
// Velocity Field Trait
// =============================================================================

/// A steady 2D velocity field.
pub trait VelocityField: Send + Sync {
    /// Velocity at `x`.
    fn velocity(&self, x: Point2) -> Vector2;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> VelocityField for F
where
    F: Fn(Point2) -> Vector2 + Send + Sync,
{
    #[inline]
    fn velocity(&self, x: Point2) -> Vector2 {
        self(x)
    }
}

// =============================================================================
// Implementations
// =============================================================================

/// The circulation in the bay: v(x, y) = (y - 0.2 x, -x).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BayCurrent;

impl VelocityField for BayCurrent {
    #[inline]
    fn velocity(&self, x: Point2) -> Vector2 {
        [x[1] - 0.2 * x[0], -x[0]]
    }

    fn name(&self) -> &'static str {
        "bay current"
    }
}

/// The same velocity everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniformVelocity {
    pub vx: f64,
    pub vy: f64,
}

impl UniformVelocity {
    pub const fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }

    /// Still water.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl VelocityField for UniformVelocity {
    #[inline]
    fn velocity(&self, _x: Point2) -> Vector2 {
        [self.vx, self.vy]
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bay_current() {
        let v = BayCurrent.velocity([0.5, 0.5]);
        assert!((v[0] - 0.4).abs() < 1e-14);
        assert!((v[1] + 0.5).abs() < 1e-14);
        // Still at the origin
        assert_eq!(BayCurrent.velocity([0.0, 0.0]), [0.0, 0.0]);
    }

    #[test]
    fn test_uniform() {
        let v = UniformVelocity::new(2.0, -1.0);
        assert_eq!(v.velocity([0.0, 0.0]), [2.0, -1.0]);
        assert_eq!(v.velocity([9.0, 9.0]), [2.0, -1.0]);
        assert_eq!(UniformVelocity::zero().velocity([1.0, 1.0]), [0.0, 0.0]);
    }

    #[test]
    fn test_closure_field() {
        let f = |p: Point2| [p[0], 2.0 * p[1]];
        assert_eq!(f.velocity([1.0, 2.0]), [1.0, 4.0]);
        assert_eq!(VelocityField::name(&f), "custom");
        assert_eq!(BayCurrent.name(), "bay current");
    }
}
