//! Axis-aligned rectangles in the model plane.

use std::fmt;

/// 2D rectangular region.
///
/// Used for the fishing ground monitored during a run and for the extent of
/// a mesh.
///
/// # Example
///
/// ```
/// use oil_spill::types::Bounds2D;
///
/// let ground = Bounds2D::fishing_ground();
///
/// assert_eq!(ground.width(), 0.45);
/// assert_eq!(ground.height(), 0.2);
/// assert!(ground.contains_point([0.45, 0.2]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2D {
    /// Minimum x-coordinate
    pub x_min: f64,
    /// Maximum x-coordinate
    pub x_max: f64,
    /// Minimum y-coordinate
    pub y_min: f64,
    /// Maximum y-coordinate
    pub y_max: f64,
}

impl Bounds2D {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if `x_max <= x_min` or `y_max <= y_min`.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        assert!(
            x_max > x_min,
            "x_max ({}) must be greater than x_min ({})",
            x_max,
            x_min
        );
        assert!(
            y_max > y_min,
            "y_max ({}) must be greater than y_min ({})",
            y_max,
            y_min
        );

        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Create bounds from `[[x_min, x_max], [y_min, y_max]]`, the layout used
    /// by the `borders` configuration key.
    ///
    /// Returns `None` if either range is empty, inverted or not finite.
    pub fn from_ranges(ranges: [[f64; 2]; 2]) -> Option<Self> {
        let [[x_min, x_max], [y_min, y_max]] = ranges;
        let finite = [x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite());
        (finite && x_max > x_min && y_max > y_min).then_some(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// The fishing ground of the bay model: [0, 0.45] × [0, 0.2].
    pub fn fishing_ground() -> Self {
        Self::new(0.0, 0.45, 0.0, 0.2)
    }

    /// Smallest rectangle enclosing all points, or `None` for degenerate input.
    pub fn enclosing(points: &[[f64; 2]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut b = (first[0], first[0], first[1], first[1]);
        for p in rest {
            b.0 = b.0.min(p[0]);
            b.1 = b.1.max(p[0]);
            b.2 = b.2.min(p[1]);
            b.3 = b.3.max(p[1]);
        }
        Self::from_ranges([[b.0, b.1], [b.2, b.3]])
    }

    /// Width (x_max - x_min).
    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height (y_max - y_min).
    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Check if a point is inside the rectangle (inclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// [`contains`](Self::contains) for a coordinate pair.
    #[inline]
    pub fn contains_point(&self, p: [f64; 2]) -> bool {
        self.contains(p[0], p[1])
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}] × [{:.2}, {:.2}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

impl Default for Bounds2D {
    fn default() -> Self {
        Self::fishing_ground()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fishing_ground() {
        let b = Bounds2D::fishing_ground();
        assert_eq!(b.x_min, 0.0);
        assert_eq!(b.x_max, 0.45);
        assert_eq!(b.y_min, 0.0);
        assert_eq!(b.y_max, 0.2);
        assert_eq!(b, Bounds2D::default());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = Bounds2D::fishing_ground();
        assert!(b.contains(0.2, 0.1));
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(0.45, 0.2));
        assert!(!b.contains(0.46, 0.1));
        assert!(!b.contains_point([0.1, -0.01]));
    }

    #[test]
    fn test_from_ranges() {
        let b = Bounds2D::from_ranges([[0.0, 1.0], [0.5, 2.0]]).unwrap();
        assert_eq!(b.width(), 1.0);
        assert_eq!(b.height(), 1.5);

        assert!(Bounds2D::from_ranges([[1.0, 0.0], [0.0, 1.0]]).is_none());
        assert!(Bounds2D::from_ranges([[0.0, 1.0], [0.0, 0.0]]).is_none());
        assert!(Bounds2D::from_ranges([[0.0, f64::NAN], [0.0, 1.0]]).is_none());
    }

    #[test]
    fn test_enclosing() {
        let b = Bounds2D::enclosing(&[[0.0, 0.0], [2.0, -1.0], [1.0, 3.0]]).unwrap();
        assert_eq!(b, Bounds2D::new(0.0, 2.0, -1.0, 3.0));

        assert!(Bounds2D::enclosing(&[]).is_none());
        assert!(Bounds2D::enclosing(&[[1.0, 1.0]]).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Bounds2D::fishing_ground().to_string(),
            "[0.00, 0.45] × [0.00, 0.20]"
        );
    }

    #[test]
    #[should_panic(expected = "x_max")]
    fn test_invalid_x() {
        Bounds2D::new(1.0, 0.0, 0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "y_max")]
    fn test_invalid_y() {
        Bounds2D::new(0.0, 1.0, 1.0, 0.0);
    }
}
