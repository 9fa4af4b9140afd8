//! Strongly-typed domain types.
//!
//! - **Index newtypes**: `CellIndex` keeps cell positions apart from point ids
//! - **Rectangles**: `Bounds2D` describes the fishing ground and mesh extents
//!
//! # Example
//!
//! ```
//! use oil_spill::types::{Bounds2D, CellIndex};
//!
//! let ground = Bounds2D::new(0.0, 0.45, 0.0, 0.2);
//! assert!(ground.contains(0.1, 0.1));
//!
//! let cell = CellIndex::new(7);
//! assert_eq!(cell.to_string(), "C7");
//! ```

mod bounds;
mod indices;

pub use bounds::Bounds2D;
pub use indices::CellIndex;
