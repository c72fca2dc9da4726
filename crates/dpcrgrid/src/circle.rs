//! Well circle type shared by detection, grid fitting and measurement.

use serde::{Deserialize, Serialize};

/// A circular well in image pixel coordinates.
///
/// `x` is the image column and `y` the image row of the center. Fields are
/// public for reading; build circles with [`Circle::new`] so the finite
/// center and `radius > 0` invariant holds. Every circle the crate emits
/// (detection, grid fitting) goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center x (column, pixels).
    pub x: f64,
    /// Center y (row, pixels).
    pub y: f64,
    /// Radius in pixels, always > 0.
    pub radius: f64,
}

impl Circle {
    /// Create a circle, rejecting non-finite coordinates and non-positive radii.
    pub fn new(x: f64, y: f64, radius: f64) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return None;
        }
        Some(Self { x, y, radius })
    }

    /// Center as `[x, y]`.
    pub fn center(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Squared distance between two circle centers.
    pub fn center_dist_sq(&self, other: &Circle) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Whether `(px, py)` lies inside or on the circle boundary.
    #[inline]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let dx = self.x - px;
        let dy = self.y - py;
        (dx * dx + dy * dy).sqrt() <= self.radius
    }
}
