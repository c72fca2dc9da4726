//! Idealized well lattice anchored on the detected circles.
//!
//! The array is assumed axis-aligned, square and uniformly spaced. The
//! lattice origin is the minimum x and minimum y over all detected centers,
//! so at least the corner column and row must have been detected. Missed or
//! spurious detections elsewhere do not affect the fitted wells.

use crate::circle::Circle;
use crate::error::GridError;

const DEFAULT_ARRAY_SIZE: usize = 30;
const DEFAULT_SPACING_PX: f64 = 24.5;
const DEFAULT_FITTED_RADIUS_PX: f64 = 6.0;

/// Geometry of the well array in image pixels.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSpec {
    /// Wells per side (the array is `array_size × array_size`).
    pub array_size: usize,
    /// Horizontal center-to-center spacing.
    pub x_spacing: f64,
    /// Vertical center-to-center spacing.
    pub y_spacing: f64,
    /// Radius assigned to every fitted well.
    pub fitted_radius: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            array_size: DEFAULT_ARRAY_SIZE,
            x_spacing: DEFAULT_SPACING_PX,
            y_spacing: DEFAULT_SPACING_PX,
            fitted_radius: DEFAULT_FITTED_RADIUS_PX,
        }
    }
}

impl GridSpec {
    /// Number of wells per panel.
    pub fn n_wells(&self) -> usize {
        self.array_size * self.array_size
    }

    /// Check that the geometry can produce a lattice.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.array_size == 0 {
            return Err(GridError::InvalidSpec("array_size must be >= 1".to_string()));
        }
        if !self.x_spacing.is_finite() || self.x_spacing <= 0.0 {
            return Err(GridError::InvalidSpec(
                "x_spacing must be finite and > 0".to_string(),
            ));
        }
        if !self.y_spacing.is_finite() || self.y_spacing <= 0.0 {
            return Err(GridError::InvalidSpec(
                "y_spacing must be finite and > 0".to_string(),
            ));
        }
        if !self.fitted_radius.is_finite() || self.fitted_radius <= 0.0 {
            return Err(GridError::InvalidSpec(
                "fitted_radius must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Minimum x and minimum y over the detected centers.
///
/// The two minima generally come from different circles.
pub fn grid_anchor(detected: &[Circle]) -> Option<[f64; 2]> {
    let first = detected.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    for c in &detected[1..] {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
    }
    Some([min_x, min_y])
}

/// Fit the `array_size²` lattice to the detected circles.
///
/// Wells are emitted column by column: for each column `i` the rows `j`
/// run `0..array_size`, i.e. the well at `(i, j)` has index
/// `i * array_size + j`.
pub fn fit_grid(detected: &[Circle], spec: &GridSpec) -> Result<Vec<Circle>, GridError> {
    spec.validate()?;
    let [x_min, y_min] = grid_anchor(detected).ok_or(GridError::EmptyDetection)?;

    let n = spec.array_size;
    let mut wells = Vec::with_capacity(spec.n_wells());
    for i in 0..n {
        for j in 0..n {
            let x = x_min + spec.x_spacing * i as f64;
            let y = y_min + spec.y_spacing * j as f64;
            let well = Circle::new(x, y, spec.fitted_radius).ok_or_else(|| {
                GridError::InvalidSpec(format!("well ({}, {}) lies off the finite plane", i, j))
            })?;
            wells.push(well);
        }
    }
    Ok(wells)
}
