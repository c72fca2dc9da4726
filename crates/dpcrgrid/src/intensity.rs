//! Mean normalized brightness inside a well.
//!
//! The disk mask is evaluated over the integer pixels of the bounding square
//! `[x - r - 2, x + r + 2] × [y - r - 2, y + r + 2]`, clipped to the image.
//! A pixel belongs to the well iff its distance to the center is `<= r`.
//! Values are normalized by 255, so the mean lies in `[0, 1]`. A mask with no
//! in-bounds pixels has intensity 0.

use image::GrayImage;
use rayon::prelude::*;

use crate::circle::Circle;

/// Safety margin (pixels) added around the radius when scanning.
const SCAN_MARGIN_PX: f64 = 2.0;

/// A measured well: circle, owning panel and mean intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WellMeasurement {
    /// Measured circle.
    pub circle: Circle,
    /// Zero-based panel index.
    pub panel_index: usize,
    /// Mean normalized brightness in `[0, 1]`.
    pub intensity: f64,
}

/// Mean of `pixel / 255` over the pixels inside `circle`.
pub fn measure_intensity(gray: &GrayImage, circle: &Circle) -> f64 {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let reach = circle.radius + SCAN_MARGIN_PX;
    let x0 = (circle.x - reach).floor().max(0.0);
    let y0 = (circle.y - reach).floor().max(0.0);
    let x1 = (circle.x + reach).ceil().min((w - 1) as f64);
    let y1 = (circle.y + reach).ceil().min((h - 1) as f64);
    if x0 > x1 || y0 > y1 {
        tracing::trace!(
            "circle ({:.1}, {:.1}, r={:.1}) lies outside the image",
            circle.x,
            circle.y,
            circle.radius
        );
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in y0 as u32..=y1 as u32 {
        for x in x0 as u32..=x1 as u32 {
            if circle.contains(x as f64, y as f64) {
                sum += gray.get_pixel(x, y)[0] as f64 / 255.0;
                count += 1;
            }
        }
    }

    if count == 0 {
        tracing::trace!(
            "circle ({:.1}, {:.1}, r={:.1}) has an empty pixel mask",
            circle.x,
            circle.y,
            circle.radius
        );
        return 0.0;
    }
    sum / count as f64
}

/// Measure every circle of a panel in parallel, preserving input order.
pub fn measure_wells(gray: &GrayImage, circles: &[Circle], panel_index: usize) -> Vec<WellMeasurement> {
    circles
        .par_iter()
        .map(|circle| WellMeasurement {
            circle: *circle,
            panel_index,
            intensity: measure_intensity(gray, circle),
        })
        .collect()
}
