//! Noise smoothing applied before circle detection.

use image::GrayImage;

/// Median-filter the image with a square `kernel × kernel` window.
///
/// `kernel` must be odd; 1 (or 0) returns an unmodified copy. The smoothed
/// image is used both for detection and for intensity measurement.
pub fn median_smooth(gray: &GrayImage, kernel: u32) -> GrayImage {
    let radius = kernel / 2;
    if radius == 0 {
        return gray.clone();
    }
    imageproc::filter::median_filter(gray, radius, radius)
}
