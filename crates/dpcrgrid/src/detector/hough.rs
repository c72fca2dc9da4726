//! Hough-gradient circle search.
//!
//! Every Canny edge pixel votes along its Sobel gradient direction (both
//! senses) for centers at each radius in `[min_radius, max_radius]`. Wells
//! produce accumulator peaks at their centers because boundary gradients
//! converge radially. Peaks above `param2` are visited strongest first; a
//! peak is kept if it is at least `min_dist` from every accepted center and
//! its best-supported radius bin also exceeds `param2` edge pixels.

use image::{GrayImage, ImageBuffer, Luma};

use super::config::HoughConfig;
use crate::circle::Circle;

type GradientImage = ImageBuffer<Luma<i16>, Vec<i16>>;

/// An edge pixel with its unit gradient direction.
#[derive(Debug, Clone, Copy)]
struct EdgePoint {
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
}

/// A local maximum of the center accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CenterPeak {
    col: usize,
    row: usize,
    votes: u32,
}

/// Integer-stepped search radii `min, min + 1, ..` clipped to the image.
#[derive(Debug, Clone, Copy)]
struct RadiusRange {
    min: f64,
    max: f64,
    steps: usize,
}

impl RadiusRange {
    /// Configured radii capped at the image diagonal; `None` when no radius fits.
    fn for_image(config: &HoughConfig, w: u32, h: u32) -> Option<Self> {
        let max = config.max_radius.min((w as f64).hypot(h as f64));
        if config.min_radius > max {
            return None;
        }
        let steps = (max - config.min_radius).floor() as usize + 1;
        Some(Self {
            min: config.min_radius,
            max,
            steps,
        })
    }

    fn radii(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps).map(move |k| self.min + k as f64)
    }
}

/// Center-vote accumulator at `1/dp` of the image resolution.
struct CenterAccumulator {
    cols: usize,
    rows: usize,
    votes: Vec<u32>,
}

impl CenterAccumulator {
    fn vote(points: &[EdgePoint], w: u32, h: u32, dp: f64, range: &RadiusRange) -> Self {
        let inv_dp = 1.0 / dp;
        let cols = ((w - 1) as f64 * inv_dp).round() as usize + 1;
        let rows = ((h - 1) as f64 * inv_dp).round() as usize + 1;
        let mut votes = vec![0u32; cols * rows];

        let radii: Vec<f64> = range.radii().collect();

        for p in points {
            for &r in &radii {
                for sign in [1.0, -1.0] {
                    let ax = ((p.x + sign * p.dx * r) * inv_dp).round();
                    let ay = ((p.y + sign * p.dy * r) * inv_dp).round();
                    if ax < 0.0 || ay < 0.0 {
                        continue;
                    }
                    let (ax, ay) = (ax as usize, ay as usize);
                    if ax >= cols || ay >= rows {
                        continue;
                    }
                    votes[ay * cols + ax] += 1;
                }
            }
        }

        Self { cols, rows, votes }
    }

    /// Cells above `threshold` that beat their 4-neighbours, strongest first.
    ///
    /// Plateaus resolve to a single cell: strict comparison against the
    /// left/up neighbours, non-strict against right/down.
    fn peaks(&self, threshold: f64) -> Vec<CenterPeak> {
        let mut peaks = Vec::new();
        if self.cols < 3 || self.rows < 3 {
            return peaks;
        }
        let stride = self.cols;
        for row in 1..self.rows - 1 {
            for col in 1..self.cols - 1 {
                let idx = row * stride + col;
                let v = self.votes[idx];
                if (v as f64) <= threshold {
                    continue;
                }
                if v > self.votes[idx - 1]
                    && v >= self.votes[idx + 1]
                    && v > self.votes[idx - stride]
                    && v >= self.votes[idx + stride]
                {
                    peaks.push(CenterPeak { col, row, votes: v });
                }
            }
        }
        peaks.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(a.row.cmp(&b.row))
                .then(a.col.cmp(&b.col))
        });
        peaks
    }
}

fn collect_edge_points(edges: &GrayImage, gx: &GradientImage, gy: &GradientImage) -> Vec<EdgePoint> {
    let mut points = Vec::new();
    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        let gxv = gx.get_pixel(x, y)[0] as f64;
        let gyv = gy.get_pixel(x, y)[0] as f64;
        let mag = (gxv * gxv + gyv * gyv).sqrt();
        if mag < 1e-9 {
            continue;
        }
        points.push(EdgePoint {
            x: x as f64,
            y: y as f64,
            dx: gxv / mag,
            dy: gyv / mag,
        });
    }
    points
}

/// Radius with the most edge support around `(cx, cy)`, in 1-pixel bins.
///
/// Returns the mean distance of the winning bin and its support count.
fn best_radius(points: &[EdgePoint], cx: f64, cy: f64, range: &RadiusRange) -> Option<(f64, u32)> {
    let lo = range.min - 0.5;
    let hi = range.max + 0.5;
    let n_bins = range.steps;
    let mut counts = vec![0u32; n_bins];
    let mut sums = vec![0.0f64; n_bins];

    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        let d = (dx * dx + dy * dy).sqrt();
        if d < lo || d >= hi {
            continue;
        }
        let bin = ((d - lo).floor() as usize).min(n_bins - 1);
        counts[bin] += 1;
        sums[bin] += d;
    }

    let (best, &support) = counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
    if support == 0 {
        return None;
    }
    let radius = (sums[best] / support as f64).clamp(range.min, range.max);
    Some((radius, support))
}

/// Detect circular wells in a smoothed grayscale image.
///
/// Output is in emission order (strongest center first) and deterministic
/// for a given image and configuration. An image without edges, or too small
/// for the smallest radius, yields an empty list. An invalid configuration is
/// an error.
pub fn detect_circles(gray: &GrayImage, config: &HoughConfig) -> Result<Vec<Circle>, String> {
    config.validate()?;
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return Ok(Vec::new());
    }
    let Some(range) = RadiusRange::for_image(config, w, h) else {
        return Ok(Vec::new());
    };

    let low = (config.param1 / 2.0).max(1.0) as f32;
    let high = (config.param1 as f32).max(low);
    let edges = imageproc::edges::canny(gray, low, high);
    let gx = imageproc::gradients::horizontal_sobel(gray);
    let gy = imageproc::gradients::vertical_sobel(gray);

    let points = collect_edge_points(&edges, &gx, &gy);
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let accum = CenterAccumulator::vote(&points, w, h, config.dp, &range);
    let peaks = accum.peaks(config.param2);
    tracing::debug!(
        "hough: {} edge points, {} center peaks",
        points.len(),
        peaks.len()
    );

    let min_dist_sq = config.min_dist * config.min_dist;
    let mut circles: Vec<Circle> = Vec::new();
    for peak in peaks {
        let cx = peak.col as f64 * config.dp;
        let cy = peak.row as f64 * config.dp;
        let too_close = circles.iter().any(|c| {
            let dx = c.x - cx;
            let dy = c.y - cy;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }
        let Some((radius, support)) = best_radius(&points, cx, cy, &range) else {
            continue;
        };
        if (support as f64) <= config.param2 {
            continue;
        }
        if let Some(circle) = Circle::new(cx, cy, radius) {
            circles.push(circle);
        }
    }
    Ok(circles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{draw_disk_image, Disk};

    fn test_config() -> HoughConfig {
        HoughConfig {
            dp: 1.0,
            min_dist: 20.0,
            param1: 20.0,
            param2: 10.0,
            min_radius: 5.0,
            max_radius: 13.0,
        }
    }

    #[test]
    fn finds_single_bright_disk() {
        let img = draw_disk_image(80, 80, &[Disk::new(40.0, 40.0, 8.0, 220)], 20);
        let circles = detect_circles(&img, &test_config()).expect("valid config");
        assert!(!circles.is_empty(), "should find the disk");

        let best = circles[0];
        let err = ((best.x - 40.0).powi(2) + (best.y - 40.0).powi(2)).sqrt();
        assert!(err <= 1.5, "center ({}, {}) off by {}", best.x, best.y, err);
        assert!(
            (best.radius - 8.0).abs() <= 1.5,
            "radius {} should be near 8",
            best.radius
        );
    }

    #[test]
    fn finds_every_well_of_small_array() {
        let mut disks = Vec::new();
        for i in 0..2 {
            for j in 0..2 {
                disks.push(Disk::new(25.0 + 40.0 * i as f32, 25.0 + 40.0 * j as f32, 8.0, 200));
            }
        }
        let img = draw_disk_image(90, 90, &disks, 10);
        let cfg = HoughConfig {
            min_dist: 25.0,
            ..test_config()
        };
        let circles = detect_circles(&img, &cfg).expect("valid config");
        assert_eq!(circles.len(), 4, "got {:?}", circles);
        for d in &disks {
            let hit = circles.iter().any(|c| {
                (c.x - d.cx as f64).abs() <= 1.5 && (c.y - d.cy as f64).abs() <= 1.5
            });
            assert!(hit, "missing disk at ({}, {})", d.cx, d.cy);
        }
    }

    #[test]
    fn accepted_centers_respect_min_dist() {
        let disks = [
            Disk::new(30.0, 30.0, 7.0, 200),
            Disk::new(45.0, 30.0, 7.0, 200),
        ];
        let img = draw_disk_image(80, 60, &disks, 10);
        let cfg = HoughConfig {
            min_dist: 25.0,
            ..test_config()
        };
        let circles = detect_circles(&img, &cfg).expect("valid config");
        for (i, a) in circles.iter().enumerate() {
            for b in &circles[i + 1..] {
                assert!(a.center_dist_sq(b).sqrt() >= 25.0);
            }
        }
    }

    #[test]
    fn flat_image_has_no_circles() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        assert!(detect_circles(&img, &test_config())
            .expect("valid config")
            .is_empty());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let img = draw_disk_image(80, 80, &[Disk::new(40.0, 40.0, 8.0, 220)], 20);
        let cfg = HoughConfig {
            dp: 0.0,
            ..test_config()
        };
        let err = detect_circles(&img, &cfg).expect_err("expected error");
        assert!(err.contains("hough.dp"));
    }

    #[test]
    fn huge_max_radius_is_capped_at_image_diagonal() {
        let img = draw_disk_image(80, 80, &[Disk::new(40.0, 40.0, 8.0, 220)], 20);
        let cfg = HoughConfig {
            max_radius: 1e17,
            ..test_config()
        };
        let range = RadiusRange::for_image(&cfg, 80, 80).expect("range");
        assert!(range.max <= 80.0f64.hypot(80.0));
        assert_eq!(range.radii().count(), range.steps);
        assert!(detect_circles(&img, &cfg).is_ok());
    }

    #[test]
    fn min_radius_beyond_image_finds_nothing() {
        let img = draw_disk_image(40, 40, &[Disk::new(20.0, 20.0, 8.0, 220)], 20);
        let cfg = HoughConfig {
            min_radius: 100.0,
            max_radius: 200.0,
            ..test_config()
        };
        assert!(detect_circles(&img, &cfg)
            .expect("valid config")
            .is_empty());
    }

    #[test]
    fn peaks_break_plateaus_once() {
        let accum = CenterAccumulator {
            cols: 4,
            rows: 3,
            votes: vec![0, 0, 0, 0, 0, 9, 9, 0, 0, 0, 0, 0],
        };
        let peaks = accum.peaks(5.0);
        assert_eq!(peaks, vec![CenterPeak { col: 1, row: 1, votes: 9 }]);
    }
}
