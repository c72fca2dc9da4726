//! Shared test utilities for image-based unit tests.

use image::{GrayImage, Luma};

/// A filled disk to render into a synthetic image.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Disk {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub value: u8,
}

impl Disk {
    pub(crate) fn new(cx: f32, cy: f32, radius: f32, value: u8) -> Self {
        Self {
            cx,
            cy,
            radius,
            value,
        }
    }
}

/// Render filled disks over a uniform background.
///
/// A pixel at distance `d <= radius` from a disk center takes that disk's
/// value; later disks overwrite earlier ones.
pub(crate) fn draw_disk_image(w: u32, h: u32, disks: &[Disk], bg_pix: u8) -> GrayImage {
    let mut img = GrayImage::from_pixel(w, h, Luma([bg_pix]));
    for y in 0..h {
        for x in 0..w {
            for d in disks {
                let dx = x as f32 - d.cx;
                let dy = y as f32 - d.cy;
                if (dx * dx + dy * dy).sqrt() <= d.radius {
                    img.put_pixel(x, y, Luma([d.value]));
                }
            }
        }
    }
    img
}

/// Render an `n × n` well array starting at `origin` with uniform `spacing`.
///
/// `well_value(i, j)` gives the fill of the well in column `i`, row `j`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_well_array(
    w: u32,
    h: u32,
    origin: [f32; 2],
    spacing: f32,
    n: usize,
    radius: f32,
    bg_pix: u8,
    well_value: impl Fn(usize, usize) -> u8,
) -> GrayImage {
    let mut disks = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            disks.push(Disk::new(
                origin[0] + spacing * i as f32,
                origin[1] + spacing * j as f32,
                radius,
                well_value(i, j),
            ));
        }
    }
    draw_disk_image(w, h, &disks, bg_pix)
}
