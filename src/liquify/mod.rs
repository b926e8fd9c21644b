//! Localized radial warping ("liquify").
//!
//! Every destination pixel inside the processed region looks up its source
//! position (reverse mapping), so the output never has unfilled gaps.

pub mod fields;

pub use fields::build_warp_field;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::face::{FaceBox, Point};

/// Padding around the face box, as a fraction of the larger image dimension.
pub const REGION_MARGIN: f32 = 0.15;

/// One radial displacement: pixels within `radius` of `center` are pulled by
/// up to (`dx`, `dy`) with a smooth falloff toward the rim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarpPoint {
    pub center: Point,
    pub radius: f32,
    pub dx: f32,
    pub dy: f32,
}

impl WarpPoint {
    pub const fn new(x: f32, y: f32, radius: f32, dx: f32, dy: f32) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
            dx,
            dy,
        }
    }

    fn is_active(&self) -> bool {
        self.radius.is_finite()
            && self.radius > 0.0
            && self.dx.is_finite()
            && self.dy.is_finite()
            && (self.dx != 0.0 || self.dy != 0.0)
    }

    /// Falloff weight `(1 - (d/r)^2)^2` at (x, y), zero outside the radius.
    #[inline]
    pub fn weight_at(&self, x: f32, y: f32) -> f32 {
        let ddx = x - self.center.x;
        let ddy = y - self.center.y;
        let dist_sq = ddx * ddx + ddy * ddy;
        let rad_sq = self.radius * self.radius;
        if dist_sq >= rad_sq {
            return 0.0;
        }
        let t = 1.0 - dist_sq / rad_sq;
        t * t
    }
}

/// Total displacement at (x, y); overlapping fields add.
fn displacement_at(warps: &[WarpPoint], x: f32, y: f32) -> (f32, f32) {
    warps.iter().fold((0.0, 0.0), |(ax, ay), w| {
        let f = w.weight_at(x, y);
        (ax + w.dx * f, ay + w.dy * f)
    })
}

/// Bilinear sample of all four channels at a fractional position. The
/// position is clamped to the image, and integer positions return the exact
/// source pixel.
pub fn bilinear_sample(img: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (w, h) = img.dimensions();
    let max_x = w.saturating_sub(1) as f32;
    let max_y = h.saturating_sub(1) as f32;
    let sx = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
    let sy = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };

    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(w.saturating_sub(1));
    let y1 = (y0 + 1).min(h.saturating_sub(1));
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let tl = img.get_pixel(x0, y0);
    let tr = img.get_pixel(x1, y0);
    let bl = img.get_pixel(x0, y1);
    let br = img.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = tl[c] as f32 * (1.0 - fx) + tr[c] as f32 * fx;
        let bottom = bl[c] as f32 * (1.0 - fx) + br[c] as f32 * fx;
        out[c] = crate::color::to_u8(top * (1.0 - fy) + bottom * fy);
    }
    Rgba(out)
}

/// Apply `warps` inside the face box padded by [`REGION_MARGIN`]. Pixels
/// outside that region are copied unchanged. Returns a new image.
pub fn apply_liquify(src: &RgbaImage, face: &FaceBox, warps: &[WarpPoint]) -> RgbaImage {
    let mut dst = src.clone();
    let active: Vec<WarpPoint> = warps.iter().copied().filter(WarpPoint::is_active).collect();
    if active.is_empty() || src.width() == 0 || src.height() == 0 {
        return dst;
    }

    let (w, h) = src.dimensions();
    let margin = w.max(h) as f32 * REGION_MARGIN;
    let (x0, y0, x1, y1) = face.padded_bounds(margin, w, h);
    log::debug!(
        "liquify: {} warp points over region ({x0},{y0})-({x1},{y1})",
        active.len()
    );

    let stride = w as usize * 4;
    let out: &mut [u8] = &mut dst;
    out.par_chunks_mut(stride)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(y, row)| {
            let fy = y as f32;
            for x in x0..x1 {
                let fx = x as f32;
                let (dx, dy) = displacement_at(&active, fx, fy);
                if dx == 0.0 && dy == 0.0 {
                    continue;
                }
                let px = bilinear_sample(src, fx - dx, fy - dy);
                let i = x as usize * 4;
                row[i..i + 4].copy_from_slice(&px.0);
            }
        });

    dst
}
