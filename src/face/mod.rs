//! Face geometry: points, the face box, and the heuristic landmark detector.

pub mod landmarks;

pub use landmarks::{LandmarkParams, detect_landmarks, locate_in_mask, sanitize_chin_y};

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn rescaled(self, inv_x: f32, inv_y: f32, width: u32, height: u32) -> Self {
        Self {
            x: (self.x * inv_x).clamp(0.0, width.saturating_sub(1) as f32),
            y: (self.y * inv_y).clamp(0.0, height.saturating_sub(1) as f32),
        }
    }
}

/// Axis-aligned face bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl FaceBox {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Pixel bounds `(x0, y0, x1, y1)` (end-exclusive) of the box grown by
    /// `margin` on every side and clamped to a `width` x `height` image.
    pub fn padded_bounds(&self, margin: f32, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x0 = (self.x - margin).floor().clamp(0.0, width as f32) as u32;
        let y0 = (self.y - margin).floor().clamp(0.0, height as f32) as u32;
        let x1 = (self.x + self.w + margin).ceil().clamp(0.0, width as f32) as u32;
        let y1 = (self.y + self.h + margin).ceil().clamp(0.0, height as f32) as u32;
        (x0, y0, x1.max(x0), y1.max(y0))
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Approximate facial anchor points. "Left" and "right" refer to image
/// coordinates (smaller x is left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    pub face: FaceBox,
    pub left_eye: Point,
    pub right_eye: Point,
    pub nose: Point,
    pub mouth: Point,
    pub chin: Point,
    pub left_cheek: Point,
    pub right_cheek: Point,
    pub left_jaw: Point,
    pub right_jaw: Point,
}

impl Landmarks {
    pub fn points(&self) -> [(&'static str, Point); 9] {
        [
            ("left_eye", self.left_eye),
            ("right_eye", self.right_eye),
            ("nose", self.nose),
            ("mouth", self.mouth),
            ("chin", self.chin),
            ("left_cheek", self.left_cheek),
            ("right_cheek", self.right_cheek),
            ("left_jaw", self.left_jaw),
            ("right_jaw", self.right_jaw),
        ]
    }

    /// Map landmarks found on a downscaled copy back to source pixels and
    /// clamp every coordinate into the `width` x `height` image.
    pub fn rescaled(&self, scale_x: f32, scale_y: f32, width: u32, height: u32) -> Self {
        let inv_x = 1.0 / scale_x;
        let inv_y = 1.0 / scale_y;
        let p = |pt: Point| pt.rescaled(inv_x, inv_y, width, height);

        let x = (self.face.x * inv_x).clamp(0.0, width as f32);
        let y = (self.face.y * inv_y).clamp(0.0, height as f32);
        let face = FaceBox {
            x,
            y,
            w: (self.face.w * inv_x).min(width as f32 - x),
            h: (self.face.h * inv_y).min(height as f32 - y),
        };

        Self {
            face,
            left_eye: p(self.left_eye),
            right_eye: p(self.right_eye),
            nose: p(self.nose),
            mouth: p(self.mouth),
            chin: p(self.chin),
            left_cheek: p(self.left_cheek),
            right_cheek: p(self.right_cheek),
            left_jaw: p(self.left_jaw),
            right_jaw: p(self.right_jaw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_bounds_are_clamped() {
        let b = FaceBox::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(b.padded_bounds(5.0, 100, 100), (5, 5, 35, 35));
        assert_eq!(b.padded_bounds(50.0, 40, 30), (0, 0, 40, 30));
    }

    #[test]
    fn rescale_maps_back_and_clamps() {
        let pt = Point::new(10.0, 20.0);
        let lm = Landmarks {
            face: FaceBox::new(5.0, 5.0, 40.0, 40.0),
            left_eye: pt,
            right_eye: pt,
            nose: pt,
            mouth: pt,
            chin: Point::new(10.0, 60.0),
            left_cheek: pt,
            right_cheek: pt,
            left_jaw: pt,
            right_jaw: pt,
        };
        let big = lm.rescaled(0.5, 0.5, 100, 100);
        assert_eq!(big.nose, Point::new(20.0, 40.0));
        assert_eq!(big.chin, Point::new(20.0, 99.0));
        assert_eq!(big.face, FaceBox::new(10.0, 10.0, 80.0, 80.0));
    }
}
