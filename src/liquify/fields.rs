//! Translate shape sliders into warp points around detected landmarks.
//!
//! Displacements are expressed as fractions of the face box so the same
//! slider value produces a proportional edit at any resolution. Positive
//! values pull toward the face center (or upward); negative values reverse
//! the direction.

use super::WarpPoint;
use crate::beauty::config::ShapeValues;
use crate::face::Landmarks;

/// Largest slim / v-line displacement, as a fraction of face width.
const CONTOUR_MAX_DISP: f32 = 0.05;
const NOSE_WIDTH: f32 = 0.12;

/// Build the ordered warp field for `shape`. Sliders at zero contribute no
/// points, so an all-zero shape yields an empty field.
pub fn build_warp_field(lm: &Landmarks, shape: &ShapeValues) -> Vec<WarpPoint> {
    let face_w = lm.face.w;
    let face_h = lm.face.h;
    let mut warps = Vec::new();

    if shape.slim != 0.0 {
        let s = shape.slim / 100.0 * face_w * CONTOUR_MAX_DISP;
        let (cl, cr) = (lm.left_cheek, lm.right_cheek);
        let (jl, jr) = (lm.left_jaw, lm.right_jaw);
        warps.push(WarpPoint::new(cl.x, cl.y, face_w * 0.2, s * 0.8, 0.0));
        warps.push(WarpPoint::new(cr.x, cr.y, face_w * 0.2, -s * 0.8, 0.0));
        warps.push(WarpPoint::new(jl.x, jl.y, face_w * 0.25, s, -s * 0.2));
        warps.push(WarpPoint::new(jr.x, jr.y, face_w * 0.25, -s, -s * 0.2));
    }

    if shape.v_line != 0.0 {
        let s = shape.v_line / 100.0 * face_w * CONTOUR_MAX_DISP;
        let jaw_y = lm.left_jaw.y * 0.9 + lm.chin.y * 0.1;
        let inset = face_w * 0.05;
        warps.push(WarpPoint::new(lm.left_jaw.x + inset, jaw_y, face_w * 0.2, s, -s * 0.2));
        warps.push(WarpPoint::new(lm.right_jaw.x - inset, jaw_y, face_w * 0.2, -s, -s * 0.2));

        let side_y = lm.chin.y - face_h * 0.05;
        let side_dx = face_w * 0.15;
        warps.push(WarpPoint::new(lm.chin.x - side_dx, side_y, face_w * 0.12, s * 0.5, -s * 0.1));
        warps.push(WarpPoint::new(lm.chin.x + side_dx, side_y, face_w * 0.12, -s * 0.5, -s * 0.1));
    }

    if shape.chin_shrink != 0.0 {
        let chin_to_mouth = (lm.chin.y - lm.mouth.y).abs().max(10.0);
        let radius = chin_to_mouth * 1.2;
        let anchor_y = lm.chin.y + radius * 0.2;
        let s = shape.chin_shrink * face_h * 0.001;
        warps.push(WarpPoint::new(lm.chin.x, anchor_y, radius, 0.0, -s));
    }

    if shape.forehead != 0.0 {
        let s = shape.forehead * face_h * 0.0008;
        let forehead_y = lm.face.y + face_h * 0.1;
        warps.push(WarpPoint::new(lm.nose.x, forehead_y, face_w * 0.5, 0.0, s));
    }

    if shape.jaw != 0.0 {
        let s = shape.jaw * face_w * 0.0006;
        let (jl, jr) = (lm.left_jaw, lm.right_jaw);
        warps.push(WarpPoint::new(jl.x, jl.y, face_w * 0.18, s, -s * 0.3));
        warps.push(WarpPoint::new(jr.x, jr.y, face_w * 0.18, -s, -s * 0.3));
    }

    let nose_w = face_w * NOSE_WIDTH;
    if shape.nose_slim != 0.0 {
        let s = shape.nose_slim * face_w * 0.0004;
        let n = lm.nose;
        warps.push(WarpPoint::new(n.x - nose_w, n.y, nose_w * 0.8, s, 0.0));
        warps.push(WarpPoint::new(n.x + nose_w, n.y, nose_w * 0.8, -s, 0.0));
    }

    if shape.nose_bridge != 0.0 {
        let s = shape.nose_bridge * face_w * 0.0005;
        let bridge_y = lm.nose.y - face_h * 0.15;
        let n = lm.nose;
        warps.push(WarpPoint::new(n.x - nose_w * 0.5, bridge_y, nose_w * 0.7, s, 0.0));
        warps.push(WarpPoint::new(n.x + nose_w * 0.5, bridge_y, nose_w * 0.7, -s, 0.0));
    }

    warps
}
