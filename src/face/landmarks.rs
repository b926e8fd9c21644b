//! Model-free landmark heuristic.
//!
//! The face is taken to be the bounding box of confident skin pixels on a
//! downscaled copy of the image. Eyes, nose and mouth are placed by fixed
//! proportions of that box; chin, cheeks and jaw are refined by scanning the
//! skin mask for the skin/background transition.

use image::RgbaImage;

use super::{FaceBox, Landmarks, Point};
use crate::color::SkinMask;
use crate::image_io::downscale_for_detection;

/// Tuning constants of the landmark heuristic. Fractions are relative to the
/// skin bounding box unless noted otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkParams {
    /// Long-edge limit of the detection copy, in pixels.
    pub max_detect_dim: u32,
    /// Probability above which a pixel counts toward the face box.
    pub skin_threshold: f32,
    /// Minimum face box width at detection resolution.
    pub min_face_width: f32,

    pub eye_y: f32,
    pub left_eye_x: f32,
    pub right_eye_x: f32,
    pub nose_y: f32,
    pub mouth_y: f32,

    /// Chin rays start this fraction of face height below the mouth.
    pub chin_scan_offset: f32,
    /// Horizontal offset of the two side rays, as a fraction of face width.
    pub chin_ray_spread: f32,
    /// Pixels that must stay below `reentry_prob` after a chin exit.
    pub chin_lookahead: i64,
    pub chin_ratio_min: f32,
    pub chin_ratio_max: f32,
    /// Mouth-to-chin distance, in nose-to-mouth units, used when the scan is
    /// implausible.
    pub chin_ratio_fallback: f32,

    /// Probability below which a scan leaves the skin region.
    pub exit_prob: f32,
    /// Probability above which a chin exit is considered a false exit.
    pub reentry_prob: f32,

    /// Cheek row, as a fraction of the eye-to-nose distance.
    pub cheek_scan_t: f32,
    pub cheek_inset: f32,
    /// Jaw row, as a fraction of the mouth-to-chin distance.
    pub jaw_scan_t: f32,
    /// Fraction of the cheek-to-chin horizontal distance used for a failed jaw scan.
    pub jaw_fallback_t: f32,
    /// Jaw hits this close (in pixels) to the box edge count as failures.
    pub jaw_edge_slack: i64,
}

impl Default for LandmarkParams {
    fn default() -> Self {
        Self {
            max_detect_dim: 200,
            skin_threshold: 0.6,
            min_face_width: 20.0,

            eye_y: 0.38,
            left_eye_x: 0.30,
            right_eye_x: 0.70,
            nose_y: 0.60,
            mouth_y: 0.75,

            chin_scan_offset: 0.12,
            chin_ray_spread: 0.15,
            chin_lookahead: 5,
            chin_ratio_min: 0.8,
            chin_ratio_max: 2.8,
            chin_ratio_fallback: 1.8,

            exit_prob: 0.3,
            reentry_prob: 0.4,

            cheek_scan_t: 0.5,
            cheek_inset: 0.15,
            jaw_scan_t: 0.55,
            jaw_fallback_t: 0.3,
            jaw_edge_slack: 2,
        }
    }
}

/// Detect landmarks on a full-resolution image. Returns `None` when no
/// plausible face region is found.
pub fn detect_landmarks(img: &RgbaImage, params: &LandmarkParams) -> Option<Landmarks> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let small = downscale_for_detection(img, params.max_detect_dim);
    let mask = SkinMask::from_image(&small.image);
    let found = locate_in_mask(&mask, params)?;
    Some(found.rescaled(small.scale_x, small.scale_y, img.width(), img.height()))
}

/// Run the heuristic directly on a skin mask. Coordinates are in mask pixels.
pub fn locate_in_mask(mask: &SkinMask, params: &LandmarkParams) -> Option<Landmarks> {
    let w = mask.width() as i64;
    let h = mask.height() as i64;

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (w, -1i64, h, -1i64);
    for y in 0..h {
        for x in 0..w {
            if mask.get(x, y) > params.skin_threshold {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }
    if max_x < 0 {
        log::debug!("landmarks: no confident skin pixels");
        return None;
    }
    let face_w = (max_x - min_x) as f32;
    let face_h = (max_y - min_y) as f32;
    if face_w < params.min_face_width {
        log::debug!("landmarks: skin region too narrow ({face_w}px)");
        return None;
    }

    let (left, top) = (min_x as f32, min_y as f32);
    let center_x = left + face_w / 2.0;

    let eyes_y = top + face_h * params.eye_y;
    let left_eye = Point::new(left + face_w * params.left_eye_x, eyes_y);
    let right_eye = Point::new(left + face_w * params.right_eye_x, eyes_y);
    let nose = Point::new(center_x, top + face_h * params.nose_y);
    let mouth = Point::new(center_x, top + face_h * params.mouth_y);

    // Chin: deepest of three confirmed downward exits
    let start_y = (mouth.y + face_h * params.chin_scan_offset).floor() as i64;
    let spread = face_w * params.chin_ray_spread;
    let raw_chin_y = [center_x, center_x - spread, center_x + spread]
        .iter()
        .map(|&x| scan_chin_ray(mask, x.floor() as i64, start_y, max_y, params))
        .max()
        .unwrap_or(max_y);
    let chin_y = sanitize_chin_y(nose.y, mouth.y, raw_chin_y as f32, params);
    let chin = Point::new(center_x, chin_y);

    let center_col = center_x.floor() as i64;

    let cheek_y = clamp_row(eyes_y + (nose.y - eyes_y) * params.cheek_scan_t, h);
    let cheek_left_x = scan_outward(mask, cheek_y, center_col, -1, min_x, params.exit_prob)
        .map(|x| x as f32)
        .unwrap_or(left + face_w * params.cheek_inset);
    let cheek_right_x = scan_outward(mask, cheek_y, center_col, 1, max_x, params.exit_prob)
        .map(|x| x as f32)
        .unwrap_or(max_x as f32 - face_w * params.cheek_inset);

    let jaw_y = clamp_row(mouth.y + (chin_y - mouth.y) * params.jaw_scan_t, h);
    let jaw_left_x = scan_outward(mask, jaw_y, center_col, -1, min_x, params.exit_prob)
        .filter(|&x| x > min_x + params.jaw_edge_slack)
        .map(|x| x as f32)
        .unwrap_or(cheek_left_x + (chin.x - cheek_left_x) * params.jaw_fallback_t);
    let jaw_right_x = scan_outward(mask, jaw_y, center_col, 1, max_x, params.exit_prob)
        .filter(|&x| x < max_x - params.jaw_edge_slack)
        .map(|x| x as f32)
        .unwrap_or(cheek_right_x + (chin.x - cheek_right_x) * params.jaw_fallback_t);

    Some(Landmarks {
        face: FaceBox::new(left, top, face_w, face_h),
        left_eye,
        right_eye,
        nose,
        mouth,
        chin,
        left_cheek: Point::new(cheek_left_x, cheek_y as f32),
        right_cheek: Point::new(cheek_right_x, cheek_y as f32),
        left_jaw: Point::new(jaw_left_x, jaw_y as f32),
        right_jaw: Point::new(jaw_right_x, jaw_y as f32),
    })
}

/// Anthropometric check on a scanned chin position: the mouth-to-chin
/// distance must lie within `[chin_ratio_min, chin_ratio_max]` times the
/// nose-to-mouth distance, otherwise it is reset to `chin_ratio_fallback`
/// times that distance below the mouth.
pub fn sanitize_chin_y(nose_y: f32, mouth_y: f32, chin_y: f32, params: &LandmarkParams) -> f32 {
    let nose_to_mouth = (mouth_y - nose_y).abs();
    let mouth_to_chin = (chin_y - mouth_y).abs();
    if mouth_to_chin > nose_to_mouth * params.chin_ratio_max
        || mouth_to_chin < nose_to_mouth * params.chin_ratio_min
    {
        mouth_y + nose_to_mouth * params.chin_ratio_fallback
    } else {
        chin_y
    }
}

fn clamp_row(y: f32, height: i64) -> i64 {
    (y.floor() as i64).clamp(0, (height - 1).max(0))
}

/// Walk down column `x` from `start_y` and return the first row where skin
/// ends and does not resume within the look-ahead window. Returns `default_y`
/// when the ray never leaves skin or starts outside the mask.
fn scan_chin_ray(mask: &SkinMask, x: i64, start_y: i64, default_y: i64, params: &LandmarkParams) -> i64 {
    let w = mask.width() as i64;
    let h = mask.height() as i64;
    if x < 0 || x >= w || start_y >= h {
        return default_y;
    }

    for y in start_y.max(0)..h {
        if mask.get(x, y) >= params.exit_prob {
            continue;
        }
        let confirmed = (1..=params.chin_lookahead)
            .map(|k| y + k)
            .take_while(|&ly| ly < h)
            .all(|ly| mask.get(x, ly) <= params.reentry_prob);
        if confirmed {
            return y;
        }
    }
    default_y
}

/// Scan row `y` from `from_x` in direction `step` (±1) up to and including
/// `limit_x`, returning the first column whose probability drops below
/// `exit_prob`.
fn scan_outward(mask: &SkinMask, y: i64, from_x: i64, step: i64, limit_x: i64, exit_prob: f32) -> Option<i64> {
    let mut x = from_x;
    loop {
        if mask.get(x, y) < exit_prob {
            return Some(x);
        }
        if x == limit_x {
            return None;
        }
        x += step;
    }
}
