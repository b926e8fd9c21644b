//! Blemish detection and healing.
//!
//! Automatic detection compares a lightly blurred "detail" view against a
//! heavily blurred "clean" view: a spot that is darker (and usually redder)
//! than its surroundings stands out in the difference. Detected spots are
//! blended toward a "healed" view that carries a little grain so the patch
//! does not look plastic.

use image::{RgbaImage, imageops};
use rand::Rng;

use crate::color::{YCbCr, rgb_to_ycbcr, to_u8};
use crate::filter::{add_grain, gaussian_blur};

const CLEAN_RADIUS: f32 = 16.0;
const DETAIL_RADIUS: f32 = 4.0;
const HEALED_RADIUS: f32 = 12.0;
const HEALED_GRAIN: f32 = 10.0;

const SHADOW_LUMA: f32 = 50.0;
const LIP_CR: f32 = 150.0;
const LIP_CB: f32 = 120.0;
const EDGE_LIMIT: u8 = 40;

const MIN_DARKENING: f32 = 5.0;
const MOLE_DARKENING: f32 = 45.0;
const MIN_REDNESS: f32 = 2.0;
const PLAIN_DARK_RANGE: (f32, f32) = (10.0, 35.0);
const SCORE_THRESHOLD: f32 = 15.0;
const SCORE_RAMP: f32 = 30.0;

const MANUAL_RADIUS_FRACTION: f32 = 0.008;
const MANUAL_MIN_RADIUS: f32 = 3.0;
const MANUAL_BLUR_FRACTION: f32 = 0.6;
const MANUAL_GRAIN: f32 = 4.0;
/// Fraction of the heal radius that is fully replaced.
const MANUAL_CORE: f32 = 0.7;

/// Read-only blurred views used by automatic detection.
pub struct BlemishLayers {
    pub clean: RgbaImage,
    pub detail: RgbaImage,
    pub healed: RgbaImage,
}

impl BlemishLayers {
    pub fn build<R: Rng + ?Sized>(img: &RgbaImage, rng: &mut R) -> Self {
        let ((clean, detail), mut healed) = rayon::join(
            || {
                rayon::join(
                    || gaussian_blur(img, CLEAN_RADIUS),
                    || gaussian_blur(img, DETAIL_RADIUS),
                )
            },
            || gaussian_blur(img, HEALED_RADIUS),
        );
        add_grain(&mut healed, HEALED_GRAIN, rng);
        Self {
            clean,
            detail,
            healed,
        }
    }
}

/// Whether a pixel may be considered for automatic healing at all: not in
/// shadow, not lip-colored, and not on a strong edge (eyes, brows, hair).
pub fn is_candidate(pixel: YCbCr, edge: u8) -> bool {
    let is_lips = pixel.cr > LIP_CR && pixel.cb < LIP_CB;
    pixel.y > SHADOW_LUMA && !is_lips && edge <= EDGE_LIMIT
}

/// Blemish score from the detail and clean views of one pixel. Zero means
/// "not a blemish".
pub fn blemish_score(detail: [u8; 3], clean: [u8; 3]) -> f32 {
    let d = rgb_to_ycbcr(detail[0] as f32, detail[1] as f32, detail[2] as f32);
    let c = rgb_to_ycbcr(clean[0] as f32, clean[1] as f32, clean[2] as f32);

    let darkening = c.y - d.y;
    let redness = d.cr - c.cr;
    if darkening <= MIN_DARKENING || darkening > MOLE_DARKENING {
        return 0.0;
    }
    if redness > MIN_REDNESS {
        redness * 3.0 + darkening
    } else if darkening > PLAIN_DARK_RANGE.0 && darkening < PLAIN_DARK_RANGE.1 {
        darkening * 1.5
    } else {
        0.0
    }
}

/// Blend factor toward the healed view for a score, weighted by skin probability.
pub fn heal_factor(score: f32, skin: f32) -> f32 {
    if score <= SCORE_THRESHOLD {
        return 0.0;
    }
    ((score - SCORE_THRESHOLD) / SCORE_RAMP).min(1.0) * skin
}

/// Radius of a manual heal spot for a `width` x `height` image.
pub fn manual_heal_radius(width: u32, height: u32) -> f32 {
    (width.min(height) as f32 * MANUAL_RADIUS_FRACTION).max(MANUAL_MIN_RADIUS)
}

/// Compositing weight at distance `d` from a heal center: 1 in the core,
/// smoothstep down to 0 at the heal radius.
pub fn heal_alpha(d: f32, radius: f32) -> f32 {
    let core = radius * MANUAL_CORE;
    if d <= core {
        1.0
    } else if d >= radius {
        0.0
    } else {
        let t = (radius - d) / (radius - core);
        t * t * (3.0 - 2.0 * t)
    }
}

/// Heal a spot centered at (`cx`, `cy`) in pixel coordinates: blur the
/// surrounding patch twice, add matching grain, and composite it back with a
/// soft circular mask. A non-finite center is ignored.
pub fn heal_spot<R: Rng + ?Sized>(img: &mut RgbaImage, cx: f32, cy: f32, rng: &mut R) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || !cx.is_finite() || !cy.is_finite() {
        return;
    }
    let radius = manual_heal_radius(w, h);
    let cx = cx.clamp(0.0, (w - 1) as f32);
    let cy = cy.clamp(0.0, (h - 1) as f32);

    let sx = (cx - radius).floor().max(0.0) as u32;
    let sy = (cy - radius).floor().max(0.0) as u32;
    let span = (radius * 2.0).ceil() as u32 + 1;
    let sw = span.min(w - sx);
    let sh = span.min(h - sy);
    if sw == 0 || sh == 0 {
        return;
    }

    let blur_radius = radius * MANUAL_BLUR_FRACTION;
    let patch = imageops::crop_imm(&*img, sx, sy, sw, sh).to_image();
    let mut patch = gaussian_blur(&gaussian_blur(&patch, blur_radius), blur_radius);
    add_grain(&mut patch, MANUAL_GRAIN, rng);

    for py in 0..sh {
        for px in 0..sw {
            let (x, y) = (sx + px, sy + py);
            let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            let alpha = heal_alpha(d, radius);
            if alpha <= 0.0 {
                continue;
            }
            let src = *patch.get_pixel(px, py);
            let dst = img.get_pixel_mut(x, y);
            for c in 0..3 {
                let v = dst[c] as f32 * (1.0 - alpha) + src[c] as f32 * alpha;
                dst[c] = to_u8(v);
            }
        }
    }
}
