//! Per-pixel skin retouch: blemish heal, smoothing, tonal edits and grain.

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::blemish::{self, BlemishLayers};
use super::config::{BeautyConfig, SkinValues};
use crate::color::{SkinMask, YCbCr, rgb_to_ycbcr, to_u8, ycbcr_to_rgb};
use crate::filter::EdgeMap;

/// Pixels with a lower skin probability are never touched.
pub const MASK_THRESHOLD: f32 = 0.1;

const WHITEN_GAIN: f32 = 40.0;
const EVEN_GAIN: f32 = 0.5;
const GLOW_KNEE: f32 = 180.0;
const GLOW_GAIN: f32 = 0.8;
const TEXTURE_GAIN: f32 = 0.3;

/// Odd 64-bit constant used to spread per-row seeds.
const ROW_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

#[inline]
fn rgb_f32(px: &[u8]) -> [f32; 3] {
    [px[0] as f32, px[1] as f32, px[2] as f32]
}

/// Edge-preserving blend toward the blurred pixel. Pixels whose summed channel
/// difference reaches `threshold` are treated as detail and left as is.
pub fn smooth_pixel(rgb: [f32; 3], blurred: [f32; 3], strength: f32, skin: f32, threshold: f32) -> [f32; 3] {
    let diff: f32 = (0..3).map(|c| (rgb[c] - blurred[c]).abs()).sum();
    if diff >= threshold || strength <= 0.0 {
        return rgb;
    }
    let alpha = strength / 100.0 * skin * (1.0 - diff / threshold);
    lerp_rgb(rgb, blurred, alpha)
}

/// Brighten luma with a log curve so dark pixels gain relatively more.
pub fn whiten_luma(y: f32, strength: f32) -> f32 {
    if strength <= 0.0 {
        return y;
    }
    (y + (y + 1.0).log10() * strength / 100.0 * WHITEN_GAIN).min(255.0)
}

/// Pull chroma toward the average skin tone `target` (Cb, Cr).
pub fn even_chroma(c: YCbCr, target: (f32, f32), strength: f32, skin: f32) -> YCbCr {
    if strength <= 0.0 {
        return c;
    }
    let s = strength / 100.0 * skin * EVEN_GAIN;
    YCbCr {
        y: c.y,
        cb: c.cb + (target.0 - c.cb) * s,
        cr: c.cr + (target.1 - c.cr) * s,
    }
}

/// Lift highlights above the glow knee.
pub fn glow_luma(y: f32, strength: f32) -> f32 {
    if strength <= 0.0 || y <= GLOW_KNEE {
        return y;
    }
    (y + (y - GLOW_KNEE) * strength / 100.0 * GLOW_GAIN).min(255.0)
}

fn has_tone_edits(v: &SkinValues) -> bool {
    v.whiten > 0.0 || v.even > 0.0 || v.dewy_glow > 0.0
}

/// Read-only inputs of one retouch pass. Every buffer has the dimensions of
/// the image being retouched.
pub struct RetouchLayers<'a> {
    pub mask: &'a SkinMask,
    pub smooth: Option<&'a RgbaImage>,
    pub blemish: Option<(&'a BlemishLayers, &'a EdgeMap)>,
    /// Mean (Cb, Cr) of confident skin pixels.
    pub tone_target: (f32, f32),
}

/// Retouch every skin pixel of `img` in place. Rows run in parallel, each with
/// its own RNG derived from `seed`, so output is reproducible for a fixed seed.
pub fn retouch_skin(img: &mut RgbaImage, layers: &RetouchLayers<'_>, config: &BeautyConfig, seed: u64) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let values = config.skin_values;
    let threshold = config.skin_mode.detail_threshold();
    let tone = has_tone_edits(&values);
    let texture_amp = values.texture * TEXTURE_GAIN;
    let stride = w as usize * 4;

    let buf: &mut [u8] = img;
    buf.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add((y as u64).wrapping_mul(ROW_SEED_STEP)));
        let mask_row = &layers.mask.as_slice()[y * w as usize..(y + 1) * w as usize];

        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let skin = mask_row[x];
            if skin <= MASK_THRESHOLD {
                continue;
            }
            let (ux, uy) = (x as u32, y as u32);
            let mut rgb = rgb_f32(px);

            if let Some((bl, edges)) = layers.blemish {
                let here = rgb_to_ycbcr(rgb[0], rgb[1], rgb[2]);
                if blemish::is_candidate(here, edges.get(ux, uy)) {
                    let detail = bl.detail.get_pixel(ux, uy);
                    let clean = bl.clean.get_pixel(ux, uy);
                    let score = blemish::blemish_score(
                        [detail[0], detail[1], detail[2]],
                        [clean[0], clean[1], clean[2]],
                    );
                    let f = blemish::heal_factor(score, skin);
                    if f > 0.0 {
                        rgb = lerp_rgb(rgb, rgb_f32(&bl.healed.get_pixel(ux, uy).0), f);
                    }
                }
            }

            if let Some(blurred) = layers.smooth {
                let b = rgb_f32(&blurred.get_pixel(ux, uy).0);
                rgb = smooth_pixel(rgb, b, values.smooth, skin, threshold);
            }

            if tone {
                let mut c = rgb_to_ycbcr(rgb[0], rgb[1], rgb[2]);
                c.y = whiten_luma(c.y, values.whiten);
                c = even_chroma(c, layers.tone_target, values.even, skin);
                c.y = glow_luma(c.y, values.dewy_glow);
                rgb = ycbcr_to_rgb(c);
            }

            if texture_amp > 0.0 {
                let grain = (rng.random::<f32>() - 0.5) * texture_amp;
                rgb = rgb.map(|v| v + grain);
            }

            px[0] = to_u8(rgb[0]);
            px[1] = to_u8(rgb[1]);
            px[2] = to_u8(rgb[2]);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beauty::config::SkinMode;
    use image::Rgba;

    const SKIN: [u8; 4] = [224, 172, 138, 255];

    #[test]
    fn smoothing_skips_strong_detail() {
        let rgb = [200.0, 150.0, 120.0];
        // diff = 40 >= 30
        assert_eq!(smooth_pixel(rgb, [180.0, 140.0, 110.0], 100.0, 1.0, 30.0), rgb);
        let soft = smooth_pixel(rgb, [195.0, 150.0, 120.0], 100.0, 1.0, 30.0);
        // alpha = 1 - 5/30
        assert!((soft[0] - (200.0 - 5.0 * 25.0 / 30.0)).abs() < 1e-4);
    }

    #[test]
    fn whitening_is_capped_and_monotonic() {
        assert_eq!(whiten_luma(100.0, 0.0), 100.0);
        let y = whiten_luma(100.0, 100.0);
        assert!((y - (100.0 + 101f32.log10() * 40.0)).abs() < 1e-3);
        assert_eq!(whiten_luma(250.0, 100.0), 255.0);
    }

    #[test]
    fn glow_only_lifts_highlights() {
        assert_eq!(glow_luma(150.0, 100.0), 150.0);
        assert!((glow_luma(200.0, 50.0) - 208.0).abs() < 1e-4);
        assert_eq!(glow_luma(250.0, 100.0), 255.0);
    }

    #[test]
    fn evening_moves_halfway_at_full_strength() {
        let c = YCbCr { y: 150.0, cb: 100.0, cr: 160.0 };
        let e = even_chroma(c, (110.0, 150.0), 100.0, 1.0);
        assert_eq!(e.y, 150.0);
        assert!((e.cb - 105.0).abs() < 1e-4);
        assert!((e.cr - 155.0).abs() < 1e-4);
    }

    fn noisy_skin(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let n = ((x * 7 + y * 13) % 11) as i32 - 5;
            Rgba([
                (SKIN[0] as i32 + n) as u8,
                (SKIN[1] as i32 + n) as u8,
                (SKIN[2] as i32 + n) as u8,
                255,
            ])
        })
    }

    fn red_variance(img: &RgbaImage) -> f32 {
        let n = img.pixels().len() as f32;
        let mean = img.pixels().map(|p| p[0] as f32).sum::<f32>() / n;
        img.pixels().map(|p| (p[0] as f32 - mean).powi(2)).sum::<f32>() / n
    }

    #[test]
    fn smoothing_reduces_variance_on_skin() {
        let src = noisy_skin(48, 48);
        let mask = SkinMask::from_image(&src);
        let blurred = crate::filter::gaussian_blur(&src, SkinMode::Standard.smooth_radius());
        let mut config = BeautyConfig::default();
        config.skin_values.smooth = 100.0;
        let layers = RetouchLayers {
            mask: &mask,
            smooth: Some(&blurred),
            blemish: None,
            tone_target: (128.0, 128.0),
        };
        let mut out = src.clone();
        retouch_skin(&mut out, &layers, &config, 1);
        assert!(red_variance(&out) < red_variance(&src) * 0.8);
    }

    #[test]
    fn hard_edges_and_background_survive() {
        // left half skin, right half blue-grey background
        let src = RgbaImage::from_fn(40, 20, |x, _| {
            if x < 20 { Rgba(SKIN) } else { Rgba([60, 90, 140, 255]) }
        });
        let mask = SkinMask::from_image(&src);
        let blurred = crate::filter::gaussian_blur(&src, 6.0);
        let mut config = BeautyConfig::default();
        config.skin_values.smooth = 100.0;
        let layers = RetouchLayers {
            mask: &mask,
            smooth: Some(&blurred),
            blemish: None,
            tone_target: (128.0, 128.0),
        };
        let mut out = src.clone();
        retouch_skin(&mut out, &layers, &config, 1);
        for y in 0..20 {
            // the skin pixel at the boundary differs from its blur by far more
            // than the detail threshold
            assert_eq!(out.get_pixel(19, y), src.get_pixel(19, y));
            for x in 20..40 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn texture_is_reproducible_for_a_seed() {
        let src = RgbaImage::from_pixel(16, 16, Rgba(SKIN));
        let mask = SkinMask::from_image(&src);
        let mut config = BeautyConfig::default();
        config.skin_values.texture = 50.0;
        let layers = RetouchLayers {
            mask: &mask,
            smooth: None,
            blemish: None,
            tone_target: (128.0, 128.0),
        };
        let mut a = src.clone();
        let mut b = src.clone();
        retouch_skin(&mut a, &layers, &config, 42);
        retouch_skin(&mut b, &layers, &config, 42);
        assert_eq!(a, b);
        assert_ne!(a, src);
        for (p, q) in a.pixels().zip(src.pixels()) {
            assert!((p[0] as i32 - q[0] as i32).abs() <= 8);
            assert_eq!(p[3], 255);
        }
    }

    #[test]
    fn auto_blemish_lifts_a_dark_spot_toward_its_surroundings() {
        // neither tone falls in the lip window, so both are candidates
        let skin = Rgba([190, 160, 145, 255]);
        let spot = Rgba([160, 128, 118, 255]);
        let src = RgbaImage::from_fn(64, 64, |x, y| {
            let d2 = (x as i32 - 32).pow(2) + (y as i32 - 32).pow(2);
            if d2 <= 64 { spot } else { skin }
        });
        let mask = SkinMask::from_image(&src);
        let edges = EdgeMap::from_image(&src);
        let layers = BlemishLayers::build(&src, &mut StdRng::seed_from_u64(5));
        let mut config = BeautyConfig::default();
        config.blemish.auto = true;
        let retouch = RetouchLayers {
            mask: &mask,
            smooth: None,
            blemish: Some((&layers, &edges)),
            tone_target: (128.0, 128.0),
        };
        let mut out = src.clone();
        retouch_skin(&mut out, &retouch, &config, 7);

        let healed = out.get_pixel(32, 32);
        assert!(healed[0] >= spot[0] + 4, "spot not lifted: {healed:?}");
        assert!(healed[1] >= spot[1] + 4, "spot not lifted: {healed:?}");
        assert!(healed[0] < skin[0] + 6);
        assert_eq!(healed[3], 255);
        assert_eq!(out.get_pixel(2, 2), src.get_pixel(2, 2));
    }
}
