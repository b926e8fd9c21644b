use image::RgbaImage;
use rayon::prelude::*;

use super::ycbcr::rgb_to_ycbcr;

const CB_RANGE: (f32, f32) = (80.0, 135.0);
const CR_RANGE: (f32, f32) = (130.0, 185.0);
const IDEAL_CB: f32 = 105.0;
const IDEAL_CR: f32 = 152.0;
const FALLOFF_DISTANCE: f32 = 40.0;

/// Probability in [0, 1] that an RGB triple is skin.
///
/// Candidates must fall inside the Cb/Cr skin box and be red-dominant; the
/// probability then falls off linearly with chroma distance from the ideal
/// skin tone.
pub fn skin_probability(r: u8, g: u8, b: u8) -> f32 {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let c = rgb_to_ycbcr(rf, gf, bf);

    let cb_skin = c.cb >= CB_RANGE.0 && c.cb <= CB_RANGE.1;
    let cr_skin = c.cr >= CR_RANGE.0 && c.cr <= CR_RANGE.1;
    let red_dominant = r > g && r > b;
    if !(cb_skin && cr_skin && red_dominant) {
        return 0.0;
    }

    let dist = ((c.cb - IDEAL_CB).powi(2) + (c.cr - IDEAL_CR).powi(2)).sqrt();
    (1.0 - dist / FALLOFF_DISTANCE).max(0.0)
}

/// Per-pixel skin probability for a whole image.
#[derive(Debug, Clone)]
pub struct SkinMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl SkinMask {
    pub fn from_image(img: &RgbaImage) -> Self {
        let width = img.width();
        let height = img.height();
        let data = img
            .as_raw()
            .par_chunks_exact(4)
            .map(|p| skin_probability(p[0], p[1], p[2]))
            .collect();
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Probability at (x, y); coordinates outside the mask read as 0.
    pub fn get(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mean (Cb, Cr) over pixels whose probability exceeds `threshold`.
    /// Falls back to neutral chroma when no pixel qualifies.
    pub fn mean_chroma(&self, img: &RgbaImage, threshold: f32) -> (f32, f32) {
        let (sum_cb, sum_cr, count) = img
            .as_raw()
            .par_chunks_exact(4)
            .zip(self.data.par_iter())
            .filter(|(_, p)| **p > threshold)
            .map(|(px, _)| {
                let c = rgb_to_ycbcr(px[0] as f32, px[1] as f32, px[2] as f32);
                (c.cb as f64, c.cr as f64, 1usize)
            })
            .reduce(|| (0.0, 0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

        if count == 0 {
            return (128.0, 128.0);
        }
        ((sum_cb / count as f64) as f32, (sum_cr / count as f64) as f32)
    }
}
