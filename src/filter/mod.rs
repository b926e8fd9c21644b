pub mod blur;
pub mod edges;

pub use blur::gaussian_blur;
pub use edges::EdgeMap;

use image::RgbaImage;
use rand::Rng;

/// Add uniform grain in `[-amplitude/2, amplitude/2)` to the RGB channels.
/// The same offset is applied to all three channels of a pixel so the grain
/// stays neutral in hue. Alpha is untouched.
pub fn add_grain<R: Rng + ?Sized>(img: &mut RgbaImage, amplitude: f32, rng: &mut R) {
    if amplitude <= 0.0 {
        return;
    }
    for px in img.pixels_mut() {
        let noise = (rng.random::<f32>() - 0.5) * amplitude;
        for c in 0..3 {
            px[c] = crate::color::to_u8(px[c] as f32 + noise);
        }
    }
}
