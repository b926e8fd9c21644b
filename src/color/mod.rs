pub mod skin;
pub mod ycbcr;

pub use skin::{SkinMask, skin_probability};
pub use ycbcr::{YCbCr, luma, rgb_to_ycbcr, ycbcr_to_rgb};

/// Clamp a floating-point channel value into the 8-bit range and round it.
#[inline]
pub fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
