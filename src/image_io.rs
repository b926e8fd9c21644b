use image::{DynamicImage, RgbaImage, imageops::FilterType};
use std::path::Path;

use crate::error::{BeautyError, Result, validate_dimensions};

pub fn load_image(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    // JPEG has no alpha channel
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        DynamicImage::ImageRgba8(img.clone()).to_rgb8().save(path)?;
    } else {
        img.save(path)?;
    }
    Ok(())
}

/// Copy raw interleaved RGBA bytes into an owned image after validating them.
pub fn rgba_from_raw(width: u32, height: u32, data: &[u8]) -> Result<RgbaImage> {
    validate_dimensions(width, height, data.len())?;
    RgbaImage::from_raw(width, height, data.to_vec()).ok_or(BeautyError::InvalidBuffer {
        width,
        height,
        expected: width as usize * height as usize * 4,
        len: data.len(),
    })
}

/// A detection-resolution copy of an image and the per-axis factors that map
/// source coordinates onto it (`small = source * scale`).
#[derive(Debug, Clone)]
pub struct Downscaled {
    pub image: RgbaImage,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Shrink an image so its long edge is at most `max_dim`, never upscaling.
/// Each side is kept at least 10 px (or the source size, if smaller).
pub fn downscale_for_detection(img: &RgbaImage, max_dim: u32) -> Downscaled {
    let (w, h) = img.dimensions();
    let long_edge = w.max(h).max(1);
    let scale = (max_dim as f32 / long_edge as f32).min(1.0);
    if scale >= 1.0 {
        return Downscaled {
            image: img.clone(),
            scale_x: 1.0,
            scale_y: 1.0,
        };
    }

    let small_w = ((w as f32 * scale).floor() as u32).max(10).min(w);
    let small_h = ((h as f32 * scale).floor() as u32).max(10).min(h);
    let image = image::imageops::resize(img, small_w, small_h, FilterType::Triangle);
    Downscaled {
        image,
        scale_x: small_w as f32 / w as f32,
        scale_y: small_h as f32 / h as f32,
    }
}
