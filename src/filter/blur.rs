use image::RgbaImage;

/// Gaussian blur with a CSS-style pixel radius (the radius is the standard
/// deviation). Returns a new buffer of identical dimensions; a non-positive
/// radius returns an unmodified copy.
pub fn gaussian_blur(img: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    image::imageops::blur(img, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn preserves_dimensions() {
        let img = RgbaImage::from_pixel(37, 21, Rgba([10, 20, 30, 255]));
        let out = gaussian_blur(&img, 4.0);
        assert_eq!(out.dimensions(), (37, 21));
    }

    #[test]
    fn zero_radius_is_copy() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        img.put_pixel(3, 3, Rgba([255, 255, 255, 255]));
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn spreads_a_point_of_light() {
        let mut img = RgbaImage::from_pixel(21, 21, Rgba([0, 0, 0, 255]));
        img.put_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let out = gaussian_blur(&img, 2.0);
        assert!(out.get_pixel(10, 10)[0] < 255);
        assert!(out.get_pixel(11, 10)[0] > 0);
    }
}
