use image::RgbaImage;
use rayon::prelude::*;

use crate::color::luma;

/// Sobel gradient magnitude (`|Gx| + |Gy|`, capped at 255) per pixel.
///
/// The outermost 1-pixel border is left at zero.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl EdgeMap {
    pub fn from_image(img: &RgbaImage) -> Self {
        let w = img.width() as usize;
        let h = img.height() as usize;
        let gray: Vec<f32> = img
            .as_raw()
            .par_chunks_exact(4)
            .map(|p| luma(p[0] as f32, p[1] as f32, p[2] as f32))
            .collect();

        let mut data = vec![0u8; w * h];
        if w >= 3 && h >= 3 {
            data.par_chunks_mut(w)
                .enumerate()
                .skip(1)
                .take(h - 2)
                .for_each(|(y, row)| {
                    let g = |x: usize, y: usize| gray[y * w + x];
                    for x in 1..w - 1 {
                        let gx = -g(x - 1, y - 1) + g(x + 1, y - 1) - 2.0 * g(x - 1, y)
                            + 2.0 * g(x + 1, y)
                            - g(x - 1, y + 1)
                            + g(x + 1, y + 1);
                        let gy = -g(x - 1, y - 1) - 2.0 * g(x, y - 1) - g(x + 1, y - 1)
                            + g(x - 1, y + 1)
                            + 2.0 * g(x, y + 1)
                            + g(x + 1, y + 1);
                        row[x] = (gx.abs() + gy.abs()).min(255.0) as u8;
                    }
                });
        }

        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    /// Edge strength at (x, y); out-of-range coordinates read as 0.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }
}
