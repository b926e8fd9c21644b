/// Full-range BT.601 luma/chroma triple, all components in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YCbCr {
    pub y: f32,
    pub cb: f32,
    pub cr: f32,
}

#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> YCbCr {
    YCbCr {
        y: luma(r, g, b),
        cb: 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b,
        cr: 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b,
    }
}

/// Inverse of [`rgb_to_ycbcr`]. Channels are clamped to [0, 255] but not rounded.
pub fn ycbcr_to_rgb(c: YCbCr) -> [f32; 3] {
    let cb = c.cb - 128.0;
    let cr = c.cr - 128.0;
    [
        (c.y + 1.402 * cr).clamp(0.0, 255.0),
        (c.y - 0.344136 * cb - 0.714136 * cr).clamp(0.0, 255.0),
        (c.y + 1.772 * cb).clamp(0.0, 255.0),
    ]
}
