use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeautyError {
    #[error("invalid buffer: {width}x{height} RGBA needs {expected} bytes, got {len}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        len: usize,
    },

    #[error("processing cancelled")]
    Cancelled,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BeautyError>;

/// Check that `len` bytes describe a non-empty `width`x`height` RGBA image.
pub fn validate_dimensions(width: u32, height: u32, len: usize) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || len != expected {
        return Err(BeautyError::InvalidBuffer {
            width,
            height,
            expected,
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_mismatched_buffers() {
        assert!(validate_dimensions(0, 10, 0).is_err());
        assert!(validate_dimensions(4, 4, 63).is_err());
        assert!(validate_dimensions(4, 4, 64).is_ok());
    }

    #[test]
    fn invalid_buffer_message_names_sizes() {
        let err = validate_dimensions(2, 2, 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid buffer: 2x2 RGBA needs 16 bytes, got 3"
        );
    }
}
