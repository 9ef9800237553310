use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;
pub const MAX_THUMBNAIL_SIZE: u32 = 800;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Failed to read image: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(image::ImageError),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(image::ImageError),
}

/// Scale stored photo bytes so the longest edge is at most `size` pixels
/// (clamped to 1..=800) and re-encode as JPEG.
///
/// Uploads are only checked by declared type and extension, so a stored
/// photo may fail to decode here.
pub fn generate_thumbnail(data: &[u8], size: u32) -> Result<Vec<u8>, ThumbnailError> {
    let size = size.clamp(1, MAX_THUMBNAIL_SIZE);

    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(ThumbnailError::Decode)?;

    // JPEG has no alpha channel
    let thumbnail_img = DynamicImage::ImageRgb8(img.thumbnail(size, size).to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    thumbnail_img
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(ThumbnailError::Encode)?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 128]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_thumbnail_fits_requested_size() {
        let thumb = generate_thumbnail(&png(400, 100), 50).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.width(), 50);
        assert!(decoded.height() <= 50);
    }

    #[test]
    fn test_thumbnail_size_is_clamped() {
        let thumb = generate_thumbnail(&png(20, 10), 0).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.width(), 1);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(generate_thumbnail(b"definitely not an image", 100).is_err());
    }
}
