use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// Longest edge of a generated thumbnail, in pixels.
pub const MAX_DIMENSION: u32 = 300;
pub const JPEG_QUALITY: u8 = 85;
/// Thumbnails are stored next to the original as `thumb_<original name>`.
pub const FILE_PREFIX: &str = "thumb_";

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("thumbnail generation failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode `bytes`, flatten to RGB and shrink to fit within 300x300, returning JPEG data.
///
/// Images already inside the bound keep their size.
pub fn render(bytes: &[u8]) -> Result<Vec<u8>, ThumbnailError> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 128]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn shrinks_proportionally_to_jpeg() {
        let jpeg = render(&png(640, 480)).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let thumb = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (300, 225));
    }

    #[test]
    fn tall_images_bound_by_height() {
        let thumb = image::load_from_memory(&render(&png(100, 900)).unwrap()).unwrap();
        assert_eq!(thumb.height(), 300);
        assert!(thumb.width() <= 34 && thumb.width() >= 33);
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let thumb = image::load_from_memory(&render(&png(20, 10)).unwrap()).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (20, 10));
    }

    #[test]
    fn undecodable_bytes_fail() {
        assert!(render(b"definitely not an image").is_err());
        assert!(render(&[]).is_err());
    }
}
