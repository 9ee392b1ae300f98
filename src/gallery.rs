//! Turns image files picked by the user into canvas backgrounds.
use std::path::Path;

use thiserror::Error;

use crate::background::BackgroundImage;
use crate::error::DrawingError;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Not a supported image file: {0}")]
    Unsupported(String),

    #[error("Failed to read image file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Invalid(#[from] DrawingError),
}

/// Check if a path looks like an image based on its extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"))
}

/// Decode any format the `image` crate understands
pub fn decode_background(bytes: &[u8]) -> Result<BackgroundImage, GalleryError> {
    let img = image::load_from_memory(bytes)?;
    log::debug!("Decoded background image: {}x{}", img.width(), img.height());

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(BackgroundImage::from_rgba(width, height, rgba.into_raw())?)
}

pub fn load_background(path: &Path) -> Result<BackgroundImage, GalleryError> {
    if !is_image_file(path) {
        return Err(GalleryError::Unsupported(path.display().to_string()));
    }
    log::info!("Loading background from {}", path.display());
    let bytes = std::fs::read(path)?;
    decode_background(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.JPG")));
        assert!(is_image_file(Path::new("/tmp/a.png")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_decode_png_bytes() {
        let source = image::RgbaImage::from_pixel(3, 5, image::Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let background = decode_background(&bytes).unwrap();
        assert_eq!((background.width(), background.height()), (3, 5));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_background(b"definitely not an image"),
            Err(GalleryError::Decode(_))
        ));
    }

    #[test]
    fn test_load_rejects_non_image_extension() {
        assert!(matches!(
            load_background(Path::new("drawing.txt")),
            Err(GalleryError::Unsupported(_))
        ));
    }
}
