use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, RgbaImage};
use parking_lot::Mutex;

use crate::error::PersistenceError;
use crate::export::RasterImage;
use crate::util::time;

pub const DEFAULT_FILE_PREFIX: &str = "Kids_Drawing_App";

/// Where a saved drawing ended up, as reported by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedLocation(String);

impl SavedLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SavedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives flattened drawings and stores them somewhere.
///
/// Called from the save worker thread, never from the drawing thread.
pub trait RasterSink: Send + Sync {
    fn persist(&self, image: &RasterImage) -> Result<SavedLocation, PersistenceError>;
}

/// Writes PNG files named `<prefix><unix millis>.png` into a directory
#[derive(Debug, Clone)]
pub struct PngFileSink {
    dir: PathBuf,
    prefix: String,
}

impl PngFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_FILE_PREFIX.to_owned(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn file_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}.png", self.prefix, time::timestamp_millis()))
    }
}

/// Encode to PNG bytes in memory
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, PersistenceError> {
    let buffer = RgbaImage::from_raw(image.width(), image.height(), image.as_rgba().to_vec())
        .ok_or(PersistenceError::MalformedRaster {
            width: image.width(),
            height: image.height(),
        })?;

    let mut bytes = Vec::new();
    buffer.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

impl RasterSink for PngFileSink {
    fn persist(&self, image: &RasterImage) -> Result<SavedLocation, PersistenceError> {
        // Encode before touching the filesystem so a failed encode leaves no file behind.
        let bytes = encode_png(image)?;

        fs::create_dir_all(&self.dir)?;
        let path = self.file_path();
        fs::write(&path, bytes)?;

        let path = fs::canonicalize(&path).unwrap_or(path);
        Ok(SavedLocation::new(path.display().to_string()))
    }
}

/// Keeps every persisted image in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    images: Mutex<Vec<RasterImage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.lock().is_empty()
    }

    /// Copies of everything saved so far, oldest first
    pub fn images(&self) -> Vec<RasterImage> {
        self.images.lock().clone()
    }
}

impl RasterSink for MemorySink {
    fn persist(&self, image: &RasterImage) -> Result<SavedLocation, PersistenceError> {
        let mut images = self.images.lock();
        images.push(image.clone());
        Ok(SavedLocation::new(format!("memory://{}", images.len() - 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Pixmap;

    fn raster(width: u32, height: u32) -> RasterImage {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 10, 10, 255));
        RasterImage::from_pixmap(&pixmap)
    }

    #[test]
    fn test_encode_png_round_trips_pixels() {
        let bytes = encode_png(&raster(3, 2)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [200, 10, 10, 255]);
    }

    #[test]
    fn test_png_file_sink_writes_file() {
        let dir = std::env::temp_dir().join(format!("doodle_pad_sink_{}", std::process::id()));
        let sink = PngFileSink::new(&dir).with_prefix("test_");

        let location = sink.persist(&raster(4, 4)).unwrap();
        let path = PathBuf::from(location.as_str());
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("test_"));
        assert_eq!(path.extension().unwrap(), "png");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_sink_numbers_locations() {
        let sink = MemorySink::new();
        assert_eq!(sink.persist(&raster(1, 1)).unwrap().as_str(), "memory://0");
        assert_eq!(sink.persist(&raster(1, 1)).unwrap().as_str(), "memory://1");
        assert_eq!(sink.len(), 2);
    }
}
