use std::path::PathBuf;
use thiserror::Error;

/// Input rejected at the drawing surface API boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DrawingError {
    #[error("Brush width must be a positive number, got {0}")]
    InvalidBrushWidth(f32),

    #[error("Unrecognized color tag: {0:?}")]
    InvalidColorTag(String),

    #[error("Background buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    InvalidBackground {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Pointer events that arrive while no gesture is active.
///
/// These are tolerated: the surface logs and drops them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("Pointer move received with no active gesture")]
    MoveWhileIdle,

    #[error("Pointer up received with no active gesture")]
    UpWhileIdle,
}

/// Errors that can occur while flattening the canvas into a raster image
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Surface has no area ({width}x{height}); it has not been laid out yet")]
    EmptySurface { width: u32, height: u32 },

    #[error("Failed to allocate a {width}x{height} raster")]
    AllocationFailed { width: u32, height: u32 },
}

/// Errors reported by a persistence collaborator
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write image: {0}")]
    Write(#[from] std::io::Error),

    #[error("Raster buffer does not match its {width}x{height} dimensions")]
    MalformedRaster { width: u32, height: u32 },

    #[error("Save worker stopped before reporting a result")]
    WorkerLost,
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(#[from] DrawingError),
}
