#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod background;
pub mod brush;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod history;
pub mod input;
pub mod path;
pub mod persistence;
pub mod renderer;
pub mod surface;
pub mod util;

pub use app::DoodleApp;
pub use background::BackgroundImage;
pub use brush::{BrushPresets, BrushSize, CurrentBrush, parse_color_tag};
pub use config::DrawingConfig;
pub use error::{ConfigError, DrawingError, ExportError, PersistenceError, StateError};
pub use export::{RasterImage, SaveTask, spawn_save};
pub use history::StrokeHistory;
pub use input::InputState;
pub use path::{BrushStyle, InProgressPath, Path, StrokeCap};
pub use persistence::{MemorySink, PngFileSink, RasterSink, SavedLocation};
pub use renderer::{Renderer, Scene};
pub use surface::{DrawingSurface, Invalidate, NoopHost};
