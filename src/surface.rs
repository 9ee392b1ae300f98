use std::sync::Arc;

use egui::{Color32, Pos2};
use tiny_skia::Pixmap;

use crate::background::BackgroundImage;
use crate::brush::{BrushPresets, BrushSize, CurrentBrush, parse_color_tag};
use crate::config::DrawingConfig;
use crate::error::{ConfigError, DrawingError, ExportError};
use crate::export::{RasterImage, SaveTask, spawn_save};
use crate::history::StrokeHistory;
use crate::input::InputState;
use crate::path::InProgressPath;
use crate::persistence::RasterSink;
use crate::renderer::{Renderer, Scene};

/// Host side of the canvas: asked to schedule a redraw after every change
pub trait Invalidate {
    fn invalidate(&self);
}

impl Invalidate for egui::Context {
    fn invalidate(&self) {
        self.request_repaint();
    }
}

/// Host that never redraws, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl Invalidate for NoopHost {
    fn invalidate(&self) {}
}

/// The drawing canvas.
///
/// Owns the brush, the stroke history, the gesture state and the optional
/// background. All methods run on the thread that owns the surface; only
/// [`DrawingSurface::save`] moves work elsewhere, and it does so with an
/// already captured [`RasterImage`].
#[derive(Debug)]
pub struct DrawingSurface<H: Invalidate = NoopHost> {
    brush: CurrentBrush,
    presets: BrushPresets,
    history: StrokeHistory,
    input: InputState,
    background: Option<BackgroundImage>,
    renderer: Renderer,
    width: u32,
    height: u32,
    host: H,
}

impl<H: Invalidate> DrawingSurface<H> {
    /// Surface with the default black 20px brush on white, not yet laid out
    pub fn new(host: H) -> Self {
        Self {
            brush: CurrentBrush::default(),
            presets: BrushPresets::default(),
            history: StrokeHistory::new(),
            input: InputState::Idle,
            background: None,
            renderer: Renderer::default(),
            width: 0,
            height: 0,
            host,
        }
    }

    pub fn with_config(config: &DrawingConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut surface = Self::new(host);
        surface.brush = config.brush()?;
        surface.presets = config.brush_presets;
        surface.renderer = Renderer::new(config.background_color()?);
        Ok(surface)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Record the laid-out size of the canvas
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("Canvas resized to {width}x{height}");
        self.width = width;
        self.height = height;
        self.host.invalidate();
    }

    // --- pointer input ---

    pub fn pointer_down(&mut self, pos: Pos2) {
        self.input
            .pointer_down(pos, self.brush.style(), &mut self.history);
        self.host.invalidate();
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        match self.input.pointer_move(pos) {
            Ok(()) => self.host.invalidate(),
            Err(err) => log::trace!("Ignoring pointer move at {pos:?}: {err}"),
        }
    }

    pub fn pointer_up(&mut self) {
        match self.input.pointer_up(&mut self.history) {
            Ok(()) => self.host.invalidate(),
            Err(err) => log::trace!("Ignoring pointer up: {err}"),
        }
    }

    /// Remove the most recent committed stroke. Never fails.
    pub fn undo(&mut self) {
        match self.history.undo() {
            Some(path) => log::info!("Undid stroke with {} points", path.len()),
            None => log::debug!("Nothing to undo"),
        }
        self.host.invalidate();
    }

    pub fn is_drawing(&self) -> bool {
        self.input.is_drawing()
    }

    pub fn in_progress(&self) -> Option<&InProgressPath> {
        self.input.in_progress()
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    // --- brush ---

    pub fn brush(&self) -> CurrentBrush {
        self.brush
    }

    pub fn presets(&self) -> BrushPresets {
        self.presets
    }

    pub fn set_brush_color(&mut self, color: Color32) {
        log::info!("Brush color set to {color:?}");
        self.brush.set_color(color);
        self.host.invalidate();
    }

    /// Apply a palette tag such as `#FF0000` or `#FF3F51B5`
    pub fn set_brush_color_tag(&mut self, tag: &str) -> Result<(), DrawingError> {
        let color = parse_color_tag(tag)?;
        self.set_brush_color(color);
        Ok(())
    }

    pub fn set_brush_width(&mut self, width: f32) -> Result<(), DrawingError> {
        self.brush.set_width(width).inspect_err(|err| {
            log::warn!("Rejected brush width: {err}");
        })?;
        log::info!("Brush width set to {width}");
        self.host.invalidate();
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: BrushSize) -> Result<(), DrawingError> {
        self.set_brush_width(self.presets.width(size))
    }

    // --- background ---

    pub fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    pub fn set_background(&mut self, image: BackgroundImage) {
        log::info!("Background set ({}x{})", image.width(), image.height());
        self.background = Some(image);
        self.host.invalidate();
    }

    pub fn clear_background(&mut self) {
        if self.background.take().is_some() {
            log::info!("Background cleared");
            self.host.invalidate();
        }
    }

    pub fn background_color(&self) -> Color32 {
        self.renderer.background_color()
    }

    // --- rendering and export ---

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            history: &self.history,
            in_progress: self.input.in_progress(),
            background: self.background.as_ref(),
        }
    }

    /// Redraw the whole canvas into `pixmap`
    pub fn render_into(&self, pixmap: &mut Pixmap) {
        self.renderer.render(&self.scene(), pixmap);
    }

    /// Flatten background, committed and in-progress strokes into an owned image
    pub fn export_raster(&self) -> Result<RasterImage, ExportError> {
        let pixmap = self
            .renderer
            .render_to_pixmap(&self.scene(), self.width, self.height)?;
        Ok(RasterImage::from_pixmap(&pixmap))
    }

    /// Capture the canvas now and write it out on a worker thread.
    ///
    /// Fails before anything reaches `sink` if the canvas has no area.
    pub fn save<F>(&self, sink: Arc<dyn RasterSink>, on_done: F) -> Result<SaveTask, ExportError>
    where
        F: FnOnce() + Send + 'static,
    {
        let image = self.export_raster().inspect_err(|err| {
            log::warn!("Export failed: {err}");
        })?;
        log::info!("Captured {}x{} snapshot for saving", image.width(), image.height());
        Ok(spawn_save(image, sink, on_done))
    }
}

impl Default for DrawingSurface<NoopHost> {
    fn default() -> Self {
        Self::new(NoopHost)
    }
}
