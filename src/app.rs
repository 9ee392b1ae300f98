use std::cell::Cell;
use std::sync::Arc;

use eframe::egui::{self, Color32, Pos2, Rect, TextureHandle, TextureOptions};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::brush::BrushSize;
use crate::components::palette_button::PaletteButton;
use crate::config::DrawingConfig;
use crate::error::ConfigError;
use crate::export::SaveTask;
use crate::gallery;
use crate::persistence::{PngFileSink, RasterSink};
use crate::surface::{DrawingSurface, Invalidate};
use crate::util::time;

const NOTICE_SECS: f64 = 3.5;

/// Repaint requests from the canvas, plus a flag telling us the texture is stale
pub struct CanvasHost {
    ctx: egui::Context,
    dirty: Cell<bool>,
}

impl std::fmt::Debug for CanvasHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasHost")
            .field("dirty", &self.dirty.get())
            .finish()
    }
}

impl CanvasHost {
    fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            dirty: Cell::new(true),
        }
    }

    fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }
}

impl Invalidate for CanvasHost {
    fn invalidate(&self) {
        self.dirty.set(true);
        self.ctx.request_repaint();
    }
}

/// Brush settings restored when the app restarts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredBrush {
    color: Color32,
    width: f32,
}

/// One step of a gesture, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerAction {
    Down(Pos2),
    Move(Pos2),
    Up,
}

/// How the canvas widget itself was interacted with this frame.
///
/// Built from the canvas `Response`, so presses that egui routed to a window
/// or panel above the canvas never show up here.
#[derive(Debug, Clone, Copy, Default)]
struct CanvasInteraction {
    clicked: bool,
    drag_started: bool,
    dragged: bool,
    drag_stopped: bool,
    press_origin: Option<Pos2>,
    pointer: Option<Pos2>,
}

impl CanvasInteraction {
    /// Every `PointerMoved` event of a drag frame becomes its own move.
    fn actions(&self, events: &[egui::Event], origin: Pos2) -> Vec<PointerAction> {
        let local = |p: Pos2| p - origin.to_vec2();
        let mut actions = Vec::new();

        if self.clicked {
            if let Some(pos) = self.pointer {
                actions.push(PointerAction::Down(local(pos)));
                actions.push(PointerAction::Up);
            }
            return actions;
        }

        if self.drag_started {
            if let Some(pos) = self.press_origin.or(self.pointer) {
                actions.push(PointerAction::Down(local(pos)));
            }
        }
        if self.drag_started || self.dragged || self.drag_stopped {
            actions.extend(events.iter().filter_map(|event| match event {
                egui::Event::PointerMoved(pos) => Some(PointerAction::Move(local(*pos))),
                _ => None,
            }));
        }
        if self.drag_stopped {
            actions.push(PointerAction::Up);
        }
        actions
    }
}

fn apply_pointer_actions<H: Invalidate>(surface: &mut DrawingSurface<H>, actions: &[PointerAction]) {
    for action in actions {
        match *action {
            PointerAction::Down(pos) => surface.pointer_down(pos),
            PointerAction::Move(pos) => surface.pointer_move(pos),
            PointerAction::Up => surface.pointer_up(),
        }
    }
}

struct Notice {
    text: String,
    expires_at: f64,
}

pub struct DoodleApp {
    surface: DrawingSurface<CanvasHost>,
    palette: Vec<Color32>,
    sink: Arc<dyn RasterSink>,
    texture: Option<TextureHandle>,
    pending_saves: Vec<SaveTask>,
    notices: Vec<Notice>,
    show_brush_dialog: bool,
}

impl DoodleApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: DrawingConfig) -> Result<Self, ConfigError> {
        let host = CanvasHost::new(cc.egui_ctx.clone());
        let mut surface = DrawingSurface::with_config(&config, host)?;

        if let Some(stored) = cc
            .storage
            .and_then(|storage| eframe::get_value::<StoredBrush>(storage, eframe::APP_KEY))
        {
            surface.set_brush_color(stored.color);
            if let Err(err) = surface.set_brush_width(stored.width) {
                log::warn!("Ignoring stored brush width: {err}");
            }
        }

        let sink = PngFileSink::new(config.export_dir()).with_prefix(config.file_prefix.clone());
        log::info!("Saving drawings to {}", sink.dir().display());

        Ok(Self {
            surface,
            palette: config.palette_colors()?,
            sink: Arc::new(sink),
            texture: None,
            pending_saves: Vec::new(),
            notices: Vec::new(),
            show_brush_dialog: false,
        })
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notices.push(Notice {
            text: text.into(),
            expires_at: time::current_time_secs() + NOTICE_SECS,
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let current = self.surface.brush().color();
            let mut picked = None;
            for &color in &self.palette {
                if PaletteButton::new(color, color == current).show(ui).clicked() {
                    picked = Some(color);
                }
            }
            if let Some(color) = picked {
                self.surface.set_brush_color(color);
            }

            ui.separator();

            if ui.button("🖌 Brush").clicked() {
                self.show_brush_dialog = true;
            }
            if ui
                .add_enabled(self.surface.history().can_undo(), egui::Button::new("↶ Undo"))
                .clicked()
            {
                self.surface.undo();
            }
            if ui.button("🖼 Background").clicked() {
                self.notify("Drop an image file onto the canvas to use it as the background");
            }
            if self.surface.background().is_some() && ui.button("Clear background").clicked() {
                self.surface.clear_background();
            }
            if ui.button("💾 Save").clicked() {
                self.save_drawing();
            }
        });
    }

    fn brush_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_brush_dialog {
            return;
        }
        let presets = self.surface.presets();
        let mut open = true;
        egui::Window::new("Brush Size: ")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for size in BrushSize::ALL {
                        let label = format!("{} ({}px)", size.label(), presets.width(size));
                        if ui.button(label).clicked() {
                            if let Err(err) = self.surface.set_brush_size(size) {
                                log::error!("Brush preset rejected: {err}");
                            }
                            self.show_brush_dialog = false;
                        }
                    }
                });
            });
        if !open {
            self.show_brush_dialog = false;
        }
    }

    fn save_drawing(&mut self) {
        let ctx = self.surface.host().ctx.clone();
        match self.surface.save(self.sink.clone(), move || ctx.request_repaint()) {
            Ok(task) => self.pending_saves.push(task),
            Err(err) => self.notify(format!("Nothing to save yet: {err}")),
        }
    }

    fn poll_saves(&mut self) {
        let mut finished = Vec::new();
        self.pending_saves.retain_mut(|task| match task.try_outcome() {
            Some(outcome) => {
                finished.push(outcome);
                false
            }
            None => true,
        });
        for outcome in finished {
            match outcome {
                Ok(location) => self.notify(format!("File saved successfully: {location}")),
                Err(err) => {
                    log::error!("Save failed: {err}");
                    self.notify("Something went wrong :(");
                }
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Only the last dropped image is used; each one replaces the previous background.
        for file in dropped {
            let loaded = if let Some(bytes) = &file.bytes {
                gallery::decode_background(bytes)
            } else if let Some(path) = &file.path {
                gallery::load_background(path)
            } else {
                log::warn!("Dropped file has no accessible data: {}", file.name);
                continue;
            };
            match loaded {
                Ok(image) => self.surface.set_background(image),
                Err(err) => {
                    log::warn!("Could not use dropped file as background: {err}");
                    self.notify(format!("Could not load image: {err}"));
                }
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.surface.host().take_dirty() && self.texture.is_some() {
            return;
        }
        let (width, height) = (self.surface.width(), self.surface.height());
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            return;
        };
        self.surface.render_into(&mut pixmap);

        let image = egui::ColorImage::from_rgba_premultiplied(
            [width as usize, height as usize],
            pixmap.data(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::LINEAR)),
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

        self.surface
            .resize(rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);

        let interaction = CanvasInteraction {
            clicked: response.clicked(),
            drag_started: response.drag_started(),
            dragged: response.dragged(),
            drag_stopped: response.drag_stopped(),
            press_origin: ui.input(|i| i.pointer.press_origin()),
            pointer: response.interact_pointer_pos(),
        };
        let actions = ui.input(|i| interaction.actions(&i.events, rect.min));
        apply_pointer_actions(&mut self.surface, &actions);
        self.refresh_texture(ui.ctx());

        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }

    fn show_notices(&mut self, ctx: &egui::Context) {
        let now = time::current_time_secs();
        self.notices.retain(|n| n.expires_at > now);
        if self.notices.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .show(ctx, |ui| {
                for notice in &self.notices {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(notice.text.as_str());
                    });
                }
            });
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

impl eframe::App for DoodleApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let brush = self.surface.brush();
        let stored = StoredBrush {
            color: brush.color(),
            width: brush.width(),
        };
        eframe::set_value(storage, eframe::APP_KEY, &stored);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_saves();
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.canvas(ui);
            });

        self.brush_dialog(ctx);
        self.show_notices(ctx);
    }
}
