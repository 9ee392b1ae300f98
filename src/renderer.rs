use egui::{Color32, Pos2};
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::background::BackgroundImage;
use crate::error::ExportError;
use crate::history::StrokeHistory;
use crate::path::{BrushStyle, InProgressPath, StrokeCap};

pub const DEFAULT_BACKGROUND_COLOR: Color32 = Color32::WHITE;

/// Everything that ends up on the canvas, borrowed for one frame
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub history: &'a StrokeHistory,
    pub in_progress: Option<&'a InProgressPath>,
    pub background: Option<&'a BackgroundImage>,
}

/// Replays a [`Scene`] onto a pixel surface.
///
/// Rendering reads the scene and writes only the target pixmap, so the same
/// scene always produces the same pixels.
#[derive(Debug, Clone)]
pub struct Renderer {
    background_color: Color32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND_COLOR)
    }
}

impl Renderer {
    pub fn new(background_color: Color32) -> Self {
        Self { background_color }
    }

    pub fn background_color(&self) -> Color32 {
        self.background_color
    }

    /// Allocate a surface of the given size and render into it
    pub fn render_to_pixmap(
        &self,
        scene: &Scene<'_>,
        width: u32,
        height: u32,
    ) -> Result<Pixmap, ExportError> {
        if width == 0 || height == 0 {
            return Err(ExportError::EmptySurface { width, height });
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(ExportError::AllocationFailed { width, height })?;
        self.render(scene, &mut pixmap);
        Ok(pixmap)
    }

    /// Draw background, then committed strokes oldest first, then the live stroke
    pub fn render(&self, scene: &Scene<'_>, pixmap: &mut Pixmap) {
        let [r, g, b, a] = self.background_color.to_srgba_unmultiplied();
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        if let Some(background) = scene.background {
            draw_background(pixmap, background);
        }

        for path in scene.history.paths() {
            draw_stroke(pixmap, path.points(), path.style());
        }

        if let Some(path) = scene.in_progress {
            draw_stroke(pixmap, path.points(), path.style());
        }
    }
}

fn draw_background(pixmap: &mut Pixmap, background: &BackgroundImage) {
    let sx = pixmap.width() as f32 / background.width() as f32;
    let sy = pixmap.height() as f32 / background.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        background.pixmap().as_ref(),
        &paint,
        Transform::from_scale(sx, sy),
        None,
    );
}

fn brush_paint(style: BrushStyle) -> Paint<'static> {
    let [r, g, b, a] = style.color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn draw_stroke(pixmap: &mut Pixmap, points: &[Pos2], style: BrushStyle) {
    let paint = brush_paint(style);

    match points {
        [] => {}
        // A tap: a round dot as wide as the brush
        [p] => {
            if let Some(dot) = PathBuilder::from_circle(p.x, p.y, style.width / 2.0) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        [first, rest @ ..] => {
            let mut builder = PathBuilder::new();
            builder.move_to(first.x, first.y);
            for p in rest {
                builder.line_to(p.x, p.y);
            }
            let Some(path) = builder.finish() else {
                return;
            };

            let stroke = Stroke {
                width: style.width,
                line_cap: line_cap(style.cap),
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

fn line_cap(cap: StrokeCap) -> LineCap {
    match cap {
        StrokeCap::Round => LineCap::Round,
        StrokeCap::Butt => LineCap::Butt,
        StrokeCap::Square => LineCap::Square,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    fn horizontal_line(color: Color32, y: f32) -> InProgressPath {
        let mut path = InProgressPath::begin(BrushStyle::new(color, 10.0), pos2(10.0, y));
        path.add_point(pos2(90.0, y));
        path
    }

    #[test]
    fn test_empty_scene_is_background_color() {
        let history = StrokeHistory::new();
        let scene = Scene {
            history: &history,
            in_progress: None,
            background: None,
        };
        let pixmap = Renderer::default().render_to_pixmap(&scene, 8, 8).unwrap();
        assert!(pixmap.pixels().iter().all(|p| p.demultiply() == tiny_skia::ColorU8::from_rgba(255, 255, 255, 255)));
    }

    #[test]
    fn test_zero_area_is_rejected() {
        let history = StrokeHistory::new();
        let scene = Scene {
            history: &history,
            in_progress: None,
            background: None,
        };
        assert_eq!(
            Renderer::default().render_to_pixmap(&scene, 0, 10).unwrap_err(),
            ExportError::EmptySurface { width: 0, height: 10 }
        );
    }

    #[test]
    fn test_later_strokes_paint_over_earlier_ones() {
        let mut history = StrokeHistory::new();
        history.commit(horizontal_line(Color32::RED, 50.0).finish());
        history.commit(horizontal_line(Color32::BLUE, 50.0).finish());
        let scene = Scene {
            history: &history,
            in_progress: None,
            background: None,
        };

        let pixmap = Renderer::default().render_to_pixmap(&scene, 100, 100).unwrap();
        assert_eq!(pixel(&pixmap, 50, 50), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixmap, 50, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn test_in_progress_drawn_on_top() {
        let mut history = StrokeHistory::new();
        history.commit(horizontal_line(Color32::RED, 50.0).finish());
        let live = horizontal_line(Color32::GREEN, 50.0);
        let scene = Scene {
            history: &history,
            in_progress: Some(&live),
            background: None,
        };

        let pixmap = Renderer::default().render_to_pixmap(&scene, 100, 100).unwrap();
        assert_eq!(pixel(&pixmap, 50, 50), [0, 255, 0, 255]);
    }

    #[test]
    fn test_single_point_renders_dot() {
        let mut history = StrokeHistory::new();
        history.commit(InProgressPath::begin(BrushStyle::new(Color32::BLACK, 10.0), pos2(20.0, 20.0)).finish());
        let scene = Scene {
            history: &history,
            in_progress: None,
            background: None,
        };

        let pixmap = Renderer::default().render_to_pixmap(&scene, 40, 40).unwrap();
        assert_eq!(pixel(&pixmap, 20, 20), [0, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 35, 35), [255, 255, 255, 255]);
    }

    #[test]
    fn test_background_image_is_stretched() {
        let image = BackgroundImage::from_rgba(2, 2, [0, 0, 255, 255].repeat(4)).unwrap();
        let history = StrokeHistory::new();
        let scene = Scene {
            history: &history,
            in_progress: None,
            background: Some(&image),
        };

        let pixmap = Renderer::default().render_to_pixmap(&scene, 64, 32).unwrap();
        for (x, y) in [(16, 8), (48, 24), (32, 16)] {
            let [r, g, b, a] = pixel(&pixmap, x, y);
            assert!(r <= 2 && g <= 2 && b >= 253 && a == 255, "pixel ({x}, {y}) = {:?}", [r, g, b, a]);
        }
    }
}
