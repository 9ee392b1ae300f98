use std::sync::Arc;

use doodle_pad::{
    BackgroundImage, DrawingSurface, ExportError, MemorySink, PersistenceError, RasterImage,
    RasterSink, SavedLocation,
};
use egui::{Color32, pos2};
use futures::executor::block_on;

fn sketch() -> DrawingSurface {
    let mut surface = DrawingSurface::default();
    surface.resize(100, 80);
    surface.set_brush_color(Color32::RED);
    surface.set_brush_width(10.0).unwrap();
    surface.pointer_down(pos2(10.0, 40.0));
    surface.pointer_move(pos2(90.0, 40.0));
    surface.pointer_up();
    surface
}

struct FailingSink;

impl RasterSink for FailingSink {
    fn persist(&self, _image: &RasterImage) -> Result<SavedLocation, PersistenceError> {
        Err(PersistenceError::Write(std::io::Error::other("disk full")))
    }
}

#[test]
fn test_export_matches_surface_size_and_content() {
    let image = sketch().export_raster().unwrap();
    assert_eq!((image.width(), image.height()), (100, 80));
    assert_eq!(image.as_rgba().len(), 100 * 80 * 4);
    assert_eq!(image.pixel(50, 40), Some([255, 0, 0, 255]));
    assert_eq!(image.pixel(50, 5), Some([255, 255, 255, 255]));
}

#[test]
fn test_render_is_repeatable() {
    let surface = sketch();
    let first = surface.export_raster().unwrap();
    let second = surface.export_raster().unwrap();
    assert_eq!(first, second);
    assert_eq!(surface.history().len(), 1);
}

#[test]
fn test_export_includes_in_progress_path() {
    let mut surface = sketch();
    surface.set_brush_color(Color32::BLUE);
    surface.pointer_down(pos2(50.0, 10.0));
    surface.pointer_move(pos2(50.0, 70.0));

    let image = surface.export_raster().unwrap();
    assert_eq!(image.pixel(50, 40), Some([0, 0, 255, 255]));
    assert_eq!(image.pixel(20, 40), Some([255, 0, 0, 255]));
    assert!(surface.is_drawing());
}

#[test]
fn test_background_sits_under_strokes() {
    let mut surface = sketch();
    let green = [0, 255, 0, 255].repeat(4 * 4);
    surface.set_background(BackgroundImage::from_rgba(4, 4, green).unwrap());

    let image = surface.export_raster().unwrap();
    assert_eq!(image.pixel(50, 40), Some([255, 0, 0, 255]));
    let [r, g, b, a] = image.pixel(50, 10).unwrap();
    assert!(r <= 2 && g >= 253 && b <= 2 && a == 255);

    surface.clear_background();
    assert_eq!(surface.export_raster().unwrap().pixel(50, 10), Some([255, 255, 255, 255]));
}

#[test]
fn test_export_of_unsized_surface_fails_without_saving() {
    let surface = DrawingSurface::default();
    assert_eq!(
        surface.export_raster().unwrap_err(),
        ExportError::EmptySurface { width: 0, height: 0 }
    );

    let sink = Arc::new(MemorySink::new());
    let result = surface.save(sink.clone(), || {});
    assert!(matches!(result, Err(ExportError::EmptySurface { .. })));
    assert!(sink.is_empty());
}

#[test]
fn test_save_hands_snapshot_to_sink() {
    let mut surface = sketch();
    let sink = Arc::new(MemorySink::new());

    let task = surface.save(sink.clone(), || {}).unwrap();
    // Drawing continues while the worker runs; the snapshot is already taken.
    surface.undo();

    let location = block_on(task).unwrap();
    assert_eq!(location.as_str(), "memory://0");
    let saved = sink.images();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].pixel(50, 40), Some([255, 0, 0, 255]));
    assert!(surface.history().is_empty());
}

#[test]
fn test_save_failure_is_reported() {
    let surface = sketch();
    let task = surface.save(Arc::new(FailingSink), || {}).unwrap();
    let err = block_on(task).unwrap_err();
    assert!(matches!(err, PersistenceError::Write(_)));
    assert_eq!(surface.history().len(), 1);
}

#[test]
fn test_on_done_runs_after_result_is_available() {
    let surface = sketch();
    let (tx, rx) = std::sync::mpsc::channel();
    let mut task = surface
        .save(Arc::new(MemorySink::new()), move || tx.send(()).unwrap())
        .unwrap();

    rx.recv().unwrap();
    assert!(matches!(task.try_outcome(), Some(Ok(_))));
}
