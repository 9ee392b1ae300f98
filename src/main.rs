#![warn(clippy::all, rust_2018_idioms)]

use doodle_pad::{DoodleApp, DrawingConfig};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = match std::env::args_os().nth(1) {
        Some(path) => DrawingConfig::load(std::path::Path::new(&path)).unwrap_or_else(|err| {
            log::error!("{err}; falling back to the default configuration");
            DrawingConfig::default()
        }),
        None => DrawingConfig::default(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 640.0])
            .with_min_inner_size([320.0, 240.0])
            .with_title("Doodle Pad"),
        ..Default::default()
    };
    eframe::run_native(
        "Doodle Pad",
        native_options,
        Box::new(move |cc| Ok(Box::new(DoodleApp::new(cc, config)?))),
    )
}
