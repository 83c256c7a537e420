use std::path::Path;

use eframe::egui;

use enso_eof::app::EnsoEofApp;
use enso_eof::data::loader;
use enso_eof::state::AppState;

/// Dataset loaded at startup when present; otherwise use File → Open.
const DEFAULT_DATA_PATH: &str = "data/ssta_pacific.parquet";

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::default();
    let default_path = Path::new(DEFAULT_DATA_PATH);
    if default_path.exists() {
        match loader::load_file(default_path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("failed to load {DEFAULT_DATA_PATH}: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    } else {
        log::info!("no dataset at {DEFAULT_DATA_PATH}; run generate_sample or use File → Open");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ENSO Modes – SSTA EOF Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(EnsoEofApp::new(state)))),
    )
}
