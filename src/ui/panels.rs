use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, ViewTab};

// ---------------------------------------------------------------------------
// Left side panel – view selector and analysis summary
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Diagnostics");
    ui.separator();

    for tab in ViewTab::ALL {
        ui.selectable_value(&mut state.view, tab, tab.label());
    }
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Dataset");
            ui.label(format!(
                "{} × {} grid, {} time steps",
                dataset.nlat(),
                dataset.nlon(),
                dataset.n_steps()
            ));
            if let (Some(first), Some(last)) =
                (dataset.years.first(), dataset.years.last())
            {
                ui.label(format!("Years {first:.1} – {last:.1}"));
            }
            let report = dataset.non_finite_report();
            if report.any() {
                ui.label(format!(
                    "{} NaN / {} Inf entries (zeroed for analysis)",
                    report.nan, report.infinite
                ));
            }
            ui.separator();

            if let Some(analysis) = &state.analysis {
                ui.strong("Leading modes");
                for (i, &vf) in
                    analysis.variance_fraction.iter().take(5).enumerate()
                {
                    ui.label(format!("Mode {}: {:.1}%", i + 1, vf * 100.0));
                }
                ui.separator();
            }

            if let Some(regimes) = &state.regimes {
                ui.strong("Regimes (±1σ on PC1)");
                ui.label(format!("σ = {:.3}", regimes.threshold));
                ui.label(format!("El Niño steps: {}", regimes.warm.len()));
                ui.label(format!("La Niña steps: {}", regimes.cold.len()));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export animation…").clicked() {
                export_animation_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} grid points × {} time steps",
                ds.n_points(),
                ds.n_steps()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open SSTA dataset")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn export_animation_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export animation")
        .set_file_name("ssta_animation.gif")
        .add_filter("GIF", &["gif"])
        .save_file();

    if let Some(path) = file {
        state.export_animation(&path);
    }
}
