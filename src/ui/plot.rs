use eframe::egui::{Color32, Ui};
use egui_plot::{
    Bar, BarChart, HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints,
    PlotUi, Points,
};
use ndarray::Array1;

use crate::analysis::modes::EofAnalysis;
use crate::color;
use crate::data::model::SstaDataset;
use crate::state::{AppState, ViewTab};

/// Modes shown in the variance spectrum.
const SPECTRUM_MODES: usize = 20;
/// Histogram bin count for the PC1 distribution.
const HISTOGRAM_BINS: usize = 30;
/// Number of discrete colors used for amplitude scatter maps.
const COLOR_BINS: usize = 24;

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

/// Render the currently selected diagnostic plot in the central panel.
pub fn central_view(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(analysis)) = (&state.dataset, &state.analysis) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to begin  (File → Open…)");
        });
        return;
    };

    match state.view {
        ViewTab::VarianceSpectrum => variance_spectrum(ui, analysis),
        ViewTab::LeadingPattern => leading_pattern(ui, dataset, analysis),
        ViewTab::PrincipalComponent => pc_series(ui, state, analysis),
        ViewTab::RegimeMeans => regime_means(ui, dataset, state),
        ViewTab::Histogram => pc_histogram(ui, analysis),
    }
}

// ---------------------------------------------------------------------------
// Variance spectrum
// ---------------------------------------------------------------------------

/// Fraction of variance explained by each of the leading modes.
fn variance_spectrum(ui: &mut Ui, analysis: &EofAnalysis) {
    let n_modes = SPECTRUM_MODES.min(analysis.variance_fraction.len());
    let points: Vec<[f64; 2]> = analysis
        .variance_fraction
        .iter()
        .take(n_modes)
        .enumerate()
        .map(|(i, &vf)| [(i + 1) as f64, vf])
        .collect();

    Plot::new("variance_spectrum")
        .x_axis_label("Mode number")
        .y_axis_label("Fraction of variance")
        .show(ui, |plot_ui: &mut PlotUi| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(Color32::LIGHT_BLUE)
                    .shape(MarkerShape::Circle)
                    .radius(4.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Spatial scatter maps
// ---------------------------------------------------------------------------

/// Scatter one spatial field over (lon, lat), colored by amplitude with the
/// diverging map over a symmetric range. Points are grouped into color
/// buckets so the plot holds a bounded number of items.
fn scatter_map(plot_ui: &mut PlotUi, dataset: &SstaDataset, values: &Array1<f64>) {
    let limit = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));

    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); COLOR_BINS];
    for (i, &v) in values.iter().enumerate() {
        let t = color::normalize_amplitude(v, limit);
        let bucket = ((t * (COLOR_BINS - 1) as f32).round() as usize).min(COLOR_BINS - 1);
        buckets[bucket].push([dataset.lon[i], dataset.lat[i]]);
    }

    for (bucket, pts) in buckets.into_iter().enumerate() {
        if pts.is_empty() {
            continue;
        }
        let t = bucket as f32 / (COLOR_BINS - 1) as f32;
        let [r, g, b] = color::diverging(t);
        plot_ui.points(
            Points::new(PlotPoints::from(pts))
                .color(Color32::from_rgb(r, g, b))
                .shape(MarkerShape::Circle)
                .radius(3.0),
        );
    }
}

/// EOF1 amplitude over the grid.
fn leading_pattern(ui: &mut Ui, dataset: &SstaDataset, analysis: &EofAnalysis) {
    ui.label(format!(
        "Leading spatial pattern — {:.1}% of variance",
        analysis.variance_fraction[0] * 100.0
    ));
    Plot::new("eof1_map")
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui: &mut PlotUi| {
            scatter_map(plot_ui, dataset, &analysis.eof1);
        });
}

/// Regime-conditional mean anomaly maps, stacked El Niño over La Niña.
fn regime_means(ui: &mut Ui, dataset: &SstaDataset, state: &AppState) {
    let Some(regimes) = &state.regimes else {
        ui.label("No regime classification available.");
        return;
    };
    let half = ui.available_height() / 2.0 - 24.0;

    regime_panel(
        ui,
        dataset,
        &format!("El Niño mean (PC1 > +σ, {} steps)", regimes.warm.len()),
        "warm_regime_map",
        state.regime_means.warm.as_ref(),
        half,
    );
    regime_panel(
        ui,
        dataset,
        &format!("La Niña mean (PC1 < -σ, {} steps)", regimes.cold.len()),
        "cold_regime_map",
        state.regime_means.cold.as_ref(),
        half,
    );
}

fn regime_panel(
    ui: &mut Ui,
    dataset: &SstaDataset,
    title: &str,
    id: &str,
    mean: Option<&Array1<f64>>,
    height: f32,
) {
    ui.label(title);
    match mean {
        Some(field) => {
            Plot::new(id.to_string())
                .x_axis_label("Longitude")
                .y_axis_label("Latitude")
                .height(height)
                .show(ui, |plot_ui: &mut PlotUi| {
                    scatter_map(plot_ui, dataset, field);
                });
        }
        None => {
            ui.label("No time steps beyond the ±σ threshold.");
        }
    }
}

// ---------------------------------------------------------------------------
// PC1 time series and distribution
// ---------------------------------------------------------------------------

/// Leading principal component over time, with the ±σ regime thresholds.
fn pc_series(ui: &mut Ui, state: &AppState, analysis: &EofAnalysis) {
    let points: Vec<[f64; 2]> = analysis
        .pc1
        .iter()
        .enumerate()
        .map(|(t, &v)| [t as f64, v])
        .collect();

    Plot::new("pc1_series")
        .legend(Legend::default())
        .x_axis_label("Time index")
        .y_axis_label("PC1 value")
        .show(ui, |plot_ui: &mut PlotUi| {
            plot_ui.line(
                Line::new(PlotPoints::from(points))
                    .name("PC1")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            if let Some(regimes) = &state.regimes {
                plot_ui.hline(
                    HLine::new(regimes.threshold)
                        .name("+σ")
                        .color(Color32::LIGHT_RED)
                        .style(LineStyle::dashed_loose()),
                );
                plot_ui.hline(
                    HLine::new(-regimes.threshold)
                        .name("-σ")
                        .color(Color32::LIGHT_BLUE)
                        .style(LineStyle::dashed_loose()),
                );
            }
        });
}

/// Probability-density histogram of PC1.
fn pc_histogram(ui: &mut Ui, analysis: &EofAnalysis) {
    let bars = histogram_bars(&analysis.pc1, HISTOGRAM_BINS);

    Plot::new("pc1_histogram")
        .x_axis_label("PC1 value")
        .y_axis_label("Probability density")
        .show(ui, |plot_ui: &mut PlotUi| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

/// Equal-width density bars: counts normalised so the bar areas sum to 1.
fn histogram_bars(values: &Array1<f64>, n_bins: usize) -> Vec<Bar> {
    let n = values.len();
    if n == 0 || n_bins == 0 {
        return Vec::new();
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= 0.0 {
        return vec![Bar::new(min, 1.0).width(1.0)];
    }
    let width = span / n_bins as f64;

    let mut counts = vec![0usize; n_bins];
    for &v in values.iter() {
        let bin = (((v - min) / width) as usize).min(n_bins - 1);
        counts[bin] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let center = min + (i as f64 + 0.5) * width;
            let density = c as f64 / (n as f64 * width);
            Bar::new(center, density).width(width * 0.95)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn histogram_densities_integrate_to_one() {
        let values = array![0.1, 0.2, -0.3, 1.5, -1.2, 0.7, 0.0, 0.4];
        let bars = histogram_bars(&values, 10);
        assert_eq!(bars.len(), 10);

        let width = (1.5 - (-1.2)) / 10.0;
        let area: f64 = bars.iter().map(|b| b.value * width).sum();
        assert!((area - 1.0).abs() < 1e-10, "area {area}");
    }

    #[test]
    fn constant_series_degenerates_to_one_bar() {
        let values = array![0.5, 0.5, 0.5];
        let bars = histogram_bars(&values, 30);
        assert_eq!(bars.len(), 1);
    }
}
