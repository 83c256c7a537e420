use std::path::Path;

use ndarray::Array1;

use crate::analysis::modes::{
    classify_regimes, regime_mean, EofAnalysis, RegimeSplit,
};
use crate::data::model::SstaDataset;
use crate::data::preprocess::{normalize, zero_non_finite, Normalization};
use crate::render::animation;

// ---------------------------------------------------------------------------
// Diagnostic views
// ---------------------------------------------------------------------------

/// Which diagnostic plot is shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    VarianceSpectrum,
    LeadingPattern,
    PrincipalComponent,
    RegimeMeans,
    Histogram,
}

impl ViewTab {
    pub const ALL: [ViewTab; 5] = [
        ViewTab::VarianceSpectrum,
        ViewTab::LeadingPattern,
        ViewTab::PrincipalComponent,
        ViewTab::RegimeMeans,
        ViewTab::Histogram,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewTab::VarianceSpectrum => "Variance spectrum",
            ViewTab::LeadingPattern => "Leading pattern (EOF1)",
            ViewTab::PrincipalComponent => "Principal component (PC1)",
            ViewTab::RegimeMeans => "Regime means",
            ViewTab::Histogram => "PC1 histogram",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Regime-conditional spatial means; `None` for a regime with no members.
#[derive(Debug, Clone, Default)]
pub struct RegimeMeans {
    pub warm: Option<Array1<f64>>,
    pub cold: Option<Array1<f64>>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is opened).
    pub dataset: Option<SstaDataset>,

    /// EOF analysis of the mean-removed anomalies.
    pub analysis: Option<EofAnalysis>,

    /// ±1σ regime classification of PC1.
    pub regimes: Option<RegimeSplit>,

    /// Spatial means conditioned on each regime.
    pub regime_means: RegimeMeans,

    /// Currently selected diagnostic view.
    pub view: ViewTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            analysis: None,
            regimes: None,
            regime_means: RegimeMeans::default(),
            view: ViewTab::VarianceSpectrum,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and run the EOF pipeline on it.
    pub fn set_dataset(&mut self, dataset: SstaDataset) {
        let mut anomalies = dataset.ssta.clone();
        let replaced = zero_non_finite(&mut anomalies);
        if replaced > 0 {
            log::info!("zeroed {replaced} non-finite entries before EOF analysis");
        }
        normalize(&mut anomalies, Normalization::PointwiseMeanRemoval);

        match EofAnalysis::from_anomalies(&anomalies) {
            Ok(analysis) => {
                let regimes = classify_regimes(&analysis.pc1);
                log::info!(
                    "EOF1 explains {:.1}% of variance; {} El Niño / {} La Niña steps (σ = {:.3})",
                    analysis.variance_fraction[0] * 100.0,
                    regimes.warm.len(),
                    regimes.cold.len(),
                    regimes.threshold,
                );

                self.regime_means = RegimeMeans {
                    warm: regime_mean(&anomalies, &regimes.warm),
                    cold: regime_mean(&anomalies, &regimes.cold),
                };
                self.analysis = Some(analysis);
                self.regimes = Some(regimes);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("EOF analysis failed: {e}");
                self.analysis = None;
                self.regimes = None;
                self.regime_means = RegimeMeans::default();
                self.status_message = Some(format!("Analysis failed: {e}"));
            }
        }

        self.dataset = Some(dataset);
    }

    /// Write the raw vs. rank-3 animation for the current dataset.
    pub fn export_animation(&mut self, path: &Path) {
        let Some(dataset) = &self.dataset else {
            self.status_message = Some("No dataset loaded".to_string());
            return;
        };
        match animation::render_to_path(dataset, path) {
            Ok(fps) => {
                self.status_message =
                    Some(format!("Wrote {} at {fps} fps", path.display()));
            }
            Err(e) => {
                log::error!("animation export failed: {e:#}");
                self.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn set_dataset_runs_the_pipeline() {
        // 2×2 grid, 4 time steps, with a NaN to exercise cleanup.
        let ssta = array![
            [1.0, -1.0, 2.0, -2.0],
            [0.5, -0.5, 1.0, -1.0],
            [f64::NAN, 0.2, -0.2, 0.1],
            [-1.0, 1.0, -2.0, 2.0]
        ];
        let ds = SstaDataset::new(
            ssta,
            vec![-5.0, -5.0, 5.0, 5.0],
            vec![100.0, 110.0, 100.0, 110.0],
            vec![1990.0, 1991.0, 1992.0, 1993.0],
        )
        .unwrap();

        let mut state = AppState::default();
        state.set_dataset(ds);

        assert!(state.analysis.is_some());
        assert!(state.regimes.is_some());
        assert!(state.status_message.is_none());

        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.eof1.len(), 4);
        assert_eq!(analysis.pc1.len(), 4);
        let total: f64 = analysis.variance_fraction.sum();
        assert!((total - 1.0).abs() < 1e-10);
    }
}
