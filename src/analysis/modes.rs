use ndarray::{Array1, Array2};

use super::svd::{economy_svd, SvdDecomposition, SvdError};

// ---------------------------------------------------------------------------
// EOF analysis of a mean-removed anomaly matrix
// ---------------------------------------------------------------------------

/// Leading-mode analysis derived from the SVD of a mean-removed
/// (space × time) anomaly matrix.
#[derive(Debug, Clone)]
pub struct EofAnalysis {
    pub decomposition: SvdDecomposition,
    /// Fraction of variance explained per mode.
    pub variance_fraction: Array1<f64>,
    /// Leading spatial pattern: first column of the left singular vectors.
    pub eof1: Array1<f64>,
    /// Leading time series: first row of the right singular vectors.
    pub pc1: Array1<f64>,
}

impl EofAnalysis {
    pub fn from_anomalies(anomalies: &Array2<f64>) -> Result<Self, SvdError> {
        let decomposition = economy_svd(anomalies)?;
        let variance_fraction = decomposition.variance_fraction();
        let eof1 = decomposition.u.column(0).to_owned();
        let pc1 = decomposition.vt.row(0).to_owned();
        Ok(EofAnalysis {
            decomposition,
            variance_fraction,
            eof1,
            pc1,
        })
    }
}

// ---------------------------------------------------------------------------
// Regime classification
// ---------------------------------------------------------------------------

/// Partition of time indices by a one-standard-deviation threshold on PC1.
/// Indices within ±threshold are left unclassified.
#[derive(Debug, Clone)]
pub struct RegimeSplit {
    /// One standard deviation of PC1.
    pub threshold: f64,
    /// El Niño time steps: `pc1 > +threshold`.
    pub warm: Vec<usize>,
    /// La Niña time steps: `pc1 < -threshold`.
    pub cold: Vec<usize>,
}

pub fn classify_regimes(pc1: &Array1<f64>) -> RegimeSplit {
    let n = pc1.len() as f64;
    let mean = pc1.sum() / n;
    let var = pc1.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let threshold = var.sqrt();

    let mut warm = Vec::new();
    let mut cold = Vec::new();
    for (t, &v) in pc1.iter().enumerate() {
        if v > threshold {
            warm.push(t);
        } else if v < -threshold {
            cold.push(t);
        }
    }

    RegimeSplit {
        threshold,
        warm,
        cold,
    }
}

/// Mean of the anomaly matrix over the member time columns of one regime,
/// yielding one spatial map. `None` when the regime has no members.
pub fn regime_mean(anomalies: &Array2<f64>, indices: &[usize]) -> Option<Array1<f64>> {
    if indices.is_empty() {
        return None;
    }
    let mut acc = Array1::<f64>::zeros(anomalies.nrows());
    for &t in indices {
        acc += &anomalies.column(t);
    }
    Some(acc / indices.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn threshold_classification_matches_std() {
        let pc1 = array![2.0, -2.0, 0.0, 0.1];

        let n = pc1.len() as f64;
        let mean = pc1.sum() / n;
        let sigma =
            (pc1.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        let split = classify_regimes(&pc1);
        assert!((split.threshold - sigma).abs() < 1e-12);

        assert_eq!(split.warm.contains(&0), 2.0 > sigma);
        assert_eq!(split.cold.contains(&1), -2.0 < -sigma);
        // 0.0 and 0.1 are well inside ±σ for this series.
        assert!(!split.warm.contains(&2) && !split.cold.contains(&2));
        assert!(!split.warm.contains(&3) && !split.cold.contains(&3));
    }

    #[test]
    fn regime_mean_averages_member_columns() {
        let anomalies = array![[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]];
        let mean = regime_mean(&anomalies, &[0, 2]).unwrap();
        assert_eq!(mean, array![3.0, 4.0]);
    }

    #[test]
    fn empty_regime_has_no_mean() {
        let anomalies = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(regime_mean(&anomalies, &[]).is_none());
    }

    #[test]
    fn eof_analysis_recovers_a_planted_mode() {
        // Rank-1 matrix: spatial pattern ⊗ time series.
        let pattern = array![1.0, -1.0, 2.0, 0.5];
        let series = array![3.0, -3.0, 1.0, -1.0, 2.0];
        let mut m = Array2::<f64>::zeros((4, 5));
        for i in 0..4 {
            for t in 0..5 {
                m[[i, t]] = pattern[i] * series[t];
            }
        }

        let analysis = EofAnalysis::from_anomalies(&m).unwrap();
        assert!(analysis.variance_fraction[0] > 0.999);

        // EOF1/PC1 match the planted vectors up to scale and sign.
        let scale = analysis.eof1[0] / pattern[0];
        for (a, b) in analysis.eof1.iter().zip(pattern.iter()) {
            assert!((a - scale * b).abs() < 1e-10);
        }
    }
}
