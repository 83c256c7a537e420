use ndarray::{Array2, Axis};

// ---------------------------------------------------------------------------
// Non-finite cleanup
// ---------------------------------------------------------------------------

/// Replace NaN and ±Inf entries with 0.0, returning the number replaced.
pub fn zero_non_finite(field: &mut Array2<f64>) -> usize {
    let mut replaced = 0;
    field.map_inplace(|v| {
        if !v.is_finite() {
            *v = 0.0;
            replaced += 1;
        }
    });
    replaced
}

// ---------------------------------------------------------------------------
// Normalization policies
// ---------------------------------------------------------------------------

/// Mutually exclusive normalization policies applied before decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Subtract the matrix-wide mean and divide by the matrix-wide
    /// (population) standard deviation. Used before the animation SVD.
    GlobalStandardize,
    /// Subtract each spatial point's own across-time mean, the classic
    /// anomaly-from-mean step before an EOF decomposition.
    PointwiseMeanRemoval,
}

/// Apply one normalization policy in place.
pub fn normalize(field: &mut Array2<f64>, policy: Normalization) {
    match policy {
        Normalization::GlobalStandardize => {
            let n = field.len() as f64;
            let mean = field.sum() / n;
            let var = field.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            if std > 0.0 {
                field.map_inplace(|v| *v = (*v - mean) / std);
            } else {
                field.map_inplace(|v| *v -= mean);
            }
        }
        Normalization::PointwiseMeanRemoval => {
            let cols = field.ncols() as f64;
            for mut row in field.axis_iter_mut(Axis(0)) {
                let mean = row.sum() / cols;
                row.map_inplace(|v| *v -= mean);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_non_finite_preserves_finite_entries() {
        let mut m = array![[1.0, f64::NAN, -2.5], [f64::INFINITY, 0.0, f64::NEG_INFINITY]];
        let replaced = zero_non_finite(&mut m);
        assert_eq!(replaced, 3);
        assert!(m.iter().all(|v| v.is_finite()));
        assert_eq!(m, array![[1.0, 0.0, -2.5], [0.0, 0.0, 0.0]]);
    }

    #[test]
    fn global_standardize_yields_zero_mean_unit_std() {
        let mut m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        normalize(&mut m, Normalization::GlobalStandardize);

        let n = m.len() as f64;
        let mean = m.sum() / n;
        let var = m.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12);
        assert!((var.sqrt() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pointwise_mean_removal_zeroes_row_means() {
        let mut m = array![[1.0, 3.0, 5.0], [-2.0, 0.0, 2.0]];
        normalize(&mut m, Normalization::PointwiseMeanRemoval);

        for row in m.rows() {
            let mean = row.sum() / row.len() as f64;
            assert!(mean.abs() < 1e-12);
        }
        // Deviations from each row mean are untouched.
        assert_eq!(m, array![[-2.0, 0.0, 2.0], [-2.0, 0.0, 2.0]]);
    }

    #[test]
    fn constant_matrix_standardizes_to_zero() {
        let mut m = Array2::from_elem((2, 4), 3.5);
        normalize(&mut m, Normalization::GlobalStandardize);
        assert!(m.iter().all(|&v| v == 0.0));
    }
}
