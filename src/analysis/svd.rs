use nalgebra::DMatrix;
use ndarray::{s, Array1, Array2};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SvdError {
    #[error("cannot decompose an empty matrix")]
    EmptyMatrix,

    #[error("singular value decomposition did not converge")]
    NoConvergence,
}

// ---------------------------------------------------------------------------
// Economy-size SVD
// ---------------------------------------------------------------------------

/// Economy-size SVD of a (space × time) matrix: `matrix ≈ u · diag(s) · vt`
/// with `r = min(space, time)` modes and singular values in descending order.
#[derive(Debug, Clone)]
pub struct SvdDecomposition {
    /// Left singular vectors (spatial patterns, EOFs), (space × r).
    pub u: Array2<f64>,
    /// Singular values (mode strengths), length r.
    pub s: Array1<f64>,
    /// Right singular vectors (time series, PCs), (r × time).
    pub vt: Array2<f64>,
}

/// Decompose a matrix with nalgebra's dense SVD.
pub fn economy_svd(matrix: &Array2<f64>) -> Result<SvdDecomposition, SvdError> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || cols == 0 {
        return Err(SvdError::EmptyMatrix);
    }

    // ndarray iterates row-major by default, matching from_row_iterator.
    let m = DMatrix::from_row_iterator(rows, cols, matrix.iter().copied());
    let svd = nalgebra::SVD::try_new(m, true, true, f64::EPSILON, 0)
        .ok_or(SvdError::NoConvergence)?;

    let u_m = svd.u.ok_or(SvdError::NoConvergence)?;
    let vt_m = svd.v_t.ok_or(SvdError::NoConvergence)?;

    let u = Array2::from_shape_fn((u_m.nrows(), u_m.ncols()), |(i, j)| u_m[(i, j)]);
    let vt = Array2::from_shape_fn((vt_m.nrows(), vt_m.ncols()), |(i, j)| vt_m[(i, j)]);
    let s = Array1::from_iter(svd.singular_values.iter().copied());

    Ok(SvdDecomposition { u, s, vt })
}

impl SvdDecomposition {
    /// Number of modes in the decomposition.
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// Rank-`k` reconstruction, keeping the `k` leading singular triplets.
    /// `k` larger than the rank reconstructs with all modes.
    pub fn reconstruct(&self, k: usize) -> Array2<f64> {
        let k = k.min(self.rank());
        let u_k = self.u.slice(s![.., ..k]);
        let s_k = self.s.slice(s![..k]);
        let vt_k = self.vt.slice(s![..k, ..]);

        // (space × k) scaled column-wise by s, then times (k × time).
        let scaled = u_k.to_owned() * &s_k;
        scaled.dot(&vt_k)
    }

    /// Fraction of total variance carried by each mode: `s_i² / Σ s_j²`.
    pub fn variance_fraction(&self) -> Array1<f64> {
        let variance = self.s.mapv(|v| v * v);
        let total = variance.sum();
        if total > 0.0 {
            variance / total
        } else {
            variance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn frobenius(m: &Array2<f64>) -> f64 {
        m.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn sample_matrix() -> Array2<f64> {
        array![
            [1.0, 2.0, -1.0, 0.5],
            [0.0, 1.5, 2.0, -0.5],
            [-1.0, 0.5, 1.0, 2.0],
            [2.0, -1.0, 0.5, 1.0],
            [0.5, 0.5, -2.0, 1.5],
            [1.5, -0.5, 1.0, -1.0],
        ]
    }

    #[test]
    fn full_rank_reconstruction_round_trips() {
        let m = sample_matrix();
        let svd = economy_svd(&m).unwrap();
        let rebuilt = svd.reconstruct(svd.rank());
        let err = frobenius(&(&m - &rebuilt));
        assert!(err < 1e-10, "round-trip error {err}");
    }

    #[test]
    fn rank_k_error_is_non_increasing() {
        let m = sample_matrix();
        let svd = economy_svd(&m).unwrap();

        let mut previous = f64::INFINITY;
        for k in 1..=svd.rank() {
            let err = frobenius(&(&m - &svd.reconstruct(k)));
            assert!(
                err <= previous + 1e-12,
                "error grew from {previous} to {err} at k={k}"
            );
            previous = err;
        }
    }

    #[test]
    fn singular_values_are_descending() {
        let svd = economy_svd(&sample_matrix()).unwrap();
        for w in svd.s.as_slice().unwrap().windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn variance_fractions_sum_to_one() {
        let svd = economy_svd(&sample_matrix()).unwrap();
        let total: f64 = svd.variance_fraction().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_matrix_is_an_error() {
        let m = Array2::<f64>::zeros((0, 4));
        assert!(matches!(economy_svd(&m), Err(SvdError::EmptyMatrix)));
    }

    #[test]
    fn reconstruct_clamps_k_to_rank() {
        let m = sample_matrix();
        let svd = economy_svd(&m).unwrap();
        let rebuilt = svd.reconstruct(100);
        assert!(frobenius(&(&m - &rebuilt)) < 1e-10);
    }
}
