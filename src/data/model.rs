use ndarray::Array2;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DatasetError – fatal shape/consistency violations
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(
        "grid mismatch: {nlat} unique latitudes × {nlon} unique longitudes = {expected}, \
         but the anomaly matrix has {actual} spatial rows"
    )]
    GridMismatch {
        nlat: usize,
        nlon: usize,
        expected: usize,
        actual: usize,
    },

    #[error("anomaly matrix is empty")]
    Empty,

    #[error("coordinate vectors have {coords} entries but the anomaly matrix has {rows} rows")]
    CoordinateMismatch { coords: usize, rows: usize },

    #[error("time axis has {years} entries but the anomaly matrix has {cols} columns")]
    TimeMismatch { years: usize, cols: usize },
}

// ---------------------------------------------------------------------------
// SstaDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// A gridded sea-surface-temperature-anomaly dataset.
///
/// Row `i` of `ssta` is one grid point, flattened row-major over the
/// coordinate axes: `i = lat_index * nlon + lon_index`. Column `t` is one
/// time step, labelled by `years[t]`.
#[derive(Debug, Clone)]
pub struct SstaDataset {
    /// Anomaly matrix, (space × time). May contain NaN/Inf as loaded.
    pub ssta: Array2<f64>,
    /// Latitude of each grid point (one entry per row of `ssta`).
    pub lat: Vec<f64>,
    /// Longitude of each grid point.
    pub lon: Vec<f64>,
    /// Fractional year of each time step (one entry per column of `ssta`).
    pub years: Vec<f64>,
    /// Sorted unique latitude values.
    pub lat_axis: Vec<f64>,
    /// Sorted unique longitude values.
    pub lon_axis: Vec<f64>,
}

/// Count of non-finite entries, reported at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonFiniteReport {
    pub nan: usize,
    pub infinite: usize,
}

impl NonFiniteReport {
    pub fn any(&self) -> bool {
        self.nan > 0 || self.infinite > 0
    }
}

impl SstaDataset {
    /// Build a dataset, validating coordinate and grid consistency.
    ///
    /// The grid check (`nlat * nlon == rows`) mirrors the invariant required
    /// for reshaping a matrix column onto the (nlat × nlon) image grid and is
    /// fatal when violated.
    pub fn new(
        ssta: Array2<f64>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        years: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        let (rows, cols) = ssta.dim();
        if rows == 0 || cols == 0 {
            return Err(DatasetError::Empty);
        }
        if lat.len() != rows || lon.len() != rows {
            return Err(DatasetError::CoordinateMismatch {
                coords: lat.len().min(lon.len()),
                rows,
            });
        }
        if years.len() != cols {
            return Err(DatasetError::TimeMismatch {
                years: years.len(),
                cols,
            });
        }

        let lat_axis = unique_sorted(&lat);
        let lon_axis = unique_sorted(&lon);
        let expected = lat_axis.len() * lon_axis.len();
        if expected != rows {
            return Err(DatasetError::GridMismatch {
                nlat: lat_axis.len(),
                nlon: lon_axis.len(),
                expected,
                actual: rows,
            });
        }

        Ok(SstaDataset {
            ssta,
            lat,
            lon,
            years,
            lat_axis,
            lon_axis,
        })
    }

    /// Number of spatial grid points (rows).
    pub fn n_points(&self) -> usize {
        self.ssta.nrows()
    }

    /// Number of time steps (columns).
    pub fn n_steps(&self) -> usize {
        self.ssta.ncols()
    }

    pub fn nlat(&self) -> usize {
        self.lat_axis.len()
    }

    pub fn nlon(&self) -> usize {
        self.lon_axis.len()
    }

    /// Grid coordinates (lat index, lon index) of spatial row `i`.
    pub fn grid_index(&self, i: usize) -> (usize, usize) {
        (i / self.nlon(), i % self.nlon())
    }

    /// Count NaN and infinite entries in the anomaly matrix.
    pub fn non_finite_report(&self) -> NonFiniteReport {
        let mut nan = 0;
        let mut infinite = 0;
        for &v in self.ssta.iter() {
            if v.is_nan() {
                nan += 1;
            } else if v.is_infinite() {
                infinite += 1;
            }
        }
        NonFiniteReport { nan, infinite }
    }
}

/// Sorted, deduplicated copy of a coordinate vector.
fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid_2x2() -> (Vec<f64>, Vec<f64>) {
        // lat-major flattening: (-5, 100), (-5, 110), (5, 100), (5, 110)
        (
            vec![-5.0, -5.0, 5.0, 5.0],
            vec![100.0, 110.0, 100.0, 110.0],
        )
    }

    #[test]
    fn grid_check_passes_for_2x2() {
        let ssta = array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6], [0.7, 0.8]];
        let (lat, lon) = grid_2x2();
        let ds = SstaDataset::new(ssta, lat, lon, vec![1990.0, 1991.0]).unwrap();
        assert_eq!(ds.nlat(), 2);
        assert_eq!(ds.nlon(), 2);
        assert_eq!(ds.n_points(), 4);
        assert_eq!(ds.grid_index(3), (1, 1));
    }

    #[test]
    fn grid_mismatch_is_fatal() {
        // Three distinct latitudes × two longitudes = 6 ≠ 4 rows.
        let ssta = array![[0.1], [0.3], [0.5], [0.7]];
        let lat = vec![-5.0, -5.0, 0.0, 5.0];
        let lon = vec![100.0, 110.0, 100.0, 110.0];
        let err = SstaDataset::new(ssta, lat, lon, vec![1990.0]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::GridMismatch {
                expected: 6,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn time_axis_must_match_columns() {
        let ssta = array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6], [0.7, 0.8]];
        let (lat, lon) = grid_2x2();
        let err = SstaDataset::new(ssta, lat, lon, vec![1990.0]).unwrap_err();
        assert!(matches!(err, DatasetError::TimeMismatch { years: 1, cols: 2 }));
    }

    #[test]
    fn non_finite_report_counts_nan_and_inf() {
        let ssta = array![
            [f64::NAN, 0.2],
            [0.3, f64::INFINITY],
            [0.5, 0.6],
            [0.7, 0.8]
        ];
        let (lat, lon) = grid_2x2();
        let ds = SstaDataset::new(ssta, lat, lon, vec![1990.0, 1991.0]).unwrap();
        let report = ds.non_finite_report();
        assert_eq!(report.nan, 1);
        assert_eq!(report.infinite, 1);
        assert!(report.any());
    }
}
