//! Writes a synthetic Pacific SSTA dataset to `data/ssta_pacific.parquet`.
//!
//! The field is built from a planted ENSO-like leading mode (an eastern
//! equatorial warm-pool pattern driven by a slowly varying AR(1) series), a
//! weaker zonal dipole mode, white noise, and a small masked-out "land"
//! region so the loader's NaN handling is exercised.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

const OUTPUT_PATH: &str = "data/ssta_pacific.parquet";

const LAT_START: f64 = -28.0;
const LON_START: f64 = 140.0;
const GRID_STEP: f64 = 4.0;
const NLAT: usize = 15;
const NLON: usize = 36;

/// Monthly steps over 1950–2000.
const N_STEPS: usize = 600;
const START_YEAR: f64 = 1950.0;

fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// AR(1) series with unit-ish variance: `x_t = phi * x_{t-1} + e_t`.
fn ar1_series(n: usize, phi: f64, noise: f64, rng: &mut StdRng) -> Vec<f64> {
    let dist = Normal::new(0.0, noise).expect("valid normal");
    let mut series = Vec::with_capacity(n);
    let mut x = 0.0;
    for _ in 0..n {
        x = phi * x + rng.sample(dist);
        series.push(x);
    }
    series
}

/// ENSO-like spatial pattern: warm tongue in the eastern equatorial Pacific.
fn enso_pattern(lat: f64, lon: f64) -> f64 {
    gaussian(lat, 0.0, 10.0) * gaussian(lon, 235.0, 35.0)
}

/// Weaker secondary mode: zonal dipole across the basin.
fn dipole_pattern(lat: f64, lon: f64) -> f64 {
    let zonal = ((lon - LON_START) / 140.0 * std::f64::consts::PI).sin();
    gaussian(lat, 0.0, 14.0) * zonal * 0.4
}

/// Crude land mask in the north-western corner of the domain.
fn is_land(lat: f64, lon: f64) -> bool {
    lat > 16.0 && lon < 152.0
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(42);

    let years: Vec<f64> = (0..N_STEPS)
        .map(|m| START_YEAR + m as f64 / 12.0)
        .collect();

    let pc_enso = ar1_series(N_STEPS, 0.93, 0.4, &mut rng);
    let pc_dipole = ar1_series(N_STEPS, 0.8, 0.3, &mut rng);
    let noise = Normal::new(0.0, 0.2).expect("valid normal");

    // Grid points flattened lat-major: index = lat_idx * NLON + lon_idx.
    let mut lat = Vec::with_capacity(NLAT * NLON);
    let mut lon = Vec::with_capacity(NLAT * NLON);
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(NLAT * NLON);

    for lat_idx in 0..NLAT {
        for lon_idx in 0..NLON {
            let point_lat = LAT_START + lat_idx as f64 * GRID_STEP;
            let point_lon = LON_START + lon_idx as f64 * GRID_STEP;
            lat.push(point_lat);
            lon.push(point_lon);

            if is_land(point_lat, point_lon) {
                rows.push(vec![f64::NAN; N_STEPS]);
                continue;
            }

            let enso = enso_pattern(point_lat, point_lon);
            let dipole = dipole_pattern(point_lat, point_lon);
            let series: Vec<f64> = (0..N_STEPS)
                .map(|t| {
                    enso * pc_enso[t] + dipole * pc_dipole[t] + rng.sample(noise)
                })
                .collect();
            rows.push(series);
        }
    }

    write_parquet(&lat, &lon, &years, &rows)?;
    println!(
        "Wrote {} grid points × {N_STEPS} time steps to {OUTPUT_PATH}",
        rows.len()
    );
    Ok(())
}

fn write_parquet(
    lat: &[f64],
    lon: &[f64],
    years: &[f64],
    rows: &[Vec<f64>],
) -> Result<()> {
    let lat_array = Float64Array::from(lat.to_vec());
    let lon_array = Float64Array::from(lon.to_vec());

    // The year list is identical on every row; the loader reads row 0.
    let mut year_builder = ListBuilder::new(Float64Builder::new());
    for _ in rows {
        let values = year_builder.values();
        for &y in years {
            values.append_value(y);
        }
        year_builder.append(true);
    }
    let year_array = year_builder.finish();

    let mut ssta_builder = ListBuilder::new(Float64Builder::new());
    for row in rows {
        let values = ssta_builder.values();
        for &v in row {
            values.append_value(v);
        }
        ssta_builder.append(true);
    }
    let ssta_array = ssta_builder.finish();

    let list_field = |name: &str| {
        Field::new(
            name,
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        )
    };
    let schema = Arc::new(Schema::new(vec![
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
        list_field("year"),
        list_field("ssta"),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(lat_array),
            Arc::new(lon_array),
            Arc::new(year_array),
            Arc::new(ssta_array),
        ],
    )
    .context("creating RecordBatch")?;

    std::fs::create_dir_all("data").context("creating data directory")?;
    let file = std::fs::File::create(OUTPUT_PATH)
        .with_context(|| format!("creating {OUTPUT_PATH}"))?;
    let mut writer =
        ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
