use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use ndarray::Array2;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::SstaDataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an SSTA dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one record per grid point: `lat`, `lon` scalars plus
///   `year` and `ssta` list columns (recommended)
/// * `.json`    – `{ "years": [...], "points": [{ "lat", "lon", "ssta" }] }`
/// * `.csv`     – wide layout: header `lat,lon,<year>,<year>,...`
pub fn load_file(path: &Path) -> Result<SstaDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!(
        "loaded SSTA matrix: {} grid points × {} time steps ({} lat × {} lon)",
        dataset.n_points(),
        dataset.n_steps(),
        dataset.nlat(),
        dataset.nlon(),
    );
    let report = dataset.non_finite_report();
    log::info!(
        "NaN entries: {}, Inf entries: {}",
        report.nan,
        report.infinite
    );

    Ok(dataset)
}

/// Assemble and validate a dataset from per-grid-point rows.
fn build_dataset(
    lat: Vec<f64>,
    lon: Vec<f64>,
    years: Vec<f64>,
    rows: Vec<Vec<f64>>,
) -> Result<SstaDataset> {
    let n_steps = years.len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_steps {
            bail!(
                "grid point {i}: {} anomaly values but {} time steps",
                row.len(),
                n_steps
            );
        }
    }

    let n_points = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let ssta = Array2::from_shape_vec((n_points, n_steps), flat)
        .context("assembling anomaly matrix")?;

    Ok(SstaDataset::new(ssta, lat, lon, years)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct JsonDataset {
    years: Vec<f64>,
    points: Vec<JsonPoint>,
}

#[derive(Deserialize)]
struct JsonPoint {
    lat: f64,
    lon: f64,
    /// `null` entries decode to NaN (JSON cannot represent NaN directly).
    ssta: Vec<Option<f64>>,
}

fn load_json(path: &Path) -> Result<SstaDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<SstaDataset> {
    let parsed: JsonDataset = serde_json::from_str(text).context("parsing JSON")?;

    let mut lat = Vec::with_capacity(parsed.points.len());
    let mut lon = Vec::with_capacity(parsed.points.len());
    let mut rows = Vec::with_capacity(parsed.points.len());
    for p in parsed.points {
        lat.push(p.lat);
        lon.push(p.lon);
        rows.push(
            p.ssta
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect(),
        );
    }

    build_dataset(lat, lon, parsed.years, rows)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: one row per grid point.  The header names the two coordinate
/// columns followed by one column per time step, labelled by fractional year:
///   `lat,lon,1950.0,1950.083,...`
/// Empty cells or `nan` decode to NaN.
fn load_csv(path: &Path) -> Result<SstaDataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

fn read_csv<R: Read>(reader: R) -> Result<SstaDataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.len() < 3 || headers[0] != "lat" || headers[1] != "lon" {
        bail!("CSV header must start with 'lat,lon' followed by year columns");
    }

    let years: Vec<f64> = headers[2..]
        .iter()
        .map(|h| {
            h.trim()
                .parse::<f64>()
                .with_context(|| format!("year column '{h}' is not a number"))
        })
        .collect::<Result<_>>()?;

    let mut lat = Vec::new();
    let mut lon = Vec::new();
    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields, expected {}",
                record.len(),
                headers.len()
            );
        }

        lat.push(parse_cell(record.get(0).unwrap_or(""), row_no, "lat")?);
        lon.push(parse_cell(record.get(1).unwrap_or(""), row_no, "lon")?);

        let values: Vec<f64> = record
            .iter()
            .skip(2)
            .enumerate()
            .map(|(j, cell)| parse_cell(cell, row_no, &headers[j + 2]))
            .collect::<Result<_>>()?;
        rows.push(values);
    }

    build_dataset(lat, lon, years, rows)
}

fn parse_cell(s: &str, row: usize, col: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, column '{col}': '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing gridded anomaly data.
///
/// Expected schema:
/// - `lat`, `lon`: Float64 – grid-point coordinates
/// - `year`: List<Float64> or LargeList<Float64> – the time axis, identical
///   on every row (read from the first row)
/// - `ssta`: List<Float64> or LargeList<Float64> – the anomaly series
fn load_parquet(path: &Path) -> Result<SstaDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut lat = Vec::new();
    let mut lon = Vec::new();
    let mut years: Option<Vec<f64>> = None;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let lat_idx = schema
            .index_of("lat")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'lat' column"))?;
        let lon_idx = schema
            .index_of("lon")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'lon' column"))?;
        let year_idx = schema
            .index_of("year")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'year' column"))?;
        let ssta_idx = schema
            .index_of("ssta")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'ssta' column"))?;

        let lat_col = batch.column(lat_idx);
        let lon_col = batch.column(lon_idx);
        let year_col = batch.column(year_idx);
        let ssta_col = batch.column(ssta_idx);

        for row in 0..batch.num_rows() {
            lat.push(extract_f64(lat_col, row).with_context(|| format!("Row {row}: 'lat'"))?);
            lon.push(extract_f64(lon_col, row).with_context(|| format!("Row {row}: 'lon'"))?);

            if years.is_none() {
                years = Some(
                    extract_f64_list(year_col, row)
                        .with_context(|| format!("Row {row}: failed to read 'year'"))?,
                );
            }

            rows.push(
                extract_f64_list(ssta_col, row)
                    .with_context(|| format!("Row {row}: failed to read 'ssta'"))?,
            );
        }
    }

    let years = years.context("parquet file contains no rows")?;
    build_dataset(lat, lon, years, rows)
}

// -- Parquet / Arrow helpers --

/// Extract a scalar `f64` from a Float64 or Float32 column at the given row.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null coordinate value");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("Expected Float64 or Float32 column, got {:?}", col.data_type())
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
/// Null list elements become NaN.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr
            .iter()
            .map(|v| v.unwrap_or(f32::NAN) as f64)
            .collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_wide_layout_parses() {
        let csv = "lat,lon,1990.0,1990.5\n\
                   -5.0,100.0,0.1,0.2\n\
                   -5.0,110.0,nan,0.4\n\
                   5.0,100.0,0.5,\n\
                   5.0,110.0,0.7,0.8\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.n_points(), 4);
        assert_eq!(ds.n_steps(), 2);
        assert_eq!(ds.years, vec![1990.0, 1990.5]);
        assert!(ds.ssta[[1, 0]].is_nan());
        assert!(ds.ssta[[2, 1]].is_nan());
        assert_eq!(ds.ssta[[3, 1]], 0.8);
    }

    #[test]
    fn csv_rejects_bad_header() {
        let csv = "x,y,1990.0\n1.0,2.0,3.0\n";
        assert!(read_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn json_nulls_become_nan() {
        let json = r#"{
            "years": [2000.0, 2000.5],
            "points": [
                {"lat": -5.0, "lon": 100.0, "ssta": [0.1, null]},
                {"lat": -5.0, "lon": 110.0, "ssta": [0.3, 0.4]},
                {"lat": 5.0, "lon": 100.0, "ssta": [0.5, 0.6]},
                {"lat": 5.0, "lon": 110.0, "ssta": [0.7, 0.8]}
            ]
        }"#;
        let ds = parse_json(json).unwrap();
        assert_eq!(ds.n_points(), 4);
        assert!(ds.ssta[[0, 1]].is_nan());
        assert_eq!(ds.ssta[[3, 0]], 0.7);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let json = r#"{
            "years": [2000.0, 2000.5],
            "points": [
                {"lat": -5.0, "lon": 100.0, "ssta": [0.1]},
                {"lat": 5.0, "lon": 100.0, "ssta": [0.5, 0.6]}
            ]
        }"#;
        assert!(parse_json(json).is_err());
    }
}
