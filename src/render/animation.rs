use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use ndarray::Array2;

use crate::analysis::svd::economy_svd;
use crate::color;
use crate::data::model::SstaDataset;
use crate::data::preprocess::{normalize, zero_non_finite, Normalization};

/// Target animation length in seconds; the frame rate is derived from it.
const TARGET_SECONDS: f64 = 30.0;
/// Number of leading modes kept for the reconstructed panel.
const RECONSTRUCTION_RANK: usize = 3;
/// Color scale limits for the standardized field.
const VLIMIT: f64 = 3.0;

/// Pixels per grid cell.
const CELL_PIXELS: u32 = 6;
/// Outer margin around the panels.
const MARGIN: u32 = 8;
/// Vertical gap between the raw and reconstructed panels.
const PANEL_GAP: u32 = 12;

const BACKGROUND: Rgba<u8> = Rgba([24, 24, 28, 255]);

// ---------------------------------------------------------------------------
// High-level pipeline
// ---------------------------------------------------------------------------

/// Standardize the dataset, decompose it, and write the raw vs. rank-3
/// comparison animation to `path`. Returns the frame rate used.
pub fn render_to_path(dataset: &SstaDataset, path: &Path) -> Result<u32> {
    let mut field = dataset.ssta.clone();
    let replaced = zero_non_finite(&mut field);
    if replaced > 0 {
        log::info!("zeroed {replaced} non-finite entries before standardization");
    }
    normalize(&mut field, Normalization::GlobalStandardize);

    let svd = economy_svd(&field).context("decomposing standardized field")?;
    let reconstructed = svd.reconstruct(RECONSTRUCTION_RANK);

    let fps = frames_per_second(dataset.n_steps());
    write_gif(path, dataset, &field, &reconstructed, fps)?;
    Ok(fps)
}

/// Frame rate so the full record plays in roughly [`TARGET_SECONDS`]:
/// `round(n_steps / 30.0)`, clamped to at least 1 fps.
pub fn frames_per_second(n_steps: usize) -> u32 {
    ((n_steps as f64 / TARGET_SECONDS).round() as u32).max(1)
}

// ---------------------------------------------------------------------------
// Frame rasterisation
// ---------------------------------------------------------------------------

/// Pixel dimensions of one frame for the dataset's grid.
pub fn frame_size(dataset: &SstaDataset) -> (u32, u32) {
    let panel_w = dataset.nlon() as u32 * CELL_PIXELS;
    let panel_h = dataset.nlat() as u32 * CELL_PIXELS;
    (
        panel_w + 2 * MARGIN,
        panel_h * 2 + PANEL_GAP + 2 * MARGIN,
    )
}

/// Render one two-panel frame: raw field above, reconstruction below.
pub fn render_frame(
    dataset: &SstaDataset,
    raw: &Array2<f64>,
    reconstructed: &Array2<f64>,
    t: usize,
) -> RgbaImage {
    let (width, height) = frame_size(dataset);
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    let panel_h = dataset.nlat() as u32 * CELL_PIXELS;
    blit_panel(&mut img, dataset, raw, t, MARGIN, MARGIN);
    blit_panel(
        &mut img,
        dataset,
        reconstructed,
        t,
        MARGIN,
        MARGIN + panel_h + PANEL_GAP,
    );
    img
}

/// Draw one field column as a (nlat × nlon) cell raster with the latitude
/// axis pointing up (row 0 of the image is the northernmost latitude).
fn blit_panel(
    img: &mut RgbaImage,
    dataset: &SstaDataset,
    field: &Array2<f64>,
    t: usize,
    x0: u32,
    y0: u32,
) {
    let nlat = dataset.nlat() as u32;
    for i in 0..dataset.n_points() {
        let (lat_idx, lon_idx) = dataset.grid_index(i);
        let [r, g, b] =
            color::diverging(color::normalize_amplitude(field[[i, t]], VLIMIT));
        let pixel = Rgba([r, g, b, 255]);

        let px = x0 + lon_idx as u32 * CELL_PIXELS;
        let py = y0 + (nlat - 1 - lat_idx as u32) * CELL_PIXELS;
        for dy in 0..CELL_PIXELS {
            for dx in 0..CELL_PIXELS {
                img.put_pixel(px + dx, py + dy, pixel);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GIF encoding
// ---------------------------------------------------------------------------

/// Encode one frame per time step into an animated GIF at `fps`.
pub fn write_gif(
    path: &Path,
    dataset: &SstaDataset,
    raw: &Array2<f64>,
    reconstructed: &Array2<f64>,
    fps: u32,
) -> Result<()> {
    if raw.dim() != reconstructed.dim() {
        bail!(
            "raw field is {:?} but reconstruction is {:?}",
            raw.dim(),
            reconstructed.dim()
        );
    }
    if raw.dim() != dataset.ssta.dim() {
        bail!("field dimensions do not match the dataset grid");
    }

    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = GifEncoder::new(file);
    encoder
        .set_repeat(Repeat::Infinite)
        .context("configuring GIF looping")?;

    let n_steps = dataset.n_steps();
    let delay = Delay::from_numer_denom_ms(1000, fps);

    for t in 0..n_steps {
        let image = render_frame(dataset, raw, reconstructed, t);
        encoder
            .encode_frame(Frame::from_parts(image, 0, 0, delay))
            .with_context(|| format!("encoding frame {t}"))?;
        if t % 60 == 0 {
            log::info!("encoded frame {t}/{n_steps} (year {:.1})", dataset.years[t]);
        }
    }

    log::info!(
        "wrote {} frames to {} at {fps} fps",
        n_steps,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tiny_dataset() -> SstaDataset {
        let ssta = array![[3.0, -3.0], [0.0, 1.0], [-1.0, 0.5], [2.0, -2.0]];
        SstaDataset::new(
            ssta,
            vec![-5.0, -5.0, 5.0, 5.0],
            vec![100.0, 110.0, 100.0, 110.0],
            vec![1990.0, 1991.0],
        )
        .unwrap()
    }

    #[test]
    fn frame_rate_rounds_to_target_duration() {
        assert_eq!(frames_per_second(300), 10);
        assert_eq!(frames_per_second(600), 20);
        assert_eq!(frames_per_second(45), 2);
        // Short records never drop to zero fps.
        assert_eq!(frames_per_second(3), 1);
    }

    #[test]
    fn frame_has_two_stacked_panels() {
        let ds = tiny_dataset();
        let frame = render_frame(&ds, &ds.ssta, &ds.ssta, 0);

        let (w, h) = frame_size(&ds);
        assert_eq!(frame.dimensions(), (w, h));
        assert_eq!(w, 2 * CELL_PIXELS + 2 * MARGIN);
        assert_eq!(h, 2 * (2 * CELL_PIXELS) + PANEL_GAP + 2 * MARGIN);
    }

    #[test]
    fn warm_cells_render_red_cold_cells_blue() {
        let ds = tiny_dataset();
        let frame = render_frame(&ds, &ds.ssta, &ds.ssta, 0);

        // Grid point 2 (lat 5, lon 100) sits at the top-left of the upper
        // panel; its value -1.0 should render blueish.
        let Rgba([r, _, b, _]) = *frame.get_pixel(MARGIN, MARGIN);
        assert!(b > r);

        // Grid point 0 (lat -5, lon 100) is bottom-left, value +3.0 → red.
        let Rgba([r, _, b, _]) = *frame.get_pixel(MARGIN, MARGIN + CELL_PIXELS);
        assert!(r > b);
    }

    #[test]
    fn mismatched_fields_are_rejected() {
        let ds = tiny_dataset();
        let wrong = ndarray::Array2::<f64>::zeros((4, 3));
        let path = std::env::temp_dir().join("enso_eof_mismatch_test.gif");
        assert!(write_gif(&path, &ds, &ds.ssta, &wrong, 1).is_err());
    }
}
