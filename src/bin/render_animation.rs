//! Headless animation renderer: loads the SSTA dataset, standardizes it,
//! reconstructs it from the three leading SVD modes, and writes an animated
//! GIF comparing the raw and reconstructed fields frame by frame.

use std::path::Path;

use anyhow::{Context, Result};

use enso_eof::data::loader;
use enso_eof::render::animation;

const DEFAULT_DATA_PATH: &str = "data/ssta_pacific.parquet";
const OUTPUT_PATH: &str = "ssta_animation.gif";

fn main() -> Result<()> {
    env_logger::init();

    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

    let dataset = loader::load_file(Path::new(&data_path))
        .with_context(|| format!("loading {data_path}"))?;

    let fps = animation::render_to_path(&dataset, Path::new(OUTPUT_PATH))?;
    log::info!("done: {OUTPUT_PATH} ({fps} fps)");
    Ok(())
}
