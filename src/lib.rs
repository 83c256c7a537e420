//! EOF/PCA analysis of gridded sea-surface-temperature anomalies.
//!
//! The crate decomposes a (space × time) SSTA matrix with a singular value
//! decomposition, derives the leading EOF/PC pair, classifies time steps into
//! El Niño / La Niña regimes, and renders both interactive diagnostic plots
//! (egui) and an animated raw-vs-reconstructed field comparison (GIF).

pub mod analysis;
pub mod app;
pub mod color;
pub mod data;
pub mod render;
pub mod state;
pub mod ui;
