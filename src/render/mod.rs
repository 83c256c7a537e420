/// Rendering layer: animated comparison of raw vs. reconstructed fields.

pub mod animation;
