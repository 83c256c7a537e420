use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Diverging blue–white–red colormap (RdBu-style)
// ---------------------------------------------------------------------------

// Anchor colors in linear RGB so mixing is perceptually even.
fn cold() -> LinSrgb<f32> {
    Srgb::new(0.20f32, 0.35, 0.78).into_linear()
}

fn neutral() -> LinSrgb<f32> {
    Srgb::new(0.96f32, 0.96, 0.96).into_linear()
}

fn warm() -> LinSrgb<f32> {
    Srgb::new(0.80f32, 0.12, 0.15).into_linear()
}

/// Sample the diverging map at `t ∈ [0, 1]`: 0 = cold, 0.5 = neutral, 1 = warm.
pub fn diverging(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let lin = if t < 0.5 {
        cold().mix(neutral(), t * 2.0)
    } else {
        neutral().mix(warm(), (t - 0.5) * 2.0)
    };
    let rgb = Srgb::<f32>::from_linear(lin).into_format::<u8>();
    [rgb.red, rgb.green, rgb.blue]
}

/// Normalise an amplitude into [0, 1] over a symmetric [-limit, +limit] range.
pub fn normalize_amplitude(value: f64, limit: f64) -> f32 {
    if limit <= 0.0 {
        return 0.5;
    }
    (((value / limit) + 1.0) / 2.0).clamp(0.0, 1.0) as f32
}

/// Map an amplitude to an egui color over a symmetric range.
pub fn amplitude_color(value: f64, limit: f64) -> Color32 {
    let [r, g, b] = diverging(normalize_amplitude(value, limit));
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_blue_and_red() {
        let low = diverging(0.0);
        let high = diverging(1.0);
        assert!(low[2] > low[0], "t=0 should lean blue, got {low:?}");
        assert!(high[0] > high[2], "t=1 should lean red, got {high:?}");
    }

    #[test]
    fn midpoint_is_near_white() {
        let mid = diverging(0.5);
        assert!(mid.iter().all(|&c| c > 230), "midpoint {mid:?}");
    }

    #[test]
    fn amplitude_normalisation_is_symmetric() {
        assert_eq!(normalize_amplitude(0.0, 3.0), 0.5);
        assert_eq!(normalize_amplitude(-3.0, 3.0), 0.0);
        assert_eq!(normalize_amplitude(3.0, 3.0), 1.0);
        // Out-of-range values clamp rather than wrap.
        assert_eq!(normalize_amplitude(10.0, 3.0), 1.0);
        // Degenerate range falls back to neutral.
        assert_eq!(normalize_amplitude(1.0, 0.0), 0.5);
    }
}
