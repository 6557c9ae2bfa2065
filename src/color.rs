use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical mapping: region → Color32
// ---------------------------------------------------------------------------

/// Maps each region to a distinct colour. Built once from the table's
/// regions so a region keeps its colour across selections.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<S: AsRef<str>>(categories: impl IntoIterator<Item = S>) -> Self {
        let categories: Vec<S> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .iter()
            .zip(palette)
            .map(|(c, color)| (c.as_ref().to_string(), color))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scale for the choropleth
// ---------------------------------------------------------------------------

/// Viridis anchor colours, dark to bright.
const VIRIDIS: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.231, 0.322, 0.545),
    (0.129, 0.569, 0.549),
    (0.369, 0.788, 0.384),
    (0.993, 0.906, 0.144),
];

/// Maps a value in `[min, max]` onto a viridis-like gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousScale {
    pub min: f64,
    pub max: f64,
}

impl ContinuousScale {
    /// Scale spanning the finite values, or `None` if there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;
        Some(ContinuousScale { min, max })
    }

    /// Position of `value` in the range, clamped to `[0, 1]`. A flat range maps to 0.5.
    pub fn normalize(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        gradient(self.normalize(value))
    }
}

/// Colour at `t` in `[0, 1]` along the viridis anchors, mixed in linear RGB.
pub fn gradient(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let segments = (VIRIDIS.len() - 1) as f32;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let local = pos - idx as f32;

    let anchor = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };
    let mixed = anchor(VIRIDIS[idx]).mix(anchor(VIRIDIS[idx + 1]), local);
    let rgb: Srgb<u8> = Srgb::from_linear(mixed);
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }

    #[test]
    fn regions_get_distinct_stable_colours() {
        let map = ColorMap::new(["Sudeste", "Nordeste", "Sul"]);
        assert_ne!(map.color_for("Sudeste"), map.color_for("Sul"));
        assert_eq!(map.color_for("Sul"), map.color_for("Sul"));
        assert_eq!(map.color_for("Norte"), Color32::GRAY);
    }

    #[test]
    fn scale_spans_finite_values() {
        let scale = ContinuousScale::from_values([3.0, f64::NAN, 1.0, 2.0]).unwrap();
        assert_eq!(scale, ContinuousScale { min: 1.0, max: 3.0 });
        assert_eq!(scale.normalize(2.0), 0.5);
        assert_eq!(scale.normalize(10.0), 1.0);
        assert!(ContinuousScale::from_values([]).is_none());
    }

    #[test]
    fn flat_scale_uses_middle() {
        let scale = ContinuousScale { min: 4.0, max: 4.0 };
        assert_eq!(scale.normalize(4.0), 0.5);
    }

    #[test]
    fn gradient_runs_dark_to_bright() {
        let (low, high) = (gradient(0.0), gradient(1.0));
        assert!(low.r() < high.r());
        assert!(low.g() < high.g());
        assert_eq!(gradient(-1.0), low);
        assert_eq!(gradient(2.0), high);
    }
}
