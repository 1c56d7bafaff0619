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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Continuous scale: count → Color32
// ---------------------------------------------------------------------------

/// Viridis control points, dark to light.
const VIRIDIS: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.229, 0.322, 0.546),
    (0.128, 0.567, 0.551),
    (0.369, 0.789, 0.383),
    (0.993, 0.906, 0.144),
];

/// Maps a numeric range onto the Viridis scale, interpolating in linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        ColorScale { min, max }
    }

    /// Scale spanning the given values; a single value maps to the top end.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self::new(min, max))
    }

    /// Position of `value` in `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 1.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.fraction(value) * (VIRIDIS.len() - 1) as f32;
        let lower = (t.floor() as usize).min(VIRIDIS.len() - 2);
        let local = t - lower as f32;
        let stop = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };
        let mixed = stop(VIRIDIS[lower]).mix(stop(VIRIDIS[lower + 1]), local);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Legend swatches from low to high: `(value, colour)`.
    pub fn legend_entries(&self, steps: usize) -> Vec<(f64, Color32)> {
        let steps = steps.max(2);
        (0..steps)
            .map(|i| {
                let v = self.min + (self.max - self.min) * i as f64 / (steps - 1) as f64;
                (v, self.color_for(v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        assert_ne!(p[0], p[3]);
    }

    #[test]
    fn scale_endpoints_hit_viridis_ends() {
        let scale = ColorScale::new(0.0, 10.0);
        assert_eq!(scale.fraction(-5.0), 0.0);
        assert_eq!(scale.fraction(20.0), 1.0);
        let low = scale.color_for(0.0);
        let high = scale.color_for(10.0);
        // dark purple vs. bright yellow
        assert!(low.r() < 100 && low.b() > low.g());
        assert!(high.r() > 200 && high.g() > 200);
    }

    #[test]
    fn degenerate_scale_is_top_colour() {
        let scale = ColorScale::spanning([3.0, 3.0]).unwrap();
        assert_eq!(scale.color_for(3.0), ColorScale::new(0.0, 1.0).color_for(1.0));
        assert!(ColorScale::spanning(std::iter::empty()).is_none());
        assert_eq!(scale.legend_entries(1).len(), 2);
    }
}
