use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

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
            to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous scale: order amount → marker colour and size
// ---------------------------------------------------------------------------

const LOW: (f32, f32, f32) = (250.0, 0.65, 0.35);
const HIGH: (f32, f32, f32) = (50.0, 0.95, 0.55);

/// Places amounts between the smallest and largest value on the map, for the
/// colour ramp and marker size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountScale {
    min: f64,
    max: f64,
}

pub const MIN_RADIUS: f32 = 2.0;
pub const MAX_RADIUS: f32 = 9.0;

impl AmountScale {
    /// Scale spanning `amounts`; an empty input gives a unit scale.
    pub fn from_amounts<I: IntoIterator<Item = f64>>(amounts: I) -> Self {
        let (min, max) = amounts
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| (lo.min(a), hi.max(a)));
        if min.is_finite() && max.is_finite() {
            AmountScale { min, max }
        } else {
            AmountScale { min: 0.0, max: 1.0 }
        }
    }

    /// Position of `amount` on the scale, in `0.0..=1.0`.
    pub fn fraction(&self, amount: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        (((amount - self.min) / range) as f32).clamp(0.0, 1.0)
    }
}

/// Colour at position `t` (0 = low, 1 = high) of the amount ramp.
pub fn ramp_color(t: f32) -> Color32 {
    let low = Hsl::new(LOW.0, LOW.1, LOW.2);
    let high = Hsl::new(HIGH.0, HIGH.1, HIGH.2);
    to_color32(low.mix(high, t.clamp(0.0, 1.0)))
}

/// Marker radius at position `t` of the amount ramp.
pub fn ramp_radius(t: f32) -> f32 {
    MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * t.clamp(0.0, 1.0)
}
