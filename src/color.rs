use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

use crate::data::model::Value;

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
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

// ---------------------------------------------------------------------------
// Color mapping: category level → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct levels of a hue column to distinct colours, keeping
/// the levels' first-appearance order for the plot legend.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: Vec<(Value, Color32)>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from a column's levels.
    pub fn new(levels: &[Value]) -> Self {
        let palette = generate_palette(levels.len());
        let mapping = levels.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given level; nulls and unknowns are grey.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .iter()
            .find(|(level, _)| level == value)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging colormap for correlation heatmaps
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn lab((r, g, b): (u8, u8, u8)) -> Lab {
    Srgb::new(r, g, b).into_format::<f32>().into_color()
}

/// Blue–white–red scale over `[-1, 1]`, centred on 0 so that `v` and `-v`
/// are equally saturated. Values outside the range are clamped.
pub fn diverging(v: f64) -> Color32 {
    if v.is_nan() {
        return Color32::TRANSPARENT;
    }
    let t = v.clamp(-1.0, 1.0) as f32;
    let (end, factor) = if t < 0.0 { (COOL, -t) } else { (WARM, t) };
    let mixed = lab(NEUTRAL).mix(lab(end), factor);
    to_color32(mixed.into_color())
}

/// Text colour readable on top of [`diverging`]`(v)`.
pub fn annotation_color(v: f64) -> Color32 {
    if v.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
