use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Series colours shared by the PNG renderer and the in-app preview
// ---------------------------------------------------------------------------

/// Hue of the full temperature series.
const FULL_SERIES_HUE: f32 = 210.0;

/// Convert an HSL triple to 8-bit RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    (
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Colour pair for an overlay chart: the full series and the selected
/// markers on the opposite side of the hue wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColors {
    pub full: (u8, u8, u8),
    pub selected: (u8, u8, u8),
}

impl SeriesColors {
    pub fn from_hue(hue: f32) -> Self {
        let contrasting = (hue + 180.0).rem_euclid(360.0);
        SeriesColors {
            full: hsl_to_rgb(hue, 0.75, 0.45),
            selected: hsl_to_rgb(contrasting, 0.85, 0.5),
        }
    }
}

impl Default for SeriesColors {
    fn default() -> Self {
        SeriesColors::from_hue(FULL_SERIES_HUE)
    }
}
