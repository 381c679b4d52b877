use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
// Color mapping: genre → Color32
// ---------------------------------------------------------------------------

/// Maps every genre in the table to a distinct colour so all charts colour
/// the same genre identically.
#[derive(Debug, Clone, Default)]
pub struct GenreColors {
    mapping: BTreeMap<String, Color32>,
}

impl GenreColors {
    /// Build the mapping from the table's sorted genre set.
    pub fn new(genres: &BTreeSet<String>) -> Self {
        let palette = generate_palette(genres.len());
        let mapping = genres
            .iter()
            .zip(palette)
            .map(|(g, c)| (g.clone(), c))
            .collect();
        GenreColors { mapping }
    }

    /// Look up the colour for a genre; unknown genres render grey.
    pub fn color_for(&self, genre: &str) -> Color32 {
        self.mapping.get(genre).copied().unwrap_or(Color32::GRAY)
    }
}
