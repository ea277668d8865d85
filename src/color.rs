use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues, starting
/// at `hue_offset` degrees.
pub fn generate_palette(n: usize, hue_offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hue_color(hue_offset + (i as f32 / n as f32) * 360.0))
        .collect()
}

/// The palette's saturation and lightness at `hue` degrees.
pub fn hue_color(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Series roles → Color32
// ---------------------------------------------------------------------------

/// What a plotted line or marker set represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRole {
    Position,
    Pulse,
    Tempo,
}

impl SeriesRole {
    fn slot(self) -> usize {
        match self {
            SeriesRole::Position => 0,
            SeriesRole::Pulse => 1,
            SeriesRole::Tempo => 2,
        }
    }
}

/// Fixed colours for every [`SeriesRole`].
#[derive(Debug, Clone)]
pub struct RoleColors {
    colors: Vec<Color32>,
}

impl Default for RoleColors {
    /// Blue position, orange pulses, red tempo.
    fn default() -> Self {
        Self::from_hues(&[220.0, 30.0, 355.0])
    }
}

impl RoleColors {
    /// One hue (degrees) per role, in [`SeriesRole`] order.
    pub fn from_hues(hues: &[f32; 3]) -> Self {
        let colors = hues.iter().map(|&h| hue_color(h)).collect();
        Self { colors }
    }

    pub fn color_for(&self, role: SeriesRole) -> Color32 {
        self.colors
            .get(role.slot())
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
