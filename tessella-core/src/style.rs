//! Visual style configuration
//!
//! One `Style` is shared by every draw routine. The defaults match a
//! dark panel: black background, white chrome, red focus outline.

use tessella_display::Rgb565;

/// Colors shared across the widget set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Fill color for cleared container viewports
    pub background: Rgb565,
    /// Default chrome color (borders, markers) when unfocused
    pub foreground: Rgb565,
    /// Outline color marking the focused control
    pub accent: Rgb565,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Rgb565::BLACK,
            foreground: Rgb565::WHITE,
            accent: Rgb565::RED,
        }
    }
}
