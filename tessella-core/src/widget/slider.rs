//! Value slider
//!
//! The track occupies half the widget's thickness; the thumb spans the
//! full thickness and protrudes a quarter on each side. Select toggles
//! adjustment mode, then the arrow keys step the value.

use core::fmt::Write;

use heapless::String;
use tessella_display::{Canvas, GlyphSource};

use crate::error::Error;
use crate::style::Style;
use crate::widget::WidgetBase;

/// Slider axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Integer value slider
#[derive(Debug)]
pub struct Slider {
    min: i32,
    max: i32,
    pub(crate) value: i32,
    pub(crate) orientation: Orientation,
    /// Draw the numeric value next to the track
    pub(crate) show_value: bool,
}

impl Slider {
    pub(crate) fn new(
        min: i32,
        max: i32,
        orientation: Orientation,
        show_value: bool,
    ) -> Result<Self, Error> {
        if min >= max {
            return Err(Error::EmptyRange);
        }
        Ok(Self {
            min,
            max,
            value: min,
            orientation,
            show_value,
        })
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Position within the range, 0.0 at `min`, 1.0 at `max`
    pub fn ratio(&self) -> f32 {
        (self.value - self.min) as f32 / (self.max - self.min) as f32
    }

    /// Step the value, saturating at the range ends; true if it moved
    pub(crate) fn adjust(&mut self, delta: i32) -> bool {
        let new = (self.value + delta).clamp(self.min, self.max);
        if new == self.value {
            return false;
        }
        self.value = new;
        true
    }

    /// Set the value if it falls inside the range
    pub(crate) fn set_value(&mut self, value: i32) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        self.value = value;
        true
    }

    pub(crate) fn draw<F: GlyphSource>(
        &self,
        base: &WidgetBase,
        canvas: &mut Canvas<'_>,
        font: &F,
        style: &Style,
    ) {
        let r = base.rect;
        let (x, y) = (r.x, r.y);
        let (w, h) = (r.w as i32, r.h as i32);

        // The thumb moves, so the whole widget area is repainted
        canvas.fill_rect(x, y, w, h, style.background);

        let track = if base.focused {
            style.accent
        } else {
            style.foreground
        };
        let thumb = if base.entered {
            base.color
        } else {
            style.foreground
        };
        let span = self.max - self.min;

        match self.orientation {
            Orientation::Horizontal => {
                let offset = (self.value - self.min) * (w - 2) / span;
                let ty = y + h / 4;
                let th = h / 2;
                canvas.draw_rect(x, ty, w, th, track);
                canvas.draw_rect(x + 1, ty + 1, w - 2, th - 2, track);
                canvas.fill_rect(x + offset, y, 2, h, thumb);
            }
            Orientation::Vertical => {
                let offset = (self.value - self.min) * (h - 2) / span;
                let tx = x + w / 4;
                let tw = w / 2;
                canvas.draw_rect(tx, y, tw, h, track);
                canvas.draw_rect(tx + 1, y + 1, tw - 2, h - 2, track);
                canvas.fill_rect(x, y + h - 2 - offset, w, 2, thumb);
            }
        }

        if self.show_value {
            let mut text: String<12> = String::new();
            if write!(text, "{}", self.value).is_ok() {
                canvas.text(font, &text, x + w + 1, y, base.color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_range() {
        assert_eq!(
            Slider::new(5, 5, Orientation::Horizontal, false).unwrap_err(),
            Error::EmptyRange
        );
        assert_eq!(
            Slider::new(10, 0, Orientation::Horizontal, false).unwrap_err(),
            Error::EmptyRange
        );
    }

    #[test]
    fn test_adjust_saturates() {
        let mut slider = Slider::new(0, 3, Orientation::Horizontal, false).unwrap();
        assert!(!slider.adjust(-1));
        assert_eq!(slider.value(), 0);
        assert!(slider.adjust(1));
        assert!(slider.adjust(1));
        assert!(slider.adjust(1));
        assert_eq!(slider.value(), 3);
        assert!(!slider.adjust(1));
        assert_eq!(slider.value(), 3);
    }

    #[test]
    fn test_set_value_checks_range() {
        let mut slider = Slider::new(0, 10, Orientation::Vertical, false).unwrap();
        assert!(slider.set_value(7));
        assert_eq!(slider.value(), 7);
        assert!(!slider.set_value(11));
        assert_eq!(slider.value(), 7);
    }

    #[test]
    fn test_ratio() {
        let mut slider = Slider::new(0, 4, Orientation::Horizontal, false).unwrap();
        slider.set_value(1);
        assert_eq!(slider.ratio(), 0.25);
    }
}
