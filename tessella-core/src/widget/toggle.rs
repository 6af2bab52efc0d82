//! Check and radio selectors
//!
//! Both carry a square/round marker plus a label to its right. The
//! marker must fit the declared bounds; construction fails otherwise.
//! Draw routines repaint both states of the marker explicitly, so a
//! state toggle only dirties the widget itself.

use alloc::string::String;

use tessella_display::{Canvas, GlyphSource};

use crate::error::Error;
use crate::geometry::Size;
use crate::style::Style;
use crate::widget::WidgetBase;

fn check_marker_fits(size: Size, marker: u32) -> Result<(), Error> {
    // The label needs at least one column right of the marker
    if size.w <= marker + 1 || size.h < marker {
        return Err(Error::MarkerTooLarge);
    }
    Ok(())
}

/// Radio selector
///
/// Radios sharing a `group` id are mutually exclusive: checking one
/// unchecks the others. An ungrouped radio toggles freely.
#[derive(Debug)]
pub struct Radio {
    pub(crate) label: String,
    /// Marker diameter in pixels
    pub(crate) marker: u32,
    pub(crate) group: Option<u8>,
    pub(crate) checked: bool,
}

impl Radio {
    pub(crate) fn new(
        size: Size,
        marker: u32,
        group: Option<u8>,
        label: &str,
    ) -> Result<Self, Error> {
        check_marker_fits(size, marker)?;
        Ok(Self {
            label: String::from(label),
            marker,
            group,
            checked: false,
        })
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn group(&self) -> Option<u8> {
        self.group
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn draw<F: GlyphSource>(
        &self,
        base: &WidgetBase,
        canvas: &mut Canvas<'_>,
        font: &F,
        style: &Style,
    ) {
        let r = base.rect;
        let d = self.marker as i32;
        let radius = d / 2;
        let cx = r.x + radius - 1;
        let cy = r.y + radius - 1;

        // Inner ring
        canvas.ellipse(cx, cy, radius - 2, radius - 2, style.foreground, false);

        // Focus outline, invisible against the background when unfocused
        let outline = if base.focused {
            style.accent
        } else {
            style.background
        };
        canvas.ellipse(cx, cy, radius, radius, outline, false);
        canvas.ellipse(cx, cy, radius - 1, radius - 1, outline, false);

        // Check dot, erased explicitly when unchecked
        let dot = if self.checked {
            base.color
        } else {
            style.background
        };
        canvas.ellipse(cx, cy, radius / 2, radius / 2, dot, true);

        let mut label_area = canvas.sub(r.x + d + 1, r.y, r.w as i32 - d - 1, r.h as i32);
        label_area.text(font, &self.label, 0, 0, base.color);
    }
}

/// Checkbox
#[derive(Debug)]
pub struct Checkbox {
    pub(crate) label: String,
    /// Marker edge length in pixels
    pub(crate) marker: u32,
    pub(crate) checked: bool,
}

impl Checkbox {
    pub(crate) fn new(size: Size, marker: u32, label: &str) -> Result<Self, Error> {
        check_marker_fits(size, marker)?;
        Ok(Self {
            label: String::from(label),
            marker,
            checked: false,
        })
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn draw<F: GlyphSource>(
        &self,
        base: &WidgetBase,
        canvas: &mut Canvas<'_>,
        font: &F,
        style: &Style,
    ) {
        let r = base.rect;
        let s = self.marker as i32;

        let outline = if base.focused {
            style.accent
        } else {
            style.foreground
        };
        canvas.draw_rect(r.x, r.y, s, s, outline);

        // Cross mark, erased explicitly when unchecked
        let mark = if self.checked {
            base.color
        } else {
            style.background
        };
        canvas.line(r.x + 1, r.y + 1, r.x + s - 2, r.y + s - 2, mark);
        canvas.line(r.x + 1, r.y + s - 2, r.x + s - 2, r.y + 1, mark);

        let mut label_area = canvas.sub(r.x + s + 1, r.y, r.w as i32 - s - 1, r.h as i32);
        label_area.text(font, &self.label, 0, 0, base.color);
    }
}
