//! Push button

use alloc::string::String;

use tessella_display::{Canvas, GlyphSource};

use crate::style::Style;
use crate::widget::WidgetBase;

/// A key-activated button with a text label
///
/// Select fires the button; the press surfaces to the caller as
/// [`UiEvent::Activated`](crate::gui::UiEvent) from `key_response`.
#[derive(Debug)]
pub struct Button {
    pub(crate) label: String,
}

impl Button {
    pub fn new(label: &str) -> Self {
        Self {
            label: String::from(label),
        }
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
        let (w, h) = (r.w as i32, r.h as i32);

        // Border doubles as the focus outline
        let border = if base.focused {
            style.accent
        } else {
            style.foreground
        };
        canvas.draw_rect(r.x, r.y, w, h, border);
        canvas.draw_rect(r.x + 1, r.y + 1, w - 2, h - 2, border);

        // Label clipped to the area inside the border
        let mut inner = canvas.sub(r.x + 3, r.y + 3, w - 6, h - 6);
        inner.text(font, &self.label, 0, 0, base.color);
    }
}
