//! Text node and the line layout cache
//!
//! Line breaks are computed once per content or viewport change and
//! cached as byte offsets of line starts. The render pass replays the
//! same advance rules over the cached lines, so what the cache predicted
//! is exactly what gets drawn.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use tessella_display::{is_half_width, Canvas, GlyphSource};

use crate::widget::WidgetBase;

/// A block of text, optionally auto-wrapped at the viewport edge
#[derive(Debug)]
pub struct Text {
    pub(crate) content: String,
    pub(crate) autowrap: bool,
    /// Byte offsets of line starts, terminated by `content.len()`
    pub(crate) line_index: Vec<usize>,
    /// Line index must be recomputed before the next draw
    pub(crate) stale: bool,
}

impl Text {
    pub(crate) fn new(content: &str, autowrap: bool) -> Self {
        Self {
            content: String::from(content),
            autowrap,
            line_index: Vec::new(),
            stale: true,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The cached line-start offsets
    pub fn line_starts(&self) -> &[usize] {
        &self.line_index
    }

    /// Number of laid-out lines
    pub fn line_count(&self) -> usize {
        self.line_index.len().saturating_sub(1)
    }

    pub(crate) fn ensure_layout(&mut self, origin_x: i32, limit_w: i32, cell: i32) {
        if !self.stale {
            return;
        }
        self.line_index = layout_lines(&self.content, origin_x, limit_w, cell, self.autowrap);
        self.stale = false;
    }

    pub(crate) fn draw<F: GlyphSource>(
        &self,
        base: &WidgetBase,
        canvas: &mut Canvas<'_>,
        font: &F,
    ) {
        let cell = font.cell_size() as i32;
        if cell == 0 || self.line_index.len() < 2 {
            return;
        }
        let lines = self.line_count();
        let y0 = base.rect.y;

        // A node scrolled to negative y starts at the line containing the
        // top edge; a partially covered line is still drawn
        let first = if y0 < 0 { (-y0 / cell) as usize } else { 0 };

        let bottom = canvas.height() as i32;
        for li in first..lines {
            let ly = y0 + li as i32 * cell;
            if ly >= bottom {
                break;
            }
            let line = &self.content[self.line_index[li]..self.line_index[li + 1]];
            canvas.text(font, line, base.rect.x, ly, base.color);
        }
    }
}

/// Compute line-start byte offsets for a block of text
///
/// The cursor starts at `origin_x` and restarts there after every break.
/// A newline force-breaks; other control characters are skipped. Code
/// points below 0x80 advance half a cell, the rest a full cell. With
/// `autowrap`, a glyph whose advance would cross `limit_w` breaks the
/// line at the current character without consuming it. The result always
/// ends with `content.len()`.
pub fn layout_lines(
    content: &str,
    origin_x: i32,
    limit_w: i32,
    cell: i32,
    autowrap: bool,
) -> Vec<usize> {
    let mut starts = vec![0usize];
    let mut x = origin_x;
    for (i, ch) in content.char_indices() {
        if ch == '\n' {
            starts.push(i + ch.len_utf8());
            x = origin_x;
            continue;
        }
        if ch.is_control() {
            continue;
        }
        let advance = if is_half_width(ch) { cell / 2 } else { cell };
        if autowrap && x + advance > limit_w && starts.last() != Some(&i) {
            starts.push(i);
            x = origin_x;
        }
        x += advance;
    }
    starts.push(content.len());
    starts
}
