//! Containers and the focus ring
//!
//! [`Layout`] is the container core: ordered children (insertion order is
//! z-order and default focus order), the cached viewport, and the cleared
//! flag. [`Frame`] adds the focus ring and an optional double-line
//! border; its key state machine lives with the tree, which owns the
//! nodes the ring points at.

use alloc::vec::Vec;

use tessella_display::Canvas;

use crate::geometry::{Point, Size, Viewport};
use crate::style::Style;
use crate::tree::WidgetId;
use crate::widget::WidgetBase;

/// Border thickness of framed containers, per side
pub const BORDER_WIDTH: u32 = 2;

/// Container core: child list plus cached geometry
#[derive(Debug, Default)]
pub struct Layout {
    pub(crate) children: Vec<WidgetId>,
    /// Cached draw area, recomputed when this widget or an ancestor moves
    pub(crate) viewport: Viewport,
    /// Absolute buffer coordinates of the viewport origin
    pub(crate) abs: Point,
    /// True once the viewport has been background-filled since the last
    /// content change
    pub(crate) cleared: bool,
}

impl Layout {
    pub(crate) fn new() -> Self {
        Self {
            children: Vec::new(),
            viewport: Viewport::INVALID,
            abs: Point::ZERO,
            cleared: false,
        }
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

/// Ordered subset of a container's children eligible for focus
///
/// The index is always in range while the ring is non-empty. `wrap`
/// selects cyclic (modulo) versus clamped (saturating) stepping.
#[derive(Debug)]
pub struct FocusRing {
    members: Vec<WidgetId>,
    index: usize,
    wrap: bool,
}

impl FocusRing {
    pub(crate) fn new(wrap: bool) -> Self {
        Self {
            members: Vec::new(),
            index: 0,
            wrap,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The control the focus cursor rests on
    pub fn current(&self) -> Option<WidgetId> {
        self.members.get(self.index).copied()
    }

    pub(crate) fn push(&mut self, id: WidgetId) {
        self.members.push(id);
    }

    /// Remove a member, repairing the index
    pub(crate) fn remove(&mut self, id: WidgetId) -> bool {
        let Some(at) = self.members.iter().position(|&m| m == id) else {
            return false;
        };
        self.members.remove(at);
        if at < self.index {
            self.index -= 1;
        }
        if self.index >= self.members.len() {
            self.index = self.members.len().saturating_sub(1);
        }
        true
    }

    /// Step the focus cursor, returning `(old, new)` when it moved
    ///
    /// An empty ring or a clamped step at the boundary is a no-op.
    pub(crate) fn step(&mut self, forward: bool) -> Option<(WidgetId, WidgetId)> {
        if self.members.is_empty() {
            return None;
        }
        let len = self.members.len();
        let old = self.index;
        let new = if self.wrap {
            if forward {
                (old + 1) % len
            } else {
                (old + len - 1) % len
            }
        } else if forward {
            (old + 1).min(len - 1)
        } else {
            old.saturating_sub(1)
        };
        if new == old {
            return None;
        }
        self.index = new;
        Some((self.members[old], self.members[new]))
    }
}

/// Focus-capable container with an optional border
#[derive(Debug)]
pub struct Frame {
    pub(crate) layout: Layout,
    pub(crate) ring: FocusRing,
    pub(crate) bordered: bool,
}

impl Frame {
    pub(crate) fn new(wrap_focus: bool, bordered: bool) -> Self {
        Self {
            layout: Layout::new(),
            ring: FocusRing::new(wrap_focus),
            bordered,
        }
    }

    pub fn ring(&self) -> &FocusRing {
        &self.ring
    }

    /// Content area: the whole bounds, or inset by the border
    pub(crate) fn calc_draw_area(&self, size: Size) -> Viewport {
        if self.bordered {
            Viewport::new(
                Point::new(BORDER_WIDTH as i32, BORDER_WIDTH as i32),
                Size::new(
                    size.w.saturating_sub(2 * BORDER_WIDTH),
                    size.h.saturating_sub(2 * BORDER_WIDTH),
                ),
            )
        } else {
            Viewport::new(Point::ZERO, size)
        }
    }

    /// Double-line border, drawn in the parent's canvas
    pub(crate) fn draw(&self, base: &WidgetBase, canvas: &mut Canvas<'_>, style: &Style) {
        if !self.bordered {
            return;
        }
        let r = base.rect;
        let color = if base.focused { style.accent } else { base.color };
        canvas.draw_rect(r.x, r.y, r.w as i32, r.h as i32, color);
        canvas.draw_rect(r.x + 1, r.y + 1, r.w as i32 - 2, r.h as i32 - 2, color);
    }
}
