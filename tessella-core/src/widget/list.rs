//! Scrollable list container
//!
//! Children stack vertically in insertion order and are resized to the
//! list's width minus a scrollbar allowance. Focus stepping is clamped
//! (no wrap-around), and the list scrolls to keep the focused child
//! inside its viewport. Restacking lives with the tree, which owns the
//! child nodes.

use crate::widget::frame::Frame;

/// Pixels reserved at the right edge of each stacked child
pub(crate) const SCROLL_ALLOWANCE: u32 = 4;

/// Vertically stacking, scrolling list
#[derive(Debug)]
pub struct ListView {
    pub(crate) frame: Frame,
    /// Scroll offset: y position of the first child
    pub(crate) start_offset: i32,
}

impl ListView {
    pub(crate) fn new() -> Self {
        Self {
            // Bordered, clamped focus: reaching the end of a list should
            // not jump back to the top
            frame: Frame::new(false, true),
            start_offset: 0,
        }
    }

    pub fn ring(&self) -> &crate::widget::FocusRing {
        &self.frame.ring
    }

    /// Current scroll offset in pixels
    pub fn scroll(&self) -> i32 {
        self.start_offset
    }
}
