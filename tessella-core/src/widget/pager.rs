//! Full-text paging view
//!
//! An undecorated container holding a single auto-wrapped text child.
//! Paging shifts the child vertically by a whole number of glyph rows;
//! the text node's line cache picks the first visible line from the
//! resulting negative y. Page turns background-fill the viewport, so
//! the key handling lives with the tree.

use alloc::string::String;

use crate::tree::WidgetId;
use crate::widget::frame::Layout;

/// Paging text viewer
#[derive(Debug)]
pub struct Pager {
    pub(crate) layout: Layout,
    /// The owned text node, created when the pager joins a tree
    pub(crate) text_child: Option<WidgetId>,
    /// Content installed into the child on attach
    pub(crate) initial: String,
}

impl Pager {
    pub(crate) fn new(content: &str) -> Self {
        Self {
            layout: Layout::new(),
            text_child: None,
            initial: String::from(content),
        }
    }

    /// The text node this pager scrolls
    pub fn text_child(&self) -> Option<WidgetId> {
        self.text_child
    }
}
