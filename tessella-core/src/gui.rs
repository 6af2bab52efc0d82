//! GUI root: layer stack, input routing, render pass
//!
//! One [`Gui`] owns the display transport, the glyph source, the widget
//! tree, and the two GUI-wide stacks:
//!
//! - the **layer stack** of top-level containers (modal overlays); only
//!   the top layer is rendered, lower layers keep their widget state but
//!   stay untouched until uncovered
//! - the **entered-control stack** recording which control receives raw
//!   input; entering and cancelling is strictly last-in-first-out
//!
//! The caller runs one cooperative cycle: scan keys into
//! [`key_response`](Gui::key_response), then [`render_frame`](Gui::render_frame),
//! then yield. A render pass always runs to completion and never holds a
//! buffer borrow across cycles.

use portable_atomic::{AtomicBool, Ordering};

use tessella_display::{DisplayBackend, DisplayError, FrameView, GlyphSource};

use crate::error::Error;
use crate::geometry::{Point, Rect, Size};
use crate::input::Key;
use crate::style::Style;
use crate::tree::{Node, Tree, WidgetId};
use crate::widget::{Kind, Reply};

/// Deepest supported modal layer nesting
pub const MAX_LAYERS: usize = 8;

/// Deepest supported control nesting (layers included)
pub const MAX_ENTERED: usize = 16;

static GUI_TAKEN: AtomicBool = AtomicBool::new(false);

/// State change reported to the caller from one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiEvent {
    /// A button fired
    Activated(WidgetId),
    /// A checkbox, radio or slider changed state
    Changed(WidgetId),
}

/// The GUI root
pub struct Gui<D: DisplayBackend, F: GlyphSource> {
    display: D,
    font: F,
    style: Style,
    tree: Tree,
    base: WidgetId,
    layers: heapless::Vec<WidgetId, MAX_LAYERS>,
    entered: heapless::Vec<WidgetId, MAX_ENTERED>,
}

impl<D: DisplayBackend, F: GlyphSource> Gui<D, F> {
    /// Construct the one GUI instance
    ///
    /// Returns `None` once an instance exists anywhere in the program;
    /// there is exactly one display and one widget tree. The base
    /// container is created entered and sized to the display.
    pub fn take(display: D, font: F, style: Style, wrap_focus: bool) -> Option<Self> {
        if GUI_TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self::new_unchecked(display, font, style, wrap_focus))
    }

    /// Construct without the single-instance guarantee
    ///
    /// For host tests and simulators that build several GUIs in one
    /// process.
    pub fn new_unchecked(display: D, font: F, style: Style, wrap_focus: bool) -> Self {
        let screen = Size::new(display.width() as u32, display.height() as u32);
        let mut tree = Tree::new(screen);
        let base = tree.attach(
            None,
            Node::frame(
                Rect::new(0, 0, screen.w, screen.h),
                style.foreground,
                wrap_focus,
                false,
            ),
        );
        // The base surface is permanently resident and always entered
        tree.mark_entered(base, true);
        Self {
            display,
            font,
            style,
            tree,
            base,
            layers: heapless::Vec::new(),
            entered: heapless::Vec::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The permanently resident base container
    pub fn base(&self) -> WidgetId {
        self.base
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn font(&self) -> &F {
        &self.font
    }

    /// The layer whose subtree the render pass currently walks
    pub fn active_layer(&self) -> WidgetId {
        self.layers.last().copied().unwrap_or(self.base)
    }

    /// The control currently receiving raw input
    pub fn input_target(&self) -> WidgetId {
        self.entered.last().copied().unwrap_or(self.base)
    }

    /// Attach a widget to the base container
    pub fn add_widget(&mut self, node: Node) -> WidgetId {
        self.tree.attach(Some(self.base), node)
    }

    /// Push a modal layer over the current surface
    ///
    /// The container is marked entered, starts receiving input, and its
    /// viewport is background-filled on the next render pass.
    pub fn add_layer(&mut self, layer: WidgetId) -> Result<(), Error> {
        if !self
            .tree
            .get(layer)
            .is_some_and(|n| n.kind().is_container())
        {
            return Err(Error::NotAContainer);
        }
        self.layers.push(layer).map_err(|_| Error::LayerOverflow)?;
        if self.entered.push(layer).is_err() {
            self.layers.pop();
            return Err(Error::LayerOverflow);
        }
        self.tree.mark_entered(layer, true);
        // Entering hands the cursor to the layer's current focus child,
        // the same way Select-entry into a frame does
        if let Some(cur) = self
            .tree
            .get(layer)
            .and_then(|n| n.kind().ring())
            .and_then(|r| r.current())
        {
            if let Some(n) = self.tree.get_mut(cur) {
                n.base.focused = true;
                n.base.dirty = true;
            }
        }
        self.tree.rebuild_viewport(layer);
        self.tree.force_repaint(layer);
        Ok(())
    }

    /// Pop the top modal layer
    ///
    /// Unwinds the entered-control stack through the departing layer and
    /// hands rendering back to the surface underneath, which must
    /// re-clear (the overlay left stale pixels over it).
    pub fn remove_layer(&mut self) -> Result<WidgetId, Error> {
        let layer = self.layers.pop().ok_or(Error::LayerUnderflow)?;
        if self.entered.contains(&layer) {
            while let Some(top) = self.entered.pop() {
                self.tree.mark_entered(top, false);
                if top == layer {
                    break;
                }
            }
        } else {
            self.tree.mark_entered(layer, false);
        }
        self.uncover_top();
        Ok(layer)
    }

    /// Programmatically ascend out of the current control
    ///
    /// The key-driven equivalent is a cancel key reaching the control.
    pub fn leave(&mut self) -> Result<WidgetId, Error> {
        let top = *self.entered.last().ok_or(Error::EnteredUnderflow)?;
        self.ascend();
        Ok(top)
    }

    /// Route one key press through the entered-control stack
    ///
    /// The key goes to the stack top (the base container when empty).
    /// An `Esc` answer ascends one level, popping the layer stack too
    /// when the departing control was the top layer; a `Descend` answer
    /// pushes the nested control. Button presses and value changes
    /// surface as [`UiEvent`]s.
    pub fn key_response(&mut self, key: Key) -> Option<UiEvent> {
        // The base cannot be ascended out of
        if self.entered.is_empty() && key == Key::Escape {
            return None;
        }
        let target = self.input_target();
        let cell = self.font.cell_size() as i32;
        match self.tree.key_input(target, key, cell) {
            Reply::None | Reply::Enter => None,
            Reply::Esc => {
                self.ascend();
                None
            }
            Reply::Descend(id) => {
                // Nesting deeper than the stack holds degrades to not
                // entering
                let _ = self.entered.push(id);
                None
            }
            Reply::Activated(id) => Some(UiEvent::Activated(id)),
            Reply::Changed(id) => Some(UiEvent::Changed(id)),
        }
    }

    fn ascend(&mut self) {
        let Some(top) = self.entered.pop() else {
            return;
        };
        if self.layers.last() == Some(&top) {
            self.layers.pop();
            self.tree.mark_entered(top, false);
            self.uncover_top();
        }
    }

    /// The surface under a departed overlay must repaint from scratch
    fn uncover_top(&mut self) {
        let top = self.active_layer();
        self.tree.force_repaint(top);
    }

    /// Replace the style and schedule a full repaint
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
        let top = self.active_layer();
        self.tree.force_repaint(top);
    }

    /// Draw the current top layer and push the buffer to the display
    ///
    /// Walks only the active layer's subtree, skips containers with
    /// invalid viewports, background-fills containers whose cleared flag
    /// is down, redraws dirty widgets, then flushes. The pass always
    /// runs to completion; buffer views live only inside it.
    pub fn render_frame(&mut self) -> Result<(), DisplayError> {
        let top = self.active_layer();
        let Self {
            display,
            font,
            style,
            tree,
            ..
        } = self;
        let width = display.width();
        let height = display.height();
        {
            let mut frame = FrameView::new(display.frame(), width, height);
            let screen = tree.screen();
            render_node(tree, top, &mut frame, font, style, Point::ZERO, screen);
        }
        display.flush()
    }
}

/// Draw one widget into its parent's region, then recurse through
/// container content
fn render_node<F: GlyphSource>(
    tree: &mut Tree,
    id: WidgetId,
    frame: &mut FrameView<'_>,
    font: &F,
    style: &Style,
    parent_abs: Point,
    parent_size: Size,
) {
    let Some(node) = tree.get(id) else { return };
    let is_container = node.kind().is_container();

    if node.base().is_dirty() {
        if matches!(node.kind(), Kind::Text(_)) {
            tree.ensure_text_layout(id, parent_size.w, font.cell_size() as i32);
        }
        let Some(node) = tree.get(id) else { return };
        let mut canvas = frame.view(parent_abs.x, parent_abs.y, parent_size.w, parent_size.h);
        node.kind.draw(&node.base, &mut canvas, font, style);
        if let Some(n) = tree.get_mut(id) {
            n.base.dirty = false;
        }
    }

    if !is_container {
        return;
    }
    let Some((viewport, abs, cleared)) = tree
        .get(id)
        .and_then(|n| n.kind.layout())
        .map(|l| (l.viewport(), l.abs, l.is_cleared()))
    else {
        return;
    };
    if !viewport.is_valid() {
        return;
    }

    if !cleared {
        let mut canvas = frame.view(abs.x, abs.y, viewport.size.w, viewport.size.h);
        canvas.fill(style.background);
        tree.clear_region(id);
        if let Some(layout) = tree.get_mut(id).and_then(|n| n.kind.layout_mut()) {
            layout.cleared = true;
        }
    }

    for at in 0..tree.children_len(id) {
        if let Some(child) = tree.child_at(id, at) {
            render_node(tree, child, frame, font, style, abs, viewport.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessella_display::sim::{BlockFont, SimDisplay};
    use tessella_display::Rgb565;

    fn gui() -> Gui<SimDisplay, BlockFont> {
        Gui::new_unchecked(
            SimDisplay::new(64, 64),
            BlockFont::new(8),
            Style::default(),
            true,
        )
    }

    #[test]
    fn test_take_refuses_second_instance() {
        let first = Gui::take(
            SimDisplay::new(8, 8),
            BlockFont::new(8),
            Style::default(),
            true,
        );
        assert!(first.is_some());
        let second = Gui::take(
            SimDisplay::new(8, 8),
            BlockFont::new(8),
            Style::default(),
            true,
        );
        assert!(second.is_none());
    }

    #[test]
    fn test_base_is_entered_and_default_target() {
        let g = gui();
        let base = g.base();
        assert!(g.tree().get(base).unwrap().base().is_entered());
        assert_eq!(g.input_target(), base);
        assert_eq!(g.active_layer(), base);
    }

    #[test]
    fn test_remove_layer_underflow_is_an_error() {
        let mut g = gui();
        assert_eq!(g.remove_layer().unwrap_err(), Error::LayerUnderflow);
        assert_eq!(g.leave().unwrap_err(), Error::EnteredUnderflow);
    }

    #[test]
    fn test_add_layer_rejects_non_container() {
        let mut g = gui();
        let b = g.add_widget(Node::button(Rect::new(0, 0, 20, 10), Rgb565::WHITE, "x"));
        assert_eq!(g.add_layer(b).unwrap_err(), Error::NotAContainer);
    }

    #[test]
    fn test_escape_at_base_is_noop() {
        let mut g = gui();
        assert_eq!(g.key_response(Key::Escape), None);
        let base = g.base();
        assert!(g.tree().get(base).unwrap().base().is_entered());
    }

    #[test]
    fn test_render_flushes() {
        let mut g = gui();
        g.add_widget(Node::button(Rect::new(4, 4, 24, 12), Rgb565::WHITE, "ok"));
        g.render_frame().unwrap();
        assert_eq!(g.display().flushes(), 1);
        // The button holds the focus cursor, so its border lands on the
        // presented frame in the accent color
        assert_eq!(g.display().pixel(4, 4), Style::default().accent);
    }
}
