//! Widget arena and structural event propagation
//!
//! Widgets live in an id arena: ownership flows parent to child through
//! each container's child list, and the upward link is a plain index
//! used for lookups only. Three structural events keep cached geometry
//! and redraw state consistent, each propagated synchronously as a
//! depth-first walk at the point of mutation:
//!
//! - transform: a widget moved or resized; its container must re-fill
//!   its background, and a container's own viewport is recomputed
//! - viewport rebuild: an ancestor's viewport changed; flows downward
//!   only, every descendant recomputes its cached viewport and dirties
//! - region clear: a container re-filled its background; flows downward
//!   only, every descendant repaints unconditionally next pass

use alloc::vec::Vec;

use tessella_display::Rgb565;

use crate::error::Error;
use crate::geometry::{clip_viewport, Point, Rect, Size};
use crate::input::Key;
use crate::widget::list::SCROLL_ALLOWANCE;
use crate::widget::{
    Button, Checkbox, Frame, Kind, ListView, Orientation, Pager, Radio, Reply, Slider, Text,
    WidgetBase,
};

/// Handle to a widget stored in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WidgetId(u32);

impl WidgetId {
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One widget: shared base state plus kind-specific state
#[derive(Debug)]
pub struct Node {
    pub(crate) base: WidgetBase,
    pub(crate) kind: Kind,
}

impl Node {
    fn with(rect: Rect, color: Rgb565, kind: Kind) -> Self {
        Self {
            base: WidgetBase::new(rect, color),
            kind,
        }
    }

    /// Plain container without focus handling
    pub fn panel(rect: Rect, color: Rgb565) -> Self {
        Self::with(rect, color, Kind::Panel(crate::widget::Layout::new()))
    }

    /// Focus-capable container; `bordered` insets the content area by
    /// [`BORDER_WIDTH`](crate::widget::BORDER_WIDTH) per side
    pub fn frame(rect: Rect, color: Rgb565, wrap_focus: bool, bordered: bool) -> Self {
        Self::with(rect, color, Kind::Frame(Frame::new(wrap_focus, bordered)))
    }

    /// Vertically stacking, scrolling list
    pub fn list(rect: Rect, color: Rgb565) -> Self {
        Self::with(rect, color, Kind::List(ListView::new()))
    }

    /// Paging text viewer; the wrapped text child is created on attach
    pub fn pager(rect: Rect, color: Rgb565, content: &str) -> Self {
        Self::with(rect, color, Kind::Pager(Pager::new(content)))
    }

    pub fn button(rect: Rect, color: Rgb565, label: &str) -> Self {
        Self::with(rect, color, Kind::Button(Button::new(label)))
    }

    /// Checkbox with a `marker`-pixel check square
    pub fn checkbox(rect: Rect, color: Rgb565, marker: u32, label: &str) -> Result<Self, Error> {
        let checkbox = Checkbox::new(rect.size(), marker, label)?;
        Ok(Self::with(rect, color, Kind::Checkbox(checkbox)))
    }

    /// Radio selector with a `marker`-pixel dot; radios sharing a group
    /// id are mutually exclusive
    pub fn radio(
        rect: Rect,
        color: Rgb565,
        marker: u32,
        group: Option<u8>,
        label: &str,
    ) -> Result<Self, Error> {
        let radio = Radio::new(rect.size(), marker, group, label)?;
        Ok(Self::with(rect, color, Kind::Radio(radio)))
    }

    pub fn slider(
        rect: Rect,
        color: Rgb565,
        min: i32,
        max: i32,
        orientation: Orientation,
        show_value: bool,
    ) -> Result<Self, Error> {
        let slider = Slider::new(min, max, orientation, show_value)?;
        Ok(Self::with(rect, color, Kind::Slider(slider)))
    }

    /// Unwrapped text at a position (the node itself has no extent)
    pub fn text(pos: Point, color: Rgb565, content: &str) -> Self {
        Self::with(
            Rect::new(pos.x, pos.y, 0, 0),
            color,
            Kind::Text(Text::new(content, false)),
        )
    }

    /// Text that wraps at the containing viewport's right edge
    pub fn wrapped_text(pos: Point, color: Rgb565, content: &str) -> Self {
        Self::with(
            Rect::new(pos.x, pos.y, 0, 0),
            color,
            Kind::Text(Text::new(content, true)),
        )
    }

    pub fn base(&self) -> &WidgetBase {
        &self.base
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }
}

/// The widget arena
///
/// Holds every widget of one GUI, including containers currently hidden
/// under other layers. The screen size acts as the viewport of the
/// implicit root: top-level containers clip directly against it.
pub struct Tree {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
    screen: Size,
}

impl Tree {
    pub fn new(screen: Size) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            screen,
        }
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn get(&self, id: WidgetId) -> Option<&Node> {
        self.nodes.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    fn alloc(&mut self, node: Node) -> WidgetId {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot as usize] = Some(node);
            WidgetId(slot)
        } else {
            self.nodes.push(Some(node));
            WidgetId(self.nodes.len() as u32 - 1)
        }
    }

    pub(crate) fn children_len(&self, id: WidgetId) -> usize {
        self.get(id)
            .and_then(|n| n.kind.layout())
            .map_or(0, |l| l.children.len())
    }

    pub(crate) fn child_at(&self, id: WidgetId, at: usize) -> Option<WidgetId> {
        self.get(id)?.kind.layout()?.children.get(at).copied()
    }

    /// Attach a widget, appending it to the parent's child sequence
    ///
    /// Insertion order is z-order and default focus order. Focus-eligible
    /// children join the parent frame's focus ring; containers attached
    /// under a realized parent get their viewport computed immediately,
    /// recursively for their descendants. With no parent (or a parent
    /// that is not a container) the widget becomes a top-level node
    /// clipped directly against the screen.
    pub fn attach(&mut self, parent: Option<WidgetId>, node: Node) -> WidgetId {
        let id = self.alloc(node);
        let parent = parent.filter(|&p| {
            self.get(p).is_some_and(|n| n.kind.is_container())
        });

        if let Some(p) = parent {
            if let Some(n) = self.get_mut(id) {
                n.base.parent = Some(p);
            }
            let focusable = self.get(id).is_some_and(|n| n.kind.is_focusable());
            let parent_entered = self.get(p).is_some_and(|n| n.base.entered);
            let mut focus_first = false;
            if let Some(pn) = self.get_mut(p) {
                if let Some(layout) = pn.kind.layout_mut() {
                    layout.children.push(id);
                }
                if focusable {
                    if let Some(ring) = pn.kind.ring_mut() {
                        // The first focus-eligible child takes the cursor
                        // right away if the frame is already entered
                        focus_first = ring.is_empty() && parent_entered;
                        ring.push(id);
                    }
                }
            }
            if focus_first {
                if let Some(n) = self.get_mut(id) {
                    n.base.focused = true;
                    n.base.dirty = true;
                }
            }
            self.adjust_layout(p);
            let realized = self
                .get(p)
                .and_then(|n| n.kind.layout())
                .is_some_and(|l| l.viewport.is_valid());
            if realized {
                self.rebuild_viewport(id);
            }
        } else {
            self.rebuild_viewport(id);
        }

        // A pager owns one wrapped text child, created here so it lives
        // in the same arena
        let pager_content = match self.get_mut(id) {
            Some(n) => match &mut n.kind {
                Kind::Pager(pager) if pager.text_child.is_none() => {
                    Some((core::mem::take(&mut pager.initial), n.base.color))
                }
                _ => None,
            },
            None => None,
        };
        if let Some((content, color)) = pager_content {
            let text = self.attach(Some(id), Node::wrapped_text(Point::ZERO, color, &content));
            if let Some(n) = self.get_mut(id) {
                if let Kind::Pager(pager) = &mut n.kind {
                    pager.text_child = Some(text);
                }
            }
        }
        id
    }

    /// Detach a widget and drop it together with its descendants
    ///
    /// The parent re-fills its background (the freed region holds stale
    /// pixels), re-runs its layout adjustment, and repairs its focus
    /// ring; when the removed child held the focus cursor, the cursor's
    /// new owner takes the focused mark.
    pub fn remove(&mut self, id: WidgetId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let parent = node.base.parent;
        let was_focused = node.base.focused;

        if let Some(p) = parent {
            let parent_entered = self.get(p).is_some_and(|n| n.base.entered);
            let mut refocus = None;
            if let Some(pn) = self.get_mut(p) {
                if let Some(layout) = pn.kind.layout_mut() {
                    layout.children.retain(|&c| c != id);
                    layout.cleared = false;
                }
                if let Some(ring) = pn.kind.ring_mut() {
                    ring.remove(id);
                    if was_focused && parent_entered {
                        refocus = ring.current();
                    }
                }
            }
            if let Some(next) = refocus {
                if let Some(n) = self.get_mut(next) {
                    n.base.focused = true;
                    n.base.dirty = true;
                }
            }
            self.adjust_layout(p);
            self.clear_region(p);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: WidgetId) {
        for at in (0..self.children_len(id)).rev() {
            if let Some(child) = self.child_at(id, at) {
                self.free_subtree(child);
            }
        }
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    // --- Mutators -------------------------------------------------------

    /// Move a widget relative to its parent's viewport
    pub fn set_position(&mut self, id: WidgetId, pos: Point) {
        let Some(n) = self.get_mut(id) else { return };
        let moved_x = n.base.rect.x != pos.x;
        n.base.rect.x = pos.x;
        n.base.rect.y = pos.y;
        if moved_x {
            if let Kind::Text(text) = &mut n.kind {
                // The wrap origin follows x
                text.stale = true;
            }
        }
        self.transform_changed(id);
    }

    /// Resize a widget
    pub fn set_size(&mut self, id: WidgetId, size: Size) {
        let Some(n) = self.get_mut(id) else { return };
        n.base.rect.w = size.w;
        n.base.rect.h = size.h;
        self.transform_changed(id);
    }

    pub fn set_color(&mut self, id: WidgetId, color: Rgb565) {
        if let Some(n) = self.get_mut(id) {
            n.base.color = color;
            n.base.dirty = true;
        }
    }

    /// Replace the content of a text node or a pager
    ///
    /// A pager resets its scroll to the top of the new document.
    pub fn set_text(&mut self, id: WidgetId, content: &str) {
        let target = match self.get(id) {
            Some(n) => match &n.kind {
                Kind::Pager(pager) => match pager.text_child {
                    Some(text) => text,
                    None => return,
                },
                Kind::Text(_) => id,
                _ => return,
            },
            None => return,
        };
        if let Some(n) = self.get_mut(target) {
            if let Kind::Text(text) = &mut n.kind {
                text.content.clear();
                text.content.push_str(content);
                text.stale = true;
            }
        }
        if target != id {
            self.set_position(target, Point::ZERO);
        }
        self.transform_changed(target);
    }

    /// Replace a button/selector label
    pub fn set_label(&mut self, id: WidgetId, label: &str) {
        let Some(n) = self.get_mut(id) else { return };
        let slot = match &mut n.kind {
            Kind::Button(button) => &mut button.label,
            Kind::Checkbox(checkbox) => &mut checkbox.label,
            Kind::Radio(radio) => &mut radio.label,
            _ => return,
        };
        slot.clear();
        slot.push_str(label);
        // A shorter label leaves stale glyphs behind
        self.transform_changed(id);
    }

    /// Set a checkbox or radio state directly
    pub fn set_checked(&mut self, id: WidgetId, checked: bool) {
        let Some(n) = self.get_mut(id) else { return };
        match &mut n.kind {
            Kind::Checkbox(checkbox) => checkbox.checked = checked,
            Kind::Radio(radio) => radio.checked = checked,
            _ => return,
        }
        n.base.dirty = true;
    }

    /// Set a slider value; out-of-range values are ignored
    pub fn set_slider_value(&mut self, id: WidgetId, value: i32) {
        let Some(n) = self.get_mut(id) else { return };
        if let Kind::Slider(slider) = &mut n.kind {
            if slider.set_value(value) {
                n.base.dirty = true;
            }
        }
    }

    // --- Event propagation ----------------------------------------------

    /// A widget moved or resized
    pub(crate) fn transform_changed(&mut self, id: WidgetId) {
        let parent = match self.get_mut(id) {
            Some(n) => {
                n.base.dirty = true;
                n.base.parent
            }
            None => return,
        };
        // The parent's background no longer matches its content
        if let Some(p) = parent {
            if let Some(layout) = self.get_mut(p).and_then(|n| n.kind.layout_mut()) {
                layout.cleared = false;
            }
        }
        if self.get(id).is_some_and(|n| n.kind.is_container()) {
            self.recompute_viewport(id);
            for at in 0..self.children_len(id) {
                if let Some(child) = self.child_at(id, at) {
                    self.rebuild_viewport(child);
                }
            }
        }
    }

    /// An ancestor's viewport changed; downward only
    pub(crate) fn rebuild_viewport(&mut self, id: WidgetId) {
        let Some(n) = self.get_mut(id) else { return };
        n.base.dirty = true;
        if let Kind::Text(text) = &mut n.kind {
            // Wrap width may have changed with the viewport
            text.stale = true;
        }
        if n.kind.is_container() {
            self.recompute_viewport(id);
            for at in 0..self.children_len(id) {
                if let Some(child) = self.child_at(id, at) {
                    self.rebuild_viewport(child);
                }
            }
        }
    }

    /// Schedule a container to re-fill its background and its whole
    /// subtree to repaint on the next render pass
    pub fn force_repaint(&mut self, id: WidgetId) {
        if let Some(layout) = self.get_mut(id).and_then(|n| n.kind.layout_mut()) {
            layout.cleared = false;
        }
        self.clear_region(id);
    }

    /// A container background-filled its viewport; every descendant must
    /// repaint
    pub(crate) fn clear_region(&mut self, id: WidgetId) {
        for at in 0..self.children_len(id) {
            if let Some(child) = self.child_at(id, at) {
                self.mark_subtree_dirty(child);
            }
        }
    }

    fn mark_subtree_dirty(&mut self, id: WidgetId) {
        if let Some(n) = self.get_mut(id) {
            n.base.dirty = true;
        }
        for at in 0..self.children_len(id) {
            if let Some(child) = self.child_at(id, at) {
                self.mark_subtree_dirty(child);
            }
        }
    }

    /// Re-clip a container's cached viewport against its parent chain
    fn recompute_viewport(&mut self, id: WidgetId) {
        let Some(n) = self.get(id) else { return };
        let rect = n.base.rect;
        let candidate = n.kind.calc_draw_area(rect.size());
        let (parent_size, parent_abs) = match n.base.parent {
            Some(p) => match self.get(p).and_then(|pn| pn.kind.layout()) {
                Some(layout) => (layout.viewport.size, layout.abs),
                None => (Size::ZERO, Point::ZERO),
            },
            None => (self.screen, Point::ZERO),
        };
        let (viewport, abs) =
            clip_viewport(candidate, rect.size(), rect.pos(), parent_size, parent_abs);
        if let Some(layout) = self.get_mut(id).and_then(|n| n.kind.layout_mut()) {
            layout.viewport = viewport;
            layout.abs = abs;
        }
    }

    // --- Layout adjustment ----------------------------------------------

    /// Container-specific sibling layout (list stacking)
    fn adjust_layout(&mut self, id: WidgetId) {
        let Some(n) = self.get(id) else { return };
        let Kind::List(list) = &n.kind else { return };
        let width = n.base.rect.w.saturating_sub(SCROLL_ALLOWANCE);
        let mut offset = list.start_offset;

        for at in 0..self.children_len(id) {
            let Some(child) = self.child_at(id, at) else {
                continue;
            };
            let Some(cn) = self.get_mut(child) else {
                continue;
            };
            let h = cn.base.rect.h;
            cn.base.rect = Rect::new(0, offset, width, h);
            if let Kind::Text(text) = &mut cn.kind {
                text.stale = true;
            }
            offset += h as i32;
            self.transform_changed(child);
        }
        // Restacking moves children over old pixels
        if let Some(layout) = self.get_mut(id).and_then(|n| n.kind.layout_mut()) {
            layout.cleared = false;
        }
    }

    /// Scroll the list so the focused child stays visible
    fn scroll_to_focus(&mut self, id: WidgetId) {
        let Some(n) = self.get(id) else { return };
        let Kind::List(list) = &n.kind else { return };
        let Some(focus) = list.frame.ring.current() else {
            return;
        };
        let view_h = list.frame.layout.viewport.size.h as i32;
        let Some(fr) = self.get(focus).map(|f| f.base.rect) else {
            return;
        };
        let delta = if fr.y < 0 {
            -fr.y
        } else if fr.bottom() > view_h {
            view_h - fr.bottom()
        } else {
            return;
        };
        if let Some(nm) = self.get_mut(id) {
            if let Kind::List(list) = &mut nm.kind {
                list.start_offset += delta;
            }
        }
        self.adjust_layout(id);
    }

    // --- Input routing ---------------------------------------------------

    /// Mark a control entered/left without other side effects
    pub(crate) fn mark_entered(&mut self, id: WidgetId, entered: bool) {
        if let Some(n) = self.get_mut(id) {
            n.base.entered = entered;
            n.base.dirty = true;
        }
    }

    /// Feed one key to a control
    ///
    /// `cell` is the glyph cell size, used by pagers to quantize page
    /// turns to whole text rows.
    pub(crate) fn key_input(&mut self, id: WidgetId, key: Key, cell: i32) -> Reply {
        let Some(n) = self.get(id) else {
            return Reply::None;
        };
        match &n.kind {
            Kind::Button(_) => {
                if key == Key::Select {
                    if let Some(nm) = self.get_mut(id) {
                        nm.base.dirty = true;
                    }
                    Reply::Activated(id)
                } else {
                    Reply::None
                }
            }
            Kind::Checkbox(_) => {
                if key == Key::Select {
                    if let Some(nm) = self.get_mut(id) {
                        if let Kind::Checkbox(checkbox) = &mut nm.kind {
                            checkbox.checked = !checkbox.checked;
                        }
                        nm.base.dirty = true;
                    }
                    Reply::Changed(id)
                } else {
                    Reply::None
                }
            }
            Kind::Radio(_) => {
                if key == Key::Select {
                    self.radio_select(id)
                } else {
                    Reply::None
                }
            }
            Kind::Slider(_) => self.slider_key(id, key),
            Kind::Frame(_) | Kind::List(_) => {
                let reply = self.frame_key(id, key, cell);
                if key == Key::Up || key == Key::Down {
                    self.scroll_to_focus(id);
                }
                reply
            }
            Kind::Pager(_) => self.pager_key(id, key, cell),
            Kind::Panel(_) | Kind::Text(_) => Reply::None,
        }
    }

    fn radio_select(&mut self, id: WidgetId) -> Reply {
        let Some((group, checked)) = self.get(id).and_then(|n| match &n.kind {
            Kind::Radio(radio) => Some((radio.group, radio.checked)),
            _ => None,
        }) else {
            return Reply::None;
        };

        match group {
            None => {
                if let Some(n) = self.get_mut(id) {
                    if let Kind::Radio(radio) = &mut n.kind {
                        radio.checked = !radio.checked;
                    }
                    n.base.dirty = true;
                }
                Reply::Changed(id)
            }
            Some(g) => {
                // A grouped radio cannot uncheck itself
                if checked {
                    return Reply::None;
                }
                for slot in 0..self.nodes.len() {
                    let other = WidgetId(slot as u32);
                    if other == id {
                        continue;
                    }
                    if let Some(n) = self.get_mut(other) {
                        if let Kind::Radio(radio) = &mut n.kind {
                            if radio.group == Some(g) && radio.checked {
                                radio.checked = false;
                                n.base.dirty = true;
                            }
                        }
                    }
                }
                if let Some(n) = self.get_mut(id) {
                    if let Kind::Radio(radio) = &mut n.kind {
                        radio.checked = true;
                    }
                    n.base.dirty = true;
                }
                Reply::Changed(id)
            }
        }
    }

    fn slider_key(&mut self, id: WidgetId, key: Key) -> Reply {
        match key {
            Key::Select => {
                let Some(n) = self.get_mut(id) else {
                    return Reply::None;
                };
                n.base.entered = !n.base.entered;
                n.base.dirty = true;
                if n.base.entered {
                    Reply::Enter
                } else {
                    Reply::Esc
                }
            }
            Key::Escape => {
                if let Some(n) = self.get_mut(id) {
                    n.base.entered = false;
                    n.base.dirty = true;
                }
                Reply::Esc
            }
            Key::Right | Key::Up => self.slider_adjust(id, 1),
            Key::Left | Key::Down => self.slider_adjust(id, -1),
        }
    }

    fn slider_adjust(&mut self, id: WidgetId, delta: i32) -> Reply {
        let Some(n) = self.get_mut(id) else {
            return Reply::None;
        };
        if let Kind::Slider(slider) = &mut n.kind {
            if slider.adjust(delta) {
                n.base.dirty = true;
                return Reply::Changed(id);
            }
        }
        Reply::None
    }

    /// The frame focus state machine
    ///
    /// Idle: Select enters the frame, handing the cursor to the current
    /// focus-ring child. Entered: Select forwards to that child (an
    /// `Enter` answer becomes `Descend`), Up/Down step the ring, Escape
    /// releases the cursor and reports `Esc` so the caller ascends.
    fn frame_key(&mut self, id: WidgetId, key: Key, cell: i32) -> Reply {
        let Some(n) = self.get(id) else {
            return Reply::None;
        };
        let entered = n.base.entered;

        if !entered {
            if key != Key::Select {
                return Reply::None;
            }
            let current = n.kind.ring().and_then(|r| r.current());
            if let Some(nm) = self.get_mut(id) {
                nm.base.entered = true;
                nm.base.focused = false;
                nm.base.dirty = true;
            }
            if let Some(cur) = current {
                if let Some(cn) = self.get_mut(cur) {
                    cn.base.focused = true;
                    cn.base.dirty = true;
                }
            }
            return Reply::Enter;
        }

        match key {
            Key::Select => {
                let Some(cur) = self.get(id).and_then(|n| n.kind.ring()).and_then(|r| r.current())
                else {
                    return Reply::None;
                };
                match self.key_input(cur, key, cell) {
                    Reply::Enter => Reply::Descend(cur),
                    Reply::Activated(w) => Reply::Activated(w),
                    Reply::Changed(w) => Reply::Changed(w),
                    _ => Reply::None,
                }
            }
            Key::Up | Key::Down => {
                let stepped = self
                    .get_mut(id)
                    .and_then(|n| n.kind.ring_mut())
                    .and_then(|r| r.step(key == Key::Down));
                if let Some((old, new)) = stepped {
                    if let Some(on) = self.get_mut(old) {
                        on.base.focused = false;
                        on.base.dirty = true;
                    }
                    if let Some(nn) = self.get_mut(new) {
                        nn.base.focused = true;
                        nn.base.dirty = true;
                    }
                }
                Reply::None
            }
            Key::Escape => {
                let current = self.get(id).and_then(|n| n.kind.ring()).and_then(|r| r.current());
                if let Some(cur) = current {
                    if let Some(cn) = self.get_mut(cur) {
                        cn.base.focused = false;
                        cn.base.dirty = true;
                    }
                }
                if let Some(nm) = self.get_mut(id) {
                    nm.base.entered = false;
                    nm.base.focused = true;
                    nm.base.dirty = true;
                }
                Reply::Esc
            }
            Key::Left | Key::Right => Reply::None,
        }
    }

    /// Paging: Down turns a page forward, Up back while scrolled; each
    /// turn shifts the text child by a whole number of glyph rows
    fn pager_key(&mut self, id: WidgetId, key: Key, cell: i32) -> Reply {
        match key {
            Key::Escape => Reply::Esc,
            Key::Select => Reply::Enter,
            Key::Down | Key::Up => {
                let Some(n) = self.get(id) else {
                    return Reply::None;
                };
                let Kind::Pager(pager) = &n.kind else {
                    return Reply::None;
                };
                let Some(text) = pager.text_child else {
                    return Reply::None;
                };
                let view_h = pager.layout.viewport.size.h as i32;
                if cell <= 0 {
                    return Reply::None;
                }
                let page = (view_h / cell) * cell;
                if page <= 0 {
                    return Reply::None;
                }
                let Some(pos) = self.get(text).map(|t| t.base.rect.pos()) else {
                    return Reply::None;
                };
                if key == Key::Down {
                    self.set_position(text, Point::new(pos.x, pos.y - page));
                } else if pos.y < 0 {
                    self.set_position(text, Point::new(pos.x, pos.y + page));
                }
                Reply::None
            }
            Key::Left | Key::Right => Reply::None,
        }
    }

    // --- Text layout ------------------------------------------------------

    /// Recompute a text node's line cache if stale
    ///
    /// `avail_w` is the containing viewport's width (the wrap limit);
    /// `cell` the glyph cell size.
    pub(crate) fn ensure_text_layout(&mut self, id: WidgetId, avail_w: u32, cell: i32) {
        if let Some(n) = self.get_mut(id) {
            let origin_x = n.base.rect.x;
            if let Kind::Text(text) = &mut n.kind {
                text.ensure_layout(origin_x, avail_w as i32, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Viewport;

    const WHITE: Rgb565 = Rgb565::WHITE;

    fn tree() -> Tree {
        Tree::new(Size::new(240, 240))
    }

    #[test]
    fn test_attach_sets_parent_and_order() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 240, 240), WHITE, true, false));
        let a = t.attach(Some(root), Node::button(Rect::new(0, 0, 60, 20), WHITE, "a"));
        let b = t.attach(Some(root), Node::button(Rect::new(0, 20, 60, 20), WHITE, "b"));
        let layout = t.get(root).unwrap().kind.layout().unwrap();
        assert_eq!(layout.children(), &[a, b]);
        assert_eq!(t.get(a).unwrap().base().parent(), Some(root));
    }

    #[test]
    fn test_root_viewport_clips_against_screen() {
        let mut t = tree();
        let root = t.attach(None, Node::panel(Rect::new(200, 0, 100, 50), WHITE));
        let layout = t.get(root).unwrap().kind.layout().unwrap();
        assert_eq!(layout.viewport().size, Size::new(40, 50));
    }

    #[test]
    fn test_bordered_frame_viewport_insets() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, true));
        let layout = t.get(root).unwrap().kind.layout().unwrap();
        assert_eq!(layout.viewport(), Viewport::new(Point::new(2, 2), Size::new(96, 96)));
        assert_eq!(layout.abs, Point::new(2, 2));
    }

    #[test]
    fn test_nested_viewport_containment() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(10, 10, 100, 100), WHITE, true, true));
        // Child pokes past the root frame's content area
        let inner = t.attach(Some(root), Node::panel(Rect::new(90, 0, 20, 20), WHITE));
        let layout = t.get(inner).unwrap().kind.layout().unwrap();
        // Content area is 96 wide; only 6 columns remain at x=90
        assert_eq!(layout.viewport().size, Size::new(6, 20));
        assert_eq!(layout.abs, Point::new(102, 12));
    }

    #[test]
    fn test_out_of_bounds_child_goes_invalid_silently() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, false));
        let gone = t.attach(Some(root), Node::panel(Rect::new(150, 0, 20, 20), WHITE));
        assert!(!t.get(gone).unwrap().kind.layout().unwrap().viewport().is_valid());
    }

    #[test]
    fn test_zero_size_parent_short_circuits_descendants() {
        let mut t = tree();
        let root = t.attach(None, Node::panel(Rect::new(0, 0, 100, 100), WHITE));
        let mid = t.attach(Some(root), Node::panel(Rect::new(0, 0, 50, 50), WHITE));
        let leafc = t.attach(Some(mid), Node::panel(Rect::new(0, 0, 10, 10), WHITE));
        assert!(t.get(leafc).unwrap().kind.layout().unwrap().viewport().is_valid());
        t.set_size(mid, Size::ZERO);
        assert!(!t.get(leafc).unwrap().kind.layout().unwrap().viewport().is_valid());
    }

    #[test]
    fn test_transform_dirties_and_drops_parent_cleared() {
        let mut t = tree();
        let root = t.attach(None, Node::panel(Rect::new(0, 0, 100, 100), WHITE));
        let child = t.attach(Some(root), Node::button(Rect::new(0, 0, 40, 20), WHITE, "x"));
        // Settle flags as a render pass would
        t.get_mut(root).unwrap().kind.layout_mut().unwrap().cleared = true;
        t.get_mut(child).unwrap().base.dirty = false;

        t.set_position(child, Point::new(10, 10));
        assert!(t.get(child).unwrap().base().is_dirty());
        assert!(!t.get(root).unwrap().kind.layout().unwrap().is_cleared());
    }

    #[test]
    fn test_viewport_rebuild_reaches_descendants() {
        let mut t = tree();
        let root = t.attach(None, Node::panel(Rect::new(0, 0, 100, 100), WHITE));
        let mid = t.attach(Some(root), Node::panel(Rect::new(0, 0, 80, 80), WHITE));
        let deep = t.attach(Some(mid), Node::panel(Rect::new(0, 0, 60, 60), WHITE));
        t.get_mut(deep).unwrap().base.dirty = false;

        t.set_size(root, Size::new(30, 30));
        assert!(t.get(deep).unwrap().base().is_dirty());
        let vp = t.get(deep).unwrap().kind.layout().unwrap().viewport();
        assert_eq!(vp.size, Size::new(30, 30));
    }

    #[test]
    fn test_clear_region_dirties_subtree() {
        let mut t = tree();
        let root = t.attach(None, Node::panel(Rect::new(0, 0, 100, 100), WHITE));
        let mid = t.attach(Some(root), Node::panel(Rect::new(0, 0, 80, 80), WHITE));
        let leafc = t.attach(Some(mid), Node::button(Rect::new(0, 0, 20, 20), WHITE, "x"));
        for id in [mid, leafc] {
            t.get_mut(id).unwrap().base.dirty = false;
        }
        t.clear_region(root);
        assert!(t.get(mid).unwrap().base().is_dirty());
        assert!(t.get(leafc).unwrap().base().is_dirty());
    }

    #[test]
    fn test_first_focusable_child_takes_cursor_when_entered() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, false));
        t.mark_entered(root, true);
        let a = t.attach(Some(root), Node::button(Rect::new(0, 0, 40, 20), WHITE, "a"));
        let b = t.attach(Some(root), Node::button(Rect::new(0, 20, 40, 20), WHITE, "b"));
        assert!(t.get(a).unwrap().base().is_focused());
        assert!(!t.get(b).unwrap().base().is_focused());
    }

    #[test]
    fn test_text_nodes_do_not_join_focus_ring() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, false));
        t.attach(Some(root), Node::text(Point::ZERO, WHITE, "title"));
        let b = t.attach(Some(root), Node::button(Rect::new(0, 20, 40, 20), WHITE, "b"));
        let ring = t.get(root).unwrap().kind.ring().unwrap();
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.current(), Some(b));
    }

    #[test]
    fn test_remove_only_focusable_leaves_ring_empty() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, false));
        t.mark_entered(root, true);
        let a = t.attach(Some(root), Node::button(Rect::new(0, 0, 40, 20), WHITE, "a"));
        t.remove(a);
        assert!(t.get(a).is_none());
        let ring = t.get(root).unwrap().kind.ring().unwrap();
        assert!(ring.is_empty());
        // Navigation on the empty ring is a no-op
        assert_eq!(t.key_input(root, Key::Down, 16), Reply::None);
        assert_eq!(t.key_input(root, Key::Up, 16), Reply::None);
    }

    #[test]
    fn test_remove_focused_moves_cursor() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, false));
        t.mark_entered(root, true);
        let a = t.attach(Some(root), Node::button(Rect::new(0, 0, 40, 20), WHITE, "a"));
        let b = t.attach(Some(root), Node::button(Rect::new(0, 20, 40, 20), WHITE, "b"));
        t.remove(a);
        assert!(t.get(b).unwrap().base().is_focused());
    }

    #[test]
    fn test_enter_then_cancel_is_identity_on_focus() {
        let mut t = tree();
        let outer = t.attach(None, Node::frame(Rect::new(0, 0, 200, 200), WHITE, true, false));
        t.mark_entered(outer, true);
        let inner = t.attach(
            Some(outer),
            Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, true),
        );
        t.attach(Some(inner), Node::button(Rect::new(0, 0, 40, 20), WHITE, "x"));
        assert!(t.get(inner).unwrap().base().is_focused());

        // Enter the inner frame, then cancel out of it
        assert_eq!(t.key_input(inner, Key::Select, 16), Reply::Enter);
        assert!(t.get(inner).unwrap().base().is_entered());
        assert!(!t.get(inner).unwrap().base().is_focused());
        assert_eq!(t.key_input(inner, Key::Escape, 16), Reply::Esc);
        assert!(!t.get(inner).unwrap().base().is_entered());
        assert!(t.get(inner).unwrap().base().is_focused());
    }

    #[test]
    fn test_frame_forwards_select_to_descend() {
        let mut t = tree();
        let outer = t.attach(None, Node::frame(Rect::new(0, 0, 200, 200), WHITE, true, false));
        t.mark_entered(outer, true);
        let inner = t.attach(
            Some(outer),
            Node::frame(Rect::new(0, 0, 100, 100), WHITE, true, false),
        );
        t.attach(Some(inner), Node::button(Rect::new(0, 0, 40, 20), WHITE, "x"));
        // Outer forwards Select to the idle inner frame, which answers
        // Enter; outer converts that into a descend request
        assert_eq!(t.key_input(outer, Key::Select, 16), Reply::Descend(inner));
    }

    #[test]
    fn test_button_activation_bubbles_through_frame() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 200, 200), WHITE, true, false));
        t.mark_entered(root, true);
        let button = t.attach(Some(root), Node::button(Rect::new(0, 0, 40, 20), WHITE, "go"));
        assert_eq!(t.key_input(root, Key::Select, 16), Reply::Activated(button));
    }

    #[test]
    fn test_radio_group_is_exclusive() {
        let mut t = tree();
        let root = t.attach(None, Node::frame(Rect::new(0, 0, 200, 200), WHITE, true, false));
        let r1 = t.attach(
            Some(root),
            Node::radio(Rect::new(0, 0, 60, 16), WHITE, 12, Some(1), "a").unwrap(),
        );
        let r2 = t.attach(
            Some(root),
            Node::radio(Rect::new(0, 16, 60, 16), WHITE, 12, Some(1), "b").unwrap(),
        );
        assert_eq!(t.key_input(r1, Key::Select, 16), Reply::Changed(r1));
        assert_eq!(t.key_input(r2, Key::Select, 16), Reply::Changed(r2));
        let checked = |t: &Tree, id| match &t.get(id).unwrap().kind {
            Kind::Radio(r) => r.is_checked(),
            _ => unreachable!(),
        };
        assert!(!checked(&t, r1));
        assert!(checked(&t, r2));
        // A grouped radio cannot uncheck itself
        assert_eq!(t.key_input(r2, Key::Select, 16), Reply::None);
        assert!(checked(&t, r2));
    }

    #[test]
    fn test_slider_enters_and_adjusts() {
        let mut t = tree();
        let s = t.attach(
            None,
            Node::slider(Rect::new(0, 0, 60, 12), WHITE, 0, 5, Orientation::Horizontal, false)
                .unwrap(),
        );
        assert_eq!(t.key_input(s, Key::Select, 16), Reply::Enter);
        assert_eq!(t.key_input(s, Key::Right, 16), Reply::Changed(s));
        assert_eq!(t.key_input(s, Key::Up, 16), Reply::Changed(s));
        assert_eq!(t.key_input(s, Key::Left, 16), Reply::Changed(s));
        assert_eq!(t.key_input(s, Key::Down, 16), Reply::Changed(s));
        // Saturated at the bottom: no change reported
        assert_eq!(t.key_input(s, Key::Down, 16), Reply::None);
        assert_eq!(t.key_input(s, Key::Select, 16), Reply::Esc);
    }

    #[test]
    fn test_list_stacks_children() {
        let mut t = tree();
        let list = t.attach(None, Node::list(Rect::new(0, 0, 100, 60), WHITE));
        let a = t.attach(Some(list), Node::button(Rect::new(0, 0, 0, 20), WHITE, "a"));
        let b = t.attach(Some(list), Node::button(Rect::new(0, 0, 0, 20), WHITE, "b"));
        assert_eq!(t.get(a).unwrap().base().rect(), Rect::new(0, 0, 96, 20));
        assert_eq!(t.get(b).unwrap().base().rect(), Rect::new(0, 20, 96, 20));
    }

    #[test]
    fn test_list_scrolls_focus_into_view() {
        let mut t = tree();
        // Content viewport is 60 - 4 = 56 rows tall; four 20-row entries
        let list = t.attach(None, Node::list(Rect::new(0, 0, 100, 60), WHITE));
        t.mark_entered(list, true);
        for label in ["a", "b", "c", "d"] {
            t.attach(Some(list), Node::button(Rect::new(0, 0, 0, 20), WHITE, label));
        }
        // Step focus to the third entry: its bottom (60) exceeds the
        // 56-row viewport, so the list scrolls up by 4
        t.key_input(list, Key::Down, 16);
        t.key_input(list, Key::Down, 16);
        let scrolled = match &t.get(list).unwrap().kind {
            Kind::List(l) => l.scroll(),
            _ => unreachable!(),
        };
        assert_eq!(scrolled, -4);
        // Scrolling back up restores the origin
        t.key_input(list, Key::Up, 16);
        t.key_input(list, Key::Up, 16);
        let scrolled = match &t.get(list).unwrap().kind {
            Kind::List(l) => l.scroll(),
            _ => unreachable!(),
        };
        assert_eq!(scrolled, 0);
    }

    #[test]
    fn test_pager_creates_text_child_and_pages() {
        let mut t = tree();
        let pager = t.attach(None, Node::pager(Rect::new(0, 0, 100, 50), WHITE, "hello"));
        let text = match &t.get(pager).unwrap().kind {
            Kind::Pager(p) => p.text_child().unwrap(),
            _ => unreachable!(),
        };
        assert_eq!(t.get(text).unwrap().base().parent(), Some(pager));

        // Page height quantizes to whole 16-pixel rows: 48
        t.key_input(pager, Key::Down, 16);
        assert_eq!(t.get(text).unwrap().base().rect().y, -48);
        t.key_input(pager, Key::Up, 16);
        assert_eq!(t.get(text).unwrap().base().rect().y, 0);
        // Up at the top is a no-op
        t.key_input(pager, Key::Up, 16);
        assert_eq!(t.get(text).unwrap().base().rect().y, 0);
    }

    #[test]
    fn test_set_text_on_pager_resets_scroll() {
        let mut t = tree();
        let pager = t.attach(None, Node::pager(Rect::new(0, 0, 100, 50), WHITE, "one"));
        let text = match &t.get(pager).unwrap().kind {
            Kind::Pager(p) => p.text_child().unwrap(),
            _ => unreachable!(),
        };
        t.key_input(pager, Key::Down, 16);
        t.set_text(pager, "two");
        assert_eq!(t.get(text).unwrap().base().rect().y, 0);
        match &t.get(text).unwrap().kind {
            Kind::Text(x) => assert_eq!(x.content(), "two"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let mut t = tree();
        let a = t.attach(None, Node::panel(Rect::new(0, 0, 10, 10), WHITE));
        t.remove(a);
        let b = t.attach(None, Node::panel(Rect::new(0, 0, 10, 10), WHITE));
        assert_eq!(a, b);
        assert!(t.get(b).is_some());
    }
}
