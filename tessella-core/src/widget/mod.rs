//! Widget node types
//!
//! One tagged variant covers the whole capability set: plain containers,
//! focus-capable frames, interactive controls, and text nodes. Capability
//! accessors (`layout`, `ring`, `is_focusable`) stand in for downcasting;
//! the tree walks and the render pass dispatch through [`Kind`].

pub mod button;
pub mod frame;
pub mod list;
pub mod pager;
pub mod slider;
pub mod text;
pub mod toggle;

pub use button::Button;
pub use frame::{FocusRing, Frame, Layout, BORDER_WIDTH};
pub use list::ListView;
pub use pager::Pager;
pub use slider::{Orientation, Slider};
pub use text::{layout_lines, Text};
pub use toggle::{Checkbox, Radio};

use tessella_display::{Canvas, GlyphSource, Rgb565};

use crate::geometry::{Rect, Size, Viewport};
use crate::style::Style;
use crate::tree::WidgetId;

/// State every widget carries
#[derive(Debug)]
pub struct WidgetBase {
    /// Position relative to the parent's viewport origin, plus size
    pub(crate) rect: Rect,
    /// Primary color: text for buttons, marker for selectors, border for
    /// frames
    pub(crate) color: Rgb565,
    /// Must redraw on the next render pass
    pub(crate) dirty: bool,
    /// The navigation cursor rests on this control
    pub(crate) focused: bool,
    /// Input is routed into this control
    pub(crate) entered: bool,
    /// Non-owning back-reference; ownership flows parent to child
    pub(crate) parent: Option<WidgetId>,
}

impl WidgetBase {
    pub(crate) fn new(rect: Rect, color: Rgb565) -> Self {
        Self {
            rect,
            color,
            dirty: true,
            focused: false,
            entered: false,
            parent: None,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn color(&self) -> Rgb565 {
        self.color
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }
}

/// Kind-specific widget state
#[derive(Debug)]
pub enum Kind {
    /// Plain container, no focus handling
    Panel(Layout),
    /// Focus-capable container with an optional border
    Frame(Frame),
    /// Vertically stacking, scrolling list
    List(ListView),
    /// Full-text paging view
    Pager(Pager),
    Button(Button),
    Checkbox(Checkbox),
    Radio(Radio),
    Slider(Slider),
    Text(Text),
}

impl Kind {
    pub fn is_container(&self) -> bool {
        self.layout().is_some()
    }

    /// Controls that can join a parent's focus list
    pub fn is_focusable(&self) -> bool {
        matches!(
            self,
            Kind::Frame(_)
                | Kind::List(_)
                | Kind::Pager(_)
                | Kind::Button(_)
                | Kind::Checkbox(_)
                | Kind::Radio(_)
                | Kind::Slider(_)
        )
    }

    /// Container state, when this kind is a container
    pub fn layout(&self) -> Option<&Layout> {
        match self {
            Kind::Panel(layout) => Some(layout),
            Kind::Frame(frame) => Some(&frame.layout),
            Kind::List(list) => Some(&list.frame.layout),
            Kind::Pager(pager) => Some(&pager.layout),
            _ => None,
        }
    }

    pub(crate) fn layout_mut(&mut self) -> Option<&mut Layout> {
        match self {
            Kind::Panel(layout) => Some(layout),
            Kind::Frame(frame) => Some(&mut frame.layout),
            Kind::List(list) => Some(&mut list.frame.layout),
            Kind::Pager(pager) => Some(&mut pager.layout),
            _ => None,
        }
    }

    /// Focus ring, when this kind tracks focus
    pub fn ring(&self) -> Option<&FocusRing> {
        match self {
            Kind::Frame(frame) => Some(&frame.ring),
            Kind::List(list) => Some(&list.frame.ring),
            _ => None,
        }
    }

    pub(crate) fn ring_mut(&mut self) -> Option<&mut FocusRing> {
        match self {
            Kind::Frame(frame) => Some(&mut frame.ring),
            Kind::List(list) => Some(&mut list.frame.ring),
            _ => None,
        }
    }

    /// Candidate draw area relative to the widget's own bounds, before
    /// any clipping
    pub(crate) fn calc_draw_area(&self, size: Size) -> Viewport {
        match self {
            Kind::Frame(frame) => frame.calc_draw_area(size),
            Kind::List(list) => list.frame.calc_draw_area(size),
            _ => Viewport::new(crate::geometry::Point::ZERO, size),
        }
    }

    /// Draw this widget into its parent's canvas
    ///
    /// Containers paint only their decoration here; their content is
    /// drawn by the render pass through their own viewport canvas.
    pub(crate) fn draw<F: GlyphSource>(
        &self,
        base: &WidgetBase,
        canvas: &mut Canvas<'_>,
        font: &F,
        style: &Style,
    ) {
        match self {
            Kind::Panel(_) | Kind::Pager(_) => {}
            Kind::Frame(frame) => frame.draw(base, canvas, style),
            Kind::List(list) => list.frame.draw(base, canvas, style),
            Kind::Button(button) => button.draw(base, canvas, font, style),
            Kind::Checkbox(checkbox) => checkbox.draw(base, canvas, font, style),
            Kind::Radio(radio) => radio.draw(base, canvas, font, style),
            Kind::Slider(slider) => slider.draw(base, canvas, font, style),
            Kind::Text(text) => text.draw(base, canvas, font),
        }
    }
}

/// Result of feeding one key to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    /// Key consumed (or ignored) with no navigation effect
    None,
    /// The control captured input; the caller should descend into it
    Enter,
    /// The control released input; the caller should ascend
    Esc,
    /// A frame resolved an Enter from its focused child
    Descend(WidgetId),
    /// A button fired
    Activated(WidgetId),
    /// A value-carrying control changed state
    Changed(WidgetId),
}
