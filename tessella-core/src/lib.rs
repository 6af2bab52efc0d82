//! Board-agnostic widget engine for the Tessella toolkit
//!
//! A retained tree of widgets (buttons, checkboxes, sliders, text,
//! containers) renders into one shared pixel buffer. Each container owns
//! a clipped, offset viewport into that buffer; structural events keep
//! cached geometry and redraw flags consistent; a per-container focus
//! ring plus a GUI-wide entered-control stack route six-key input through
//! nested modal surfaces.
//!
//! This crate contains no hardware access. The display transport and
//! glyph rasterizer are consumed through the `tessella-display` traits;
//! key debouncing and the process entry point live with the caller, which
//! is expected to run one cooperative loop of scan-input /
//! [`key_response`](gui::Gui::key_response) /
//! [`render_frame`](gui::Gui::render_frame).

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod error;
pub mod geometry;
pub mod gui;
pub mod input;
pub mod style;
pub mod tree;
pub mod widget;

pub use error::Error;
pub use geometry::{Point, Rect, Size, Viewport};
pub use gui::{Gui, UiEvent};
pub use input::Key;
pub use style::Style;
pub use tree::{Node, Tree, WidgetId};

// The color type appears in every widget constructor
pub use tessella_display::Rgb565;
