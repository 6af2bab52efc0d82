//! Display-side contracts for the Tessella widget toolkit
//!
//! This crate holds everything the widget engine consumes but does not
//! implement itself:
//!
//! - The display transport trait (shared pixel buffer + flush)
//! - The glyph source trait (fixed-cell bitmap fonts)
//! - Frame buffer views: a whole-frame view rebuilt each render pass and
//!   clipped sub-views scoped to one container viewport
//! - Packed RGB565 color
//!
//! Physical panel drivers and font file parsers implement these traits
//! elsewhere; the engine never addresses hardware directly.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod backend;
pub mod color;
pub mod frame;
pub mod glyph;
#[cfg(feature = "std")]
pub mod sim;

pub use backend::{DisplayBackend, DisplayError};
pub use color::Rgb565;
pub use frame::{Canvas, FrameView};
pub use glyph::{is_half_width, GlyphError, GlyphSource, MAX_CELL};
