//! Host-side simulator backend
//!
//! Test doubles for the transport and glyph contracts, available with the
//! `std` feature. `SimDisplay` keeps the last flushed frame so tests can
//! assert on what the panel would actually show.

use std::vec;
use std::vec::Vec;

use crate::backend::{DisplayBackend, DisplayError};
use crate::color::Rgb565;
use crate::glyph::{GlyphError, GlyphSource};

/// In-memory display transport
pub struct SimDisplay {
    width: u16,
    height: u16,
    frame: Vec<u8>,
    presented: Vec<u8>,
    flushes: u32,
}

impl SimDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize * 2;
        Self {
            width,
            height,
            frame: vec![0; len],
            presented: vec![0; len],
            flushes: 0,
        }
    }

    /// The last flushed frame
    pub fn presented(&self) -> &[u8] {
        &self.presented
    }

    /// Number of completed flushes
    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    /// Read one pixel from the last flushed frame
    pub fn pixel(&self, x: u16, y: u16) -> Rgb565 {
        let idx = (y as usize * self.width as usize + x as usize) * 2;
        Rgb565(u16::from_le_bytes([
            self.presented[idx],
            self.presented[idx + 1],
        ]))
    }

    /// Read one pixel from the live (unflushed) frame
    pub fn frame_pixel(&self, x: u16, y: u16) -> Rgb565 {
        let idx = (y as usize * self.width as usize + x as usize) * 2;
        Rgb565(u16::from_le_bytes([self.frame[idx], self.frame[idx + 1]]))
    }
}

impl DisplayBackend for SimDisplay {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn frame(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.presented.copy_from_slice(&self.frame);
        self.flushes += 1;
        Ok(())
    }
}

/// Deterministic test font: every glyph is a filled cell, space is empty
pub struct BlockFont {
    cell: u16,
}

impl BlockFont {
    pub fn new(cell: u16) -> Self {
        Self { cell }
    }
}

impl GlyphSource for BlockFont {
    fn cell_size(&self) -> u16 {
        self.cell
    }

    fn rasterize(&self, ch: char, out: &mut [u8]) -> Result<(), GlyphError> {
        let fill = if ch == ' ' { 0x00 } else { 0xFF };
        for b in out.iter_mut() {
            *b = fill;
        }
        Ok(())
    }
}
