/*
 *  display/traits.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::display::error::DisplayError;

/// Color depth of the packed framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 1 bit per pixel, 8 pixels stacked per page byte
    Monochrome,

    /// 2 bits per pixel (white, light gray, dark gray, black), 4 pixels per byte
    Gray2,
}

impl ColorDepth {
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            ColorDepth::Monochrome => 1,
            ColorDepth::Gray2 => 2,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(ColorDepth::Monochrome),
            2 => Some(ColorDepth::Gray2),
            _ => None,
        }
    }
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Color depth of the controller RAM
    pub color_depth: ColorDepth,

    /// Maximum recommended frame rate over the serial link
    pub max_fps: u32,
}

impl DisplayCapabilities {
    /// Number of bytes in one full frame (pages x columns)
    pub fn frame_len(&self) -> usize {
        let per_byte = 8 / self.color_depth.bits_per_pixel() as u32;
        (self.height.div_ceil(per_byte) * self.width) as usize
    }
}

/// Transport to the physical panel.
///
/// The framebuffer lives with the caller; a driver only knows how to power the
/// controller up and how to push a complete packed frame to it.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Run the controller power-up and configuration sequence
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Transfer a complete packed frame (pages x columns) to display RAM
    fn flush(&mut self, frame: &[u8]) -> Result<(), DisplayError>;

    /// Blank the panel RAM without touching any software framebuffer
    fn clear_hardware(&mut self) -> Result<(), DisplayError>;
}
