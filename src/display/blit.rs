/*
 *  display/blit.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clipped block copies: glyphs, bitmaps and packed movie frames
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

use serde::{Deserialize, Serialize};

use crate::display::color::GrayLevel;
use crate::display::error::DisplayError;
use crate::display::framebuffer::PointTarget;

/// Bytes needed for one row of a 1-bit bitmap
#[inline]
pub fn bitmap_stride(width: u32) -> usize {
    width.div_ceil(8) as usize
}

/// Copy a 1-bit bitmap into the target.
///
/// The bitmap is row-major, `ceil(width / 8)` bytes per row, leftmost pixel
/// in the most significant bit. Set bits are written as `fg`, clear bits as
/// `bg`. Destination columns outside `[vis0, vis1]` are left untouched.
#[allow(clippy::too_many_arguments)]
pub fn copy_block<T: PointTarget + ?Sized>(
    target: &mut T,
    bitmap: &[u8],
    x0: i32,
    y0: i32,
    vis0: i32,
    vis1: i32,
    width: u32,
    height: u32,
    bg: GrayLevel,
    fg: GrayLevel,
) -> Result<(), DisplayError> {
    if vis0 > vis1 {
        return Err(DisplayError::InvalidWindow { start: vis0, end: vis1 });
    }

    let stride = bitmap_stride(width);
    let expected = stride * height as usize;
    if bitmap.is_empty() || bitmap.len() < expected {
        return Err(DisplayError::BufferSizeMismatch { expected, actual: bitmap.len() });
    }

    for row in 0..height as usize {
        let y = y0 + row as i32;
        let line = &bitmap[row * stride..(row + 1) * stride];

        for col in 0..width as usize {
            let x = x0 + col as i32;
            if x < vis0 || x > vis1 {
                continue;
            }

            let set = line[col / 8] & (0x80 >> (col % 8)) != 0;
            target.set_point(x, y, if set { fg } else { bg }.raw());
        }
    }

    Ok(())
}

/// Byte order of a packed frame record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanLayout {
    /// `ceil(height / ppb)` pages of `width` bytes, pixels stacked vertically
    #[default]
    Page,

    /// `height` rows of `ceil(width / ppb)` bytes, pixels side by side
    Row,
}

impl ScanLayout {
    /// Record size for a frame of the given geometry
    pub fn frame_len(self, width: u32, height: u32, bits_per_pixel: u32) -> usize {
        let ppb = 8 / bits_per_pixel.clamp(1, 8);
        let len = match self {
            ScanLayout::Page => height.div_ceil(ppb) as u64 * width as u64,
            ScanLayout::Row => width.div_ceil(ppb) as u64 * height as u64,
        };
        usize::try_from(len).unwrap_or(usize::MAX)
    }
}

/// A borrowed frame record together with its geometry
#[derive(Debug, Clone, Copy)]
pub struct PackedFrame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    pub layout: ScanLayout,
}

impl PackedFrame<'_> {
    pub fn expected_len(&self) -> usize {
        self.layout.frame_len(self.width, self.height, self.bits_per_pixel)
    }

    /// Raw sample at frame coordinates
    fn sample(&self, x: u32, y: u32) -> u8 {
        let bpp = self.bits_per_pixel;
        let ppb = 8 / bpp;
        let mask = ((1u16 << bpp) - 1) as u8;

        let (index, slot) = match self.layout {
            ScanLayout::Page => ((y / ppb) as usize * self.width as usize + x as usize, y % ppb),
            ScanLayout::Row => {
                (y as usize * self.width.div_ceil(ppb) as usize + (x / ppb) as usize, x % ppb)
            }
        };
        let shift = (ppb - 1 - slot) * bpp;
        (self.data[index] >> shift) & mask
    }
}

/// Unpack a frame record into the target at (x0, y0).
///
/// Samples are rescaled onto the four panel levels; `invert` flips every
/// level, which is how a white-on-black movie is shown.
pub fn copy_packed_frame<T: PointTarget + ?Sized>(
    target: &mut T,
    frame: &PackedFrame<'_>,
    x0: i32,
    y0: i32,
    invert: bool,
) -> Result<(), DisplayError> {
    if !matches!(frame.bits_per_pixel, 1 | 2 | 4 | 8) {
        return Err(DisplayError::InvalidConfiguration(format!(
            "unsupported frame depth: {} bits per pixel",
            frame.bits_per_pixel
        )));
    }

    let expected = frame.expected_len();
    if frame.data.len() < expected {
        return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.data.len() });
    }

    // a 1-bit row frame is exactly a bitmap
    if frame.bits_per_pixel == 1 && frame.layout == ScanLayout::Row {
        let (bg, fg) = if invert {
            (GrayLevel::Black, GrayLevel::White)
        } else {
            (GrayLevel::White, GrayLevel::Black)
        };
        let vis1 = x0 + frame.width as i32 - 1;
        return copy_block(target, frame.data, x0, y0, x0, vis1.max(x0), frame.width, frame.height, bg, fg);
    }

    for y in 0..frame.height {
        for x in 0..frame.width {
            let level = GrayLevel::from_sample(frame.sample(x, y), frame.bits_per_pixel as u8);
            let level = if invert { level.inverted() } else { level };
            target.set_point(x0 + x as i32, y0 + y as i32, level.raw());
        }
    }

    Ok(())
}
