/*
 *  display/framebuffer.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Packed page framebuffer with mirroring and a drawing cursor
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Gray2;
use embedded_graphics::prelude::*;

use crate::display::color::GrayLevel;
use crate::display::traits::{ColorDepth, DisplayCapabilities};

/// Mirroring applied to every coordinate before it reaches the pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    MirrorX,
    MirrorY,
    MirrorXY,
}

impl Orientation {
    pub fn mirror_x(self) -> bool {
        matches!(self, Orientation::MirrorX | Orientation::MirrorXY)
    }

    pub fn mirror_y(self) -> bool {
        matches!(self, Orientation::MirrorY | Orientation::MirrorXY)
    }
}

impl TryFrom<u8> for Orientation {
    type Error = u8;

    /// 0 none, 1 mirror x, 2 mirror y, 3 both
    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(Orientation::Normal),
            1 => Ok(Orientation::MirrorX),
            2 => Ok(Orientation::MirrorY),
            3 => Ok(Orientation::MirrorXY),
            other => Err(other),
        }
    }
}

/// Anything a rasterizer can plot into.
///
/// `cursor` is the last point handed to `set_point`, in caller coordinates
/// (before mirroring), and is what `line_to` starts from.
pub trait PointTarget {
    fn set_point(&mut self, x: i32, y: i32, level: u8);

    fn cursor(&self) -> (i32, i32);
}

/// Software copy of the controller RAM.
///
/// Pages are rows of bytes; each byte stacks `8 / bits_per_pixel` pixels
/// vertically, the topmost pixel in the most significant field.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pages: Vec<u8>,
    width: u32,
    height: u32,
    bits_per_pixel: u8,
    orientation: Orientation,
    cursor: (i32, i32),
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, depth: ColorDepth) -> Self {
        let bits_per_pixel = depth.bits_per_pixel();
        let per_byte = 8 / bits_per_pixel as u32;
        let page_count = height.div_ceil(per_byte);
        Self {
            pages: vec![0; (page_count * width) as usize],
            width,
            height,
            bits_per_pixel,
            orientation: Orientation::Normal,
            cursor: (0, 0),
        }
    }

    pub fn for_capabilities(caps: &DisplayCapabilities) -> Self {
        Self::new(caps.width, caps.height, caps.color_depth)
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn bits_per_pixel(&self) -> u8 { self.bits_per_pixel }

    /// Pixels packed into one byte
    pub fn pixels_per_byte(&self) -> u32 {
        8 / self.bits_per_pixel as u32
    }

    pub fn page_count(&self) -> u32 {
        self.height.div_ceil(self.pixels_per_byte())
    }

    /// Mask covering one pixel field
    pub fn level_mask(&self) -> u8 {
        ((1u16 << self.bits_per_pixel) - 1) as u8
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Affects later reads and writes only; stored pixels are not moved
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Packed pages in transfer order, ready for a driver flush
    pub fn as_bytes(&self) -> &[u8] {
        &self.pages
    }

    /// Map caller coordinates to a (byte index, bit shift) pair
    #[inline]
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u32)> {
        let x = if self.orientation.mirror_x() { self.width as i32 - x - 1 } else { x };
        let y = if self.orientation.mirror_y() { self.height as i32 - y - 1 } else { y };

        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }

        let per_byte = self.pixels_per_byte();
        let (x, y) = (x as u32, y as u32);
        let index = ((y / per_byte) * self.width + x) as usize;
        let shift = (per_byte - 1 - (y % per_byte)) * self.bits_per_pixel as u32;
        Some((index, shift))
    }

    /// Read back a pixel level; `None` when the point is off screen
    pub fn get_point(&self, x: i32, y: i32) -> Option<u8> {
        let (index, shift) = self.locate(x, y)?;
        Some((self.pages[index] >> shift) & self.level_mask())
    }

    /// Flip a pixel to the opposite end of the gray ramp
    pub fn reverse_point(&mut self, x: i32, y: i32) -> Option<u8> {
        let current = self.get_point(x, y)?;
        let reversed = self.level_mask() - current;
        self.cursor = (x, y);
        self.store(x, y, reversed);
        Some(reversed)
    }

    /// Four-level ramp value to a field value at this depth; on a
    /// 1-bit store anything darker than mid-gray inks
    #[inline]
    fn to_field(&self, level: u8) -> u8 {
        (level & GrayLevel::MAX) >> 2u8.saturating_sub(self.bits_per_pixel)
    }

    fn store(&mut self, x: i32, y: i32, field: u8) {
        let Some((index, shift)) = self.locate(x, y) else {
            return;
        };

        let mask = self.level_mask();
        let byte = self.pages[index] & !(mask << shift);
        self.pages[index] = byte | ((field & mask) << shift);
    }

    /// Byte fill of every page.
    ///
    /// Any non-zero level fills with 0xFF, so only white and the deepest
    /// level come out as uniform pixel fills.
    pub fn clear(&mut self, level: u8) {
        self.pages.fill(if level != 0 { 0xFF } else { 0x00 });
    }
}

impl PointTarget for FrameBuffer {
    fn set_point(&mut self, x: i32, y: i32, level: u8) {
        self.cursor = (x, y);
        self.store(x, y, self.to_field(level));
    }

    fn cursor(&self) -> (i32, i32) {
        self.cursor
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Gray2;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            self.set_point(p.x, p.y, GrayLevel::from(c).raw());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    fn gray_fb() -> FrameBuffer {
        FrameBuffer::new(192, 96, ColorDepth::Gray2)
    }

    #[test]
    fn test_geometry() {
        let fb = gray_fb();
        assert_eq!(fb.pixels_per_byte(), 4);
        assert_eq!(fb.page_count(), 24);
        assert_eq!(fb.as_bytes().len(), 24 * 192);
        assert_eq!(fb.level_mask(), 0x03);

        let mono = FrameBuffer::new(84, 48, ColorDepth::Monochrome);
        assert_eq!(mono.page_count(), 6);
        assert_eq!(mono.level_mask(), 0x01);
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut fb = gray_fb();
        for level in 0..=3u8 {
            fb.set_point(10, 13, level);
            assert_eq!(fb.get_point(10, 13), Some(level));
        }
    }

    #[test]
    fn test_packing_is_msb_first() {
        let mut fb = gray_fb();
        fb.set_point(5, 0, 3);
        assert_eq!(fb.as_bytes()[5], 0b1100_0000);
        fb.set_point(5, 3, 1);
        assert_eq!(fb.as_bytes()[5], 0b1100_0001);
        // second page starts at y = 4
        fb.set_point(0, 4, 2);
        assert_eq!(fb.as_bytes()[192], 0b1000_0000);
    }

    #[test]
    fn test_no_bleed_between_fields() {
        let mut fb = gray_fb();
        for y in 0..4 {
            fb.set_point(7, y, 3);
        }
        fb.set_point(7, 1, 0);
        assert_eq!(fb.get_point(7, 0), Some(3));
        assert_eq!(fb.get_point(7, 1), Some(0));
        assert_eq!(fb.get_point(7, 2), Some(3));
        assert_eq!(fb.get_point(7, 3), Some(3));
    }

    #[test]
    fn test_level_is_masked() {
        let mut fb = gray_fb();
        fb.set_point(0, 1, 0xFE);
        assert_eq!(fb.get_point(0, 1), Some(2));
        assert_eq!(fb.get_point(0, 0), Some(0));
        assert_eq!(fb.get_point(0, 2), Some(0));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut fb = gray_fb();
        let before = fb.as_bytes().to_vec();
        fb.set_point(-1, 0, 3);
        fb.set_point(0, -1, 3);
        fb.set_point(192, 0, 3);
        fb.set_point(0, 96, 3);
        assert_eq!(fb.as_bytes(), &before[..]);
        assert_eq!(fb.get_point(-1, 0), None);
        assert_eq!(fb.get_point(192, 95), None);
        assert_eq!(fb.get_point(0, 96), None);
    }

    #[test]
    fn test_mirroring() {
        let mut plain = gray_fb();
        plain.set_point(3, 9, 2);

        let mut fb = gray_fb();
        fb.set_orientation(Orientation::MirrorX);
        fb.set_point(3, 9, 2);
        fb.set_orientation(Orientation::Normal);
        assert_eq!(fb.get_point(192 - 1 - 3, 9), Some(2));
        assert_eq!(fb.get_point(3, 9), Some(0));

        let mut fb = gray_fb();
        fb.set_orientation(Orientation::MirrorY);
        fb.set_point(3, 9, 2);
        fb.set_orientation(Orientation::Normal);
        assert_eq!(fb.get_point(3, 96 - 1 - 9), Some(2));

        let mut fb = gray_fb();
        fb.set_orientation(Orientation::MirrorXY);
        fb.set_point(3, 9, 2);
        assert_eq!(fb.get_point(3, 9), plain.get_point(3, 9));
        fb.set_orientation(Orientation::Normal);
        assert_eq!(fb.get_point(188, 86), Some(2));
    }

    #[test]
    fn test_orientation_from_mode() {
        assert_eq!(Orientation::try_from(0), Ok(Orientation::Normal));
        assert_eq!(Orientation::try_from(3), Ok(Orientation::MirrorXY));
        assert_eq!(Orientation::try_from(4), Err(4));
    }

    #[test]
    fn test_cursor_tracks_unmirrored_point() {
        let mut fb = gray_fb();
        fb.set_orientation(Orientation::MirrorXY);
        fb.set_point(12, 34, 1);
        assert_eq!(fb.cursor(), (12, 34));
        fb.set_point(-5, 500, 1);
        assert_eq!(fb.cursor(), (-5, 500));
    }

    #[test]
    fn test_clear_is_byte_fill() {
        let mut fb = gray_fb();
        fb.clear(3);
        assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(fb.get_point(100, 50), Some(3));
        fb.clear(0);
        assert!(fb.as_bytes().iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_reverse_point() {
        let mut fb = gray_fb();
        fb.set_point(1, 1, 1);
        assert_eq!(fb.reverse_point(1, 1), Some(2));
        assert_eq!(fb.get_point(1, 1), Some(2));
        assert_eq!(fb.reverse_point(-1, 1), None);
    }

    #[test]
    fn test_mono_store_thresholds_the_ramp() {
        let mut fb = FrameBuffer::new(16, 8, ColorDepth::Monochrome);
        for (x, level) in [GrayLevel::White, GrayLevel::LightGray, GrayLevel::DarkGray, GrayLevel::Black]
            .into_iter()
            .enumerate()
        {
            fb.set_point(x as i32, 0, level.raw());
        }
        assert_eq!(fb.get_point(0, 0), Some(0));
        assert_eq!(fb.get_point(1, 0), Some(0));
        assert_eq!(fb.get_point(2, 0), Some(1));
        assert_eq!(fb.get_point(3, 0), Some(1));

        assert_eq!(fb.reverse_point(3, 0), Some(0));
        assert_eq!(fb.reverse_point(0, 0), Some(1));
        assert_eq!(fb.get_point(0, 0), Some(1));
    }

    #[test]
    fn test_embedded_graphics_draw_target() {
        let mut fb = gray_fb();
        Line::new(Point::new(0, 0), Point::new(9, 0))
            .into_styled(PrimitiveStyle::with_stroke(Gray2::BLACK, 1))
            .draw(&mut fb)
            .unwrap();
        for x in 0..10 {
            assert_eq!(fb.get_point(x, 0), Some(GrayLevel::Black.raw()));
        }
        assert_eq!(fb.get_point(10, 0), Some(GrayLevel::White.raw()));
    }
}
