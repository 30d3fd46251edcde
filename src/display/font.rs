/*
 *  display/font.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-size glyph tables
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

use embedded_graphics::image::GetPixel;
use embedded_graphics::mono_font::{ascii, mapping::GlyphMapping, MonoFont};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use serde::{Deserialize, Serialize};

/// First and last printable ASCII codes carried by every table
pub const ASCII_MIN: u8 = b' ';
pub const ASCII_MAX: u8 = b'~';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontName {
    Font5x7,
    Font5x8,
    Font6x10,
    Font7x13,
    Font8x13,
    Font9x18,
    #[default]
    Font10x20,
}

impl FontName {
    pub const ALL: [FontName; 7] = [
        FontName::Font5x7,
        FontName::Font5x8,
        FontName::Font6x10,
        FontName::Font7x13,
        FontName::Font8x13,
        FontName::Font9x18,
        FontName::Font10x20,
    ];

    fn source(self) -> &'static MonoFont<'static> {
        match self {
            FontName::Font5x7 => &ascii::FONT_5X7,
            FontName::Font5x8 => &ascii::FONT_5X8,
            FontName::Font6x10 => &ascii::FONT_6X10,
            FontName::Font7x13 => &ascii::FONT_7X13,
            FontName::Font8x13 => &ascii::FONT_8X13,
            FontName::Font9x18 => &ascii::FONT_9X18,
            FontName::Font10x20 => &ascii::FONT_10X20,
        }
    }
}

/// A glyph table in block layout.
///
/// Each glyph is `height` rows of `bytes_per_row` bytes, leftmost pixel in
/// the most significant bit; glyph `n` starts at `n * bytes_per_row * height`.
#[derive(Debug, Clone)]
pub struct Font {
    name: FontName,
    width: u32,
    height: u32,
    cmin: u8,
    cmax: u8,
    data: Vec<u8>,
}

impl Font {
    /// Build the table by sampling an embedded-graphics atlas
    pub fn load(name: FontName) -> Self {
        let source = name.source();
        let Size { width, height } = source.character_size;
        let bytes_per_row = width.div_ceil(8) as usize;
        let glyph_len = bytes_per_row * height as usize;
        let per_atlas_row = (source.image.size().width / width).max(1) as usize;

        let count = (ASCII_MAX - ASCII_MIN) as usize + 1;
        let mut data = vec![0u8; count * glyph_len];

        for (n, glyph) in data.chunks_exact_mut(glyph_len).enumerate() {
            let c = char::from(ASCII_MIN + n as u8);
            let index = source.glyph_mapping.index(c);
            let ox = ((index % per_atlas_row) as u32 * width) as i32;
            let oy = ((index / per_atlas_row) as u32 * height) as i32;

            for row in 0..height as usize {
                for col in 0..width as usize {
                    let p = Point::new(ox + col as i32, oy + row as i32);
                    if source.image.pixel(p) == Some(BinaryColor::On) {
                        glyph[row * bytes_per_row + col / 8] |= 0x80 >> (col % 8);
                    }
                }
            }
        }

        Self {
            name,
            width,
            height,
            cmin: ASCII_MIN,
            cmax: ASCII_MAX,
            data,
        }
    }

    pub fn name(&self) -> FontName { self.name }
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn cmin(&self) -> u8 { self.cmin }
    pub fn cmax(&self) -> u8 { self.cmax }

    pub fn bytes_per_row(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    pub fn glyph_len(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    /// Codes outside the table fall back to the first glyph
    pub fn glyph_index(&self, code: u8) -> usize {
        if (self.cmin..=self.cmax).contains(&code) {
            (code - self.cmin) as usize
        } else {
            0
        }
    }

    pub fn glyph(&self, code: u8) -> &[u8] {
        let start = self.glyph_index(code) * self.glyph_len();
        &self.data[start..start + self.glyph_len()]
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::load(FontName::default())
    }
}
