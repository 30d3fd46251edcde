/*
 *  display/color.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed gray levels of the panel
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

use embedded_graphics::pixelcolor::{Gray2, GrayColor};
use serde::{Deserialize, Serialize};

/// One of the four intensities the controller can show.
///
/// The discriminant is the raw 2-bit value stored in the framebuffer, so
/// `White` is an all-zero page and `Black` an all-ones page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayLevel {
    #[default]
    White = 0,
    LightGray = 1,
    DarkGray = 2,
    Black = 3,
}

impl GrayLevel {
    /// Highest raw level (all bits of a 2-bit field set)
    pub const MAX: u8 = 3;

    /// Build from a raw value, keeping only the low two bits
    pub fn from_raw(raw: u8) -> Self {
        match raw & Self::MAX {
            0 => GrayLevel::White,
            1 => GrayLevel::LightGray,
            2 => GrayLevel::DarkGray,
            _ => GrayLevel::Black,
        }
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    /// The level on the opposite end of the ramp
    pub fn inverted(self) -> Self {
        Self::from_raw(Self::MAX - self.raw())
    }

    /// Contrasting background for single-colour bitmaps
    pub fn background(self) -> Self {
        if self == GrayLevel::White {
            GrayLevel::Black
        } else {
            GrayLevel::White
        }
    }

    /// Rescale a sample of `bits` depth onto the four panel levels
    pub fn from_sample(sample: u8, bits: u8) -> Self {
        match bits {
            0 => GrayLevel::White,
            1 => {
                if sample & 1 != 0 {
                    GrayLevel::Black
                } else {
                    GrayLevel::White
                }
            }
            2 => Self::from_raw(sample),
            b => Self::from_raw(sample >> (b.min(8) - 2)),
        }
    }
}

impl From<GrayLevel> for u8 {
    fn from(level: GrayLevel) -> Self {
        level.raw()
    }
}

// embedded-graphics treats luma 0 as dark; the panel stores 0 as white.
impl From<GrayLevel> for Gray2 {
    fn from(level: GrayLevel) -> Self {
        Gray2::new(GrayLevel::MAX - level.raw())
    }
}

impl From<Gray2> for GrayLevel {
    fn from(color: Gray2) -> Self {
        GrayLevel::from_raw(GrayLevel::MAX - (color.luma() & GrayLevel::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values_match_panel_encoding() {
        assert_eq!(u8::from(GrayLevel::White), 0);
        assert_eq!(u8::from(GrayLevel::LightGray), 1);
        assert_eq!(u8::from(GrayLevel::DarkGray), 2);
        assert_eq!(u8::from(GrayLevel::Black), 3);
    }

    #[test]
    fn test_from_raw_masks_high_bits() {
        assert_eq!(GrayLevel::from_raw(0x07), GrayLevel::Black);
        assert_eq!(GrayLevel::from_raw(0xFC), GrayLevel::White);
    }

    #[test]
    fn test_gray2_conversion_is_inverse() {
        for raw in 0..=GrayLevel::MAX {
            let level = GrayLevel::from_raw(raw);
            assert_eq!(GrayLevel::from(Gray2::from(level)), level);
        }
        assert_eq!(Gray2::from(GrayLevel::White), Gray2::WHITE);
        assert_eq!(Gray2::from(GrayLevel::Black), Gray2::BLACK);
    }

    #[test]
    fn test_sample_rescaling() {
        assert_eq!(GrayLevel::from_sample(1, 1), GrayLevel::Black);
        assert_eq!(GrayLevel::from_sample(0, 1), GrayLevel::White);
        assert_eq!(GrayLevel::from_sample(0x0F, 4), GrayLevel::Black);
        assert_eq!(GrayLevel::from_sample(0x40, 8), GrayLevel::LightGray);
    }

    #[test]
    fn test_background_contrasts() {
        assert_eq!(GrayLevel::Black.background(), GrayLevel::White);
        assert_eq!(GrayLevel::White.background(), GrayLevel::Black);
        assert_eq!(GrayLevel::DarkGray.inverted(), GrayLevel::LightGray);
    }
}
