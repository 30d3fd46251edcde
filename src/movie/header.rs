/*
 *  movie/header.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  LVIF header - eight little-endian words in front of the frame records
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

use super::MovieError;
pub use crate::display::blit::ScanLayout;

use log::debug;

/// "LVIF" as it reads from disk
pub const MAGIC: u32 = u32::from_le_bytes(*b"LVIF");

/// Eight u32 words
pub const HEADER_LEN: usize = 32;

/// Largest frame edge accepted, far beyond any dot-matrix panel
pub const MAX_FRAME_EDGE: u32 = 4096;

/// Movie header
///
/// ```text
///  0  magic            "LVIF"
///  4  video_width      source clip, informational
///  8  video_height
/// 12  lcd_width        frame record geometry
/// 16  lcd_height
/// 20  fps
/// 24  frame_count
/// 28  bits_per_pixel
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieHeader {
    pub magic: u32,
    pub video_width: u32,
    pub video_height: u32,
    pub lcd_width: u32,
    pub lcd_height: u32,
    pub fps: u32,
    pub frame_count: u32,
    pub bits_per_pixel: u32,
}

impl MovieHeader {
    /// Decode the first `HEADER_LEN` bytes and check the magic
    pub fn parse(bytes: &[u8]) -> Result<Self, MovieError> {
        if bytes.len() < HEADER_LEN {
            return Err(MovieError::ShortHeader(bytes.len()));
        }

        let mut words = [0u32; 8];
        for (word, chunk) in words.iter_mut().zip(bytes[..HEADER_LEN].chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let [magic, video_width, video_height, lcd_width, lcd_height, fps, frame_count, bits_per_pixel] =
            words;
        if magic != MAGIC {
            return Err(MovieError::BadMagic(magic));
        }

        Ok(Self {
            magic,
            video_width,
            video_height,
            lcd_width,
            lcd_height,
            fps,
            frame_count,
            bits_per_pixel,
        })
    }

    /// Field sanity, independent of the file size
    pub fn validate(&self) -> Result<(), MovieError> {
        if self.fps == 0 {
            return Err(MovieError::InvalidHeader("fps must be at least 1".into()));
        }
        if self.frame_count == 0 {
            return Err(MovieError::InvalidHeader("frame count must be at least 1".into()));
        }
        if self.lcd_width == 0 || self.lcd_height == 0 {
            return Err(MovieError::InvalidHeader(format!(
                "empty frame geometry {}x{}",
                self.lcd_width, self.lcd_height
            )));
        }
        if self.lcd_width > MAX_FRAME_EDGE || self.lcd_height > MAX_FRAME_EDGE {
            return Err(MovieError::InvalidHeader(format!(
                "frame geometry {}x{} exceeds {} pixels per edge",
                self.lcd_width, self.lcd_height, MAX_FRAME_EDGE
            )));
        }
        if !matches!(self.bits_per_pixel, 1 | 2 | 4 | 8) {
            return Err(MovieError::InvalidHeader(format!(
                "{} bits per pixel does not divide a byte",
                self.bits_per_pixel
            )));
        }
        Ok(())
    }

    /// Bytes in one frame record
    pub fn frame_len(&self, layout: ScanLayout) -> usize {
        layout.frame_len(self.lcd_width, self.lcd_height, self.bits_per_pixel)
    }

    /// Bytes of frame records after the header
    pub fn body_len(&self, layout: ScanLayout) -> u64 {
        (self.frame_len(layout) as u64).saturating_mul(self.frame_count as u64)
    }

    /// Exact size a well-formed file must have
    pub fn file_len(&self, layout: ScanLayout) -> u64 {
        self.body_len(layout).saturating_add(HEADER_LEN as u64)
    }

    /// Wire form, the inverse of `parse`
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let words = [
            self.magic,
            self.video_width,
            self.video_height,
            self.lcd_width,
            self.lcd_height,
            self.fps,
            self.frame_count,
            self.bits_per_pixel,
        ];

        let mut out = [0u8; HEADER_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    pub fn log_debug(&self, layout: ScanLayout) {
        debug!("video_width[{}]", self.video_width);
        debug!("video_height[{}]", self.video_height);
        debug!("lcd_width[{}]", self.lcd_width);
        debug!("lcd_height[{}]", self.lcd_height);
        debug!("video_fps[{}]", self.fps);
        debug!("video_frame[{}]", self.frame_count);
        debug!("pixel_bit[{}]", self.bits_per_pixel);
        debug!("scan[{:?}] frame_len[{}] file_len[{}]",
               layout, self.frame_len(layout), self.file_len(layout));
    }
}
