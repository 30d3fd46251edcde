/*
 *  movie/mod.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  LVIF movie container and frame-timed playback
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

pub mod header;
pub mod pacer;
pub mod player;

pub use header::{MovieHeader, ScanLayout, HEADER_LEN, MAGIC, MAX_FRAME_EDGE};
pub use pacer::{Clock, FramePacer, SystemClock};
pub use player::{MoviePlayer, PlayState};

use crate::display::DisplayError;
use thiserror::Error;

/// Movie loading and playback errors
#[derive(Debug, Error)]
pub enum MovieError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short header: {0} of {HEADER_LEN} bytes")]
    ShortHeader(usize),

    #[error("Bad magic 0x{0:08X}, not an LVIF movie")]
    BadMagic(u32),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("File size mismatch: header declares {expected} bytes, file has {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),
}
