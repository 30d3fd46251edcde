/*
 *  movie/player.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Movie player - buffered frames stepped through a small state machine
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

use super::header::{MovieHeader, ScanLayout, HEADER_LEN};
use super::pacer::{Clock, FramePacer, SystemClock};
use super::MovieError;
use crate::config::DEFAULT_FRAME_MARGIN_MS;
use crate::display::{copy_packed_frame, DisplayError, DisplayManager, GrayLevel, PackedFrame};

use log::{debug, info};
use std::path::Path;
use std::time::Duration;

/// Playback control state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Nothing to show, or the last frame has gone out
    #[default]
    Stopped,

    /// Armed; the next step rewinds to frame 0
    Start,

    /// Advancing one frame per step
    Running,
}

/// A fully buffered movie
#[derive(Debug)]
struct Movie {
    header: MovieHeader,
    layout: ScanLayout,
    frame_len: usize,
    frames: Vec<u8>,
}

impl Movie {
    fn from_bytes(mut data: Vec<u8>, layout: ScanLayout) -> Result<Self, MovieError> {
        let header = MovieHeader::parse(&data)?;
        header.log_debug(layout);
        header.validate()?;

        let expected = header.file_len(layout);
        let actual = data.len() as u64;
        if actual != expected {
            return Err(MovieError::SizeMismatch { expected, actual });
        }

        let frame_len = header.frame_len(layout);
        data.drain(..HEADER_LEN);

        Ok(Self { header, layout, frame_len, frames: data })
    }

    fn frame(&self, index: u32) -> Option<&[u8]> {
        let start = index as usize * self.frame_len;
        self.frames.get(start..start + self.frame_len)
    }

    fn draw(
        &self,
        index: u32,
        display: &mut DisplayManager,
        colour: GrayLevel,
    ) -> Result<(), DisplayError> {
        let data = self.frame(index).ok_or(DisplayError::BufferSizeMismatch {
            expected: (index as usize + 1) * self.frame_len,
            actual: self.frames.len(),
        })?;

        let frame = PackedFrame {
            data,
            width: self.header.lcd_width,
            height: self.header.lcd_height,
            bits_per_pixel: self.header.bits_per_pixel,
            layout: self.layout,
        };

        let (x0, y0) = centered_origin(display.screen_size(), &self.header);
        copy_packed_frame(display.framebuffer_mut(), &frame, x0, y0, colour == GrayLevel::White)
    }
}

/// Top-left corner for a frame centred on screen.
///
/// Keeps the panel's historical one-pixel up-left bias. A frame that fits is
/// never pushed off the top-left edge; a larger one is cropped about its
/// centre.
pub fn centered_origin((width, height): (u32, u32), header: &MovieHeader) -> (i32, i32) {
    let place = |screen: u32, frame: u32| {
        let offset = (screen as i64 - frame as i64) / 2 - 1;
        let offset = if frame <= screen { offset.max(0) } else { offset };
        offset.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    };
    (place(width, header.lcd_width), place(height, header.lcd_height))
}

/// Plays an LVIF movie one frame per `step`.
///
/// ```ignore
/// let mut player = MoviePlayer::new(Duration::from_millis(10));
/// player.load("clip.lvif", ScanLayout::Page)?;
/// while player.step(&mut display, GrayLevel::Black)? != PlayState::Stopped {}
/// player.teardown(&mut display)?;
/// ```
pub struct MoviePlayer<C: Clock = SystemClock> {
    clock: C,
    pacer: FramePacer,
    movie: Option<Movie>,
    state: PlayState,
    index: u32,
}

impl MoviePlayer<SystemClock> {
    pub fn new(frame_margin: Duration) -> Self {
        Self::with_clock(SystemClock, frame_margin)
    }
}

impl Default for MoviePlayer<SystemClock> {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_FRAME_MARGIN_MS))
    }
}

impl<C: Clock> MoviePlayer<C> {
    pub fn with_clock(clock: C, frame_margin: Duration) -> Self {
        Self {
            clock,
            pacer: FramePacer::new(1, frame_margin),
            movie: None,
            state: PlayState::Stopped,
            index: 0,
        }
    }

    /// Read a movie file into memory in one go.
    ///
    /// Any previously loaded movie is dropped first, so a failed load
    /// leaves the player empty and stopped.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, layout: ScanLayout) -> Result<(), MovieError> {
        let path = path.as_ref();
        self.unload();

        let data = std::fs::read(path)?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        self.load_bytes(data, layout)?;

        info!("Loaded movie {}", path.display());
        Ok(())
    }

    /// Take ownership of an in-memory movie image (header and frames)
    pub fn load_bytes(&mut self, data: Vec<u8>, layout: ScanLayout) -> Result<(), MovieError> {
        self.unload();

        let movie = Movie::from_bytes(data, layout)?;
        self.pacer.set_fps(movie.header.fps);
        self.movie = Some(movie);
        self.state = PlayState::Start;
        Ok(())
    }

    fn unload(&mut self) {
        self.movie = None;
        self.state = PlayState::Stopped;
        self.index = 0;
        self.pacer.reset();
    }

    /// Arm playback from the first frame, keeping the buffered frames
    pub fn rewind(&mut self) -> PlayState {
        if self.movie.is_some() {
            self.state = PlayState::Start;
        }
        self.state
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.movie.is_some()
    }

    pub fn header(&self) -> Option<&MovieHeader> {
        self.movie.as_ref().map(|m| &m.header)
    }

    /// Index of the next frame to show
    pub fn frame_index(&self) -> u32 {
        self.index
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Advance playback by one call.
    ///
    /// `Start` moves to `Running` without drawing. Each `Running` call
    /// draws the current frame, flushes, paces and moves on; the call after
    /// the last frame returns `Stopped`. A failed draw or flush stops
    /// playback and returns the error.
    pub fn step(
        &mut self,
        display: &mut DisplayManager,
        colour: GrayLevel,
    ) -> Result<PlayState, MovieError> {
        match self.state {
            PlayState::Stopped => return Ok(PlayState::Stopped),
            PlayState::Start => {
                self.index = 0;
                self.state = PlayState::Running;
                return Ok(PlayState::Running);
            }
            PlayState::Running => {}
        }

        let Some(movie) = self.movie.as_ref() else {
            self.state = PlayState::Stopped;
            return Ok(PlayState::Stopped);
        };

        if self.index >= movie.header.frame_count {
            self.state = PlayState::Stopped;
            return Ok(PlayState::Stopped);
        }

        let shown = movie
            .draw(self.index, display, colour)
            .and_then(|()| display.update());
        if let Err(err) = shown {
            self.state = PlayState::Stopped;
            return Err(err.into());
        }

        self.pacer.pace(&mut self.clock);
        self.index += 1;
        Ok(PlayState::Running)
    }

    /// Release the frames, stop, and blank the screen
    pub fn teardown(&mut self, display: &mut DisplayManager) -> Result<(), MovieError> {
        self.unload();
        display.clear_screen()?;
        Ok(())
    }
}
