/*
 *  movie/pacer.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame pacing against a monotonic clock
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

use log::trace;
use std::time::{Duration, Instant};

/// Time source for pacing, swapped out in tests
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&mut self, duration: Duration);
}

/// Wall clock, blocks the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Holds flushes to the movie's frame rate.
///
/// Measured flush to flush: when the previous flush is less than one frame
/// interval ago, wait out the rest of the interval plus a fixed margin. The
/// first frame after a reset never waits.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame: Duration,
    margin: Duration,
    last_flush: Option<Instant>,
}

impl FramePacer {
    pub fn new(fps: u32, margin: Duration) -> Self {
        Self {
            frame: Self::interval(fps),
            margin,
            last_flush: None,
        }
    }

    // whole milliseconds, 25 fps is 40 ms
    fn interval(fps: u32) -> Duration {
        Duration::from_millis(1000 / fps.max(1) as u64)
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.frame = Self::interval(fps);
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame
    }

    pub fn margin(&self) -> Duration {
        self.margin
    }

    /// Forget the last flush
    pub fn reset(&mut self) {
        self.last_flush = None;
    }

    /// Call right after a flush. Sleeps if needed and returns the wait.
    pub fn pace<C: Clock + ?Sized>(&mut self, clock: &mut C) -> Option<Duration> {
        let now = clock.now();
        let wait = self.last_flush.and_then(|prev| {
            let elapsed = now.saturating_duration_since(prev);
            (elapsed < self.frame).then(|| self.frame - elapsed + self.margin)
        });
        self.last_flush = Some(now);

        if let Some(wait) = wait {
            trace!("Waiting [{}]ms ...", wait.as_millis());
            clock.sleep(wait);
        }
        wait
    }
}
