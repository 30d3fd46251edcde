/*
 *  func_timer.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scope timer, logs how long a block took when it goes out of scope
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

/// Logs the elapsed time at trace level on drop.
///
/// ```ignore
/// let _timer = FunctionTimer::new("flush");
/// ```
pub struct FunctionTimer {
    name: &'static str,
    start: Instant,
}

impl FunctionTimer {
    pub fn new(name: &'static str) -> Self {
        FunctionTimer {
            name,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for FunctionTimer {
    fn drop(&mut self) {
        trace!("'{}' took: {:?}", self.name, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_monotonic() {
        let timer = FunctionTimer::new("test");
        std::thread::sleep(Duration::from_millis(2));
        let first = timer.elapsed();
        assert!(first >= Duration::from_millis(2));
        assert!(timer.elapsed() >= first);
    }
}
