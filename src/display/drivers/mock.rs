/*
 *  display/drivers/mock.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};

use std::sync::{Arc, Mutex, MutexGuard};

/// Mock display driver
///
/// Simulates a panel without touching GPIO. It's used for:
/// - Unit and integration tests
/// - `--dry-run` playback on a development machine
///
/// Every transfer is recorded in a shared `MockDriverState` so tests can keep
/// a handle after the driver has been boxed away inside a `DisplayManager`.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times flush() succeeded
    pub flush_count: usize,

    /// Number of times clear_hardware() was called
    pub clear_count: usize,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Total bytes pushed to the simulated panel
    pub bytes_written: usize,

    /// Contents of the simulated panel RAM after the last transfer
    pub last_frame: Vec<u8>,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    /// Create a new mock driver
    ///
    /// Geometry defaults to the 192x96 four-gray panel.
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let width = config.width.unwrap_or(192);
        let height = config.height.unwrap_or(96);
        let bits = config.bits_per_pixel.unwrap_or(2);

        let color_depth = ColorDepth::from_bits(bits).ok_or_else(|| {
            DisplayError::InvalidConfiguration(format!("unsupported bits per pixel: {}", bits))
        })?;

        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidConfiguration(
                format!("display size must be non-zero, got {}x{}", width, height)
            ));
        }

        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth,
            max_fps: 60,
        };

        Ok(Self {
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        })
    }

    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Result<Self, DisplayError> {
        let config = DisplayConfig {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        Self::new(&config)
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockDriverState>, DisplayError> {
        self.state
            .lock()
            .map_err(|_| DisplayError::Other("mock driver state poisoned".to_string()))
    }

    /// Reset state counters (useful between tests)
    pub fn reset_state(&mut self) -> Result<(), DisplayError> {
        *self.lock()? = MockDriverState::default();
        Ok(())
    }

    /// Level of a pixel in the last transferred frame
    pub fn frame_level(&self, x: u32, y: u32) -> Option<u8> {
        let caps = &self.capabilities;
        if x >= caps.width || y >= caps.height {
            return None;
        }

        let bits = caps.color_depth.bits_per_pixel() as u32;
        let per_byte = 8 / bits;
        let index = ((y / per_byte) * caps.width + x) as usize;
        let shift = (per_byte - 1 - y % per_byte) * bits;
        let mask = ((1u16 << bits) - 1) as u8;

        let state = self.lock().ok()?;
        state.last_frame.get(index).map(|b| (b >> shift) & mask)
    }

    /// Count pixels in the last frame that are not white
    pub fn count_inked_pixels(&self) -> usize {
        let (w, h) = (self.capabilities.width, self.capabilities.height);
        (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| self.frame_level(x, y).is_some_and(|l| l != 0))
            .count()
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock()?;

        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn flush(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        let expected = self.capabilities.frame_len();
        if frame.len() != expected {
            return Err(DisplayError::BufferSizeMismatch {
                expected,
                actual: frame.len(),
            });
        }

        let mut state = self.lock()?;

        if state.simulate_flush_failure {
            return Err(DisplayError::Other("Simulated flush failure".to_string()));
        }

        state.flush_count += 1;
        state.bytes_written += frame.len();
        state.last_frame.clear();
        state.last_frame.extend_from_slice(frame);
        Ok(())
    }

    fn clear_hardware(&mut self) -> Result<(), DisplayError> {
        let len = self.capabilities.frame_len();
        let mut state = self.lock()?;
        state.clear_count += 1;
        state.bytes_written += len;
        state.last_frame = vec![0; len];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new_with_size(192, 96).unwrap();
        assert_eq!(driver.capabilities().width, 192);
        assert_eq!(driver.capabilities().height, 96);
        assert_eq!(driver.capabilities().frame_len(), 24 * 192);
        assert_eq!(driver.count_inked_pixels(), 0);
    }

    #[test]
    fn test_mock_driver_rejects_bad_depth() {
        let config = DisplayConfig {
            bits_per_pixel: Some(4),
            ..Default::default()
        };
        assert!(MockDriver::new(&config).is_err());
        assert!(MockDriver::new_with_size(0, 96).is_err());
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(192, 96).unwrap();

        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_driver_flush_records_frame() {
        let mut driver = MockDriver::new_with_size(8, 8).unwrap();
        let mut frame = vec![0u8; 16];
        frame[0] = 0b1100_0000; // (0, 0) black
        frame[8 + 3] = 0b0000_0010; // (3, 7) dark gray

        driver.flush(&frame).unwrap();

        assert_eq!(driver.frame_level(0, 0), Some(3));
        assert_eq!(driver.frame_level(0, 1), Some(0));
        assert_eq!(driver.frame_level(3, 7), Some(2));
        assert_eq!(driver.frame_level(8, 0), None);
        assert_eq!(driver.count_inked_pixels(), 2);
        assert_eq!(driver.state().lock().unwrap().bytes_written, 16);
    }

    #[test]
    fn test_mock_driver_clear_hardware() {
        let mut driver = MockDriver::new_with_size(8, 8).unwrap();
        driver.flush(&[0xFF; 16]).unwrap();
        assert_eq!(driver.count_inked_pixels(), 64);

        driver.clear_hardware().unwrap();

        assert_eq!(driver.count_inked_pixels(), 0);
        assert_eq!(driver.state().lock().unwrap().clear_count, 1);
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new_with_size(8, 8).unwrap();

        driver.state().lock().unwrap().simulate_flush_failure = true;
        assert!(driver.flush(&[0; 16]).is_err());

        driver.state().lock().unwrap().simulate_flush_failure = false;
        assert!(driver.flush(&[0; 16]).is_ok());
        assert_eq!(driver.state().lock().unwrap().flush_count, 1);

        driver.state().lock().unwrap().simulate_init_failure = true;
        assert!(matches!(driver.init(), Err(DisplayError::InitializationFailed(_))));
    }

    #[test]
    fn test_mock_driver_buffer_size_mismatch() {
        let mut driver = MockDriver::new_with_size(192, 96).unwrap();

        let buffer = vec![0xFF; 512];

        assert!(matches!(
            driver.flush(&buffer),
            Err(DisplayError::BufferSizeMismatch { expected: 4608, actual: 512 })
        ));
    }

    #[test]
    fn test_reset_state() {
        let mut driver = MockDriver::new_with_size(8, 8).unwrap();
        driver.init().unwrap();
        driver.reset_state().unwrap();
        assert_eq!(driver.state().lock().unwrap().init_count, 0);
    }
}
