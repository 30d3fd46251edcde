/*
 *  display/error.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for display subsystem
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

use std::fmt;
use std::error::Error;

/// Unified error type for all display operations
///
/// Pixel writes never produce one of these: off-screen points are clipped
/// silently. Only malformed arguments and transport failures are reported.
#[derive(Debug)]
pub enum DisplayError {
    /// Hardware initialization failed
    InitializationFailed(String),

    /// GPIO pin error
    GpioError(String),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Visible window has its start after its end
    InvalidWindow { start: i32, end: i32 },

    /// Block would land entirely outside the screen
    OffScreen { x: i32, y: i32 },

    /// Source buffer too small for the declared block geometry
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::InitializationFailed(msg) =>
                write!(f, "Display initialization failed: {}", msg),
            DisplayError::GpioError(msg) =>
                write!(f, "GPIO error: {}", msg),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::InvalidWindow { start, end } =>
                write!(f, "Invalid visible window: start {} is after end {}", start, end),
            DisplayError::OffScreen { x, y } =>
                write!(f, "Block at ({}, {}) is entirely off screen", x, y),
            DisplayError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Buffer size mismatch: expected {} bytes, got {}", expected, actual),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {}

// pin export and direction setup go through sysfs directly
impl From<linux_embedded_hal::sysfs_gpio::Error> for DisplayError {
    fn from(err: linux_embedded_hal::sysfs_gpio::Error) -> Self {
        DisplayError::GpioError(err.to_string())
    }
}

/// Factory error types
#[derive(Debug)]
pub enum DisplayFactoryError {
    /// No driver specified in configuration
    NoDriverSpecified,

    /// Driver needs GPIO wiring that the configuration lacks
    NoGpioConfiguration,

    /// Display driver initialization failed
    DriverInitFailed(DisplayError),

    /// Configuration validation error
    ConfigError(String),
}

impl fmt::Display for DisplayFactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayFactoryError::NoDriverSpecified =>
                write!(f, "No display driver specified in configuration"),
            DisplayFactoryError::NoGpioConfiguration =>
                write!(f, "No GPIO pin configuration specified"),
            DisplayFactoryError::DriverInitFailed(err) =>
                write!(f, "Driver initialization failed: {}", err),
            DisplayFactoryError::ConfigError(msg) =>
                write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for DisplayFactoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DisplayFactoryError::DriverInitFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DisplayError> for DisplayFactoryError {
    fn from(err: DisplayError) -> Self {
        DisplayFactoryError::DriverInitFailed(err)
    }
}
