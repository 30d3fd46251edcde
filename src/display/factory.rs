/*
 *  display/factory.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Factory pattern for display driver selection
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

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::mock::MockDriver;
use crate::display::drivers::st75256::St75256Driver;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::DisplayDriver;
use log::info;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display driver from configuration
    ///
    /// The driver is returned uninitialized; `DisplayManager::init` runs the
    /// power-up sequence.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     driver: Some(DriverKind::St75256),
    ///     gpio: Some(GpioConfig::default()),
    ///     ..Default::default()
    /// };
    ///
    /// let driver = DisplayDriverFactory::create_from_config(&config)?;
    /// ```
    pub fn create_from_config(
        config: &DisplayConfig
    ) -> Result<BoxedDriver, DisplayFactoryError> {
        Self::validate_config(config)?;

        let driver_kind = config.driver
            .ok_or(DisplayFactoryError::NoDriverSpecified)?;

        match driver_kind {
            DriverKind::St75256 => {
                let gpio = config.gpio.as_ref()
                    .ok_or(DisplayFactoryError::NoGpioConfiguration)?;
                Ok(Box::new(St75256Driver::new_sysfs(gpio, config)?))
            }
            DriverKind::Mock => {
                info!("Using mock display driver (no hardware access)");
                Ok(Box::new(MockDriver::new(config)?))
            }
        }
    }

    /// Validate a configuration without creating a driver
    ///
    /// Checked before any GPIO is exported.
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayFactoryError> {
        let driver_kind = config.driver
            .ok_or(DisplayFactoryError::NoDriverSpecified)?;

        if driver_kind == DriverKind::St75256 && config.gpio.is_none() {
            return Err(DisplayFactoryError::NoGpioConfiguration);
        }

        if let Some(mirror) = config.mirror {
            if mirror > 3 {
                return Err(DisplayFactoryError::ConfigError(
                    format!("Invalid mirror mode: {} (must be 0..=3)", mirror)
                ));
            }
        }

        if let Some(bits) = config.bits_per_pixel {
            if bits != 1 && bits != 2 {
                return Err(DisplayFactoryError::ConfigError(
                    format!("Invalid depth: {} bits per pixel (must be 1 or 2)", bits)
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GpioConfig;

    #[test]
    fn test_validate_config_no_driver() {
        let config = DisplayConfig {
            driver: None,
            gpio: Some(GpioConfig::default()),
            ..Default::default()
        };

        assert!(matches!(
            DisplayDriverFactory::validate_config(&config),
            Err(DisplayFactoryError::NoDriverSpecified)
        ));
    }

    #[test]
    fn test_validate_config_no_gpio() {
        let config = DisplayConfig {
            driver: Some(DriverKind::St75256),
            gpio: None,
            ..Default::default()
        };

        assert!(matches!(
            DisplayDriverFactory::create_from_config(&config),
            Err(DisplayFactoryError::NoGpioConfiguration)
        ));
    }

    #[test]
    fn test_validate_config_invalid_mirror() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Mock),
            mirror: Some(5), // Invalid!
            ..Default::default()
        };

        assert!(DisplayDriverFactory::validate_config(&config).is_err());
    }

    #[test]
    fn test_create_mock_driver() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Mock),
            width: Some(128),
            height: Some(64),
            bits_per_pixel: Some(1),
            ..Default::default()
        };

        let driver = DisplayDriverFactory::create_from_config(&config).unwrap();
        assert_eq!(driver.dimensions(), (128, 64));
        assert_eq!(driver.capabilities().frame_len(), 8 * 128);
    }
}
