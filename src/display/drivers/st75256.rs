/*
 *  display/drivers/st75256.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  ST75256 dot-matrix LCD over a bit-banged 4-wire serial link
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

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SysfsPin};
use log::{debug, info};

use crate::config::{DisplayConfig, GpioConfig};
use crate::display::error::DisplayError;
use crate::display::traits::{ColorDepth, DisplayCapabilities, DisplayDriver};

/// One step of a controller power-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Command byte with no parameters
    Command(u8),

    /// Command byte followed by parameter bytes
    CommandData(u8, &'static [u8]),

    /// Pause in milliseconds
    DelayMs(u32),

    /// Display mode, page/column window and duty for the panel geometry
    SetMode,
}

/// Everything that differs between panels driven by this controller
#[derive(Debug, Clone)]
pub struct PanelProfile {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub color_depth: ColorDepth,
    pub init: &'static [InitStep],
}

const ST75256_INIT: &[InitStep] = &[
    InitStep::Command(0x31),                  // extension command 2
    InitStep::CommandData(0xD7, &[0x9F]),     // disable auto read
    InitStep::DelayMs(10),
    InitStep::DelayMs(20),
    InitStep::Command(0x30),                  // extension command 1
    InitStep::Command(0x94),                  // sleep out
    InitStep::Command(0xAE),                  // display off
    InitStep::DelayMs(50),
    InitStep::CommandData(0x20, &[0x0B]),     // power control: VB, VR, VF on
    InitStep::CommandData(0x81, &[0x28, 0x03]), // Vop, panel contrast
    InitStep::Command(0x31),
    InitStep::CommandData(0x20, &[            // gray levels
        0x01, 0x03, 0x05, 0x07, 0x09, 0x0b, 0x0d, 0x10,
        0x11, 0x13, 0x15, 0x17, 0x19, 0x1b, 0x1d, 0x1f,
    ]),
    InitStep::CommandData(0x32, &[0x00, 0x01, 0x02]), // analog circuit, bias 1/12
    InitStep::CommandData(0x51, &[0xFB]),     // booster level x10
    InitStep::Command(0x30),
    InitStep::CommandData(0xBC, &[0x00]),     // data scan direction
    InitStep::Command(0x08),                  // data format, LSB on bottom
    InitStep::Command(0xA6),                  // normal display
    InitStep::Command(0x31),
    InitStep::Command(0x40),                  // internal power supply
    InitStep::SetMode,
    InitStep::Command(0x30),
    InitStep::Command(0xAF),                  // display on
];

impl PanelProfile {
    /// 192x96 four-gray module
    pub const ST75256_192X96: PanelProfile = PanelProfile {
        name: "ST75256 192x96",
        width: 192,
        height: 96,
        color_depth: ColorDepth::Gray2,
        init: ST75256_INIT,
    };

    /// Same controller, different glass
    pub fn with_geometry(mut self, width: u32, height: u32, color_depth: ColorDepth) -> Self {
        self.width = width;
        self.height = height;
        self.color_depth = color_depth;
        self
    }

    pub fn page_count(&self) -> u32 {
        self.height.div_ceil(8 / self.color_depth.bits_per_pixel() as u32)
    }
}

/// The five wires of the serial link
pub struct SerialPins<P> {
    pub cs: P,
    pub rst: P,
    pub dc: P,
    pub sda: P,
    pub scl: P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Command,
    Data,
}

fn pin_result<E: core::fmt::Debug>(result: Result<(), E>) -> Result<(), DisplayError> {
    result.map_err(|e| DisplayError::GpioError(format!("{:?}", e)))
}

/// Bit-banged ST75256 driver.
///
/// Holds no framebuffer; `flush` streams whatever packed frame it is given.
pub struct St75256Driver<P, D> {
    pins: SerialPins<P>,
    delay: D,
    profile: PanelProfile,
    capabilities: DisplayCapabilities,
}

impl<P: OutputPin, D: DelayNs> St75256Driver<P, D> {
    pub fn new(pins: SerialPins<P>, delay: D, profile: PanelProfile) -> Self {
        let capabilities = DisplayCapabilities {
            width: profile.width,
            height: profile.height,
            color_depth: profile.color_depth,
            // a full frame is ~37k clock edges through sysfs
            max_fps: 30,
        };

        Self { pins, delay, profile, capabilities }
    }

    pub fn profile(&self) -> &PanelProfile {
        &self.profile
    }

    /// Release the pins and delay
    pub fn release(self) -> (SerialPins<P>, D) {
        (self.pins, self.delay)
    }

    fn write_byte(&mut self, byte: u8, transfer: Transfer) -> Result<(), DisplayError> {
        pin_result(self.pins.scl.set_low())?;
        match transfer {
            Transfer::Command => pin_result(self.pins.dc.set_low())?,
            Transfer::Data => pin_result(self.pins.dc.set_high())?,
        }
        pin_result(self.pins.cs.set_low())?;

        for bit in (0..8).rev() {
            pin_result(self.pins.scl.set_low())?;
            if byte & (1 << bit) != 0 {
                pin_result(self.pins.sda.set_high())?;
            } else {
                pin_result(self.pins.sda.set_low())?;
            }
            pin_result(self.pins.scl.set_high())?;
        }

        pin_result(self.pins.cs.set_high())
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.write_byte(cmd, Transfer::Command)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        for &b in bytes {
            self.write_byte(b, Transfer::Data)?;
        }
        Ok(())
    }

    fn hardware_reset(&mut self) -> Result<(), DisplayError> {
        pin_result(self.pins.rst.set_high())?;
        self.delay.delay_ms(10);
        pin_result(self.pins.rst.set_low())?;
        self.delay.delay_ms(10);
        pin_result(self.pins.rst.set_high())
    }

    /// Display mode plus a window covering the whole panel
    fn set_mode(&mut self) -> Result<(), DisplayError> {
        let mode = match self.profile.color_depth {
            ColorDepth::Monochrome => 0x10,
            ColorDepth::Gray2 => 0x11,
        };
        let last_page = self.profile.page_count().saturating_sub(1).min(0xFF) as u8;
        let last_column = self.profile.width.saturating_sub(1).min(0xFF) as u8;
        let last_row = self.profile.height.saturating_sub(1).min(0xFF) as u8;

        self.command(0x30)?;
        self.command(0xF0)?;
        self.data(&[mode])?;
        self.command(0x75)?;
        self.data(&[0x00, last_page])?;
        self.command(0x15)?;
        self.data(&[0x00, last_column])?;
        self.command(0xCA)?;
        self.data(&[0x00, last_row, 0x00])
    }

    fn run_step(&mut self, step: InitStep) -> Result<(), DisplayError> {
        match step {
            InitStep::Command(cmd) => self.command(cmd),
            InitStep::CommandData(cmd, data) => {
                self.command(cmd)?;
                self.data(data)
            }
            InitStep::DelayMs(ms) => {
                self.delay.delay_ms(ms);
                Ok(())
            }
            InitStep::SetMode => self.set_mode(),
        }
    }
}

impl St75256Driver<SysfsPin, Delay> {
    /// Export the configured pins through sysfs and drive them as outputs
    pub fn new_sysfs(gpio: &GpioConfig, config: &DisplayConfig) -> Result<Self, DisplayError> {
        info!(
            "Initializing ST75256 on sysfs GPIO cs={} rst={} dc={} sda={} scl={}",
            gpio.cs, gpio.rst, gpio.dc, gpio.sda, gpio.scl
        );

        let output = |number: u64| -> Result<SysfsPin, DisplayError> {
            let pin = SysfsPin::new(number);
            pin.export()?;
            pin.set_direction(Direction::Out)?;
            Ok(pin)
        };

        let pins = SerialPins {
            cs: output(gpio.cs)?,
            rst: output(gpio.rst)?,
            dc: output(gpio.dc)?,
            sda: output(gpio.sda)?,
            scl: output(gpio.scl)?,
        };

        let base = PanelProfile::ST75256_192X96;
        let depth = match config.bits_per_pixel {
            Some(bits) => ColorDepth::from_bits(bits).ok_or_else(|| {
                DisplayError::InvalidConfiguration(format!(
                    "ST75256 supports 1 or 2 bits per pixel, got {}", bits
                ))
            })?,
            None => base.color_depth,
        };
        let profile = base.clone().with_geometry(
            config.width.unwrap_or(base.width),
            config.height.unwrap_or(base.height),
            depth,
        );

        Ok(Self::new(pins, Delay, profile))
    }
}

impl<P, D> DisplayDriver for St75256Driver<P, D>
where
    P: OutputPin + Send,
    D: DelayNs + Send,
{
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.hardware_reset()?;
        let init = self.profile.init;
        for &step in init {
            self.run_step(step)
                .map_err(|e| DisplayError::InitializationFailed(e.to_string()))?;
        }
        debug!("{} ready", self.profile.name);
        Ok(())
    }

    fn flush(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        let expected = self.capabilities.frame_len();
        if frame.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.len() });
        }

        self.set_mode()?;
        self.command(0x5C)?;
        self.data(frame)
    }

    fn clear_hardware(&mut self) -> Result<(), DisplayError> {
        let blank = vec![0u8; self.capabilities.frame_len()];
        self.flush(&blank)
    }
}
