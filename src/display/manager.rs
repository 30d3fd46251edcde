/*
 *  display/manager.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display manager - framebuffer, active font and driver in one context
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
use crate::display::{
    BoxedDriver,
    DisplayCapabilities,
    DisplayDriver,
    DisplayDriverFactory,
    DisplayError,
    DisplayFactoryError,
    Font,
    FontName,
    FrameBuffer,
    GrayLevel,
    Orientation,
    PointTarget,
};
use crate::display::blit::copy_block;
use crate::func_timer::FunctionTimer;

use log::{debug, info, warn};
use std::time::Instant;

/// Transfer timing for full-frame flushes
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    /// Time spent pushing the last frame to the panel
    pub transfer_time_us: u64,

    /// Flush counter for averaging
    pub frame_count: u64,

    /// Average transfer time over recent frames
    pub avg_transfer_time_us: u64,

    /// Frame budget at the panel's recommended rate
    pub target_frame_time_us: u64,
}

impl PerformanceMetrics {
    pub fn new(target_fps: u32) -> Self {
        let target_frame_time_us = 1_000_000 / target_fps.max(1) as u64;
        Self {
            transfer_time_us: 0,
            frame_count: 0,
            avg_transfer_time_us: 0,
            target_frame_time_us,
        }
    }

    pub fn record_frame(&mut self, transfer_time_us: u64) {
        self.transfer_time_us = transfer_time_us;
        self.frame_count += 1;

        // Simple moving average (last frame + current) / 2
        if self.avg_transfer_time_us == 0 {
            self.avg_transfer_time_us = transfer_time_us;
        } else {
            self.avg_transfer_time_us = (self.avg_transfer_time_us + transfer_time_us) / 2;
        }

        // Warn if a single transfer blows the frame budget by >20%
        if transfer_time_us > self.target_frame_time_us * 12 / 10 {
            warn!("Flush took {}μs, frame budget is {}μs",
                  transfer_time_us, self.target_frame_time_us);
        }
    }

    /// Upper bound on the frame rate the link can sustain
    pub fn fps(&self) -> f32 {
        if self.avg_transfer_time_us == 0 {
            0.0
        } else {
            1_000_000.0 / self.avg_transfer_time_us as f32
        }
    }
}

/// The display context.
///
/// Owns the packed framebuffer, the active font and the panel driver, so
/// several independent displays can coexist (one real, any number mocked in
/// tests). Drawing only touches the framebuffer; nothing reaches the panel
/// until `update`.
///
/// Shapes come from the `Rasterizer` extension trait, text from the methods
/// in `display::text`.
pub struct DisplayManager {
    /// Hardware transport
    driver: BoxedDriver,

    /// Software copy of the panel RAM
    framebuffer: FrameBuffer,

    /// Cached driver capabilities
    capabilities: DisplayCapabilities,

    /// Active font
    font: Font,

    /// Flush timing
    pub metrics: PerformanceMetrics,
}

impl DisplayManager {
    /// Build the driver from configuration and power the panel up.
    ///
    /// Mirroring and font come from the config; the framebuffer starts white.
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayFactoryError> {
        info!("Initializing DisplayManager");

        let driver = DisplayDriverFactory::create_from_config(config)?;
        let mut manager = Self::new_with_driver(driver);

        if let Some(mode) = config.mirror {
            let orientation = Orientation::try_from(mode).map_err(|m| {
                DisplayFactoryError::ConfigError(format!("Invalid mirror mode: {}", m))
            })?;
            manager.set_orientation(orientation);
        }
        if let Some(name) = config.font {
            manager.set_font(name);
        }

        manager.init().map_err(DisplayFactoryError::DriverInitFailed)?;
        Ok(manager)
    }

    /// Wrap an existing driver.
    ///
    /// The driver is not initialized here; call `init` before the first
    /// `update` when the driver needs it.
    pub fn new_with_driver(driver: BoxedDriver) -> Self {
        let capabilities = driver.capabilities().clone();
        let framebuffer = FrameBuffer::for_capabilities(&capabilities);
        let metrics = PerformanceMetrics::new(capabilities.max_fps);

        info!("Display: {}x{}, {} bpp (target: {} FPS)",
              capabilities.width,
              capabilities.height,
              capabilities.color_depth.bits_per_pixel(),
              capabilities.max_fps);

        Self {
            driver,
            framebuffer,
            capabilities,
            font: Font::default(),
            metrics,
        }
    }

    /// Run the controller power-up sequence and blank the panel
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.driver.init()?;
        self.framebuffer.clear(GrayLevel::White.raw());
        self.driver.clear_hardware()?;
        debug!("Display initialized, font {:?}, {:?}", self.font.name(), self.orientation());
        Ok(())
    }

    /// Get display capabilities
    pub fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    /// Screen size as (width, height)
    pub fn screen_size(&self) -> (u32, u32) {
        (self.capabilities.width, self.capabilities.height)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    pub fn orientation(&self) -> Orientation {
        self.framebuffer.orientation()
    }

    /// Affects subsequent reads and writes only
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.framebuffer.set_orientation(orientation);
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn set_font(&mut self, name: FontName) {
        if self.font.name() != name {
            self.font = Font::load(name);
        }
    }

    /// Split borrow for glyph blits
    pub(crate) fn font_and_framebuffer(&mut self) -> (&Font, &mut FrameBuffer) {
        (&self.font, &mut self.framebuffer)
    }

    /// Pixel level, `None` off screen
    pub fn get_point(&self, x: i32, y: i32) -> Option<u8> {
        self.framebuffer.get_point(x, y)
    }

    /// Flip a pixel to the opposite end of the gray ramp
    pub fn reverse_point(&mut self, x: i32, y: i32) -> Option<u8> {
        self.framebuffer.reverse_point(x, y)
    }

    /// Fill the framebuffer (byte fill, see `FrameBuffer::clear`)
    pub fn clear(&mut self, colour: GrayLevel) {
        self.framebuffer.clear(colour.raw());
    }

    /// Push the whole framebuffer to the panel
    pub fn update(&mut self) -> Result<(), DisplayError> {
        let _timer = FunctionTimer::new("DisplayManager::update");
        let transfer_start = Instant::now();

        self.driver.flush(self.framebuffer.as_bytes())?;

        let transfer_time = transfer_start.elapsed().as_micros() as u64;
        self.metrics.record_frame(transfer_time);
        Ok(())
    }

    /// Blank both the framebuffer and the panel RAM
    pub fn clear_screen(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.clear(GrayLevel::White.raw());
        self.driver.clear_hardware()
    }

    /// Composite a 1-bit row-major bitmap.
    ///
    /// The origin is pulled onto the screen first. Set bits take `colour`,
    /// clear bits take white (black when `colour` is white itself).
    pub fn put_bitmap(
        &mut self,
        x0: i32,
        y0: i32,
        width: u32,
        height: u32,
        bitmap: &[u8],
        colour: GrayLevel,
    ) -> Result<(), DisplayError> {
        let (w, h) = self.screen_size();
        let x0 = x0.clamp(0, w as i32 - 1);
        let y0 = y0.clamp(0, h as i32 - 1);

        copy_block(
            &mut self.framebuffer,
            bitmap,
            x0,
            y0,
            0,
            w as i32 - 1,
            width,
            height,
            colour.background(),
            colour,
        )
    }

    /// Get performance metrics
    pub fn performance_metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }
}

impl PointTarget for DisplayManager {
    #[inline]
    fn set_point(&mut self, x: i32, y: i32, level: u8) {
        self.framebuffer.set_point(x, y, level);
    }

    #[inline]
    fn cursor(&self) -> (i32, i32) {
        self.framebuffer.cursor()
    }
}
