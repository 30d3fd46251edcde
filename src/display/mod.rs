/*
 *  display/mod.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - packed framebuffer, drawing and panel drivers
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod color;
pub mod framebuffer;

// Drawing on top of the framebuffer
pub mod raster;
pub mod blit;
pub mod font;
pub mod text;

// Panel drivers
pub mod drivers;
pub mod factory;

// Display manager
pub mod manager;

// Re-exports for convenience
pub use traits::{DisplayDriver, DisplayCapabilities, ColorDepth};
pub use error::{DisplayError, DisplayFactoryError};
pub use color::GrayLevel;
pub use framebuffer::{FrameBuffer, Orientation, PointTarget};
pub use raster::Rasterizer;
pub use blit::{copy_block, copy_packed_frame, PackedFrame, ScanLayout};
pub use font::{Font, FontName};
pub use text::ScrollDirection;
pub use factory::{DisplayDriverFactory, BoxedDriver};
pub use manager::{DisplayManager, PerformanceMetrics};
