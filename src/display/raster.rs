/*
 *  display/raster.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Integer line, rectangle, circle and ellipse rasterization
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

use crate::display::color::GrayLevel;
use crate::display::framebuffer::PointTarget;

/// Shape drawing on top of `PointTarget::set_point`.
///
/// Every primitive plots point by point, so off-screen parts clip for free.
pub trait Rasterizer: PointTarget {
    /// Classic Bresenham; both end points are plotted
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, colour: GrayLevel) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };

        let (mut x, mut y) = (x0, y0);
        let mut err = dx - dy;
        loop {
            self.set_point(x, y, colour.raw());
            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Line from the cursor
    fn line_to(&mut self, x: i32, y: i32, colour: GrayLevel) {
        let (cx, cy) = self.cursor();
        self.line(cx, cy, x, y, colour);
    }

    fn rectangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: GrayLevel, filled: bool) {
        if filled {
            for x in x1.min(x2)..=x1.max(x2) {
                self.line(x, y1, x, y2, colour);
            }
        } else {
            self.line(x1, y1, x2, y1, colour);
            self.line_to(x2, y2, colour);
            self.line_to(x1, y2, colour);
            self.line_to(x1, y1, colour);
        }
    }

    /// Midpoint circle; a filled circle is drawn as symmetric chords
    fn circle(&mut self, cx: i32, cy: i32, r: i32, colour: GrayLevel, filled: bool) {
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let mut f = 1 - r;
        let mut x = 0;
        let mut y = r;

        if filled {
            self.line(cx, cy + r, cx, cy - r, colour);
            self.line(cx + r, cy, cx - r, cy, colour);
        } else {
            self.set_point(cx, cy + r, colour.raw());
            self.set_point(cx, cy - r, colour.raw());
            self.set_point(cx + r, cy, colour.raw());
            self.set_point(cx - r, cy, colour.raw());
        }

        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;

            if filled {
                self.line(cx + x, cy + y, cx - x, cy + y, colour);
                self.line(cx + x, cy - y, cx - x, cy - y, colour);
                self.line(cx + y, cy + x, cx - y, cy + x, colour);
                self.line(cx + y, cy - x, cx - y, cy - x, colour);
            } else {
                for (px, py) in [
                    (cx + x, cy + y), (cx - x, cy + y),
                    (cx + x, cy - y), (cx - x, cy - y),
                    (cx + y, cy + x), (cx - y, cy + x),
                    (cx + y, cy - x), (cx - y, cy - x),
                ] {
                    self.set_point(px, py, colour.raw());
                }
            }
        }
    }

    /// Two-region midpoint ellipse (John Kennedy's formulation)
    fn ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, colour: GrayLevel, filled: bool) {
        let (rx, ry) = (rx.abs(), ry.abs());

        // a flat ellipse is its major axis; both radii zero is a point
        if rx == 0 || ry == 0 {
            self.line(cx - rx, cy - ry, cx + rx, cy + ry, colour);
            return;
        }

        let two_a_square = 2 * rx * rx;
        let two_b_square = 2 * ry * ry;

        // region 1: |slope| <= 1
        let mut x = rx;
        let mut y = 0;
        let mut x_change = ry * ry * (1 - 2 * rx);
        let mut y_change = rx * rx;
        let mut error = 0;
        let mut stopping_x = two_b_square * rx;
        let mut stopping_y = 0;

        while stopping_x >= stopping_y {
            self.plot_ellipse_points(cx, cy, x, y, colour, filled);
            y += 1;
            stopping_y += two_a_square;
            error += y_change;
            y_change += two_a_square;

            if 2 * error + x_change > 0 {
                x -= 1;
                stopping_x -= two_b_square;
                error += x_change;
                x_change += two_b_square;
            }
        }

        // region 2: |slope| > 1
        x = 0;
        y = ry;
        x_change = ry * ry;
        y_change = rx * rx * (1 - 2 * ry);
        error = 0;
        stopping_x = 0;
        stopping_y = two_a_square * ry;

        while stopping_x <= stopping_y {
            self.plot_ellipse_points(cx, cy, x, y, colour, filled);
            x += 1;
            stopping_x += two_b_square;
            error += x_change;
            x_change += two_b_square;

            if 2 * error + y_change > 0 {
                y -= 1;
                stopping_y -= two_a_square;
                error += y_change;
                y_change += two_a_square;
            }
        }
    }

    #[doc(hidden)]
    fn plot_ellipse_points(&mut self, cx: i32, cy: i32, x: i32, y: i32, colour: GrayLevel, filled: bool) {
        if filled {
            self.line(cx + x, cy + y, cx - x, cy + y, colour);
            self.line(cx - x, cy - y, cx + x, cy - y, colour);
        } else {
            self.set_point(cx + x, cy + y, colour.raw());
            self.set_point(cx - x, cy + y, colour.raw());
            self.set_point(cx - x, cy - y, colour.raw());
            self.set_point(cx + x, cy - y, colour.raw());
        }
    }
}

impl<T: PointTarget + ?Sized> Rasterizer for T {}
