/*
 *  display/text.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text rendering - glyphs, clipped strings, paragraphs and marquees
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

//! Text drawing on the display context.
//!
//! Everything here writes to the framebuffer only, except the scroll
//! routines which flush once per animation step. Visible windows are
//! inclusive column ranges `[vis0, vis1]`.

use crate::display::blit::copy_block;
use crate::display::{DisplayError, DisplayManager, GrayLevel};

use log::trace;
use std::time::Duration;

/// Marquee direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

// non-ASCII lands on the fallback glyph
#[inline]
fn char_code(ch: char) -> u8 {
    u8::try_from(ch).unwrap_or(0)
}

impl DisplayManager {
    fn glyph_size(&self) -> (i32, i32) {
        (self.font().width() as i32, self.font().height() as i32)
    }

    /// Reject a text row that cannot show a single pixel
    fn check_row(&self, x: i32, y: i32) -> Result<(), DisplayError> {
        let (_, h) = self.screen_size();
        let (_, fh) = self.glyph_size();
        if y <= -fh || y >= h as i32 {
            return Err(DisplayError::OffScreen { x, y });
        }
        Ok(())
    }

    fn check_window(vis0: i32, vis1: i32) -> Result<(), DisplayError> {
        if vis1 < vis0 {
            return Err(DisplayError::InvalidWindow { start: vis0, end: vis1 });
        }
        Ok(())
    }

    /// Draw one glyph with its top-left corner at (x, y)
    pub fn put_char(
        &mut self,
        x: i32,
        y: i32,
        ch: char,
        bg: GrayLevel,
        fg: GrayLevel,
    ) -> Result<(), DisplayError> {
        let (w, _) = self.screen_size();
        self.put_char_clipped(x, 0, w as i32 - 1, y, ch, bg, fg)
    }

    /// Draw one glyph, touching only columns inside `[vis0, vis1]`
    #[allow(clippy::too_many_arguments)]
    pub fn put_char_clipped(
        &mut self,
        x: i32,
        vis0: i32,
        vis1: i32,
        y: i32,
        ch: char,
        bg: GrayLevel,
        fg: GrayLevel,
    ) -> Result<(), DisplayError> {
        let (w, h) = self.screen_size();
        let (fw, fh) = self.glyph_size();
        if x >= w as i32 || x <= -fw || y >= h as i32 || y <= -fh {
            return Err(DisplayError::OffScreen { x, y });
        }
        Self::check_window(vis0, vis1)?;

        let (font, framebuffer) = self.font_and_framebuffer();
        copy_block(
            framebuffer,
            font.glyph(char_code(ch)),
            x,
            y,
            vis0,
            vis1,
            font.width(),
            font.height(),
            bg,
            fg,
        )
    }

    /// Single line of text; stops at the right edge, never wraps
    pub fn put_string(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        bg: GrayLevel,
        fg: GrayLevel,
    ) -> Result<(), DisplayError> {
        let (w, _) = self.screen_size();
        self.put_string_clipped(x, 0, w as i32 - 1, y, text, bg, fg)
    }

    /// Single line of text seen through the window `[vis0, vis1]`.
    ///
    /// Glyphs wholly left of the window are skipped, the first glyph past
    /// the window or the screen ends the line.
    #[allow(clippy::too_many_arguments)]
    pub fn put_string_clipped(
        &mut self,
        x: i32,
        vis0: i32,
        vis1: i32,
        y: i32,
        text: &str,
        bg: GrayLevel,
        fg: GrayLevel,
    ) -> Result<(), DisplayError> {
        self.check_row(x, y)?;
        Self::check_window(vis0, vis1)?;

        let (w, _) = self.screen_size();
        let (fw, _) = self.glyph_size();
        let left = vis0.max(0);

        let mut xpos = x;
        for ch in text.chars() {
            if xpos >= w as i32 || xpos > vis1 {
                break;
            }
            if xpos + fw > left {
                self.put_char_clipped(xpos, vis0, vis1, y, ch, bg, fg)?;
            }
            xpos += fw;
        }

        Ok(())
    }

    /// Decimal rendering of `n` at (x, y)
    pub fn put_number(
        &mut self,
        x: i32,
        y: i32,
        n: i64,
        bg: GrayLevel,
        fg: GrayLevel,
    ) -> Result<(), DisplayError> {
        self.put_string(x, y, &n.to_string(), bg, fg)
    }

    /// Paragraph layout inside the margins `[vis0, vis1]`.
    ///
    /// `\r` returns to the left margin, `\n` drops one glyph row. Text that
    /// runs into the right margin wraps. Layout ends at the bottom of the
    /// screen.
    pub fn layout_text(
        &mut self,
        vis0: i32,
        vis1: i32,
        y: i32,
        text: &str,
        bg: GrayLevel,
        fg: GrayLevel,
    ) -> Result<(), DisplayError> {
        self.check_row(vis0, y)?;
        Self::check_window(vis0, vis1)?;

        let (w, h) = self.screen_size();
        let (w, h) = (w as i32, h as i32);
        let (fw, fh) = self.glyph_size();

        let mut xpos = vis0;
        let mut ypos = y;
        for ch in text.chars() {
            match ch {
                '\r' => {
                    xpos = vis0;
                    continue;
                }
                '\n' => {
                    ypos += fh;
                    if ypos >= h {
                        break;
                    }
                    continue;
                }
                _ => {}
            }

            // a window narrower than a glyph still shows one per row
            if (xpos >= w || xpos >= vis1) && xpos > vis0 {
                xpos = vis0;
                ypos += fh;
                if ypos >= h {
                    break;
                }
            }

            if xpos + fw > 0 && xpos < w {
                self.put_char_clipped(xpos, vis0, vis1, ypos, ch, bg, fg)?;
            }
            xpos += fw;
        }

        Ok(())
    }

    /// Slide `text` across the window one column per step.
    ///
    /// Each step draws the string, flushes, then erases it in `bg` and waits
    /// `delay`. A left scroll starts at `x` and ends once the tail of the
    /// string is inside the window; a right scroll ends once the head of the
    /// string has reached the left edge of the window. Returns the number of
    /// frames shown.
    #[allow(clippy::too_many_arguments)]
    pub fn scroll_text(
        &mut self,
        x: i32,
        vis0: i32,
        vis1: i32,
        y: i32,
        text: &str,
        bg: GrayLevel,
        fg: GrayLevel,
        direction: ScrollDirection,
        delay: Duration,
    ) -> Result<usize, DisplayError> {
        self.check_row(x, y)?;
        Self::check_window(vis0, vis1)?;

        let (w, _) = self.screen_size();
        let w = w as i32;
        let (fw, _) = self.glyph_size();
        let span = text.chars().count() as i32 * fw;

        let mut frames = 0;
        let mut pos = x;
        loop {
            let done = match direction {
                ScrollDirection::Left => pos <= -span || (pos + span < w && pos + span < vis1),
                ScrollDirection::Right => pos >= w || (pos > 0 && pos > vis0),
            };
            if done {
                break;
            }

            self.put_string_clipped(pos, vis0, vis1, y, text, bg, fg)?;
            self.update()?;
            self.put_string_clipped(pos, vis0, vis1, y, text, bg, bg)?;
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            frames += 1;
            pos += match direction {
                ScrollDirection::Left => -1,
                ScrollDirection::Right => 1,
            };
        }

        trace!("scrolled {:?} over {} frames", direction, frames);
        Ok(frames)
    }

    /// Ping-pong marquee for text that overfills the window.
    ///
    /// Text that fits is drawn once, statically, without a flush. Returns
    /// the number of frames shown.
    #[allow(clippy::too_many_arguments)]
    pub fn auto_scroll_text(
        &mut self,
        vis0: i32,
        vis1: i32,
        y: i32,
        text: &str,
        bg: GrayLevel,
        fg: GrayLevel,
        delay: Duration,
    ) -> Result<usize, DisplayError> {
        self.check_row(vis0, y)?;
        Self::check_window(vis0, vis1)?;

        let (w, _) = self.screen_size();
        let (fw, _) = self.glyph_size();
        let span = text.chars().count() as i32 * fw;
        let room = vis1 - vis0;

        if span >= w as i32 || span >= room {
            let mut frames = self.scroll_text(
                vis0, vis0, vis1, y, text, bg, fg, ScrollDirection::Left, delay,
            )?;
            let back = vis0 - (span - room);
            frames += self.scroll_text(
                back, vis0, vis1, y, text, bg, fg, ScrollDirection::Right, delay,
            )?;
            Ok(frames)
        } else {
            self.put_string_clipped(vis0, vis0, vis1, y, text, bg, fg)?;
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockDriver;
    use crate::display::FontName;

    const W: GrayLevel = GrayLevel::White;
    const B: GrayLevel = GrayLevel::Black;

    fn manager(width: u32, height: u32, font: FontName) -> (DisplayManager, MockDriver) {
        let driver = MockDriver::new_with_size(width, height).unwrap();
        let probe = driver.clone();
        let mut manager = DisplayManager::new_with_driver(Box::new(driver));
        manager.set_font(font);
        (manager, probe)
    }

    fn ink_in(m: &DisplayManager, x0: i32, x1: i32, y0: i32, y1: i32) -> usize {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| m.get_point(x, y).is_some_and(|l| l != 0))
            .count()
    }

    #[test]
    fn test_put_char_stays_in_glyph_box() {
        let (mut m, _) = manager(192, 96, FontName::Font10x20);
        m.put_char(0, 0, 'A', W, B).unwrap();

        assert!(ink_in(&m, 0, 10, 0, 20) > 0);
        assert_eq!(ink_in(&m, 10, 192, 0, 96), 0);
        assert_eq!(ink_in(&m, 0, 192, 20, 96), 0);
    }

    #[test]
    fn test_put_char_off_screen_is_an_error() {
        let (mut m, _) = manager(192, 96, FontName::Font10x20);

        assert!(matches!(m.put_char(192, 0, 'A', W, B), Err(DisplayError::OffScreen { .. })));
        assert!(matches!(m.put_char(-10, 0, 'A', W, B), Err(DisplayError::OffScreen { .. })));
        assert!(m.put_char(-9, 0, 'A', W, B).is_ok());
        assert!(matches!(
            m.put_char_clipped(0, 20, 10, 0, 'A', W, B),
            Err(DisplayError::InvalidWindow { start: 20, end: 10 })
        ));
    }

    #[test]
    fn test_non_ascii_uses_fallback_glyph() {
        let (mut m, _) = manager(64, 32, FontName::Font6x10);
        m.clear(B);
        // fallback is the space glyph, so the box is painted background
        m.put_char(0, 0, 'é', W, B).unwrap();
        assert_eq!(ink_in(&m, 0, 6, 0, 10), 0);
    }

    #[test]
    fn test_put_string_clipped_window() {
        let (mut m, _) = manager(192, 96, FontName::Font10x20);
        m.put_string_clipped(0, 15, 24, 0, "HHHHH", W, B).unwrap();

        assert!(ink_in(&m, 15, 25, 0, 20) > 0);
        assert_eq!(ink_in(&m, 0, 15, 0, 20), 0);
        assert_eq!(ink_in(&m, 25, 192, 0, 20), 0);
    }

    #[test]
    fn test_put_string_row_checks() {
        let (mut m, _) = manager(192, 96, FontName::Font10x20);

        assert!(m.put_string(0, 96, "x", W, B).is_err());
        assert!(m.put_string(0, -20, "x", W, B).is_err());
        assert!(m.put_string(0, -19, "x", W, B).is_ok());
        assert!(m.put_string(0, 95, "x", W, B).is_ok());
    }

    #[test]
    fn test_put_string_stops_at_edge() {
        let (mut m, _) = manager(64, 32, FontName::Font6x10);
        // long enough to run off the right edge
        m.put_string(60, 0, "MMMMMMMM", W, B).unwrap();

        assert!(ink_in(&m, 60, 64, 0, 10) > 0);
        assert_eq!(ink_in(&m, 0, 60, 0, 32), 0);
    }

    #[test]
    fn test_put_number_matches_string() {
        let (mut a, _) = manager(64, 32, FontName::Font6x10);
        let (mut b, _) = manager(64, 32, FontName::Font6x10);

        a.put_number(2, 3, -42, W, B).unwrap();
        b.put_string(2, 3, "-42", W, B).unwrap();

        assert_eq!(a.framebuffer().as_bytes(), b.framebuffer().as_bytes());
    }

    #[test]
    fn test_layout_text_wraps_and_breaks() {
        let (mut m, _) = manager(64, 32, FontName::Font6x10);

        // 12 glyphs of 6 px: the twelfth starts at 66 and wraps
        m.layout_text(0, 63, 0, "LLLLLLLLLLLL", W, B).unwrap();
        assert!(ink_in(&m, 0, 6, 10, 20) > 0);
        assert_eq!(ink_in(&m, 6, 64, 10, 20), 0);

        m.clear(W);
        m.layout_text(0, 63, 0, "L\r\nL", W, B).unwrap();
        assert!(ink_in(&m, 0, 6, 0, 10) > 0);
        assert!(ink_in(&m, 0, 6, 10, 20) > 0);
        assert_eq!(ink_in(&m, 6, 64, 0, 32), 0);

        // plain newline keeps the column
        m.clear(W);
        m.layout_text(0, 63, 0, "L\nL", W, B).unwrap();
        assert!(ink_in(&m, 6, 12, 10, 20) > 0);
    }

    #[test]
    fn test_layout_text_stops_at_bottom() {
        let (mut m, _) = manager(64, 32, FontName::Font6x10);
        m.layout_text(0, 63, 0, "L\nL\nL\nL\nL", W, B).unwrap();

        assert!(ink_in(&m, 0, 64, 20, 30) > 0);
        assert!(m.layout_text(0, 63, 32, "L", W, B).is_err());
    }

    #[test]
    fn test_scroll_left_frame_count() {
        let (mut m, probe) = manager(192, 96, FontName::Font10x20);
        let text = "ABCDEFGHIJKLMNOPQRSTUVWXY";

        // 250 px of text ends inside [0, 191] once x < -59
        let frames = m
            .scroll_text(0, 0, 191, 10, text, W, B, ScrollDirection::Left, Duration::ZERO)
            .unwrap();

        assert_eq!(frames, 60);
        assert_eq!(probe.state().lock().unwrap().flush_count, 60);
        assert!(m.framebuffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_auto_scroll_ping_pong() {
        let (mut m, probe) = manager(192, 96, FontName::Font10x20);
        let text = "ABCDEFGHIJKLMNOPQRSTUVWXY";

        let frames = m.auto_scroll_text(0, 191, 10, text, W, B, Duration::ZERO).unwrap();

        assert_eq!(frames, 120);
        assert_eq!(probe.state().lock().unwrap().flush_count, 120);
        assert!(m.framebuffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_auto_scroll_short_text_is_static() {
        let (mut m, probe) = manager(192, 96, FontName::Font10x20);

        let frames = m.auto_scroll_text(0, 191, 10, "Hi", W, B, Duration::ZERO).unwrap();

        assert_eq!(frames, 0);
        assert_eq!(probe.state().lock().unwrap().flush_count, 0);
        assert!(ink_in(&m, 0, 20, 10, 30) > 0);
    }

    #[test]
    fn test_scroll_right_stops_at_window_edge() {
        let (mut m, _) = manager(64, 32, FontName::Font6x10);

        let frames = m
            .scroll_text(-5, 0, 63, 0, "AB", W, B, ScrollDirection::Right, Duration::ZERO)
            .unwrap();

        // -5..=0
        assert_eq!(frames, 6);
    }
}
