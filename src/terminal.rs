//! Presents a [`PixelSurface`] on a true-colour terminal.
//!
//! Each character cell shows two pixels: the top one as the background
//! colour and the bottom one as the foreground of a lower half block.

use std::io::{self, Write};

use crate::color::Rgb;
use crate::surface::PixelSurface;

const HALF_BLOCK: &str = "▄";
/// Impossible "previous" colour so the first cell of a row always emits
const NO_COLOR: Rgb = (255, 255, 254);

pub struct Presenter {
    output_buf: Vec<u8>,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            output_buf: Vec::with_capacity(1024 * 64),
        }
    }

    /// Build the escape sequence stream for one frame.
    pub fn encode(&mut self, surface: &PixelSurface) -> io::Result<&[u8]> {
        let (width, height) = (surface.width(), surface.height());
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        for y in (0..height).step_by(2) {
            let mut prev_top = NO_COLOR;
            let mut prev_bot = NO_COLOR;
            for x in 0..width {
                let top = surface.pixel(x, y);
                let bot = if y + 1 < height { surface.pixel(x, y + 1) } else { top };

                // Only emit color codes if changed
                if top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                self.output_buf.extend_from_slice(HALF_BLOCK.as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            if y + 2 < height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        Ok(&self.output_buf)
    }

    pub fn present<W: Write>(&mut self, surface: &PixelSurface, out: &mut W) -> io::Result<()> {
        let frame = self.encode(surface)?;
        out.write_all(frame)?;
        out.flush()
    }
}
