/// Presents RGBA pixel buffers as terminal cells
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use glyph3d_core::{Color as Rgba, PixelBuffer};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '▀';

/// How a pair of stacked pixels becomes one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStyle {
    /// Two true-color pixels per cell
    #[default]
    HalfBlock,
    /// One ramp character per cell, tinted with the mean color
    Ascii,
}

/// Terminal presenter sized in character cells
///
/// Each cell covers two pixel rows, so the pixel buffer it expects is
/// `columns × rows * 2`. Drawing starts at the current cursor position.
pub struct TerminalRenderer {
    columns: usize,
    rows: usize,
    style: CellStyle,
}

impl TerminalRenderer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            style: CellStyle::default(),
        }
    }

    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.columns = columns;
        self.rows = rows;
    }

    /// Pixel dimensions of the buffer to render
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.columns, self.rows * 2)
    }

    pub fn style(&self) -> CellStyle {
        self.style
    }

    pub fn toggle_style(&mut self) -> CellStyle {
        self.style = match self.style {
            CellStyle::HalfBlock => CellStyle::Ascii,
            CellStyle::Ascii => CellStyle::HalfBlock,
        };
        self.style
    }

    pub fn draw<W: Write>(&self, pixels: &PixelBuffer, writer: &mut W) -> std::io::Result<()> {
        let background = Rgba::BLACK;
        for row in 0..self.rows {
            if row > 0 {
                writer.queue(Print("\r\n"))?;
            }
            let mut last: Option<(Rgba, Rgba)> = None;
            for col in 0..self.columns {
                let top = pixels.pixel(col, row * 2).unwrap_or(background);
                let bottom = pixels.pixel(col, row * 2 + 1).unwrap_or(background);
                match self.style {
                    CellStyle::HalfBlock => {
                        if last != Some((top, bottom)) {
                            writer.queue(SetForegroundColor(to_terminal(top)))?;
                            writer.queue(SetBackgroundColor(to_terminal(bottom)))?;
                            last = Some((top, bottom));
                        }
                        writer.queue(Print(HALF_BLOCK))?;
                    }
                    CellStyle::Ascii => {
                        let mean = average(top, bottom);
                        if last != Some((mean, mean)) {
                            writer.queue(SetForegroundColor(to_terminal(mean)))?;
                            last = Some((mean, mean));
                        }
                        writer.queue(Print(ramp_char(mean.luminance())))?;
                    }
                }
            }
            writer.queue(ResetColor)?;
        }
        Ok(())
    }
}

/// Ramp character for a brightness in `0.0..=1.0`
pub fn ramp_char(luminance: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (luminance.clamp(0.0, 1.0) * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

fn average(a: Rgba, b: Rgba) -> Rgba {
    let mid = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
    Rgba::new(mid(a.r, b.r), mid(a.g, b.g), mid(a.b, b.b))
}

fn to_terminal(color: Rgba) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(renderer: &TerminalRenderer, pixels: &PixelBuffer) -> String {
        let mut out = Vec::new();
        renderer.draw(pixels, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_ramp_ends() {
        assert_eq!(ramp_char(0.0), ' ');
        assert_eq!(ramp_char(1.0), '@');
        assert_eq!(ramp_char(7.0), '@');
        assert_eq!(ramp_char(-1.0), ' ');
    }

    #[test]
    fn test_pixel_size_doubles_rows() {
        let mut renderer = TerminalRenderer::new(80, 23);
        assert_eq!(renderer.pixel_size(), (80, 46));
        renderer.resize(100, 30);
        assert_eq!(renderer.pixel_size(), (100, 60));
    }

    #[test]
    fn test_half_block_cells() {
        let renderer = TerminalRenderer::new(4, 2);
        let pixels = PixelBuffer::new(4, 4, Rgba::WHITE);
        let text = output(&renderer, &pixels);
        assert_eq!(text.matches(HALF_BLOCK).count(), 8);
    }

    #[test]
    fn test_ascii_cells() {
        let mut renderer = TerminalRenderer::new(3, 1);
        assert_eq!(renderer.toggle_style(), CellStyle::Ascii);
        let mut pixels = PixelBuffer::new(3, 2, Rgba::BLACK);
        pixels.set_pixel(1, 0, Rgba::WHITE);
        pixels.set_pixel(1, 1, Rgba::WHITE);
        let text = output(&renderer, &pixels);
        assert!(text.contains('@'));
        assert!(!text.contains(HALF_BLOCK));
    }
}
