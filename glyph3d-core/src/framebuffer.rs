/// Pixel and depth buffers
///
/// Both are owned by a single render call and dropped (or handed back) when
/// it returns.
use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Multiply each color channel by `intensity`, clamped to 0-255
    pub fn shade(self, intensity: f32) -> Self {
        let channel = |c: u8| (c as f32 * intensity).clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }

    /// `self` over `under` with coverage `opacity / 255`
    pub fn blend_over(self, under: Color, opacity: u8) -> Self {
        if opacity == u8::MAX {
            return self;
        }
        let alpha = opacity as f32 / 255.0;
        let mix = |top: u8, bottom: u8| {
            (top as f32 * alpha + bottom as f32 * (1.0 - alpha)).round() as u8
        };
        Self {
            r: mix(self.r, under.r),
            g: mix(self.g, under.g),
            b: mix(self.b, under.b),
            a: under.a.max(opacity),
        }
    }

    /// Perceived brightness in `0.0..=1.0`
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Row-major RGBA image with a top-left origin
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        let pixels = background.to_bytes().repeat(width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, 4 per pixel
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some(Color {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Alpha-blend `color` over the pixel already stored
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Color, opacity: u8) {
        if let Some(under) = self.pixel(x, y) {
            self.set_pixel(x, y, color.blend_over(under, opacity));
        }
    }

    /// Pixels whose color differs from `background`
    pub fn count_not(&self, background: Color) -> usize {
        let bg = background.to_bytes();
        self.pixels
            .chunks_exact(4)
            .filter(|p| p[..] != bg[..])
            .count()
    }
}

/// A color buffer with a parallel depth buffer
///
/// Depth starts at +infinity; smaller values are nearer.
#[derive(Debug, Clone)]
pub struct DepthTarget {
    color: PixelBuffer,
    depth: Vec<f32>,
}

impl DepthTarget {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            color: PixelBuffer::new(width, height, background),
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.color.width
    }

    pub fn height(&self) -> usize {
        self.color.height
    }

    pub fn color(&self) -> &PixelBuffer {
        &self.color
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width() && y < self.height()).then(|| self.depth[y * self.width() + x])
    }

    /// Write `color` if `depth` is nearer than or equal to the stored depth
    ///
    /// Equal depth passes so that later draws win ties.
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32, color: Color, opacity: u8) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }
        let idx = y * self.width() + x;
        if depth <= self.depth[idx] {
            self.depth[idx] = depth;
            self.color.blend_pixel(x, y, color, opacity);
            return true;
        }
        false
    }

    pub fn into_pixels(self) -> PixelBuffer {
        self.color
    }
}
