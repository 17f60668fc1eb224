//! Color-classified RGBA image buffers.

use crate::Rgb;

/// One RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Neutral, fully transparent pixel used for invalid samples.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque pixel of the given color.
    pub const fn opaque(color: Rgb) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            a: 255,
        }
    }
}

/// A W×H buffer of RGBA pixels, one per source sample, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl ClassifiedImage {
    /// Create a fully transparent image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set the pixel at flat sample index `idx`.
    #[inline]
    pub fn set(&mut self, idx: usize, color: Rgba) {
        let offset = idx * 4;
        self.pixels[offset] = color.r;
        self.pixels[offset + 1] = color.g;
        self.pixels[offset + 2] = color.b;
        self.pixels[offset + 3] = color.a;
    }

    /// Pixel at column `i`, row `j`.
    pub fn pixel(&self, i: usize, j: usize) -> Option<Rgba> {
        if i >= self.width || j >= self.height {
            return None;
        }
        let offset = (j * self.width + i) * 4;
        Some(Rgba {
            r: self.pixels[offset],
            g: self.pixels[offset + 1],
            b: self.pixels[offset + 2],
            a: self.pixels[offset + 3],
        })
    }

    /// Raw RGBA bytes (4 bytes per pixel).
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}
