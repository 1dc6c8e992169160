//! Owned interleaved RGB8 pixel storage.

use crate::error::BufferError;

/// Channels per pixel. Buffers are always interleaved RGB.
pub const CHANNELS: usize = 3;

/// Interleaved `[R, G, B, R, G, B, ...]` bytes with known dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap decoded bytes, checking that they cover exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if bytes.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    /// Build a buffer from a row-major list of pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 3]]) -> Result<Self, BufferError> {
        Self::new(width, height, pixels.iter().flatten().copied().collect())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
        ])
    }
}
