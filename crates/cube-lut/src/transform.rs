//! Per-pixel application of a [`LutTable`] to an 8-bit buffer.

use crate::pixel::{PixelBuffer, CHANNELS};
use crate::table::LutTable;

/// Rewrites RGB8 buffers through a lookup table.
///
/// The byte-to-float table is filled in [`PixelTransformer::new`], so it is
/// complete before the transformer can be handed to anything that uses it.
#[derive(Debug, Clone)]
pub struct PixelTransformer {
    normalize: [f32; 256],
}

impl PixelTransformer {
    pub fn new() -> Self {
        let mut normalize = [0.0_f32; 256];
        for (value, slot) in normalize.iter_mut().enumerate() {
            *slot = value as f32 / 255.0;
        }
        Self { normalize }
    }

    /// `byte / 255` from the precomputed table.
    #[inline]
    pub fn normalize(&self, byte: u8) -> f32 {
        self.normalize[byte as usize]
    }

    /// Transform every pixel of `buffer` in place.
    pub fn apply(&self, buffer: &mut PixelBuffer, table: &LutTable) {
        for px in buffer.as_mut_bytes().chunks_exact_mut(CHANNELS) {
            let out = table.apply(
                self.normalize(px[0]),
                self.normalize(px[1]),
                self.normalize(px[2]),
            );
            px[0] = round_to_byte(out.r);
            px[1] = round_to_byte(out.g);
            px[2] = round_to_byte(out.b);
        }
    }
}

impl Default for PixelTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a normalized value to a byte, rounding half up and saturating.
#[inline]
pub fn round_to_byte(x: f32) -> u8 {
    (x * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}
